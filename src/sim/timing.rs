//! Elapsed-time accumulation across the rounds of one level attempt

/// Start/stop stopwatch that sums every measured interval
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingAccumulator {
    sum_ms: f64,
    /// Start of the running interval; `Some` exactly when timing is active
    started_at: Option<f64>,
}

impl TimingAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin an interval. No-op while already running.
    pub fn start(&mut self, now: f64) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// End the running interval and add it to the sum. No-op while stopped.
    pub fn stop(&mut self, now: f64) {
        if let Some(t0) = self.started_at.take() {
            self.sum_ms += (now - t0).max(0.0);
        }
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<f64> {
        self.started_at
    }

    /// Accumulated milliseconds (excluding any running interval)
    pub fn sum_ms(&self) -> f64 {
        self.sum_ms
    }

    /// Accumulated time rounded to whole milliseconds
    pub fn total_ms(&self) -> u64 {
        self.sum_ms.round() as u64
    }
}
