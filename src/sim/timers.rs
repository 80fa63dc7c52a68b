//! Virtual-time timer queue
//!
//! Every delay in the game (round transitions, reveal windows, playback steps)
//! is a timer in this queue. The driver advances time explicitly, so the whole
//! simulation is reproducible from a seed plus a list of timed inputs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Entry<T> {
    due: f64,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed so the max-heap yields the earliest timer first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Ordered queue of pending timers over a virtual millisecond clock
pub struct Scheduler<T> {
    now: f64,
    next_seq: u64,
    queue: BinaryHeap<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<T> Scheduler<T> {
    /// Create a scheduler whose clock starts at `now` (ms)
    pub fn new(now: f64) -> Self {
        Self {
            now,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Queue `task` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: f64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry {
            due: self.now + delay_ms.max(0.0),
            seq,
            task,
        });
    }

    /// Pop the next timer due at or before `until`, moving the clock to its due time
    pub fn pop_due(&mut self, until: f64) -> Option<T> {
        if self.queue.peek().is_some_and(|e| e.due <= until) {
            let entry = self.queue.pop()?;
            self.now = self.now.max(entry.due);
            Some(entry.task)
        } else {
            None
        }
    }

    /// Move the clock forward (never backwards)
    pub fn set_now(&mut self, now: f64) {
        self.now = self.now.max(now);
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|e| e.due)
    }

    /// Drop every pending timer matching `pred`
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) {
        self.queue.retain(|e| !pred(&e.task));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
