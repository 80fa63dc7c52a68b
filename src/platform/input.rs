//! Tap de-duplication
//!
//! Touch browsers deliver `pointerdown` and `click` for one physical tap, and
//! impatient players double-tap. A control accepts one activation per window.

use std::collections::HashMap;
use std::hash::Hash;

/// Per-control duplicate suppression
#[derive(Debug, Clone)]
pub struct TapGuard<K> {
    window_ms: f64,
    last_accepted: HashMap<K, f64>,
}

impl<K: Eq + Hash> TapGuard<K> {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last_accepted: HashMap::new(),
        }
    }

    /// Returns true if the tap should be handled
    pub fn accept(&mut self, control: K, now: f64) -> bool {
        match self.last_accepted.get(&control) {
            Some(&last) if now - last < self.window_ms => false,
            _ => {
                self.last_accepted.insert(control, now);
                true
            }
        }
    }
}
