//! Level progress: completed levels and best passing times
//!
//! Persisted to the session store under two keys:
//! - `completedLevels`: JSON array of level IDs, ascending
//! - `bestTimesByLevel`: JSON object of level ID string to milliseconds
//!
//! Anything unreadable in either key loads as empty.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::persistence::KeyValueStore;
use crate::sim::Level;

/// Outcome of recording a passed level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassRecord {
    /// Level was not completed before
    pub newly_completed: bool,
    /// Time beat the stored best (or there was none)
    pub new_best: bool,
}

/// Completed levels and best times for this browser session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    completed: BTreeSet<Level>,
    best_times: BTreeMap<Level, u64>,
}

impl Progress {
    const COMPLETED_KEY: &'static str = "completedLevels";
    const BEST_TIMES_KEY: &'static str = "bestTimesByLevel";

    pub fn new() -> Self {
        Self::default()
    }

    /// Level 1 is always open; every other level needs its predecessor completed
    pub fn is_unlocked(&self, level: Level) -> bool {
        match level.previous() {
            None => true,
            Some(prev) => self.completed.contains(&prev),
        }
    }

    /// Unlock state of every level, in level order
    pub fn unlocked(&self) -> [bool; 4] {
        Level::ALL.map(|level| self.is_unlocked(level))
    }

    pub fn is_completed(&self, level: Level) -> bool {
        self.completed.contains(&level)
    }

    /// Completed level IDs, ascending
    pub fn completed_ids(&self) -> Vec<u8> {
        self.completed.iter().map(|l| l.id()).collect()
    }

    pub fn best_time(&self, level: Level) -> Option<u64> {
        self.best_times.get(&level).copied()
    }

    /// Record a passing run. Only a strictly faster time replaces the best.
    pub fn record_pass(&mut self, level: Level, total_ms: u64) -> PassRecord {
        let newly_completed = self.completed.insert(level);
        let new_best = match self.best_times.get(&level) {
            Some(&best) => total_ms < best,
            None => true,
        };
        if new_best {
            self.best_times.insert(level, total_ms);
        }
        PassRecord {
            newly_completed,
            new_best,
        }
    }

    /// Forget all progress
    pub fn reset(&mut self) {
        self.completed.clear();
        self.best_times.clear();
    }

    /// Load from the store, dropping anything malformed
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let completed = store
            .get(Self::COMPLETED_KEY)
            .map(|raw| parse_completed(&raw))
            .unwrap_or_default();
        let best_times = store
            .get(Self::BEST_TIMES_KEY)
            .map(|raw| parse_best_times(&raw))
            .unwrap_or_default();

        log::debug!(
            "Loaded progress: {} completed, {} best times",
            completed.len(),
            best_times.len()
        );
        Self {
            completed,
            best_times,
        }
    }

    /// Write both keys
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        self.save_completed(store);
        self.save_best_times(store);
    }

    pub fn save_completed(&self, store: &mut dyn KeyValueStore) {
        if let Ok(json) = serde_json::to_string(&self.completed_ids()) {
            store.set(Self::COMPLETED_KEY, &json);
        }
    }

    pub fn save_best_times(&self, store: &mut dyn KeyValueStore) {
        let by_id: BTreeMap<String, u64> = self
            .best_times
            .iter()
            .map(|(level, ms)| (level.id().to_string(), *ms))
            .collect();
        if let Ok(json) = serde_json::to_string(&by_id) {
            store.set(Self::BEST_TIMES_KEY, &json);
        }
    }

    /// Remove both keys from the store
    pub fn clear_store(store: &mut dyn KeyValueStore) {
        store.remove(Self::COMPLETED_KEY);
        store.remove(Self::BEST_TIMES_KEY);
    }
}

/// Accepts integers and numeric strings; drops everything else
fn parse_completed(raw: &str) -> BTreeSet<Level> {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) else {
        log::warn!("Ignoring malformed completed levels");
        return BTreeSet::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|n| n.is_finite() && n.fract() == 0.0 && (1.0..=255.0).contains(n))
        .filter_map(|n| Level::from_id(n as u8))
        .collect()
}

fn parse_best_times(raw: &str) -> BTreeMap<Level, u64> {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
        log::warn!("Ignoring malformed best times");
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(key, value)| {
            let level = key.trim().parse::<u8>().ok().and_then(Level::from_id)?;
            let ms = value.as_f64().filter(|ms| ms.is_finite() && *ms >= 0.0)?;
            Some((level, ms.round() as u64))
        })
        .collect()
}
