//! Player preferences and device tuning
//!
//! Persisted next to progress in the session store.

use serde::{Deserialize, Serialize};

use crate::consts::{CONFETTI_PIECES, CONFETTI_PIECES_REDUCED};
use crate::persistence::KeyValueStore;
use crate::sim::Level;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Multiplier on every level's time budget (device tuning)
    pub time_scale: f64,
    /// Celebrate the final level with confetti
    pub confetti: bool,
    /// Reduced motion (fewer confetti pieces)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            confetti: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Session store key
    const STORAGE_KEY: &'static str = "reflexArcadeSettings";

    /// Tuned time budget for a level
    pub fn max_time_ms(&self, level: Level) -> u64 {
        let scale = if self.time_scale.is_finite() && self.time_scale > 0.0 {
            self.time_scale
        } else {
            1.0
        };
        (level.base_max_time_ms() as f64 * scale).round() as u64
    }

    /// Confetti piece count (0 when disabled)
    pub fn confetti_pieces(&self) -> usize {
        if !self.confetti {
            0
        } else if self.reduced_motion {
            CONFETTI_PIECES_REDUCED
        } else {
            CONFETTI_PIECES
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from session storage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if let Ok(json) = serde_json::to_string(self) {
            store.set(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_default_budgets() {
        let s = Settings::default();
        let budgets: Vec<u64> = Level::ALL.iter().map(|l| s.max_time_ms(*l)).collect();
        assert_eq!(budgets, vec![4000, 3500, 15000, 20000]);
    }

    #[test]
    fn test_time_scale() {
        let s = Settings {
            time_scale: 1.25,
            ..Default::default()
        };
        assert_eq!(s.max_time_ms(Level::Stroop), 4375);

        let broken = Settings {
            time_scale: f64::NAN,
            ..Default::default()
        };
        assert_eq!(broken.max_time_ms(Level::Reaction), 4000);
    }

    #[test]
    fn test_confetti_pieces() {
        let mut s = Settings::default();
        assert_eq!(s.confetti_pieces(), CONFETTI_PIECES);
        s.reduced_motion = true;
        assert_eq!(s.confetti_pieces(), CONFETTI_PIECES_REDUCED);
        s.confetti = false;
        assert_eq!(s.confetti_pieces(), 0);
    }

    #[test]
    fn test_load_save() {
        let mut store = MemoryStorage::new();
        assert_eq!(Settings::load(&store), Settings::default());

        let s = Settings {
            time_scale: 1.5,
            confetti: false,
            reduced_motion: true,
        };
        s.save(&mut store);
        assert_eq!(Settings::load(&store), s);

        // Missing fields take defaults
        store.set("reflexArcadeSettings", r#"{"confetti":false}"#);
        let partial = Settings::load(&store);
        assert!(!partial.confetti);
        assert_eq!(partial.time_scale, 1.0);

        store.set("reflexArcadeSettings", "garbage");
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
