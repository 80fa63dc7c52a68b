//! Reflex Arcade - four reflex/memory mini-games in the browser
//!
//! Core modules:
//! - `sim`: Deterministic game logic (scheduler, session, mini-games, confetti)
//! - `persistence`: Session-scoped key/value storage
//! - `progress`: Completed levels and best times
//! - `settings`: Player preferences and device tuning
//! - `platform`: Browser/native clock and input de-duplication

pub mod persistence;
pub mod platform;
pub mod progress;
pub mod settings;
pub mod sim;

pub use progress::Progress;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Rounds in every level attempt
    pub const ROUNDS_PER_LEVEL: u32 = 5;
    /// Number of levels
    pub const LEVEL_COUNT: u8 = 4;

    /// Countdown step length ("3", "2", "1")
    pub const COUNTDOWN_STEP_MS: f64 = 950.0;
    /// Pause between "GO!" and the first round
    pub const COUNTDOWN_GO_MS: f64 = 520.0;

    /// Duplicate taps on the same control within this window are dropped
    pub const TAP_GUARD_MS: f64 = 180.0;

    /// Confetti runs this long after the final level is passed
    pub const CONFETTI_DURATION_MS: f64 = 12_000.0;
    pub const CONFETTI_PIECES: usize = 260;
    /// Piece cap when reduced motion is on
    pub const CONFETTI_PIECES_REDUCED: usize = 80;

    /// Reaction target
    pub const REACTION_DELAY_MIN_MS: f64 = 450.0;
    pub const REACTION_DELAY_SPAN_MS: f64 = 900.0;
    pub const TARGET_SIZE: f32 = 85.0;
    pub const TARGET_PAD: f32 = 8.0;
    pub const TARGET_TOP_SAFE: f32 = 120.0;

    /// Stroop pause before the next word
    pub const STROOP_NEXT_MS: f64 = 180.0;

    /// Simon timings
    pub const SIMON_LENGTHS: [usize; 5] = [3, 4, 5, 6, 7];
    pub const SIMON_FALLBACK_LENGTH: usize = 5;
    pub const SIMON_PANELS: usize = 4;
    pub const SIMON_LEAD_IN_MS: f64 = 450.0;
    pub const SIMON_FLASH_ON_MS: f64 = 260.0;
    pub const SIMON_FLASH_OFF_MS: f64 = 190.0;
    pub const SIMON_PRESS_MS: f64 = 140.0;
    pub const SIMON_RETRY_MS: f64 = 550.0;
    pub const SIMON_NEXT_MS: f64 = 650.0;

    /// Memory timings
    pub const MEMORY_CARDS: [usize; 5] = [6, 6, 8, 8, 12];
    pub const MEMORY_FALLBACK_CARDS: usize = 12;
    pub const MEMORY_PREVIEW_MS: [f64; 5] = [1000.0, 850.0, 950.0, 1050.0, 2200.0];
    pub const MEMORY_FALLBACK_PREVIEW_MS: f64 = 1000.0;
    pub const MEMORY_CLOSED_BEFORE_REVEAL_MS: f64 = 220.0;
    pub const MEMORY_HIGHLIGHT_MS: f64 = 200.0;
    pub const MEMORY_FLIP_BACK_MS: f64 = 520.0;
    pub const MEMORY_NEXT_MS: f64 = 460.0;

    /// Memory card sizing (pixels)
    pub const CARD_GAP: f32 = 10.0;
    pub const CARD_MIN_W: f32 = 56.0;
    pub const CARD_MAX_W: f32 = 92.0;
    pub const CARD_MIN_H: f32 = 44.0;
    pub const CARD_MAX_H: f32 = 72.0;
}
