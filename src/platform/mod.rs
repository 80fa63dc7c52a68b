//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Monotonic time
//! - Input de-duplication

pub mod input;
pub mod time;

pub use input::TapGuard;
pub use time::MonotonicClock;
