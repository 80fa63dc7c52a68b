//! Deterministic game core
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Time only comes in through `dispatch`, `advance_to` and `frame`
//! - Seeded RNG only
//! - Timers fire in due order, ties in scheduling order
//! - No DOM or platform dependencies

pub mod autoplay;
pub mod confetti;
pub mod games;
pub mod level;
pub mod session;
pub mod state;
pub mod timers;
pub mod timing;

pub use autoplay::autoplay_input;
pub use confetti::{Confetti, ConfettiPiece};
pub use games::{GameTimer, MiniGame, RoundCtx, RoundGame};
pub use level::Level;
pub use session::{Attempt, Session, StartError, Timer};
pub use state::{Action, BestTimeRow, GameInput, LevelResult, Screen, Signal, Viewport};
pub use timers::Scheduler;
pub use timing::TimingAccumulator;
