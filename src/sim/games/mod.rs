//! The four mini-games
//!
//! Each game drives its own round loop through timers and input, and reports
//! back to the session through a borrowed `RoundCtx`. The session never looks
//! inside a game; it only routes timers and input to it.

pub mod memory;
pub mod reaction;
pub mod simon;
pub mod stroop;

use rand_pcg::Pcg32;

use super::level::Level;
use super::session::{Attempt, StartError, Timer};
use super::state::{GameInput, Signal, Viewport};
use super::timers::Scheduler;

pub use memory::{MemoryGame, MemoryTimer};
pub use reaction::{ReactionField, ReactionTimer};
pub use simon::{SimonGame, SimonTimer};
pub use stroop::{StroopGame, StroopTimer};

/// Session services available to a running mini-game
pub struct RoundCtx<'a> {
    pub(crate) attempt: &'a mut Attempt,
    pub(crate) timers: &'a mut Scheduler<Timer>,
    pub(crate) rng: &'a mut Pcg32,
    pub(crate) signals: &'a mut Vec<Signal>,
    pub(crate) viewport: Viewport,
}

impl RoundCtx<'_> {
    pub fn now(&self) -> f64 {
        self.timers.now()
    }

    pub fn timing_start(&mut self) {
        let now = self.now();
        self.attempt.timing_start(now);
    }

    pub fn timing_stop(&mut self) {
        let now = self.now();
        self.attempt.timing_stop(now);
    }

    pub fn mark_round(&mut self, correct: bool) {
        self.attempt.mark_round(correct);
    }

    /// Ask the session to score the attempt once this callback returns
    pub fn finish_level(&mut self) {
        self.attempt.request_finish();
    }

    /// Fire `timer` back at this game after `delay_ms`
    pub fn schedule(&mut self, delay_ms: f64, timer: impl Into<GameTimer>) {
        let task = Timer::Game {
            attempt: self.attempt.id(),
            timer: timer.into(),
        };
        self.timers.schedule(delay_ms, task);
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut *self.rng
    }

    pub fn emit(&mut self, signal: impl Into<Signal>) {
        self.signals.push(signal.into());
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Publish the round header
    pub fn announce_round(&mut self, round: u32) {
        let level = self.attempt.level();
        self.emit(Signal::Round { level, round });
    }

    pub fn status(&mut self, text: impl Into<String>) {
        self.emit(Signal::Status(text.into()));
    }
}

/// Common round-loop shape of every mini-game
pub trait RoundGame {
    type Timer;

    /// Begin round 1
    fn start(&mut self, ctx: &mut RoundCtx<'_>);

    /// A timer this game scheduled has fired
    fn on_timer(&mut self, timer: Self::Timer, ctx: &mut RoundCtx<'_>);

    /// Current round (1-based, 0 before start)
    fn round(&self) -> u32;
}

/// Timer owned by one of the games
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameTimer {
    Reaction(ReactionTimer),
    Stroop(StroopTimer),
    Simon(SimonTimer),
    Memory(MemoryTimer),
}

impl From<ReactionTimer> for GameTimer {
    fn from(t: ReactionTimer) -> Self {
        GameTimer::Reaction(t)
    }
}

impl From<StroopTimer> for GameTimer {
    fn from(t: StroopTimer) -> Self {
        GameTimer::Stroop(t)
    }
}

impl From<SimonTimer> for GameTimer {
    fn from(t: SimonTimer) -> Self {
        GameTimer::Simon(t)
    }
}

impl From<MemoryTimer> for GameTimer {
    fn from(t: MemoryTimer) -> Self {
        GameTimer::Memory(t)
    }
}

/// The mini-game for the current level
#[derive(Debug, Clone)]
pub enum MiniGame {
    Reaction(ReactionField),
    Stroop(StroopGame),
    Simon(SimonGame),
    Memory(MemoryGame),
}

impl MiniGame {
    /// Build the game for `level`
    pub fn for_level(level: Level, viewport: Viewport) -> Result<Self, StartError> {
        Ok(match level {
            Level::Reaction => MiniGame::Reaction(ReactionField::new()),
            Level::Stroop => MiniGame::Stroop(StroopGame::new()),
            Level::Simon => MiniGame::Simon(SimonGame::new()),
            Level::Memory => MiniGame::Memory(MemoryGame::new(viewport)?),
        })
    }

    pub fn level(&self) -> Level {
        match self {
            MiniGame::Reaction(_) => Level::Reaction,
            MiniGame::Stroop(_) => Level::Stroop,
            MiniGame::Simon(_) => Level::Simon,
            MiniGame::Memory(_) => Level::Memory,
        }
    }

    pub fn start(&mut self, ctx: &mut RoundCtx<'_>) {
        match self {
            MiniGame::Reaction(g) => g.start(ctx),
            MiniGame::Stroop(g) => g.start(ctx),
            MiniGame::Simon(g) => g.start(ctx),
            MiniGame::Memory(g) => g.start(ctx),
        }
    }

    pub fn on_timer(&mut self, timer: GameTimer, ctx: &mut RoundCtx<'_>) {
        match (self, timer) {
            (MiniGame::Reaction(g), GameTimer::Reaction(t)) => g.on_timer(t, ctx),
            (MiniGame::Stroop(g), GameTimer::Stroop(t)) => g.on_timer(t, ctx),
            (MiniGame::Simon(g), GameTimer::Simon(t)) => g.on_timer(t, ctx),
            (MiniGame::Memory(g), GameTimer::Memory(t)) => g.on_timer(t, ctx),
            (_, t) => log::debug!("Ignoring foreign timer {:?}", t),
        }
    }

    pub fn on_input(&mut self, input: GameInput, ctx: &mut RoundCtx<'_>) {
        match (self, input) {
            (MiniGame::Reaction(g), GameInput::TargetHit) => g.hit(ctx),
            (MiniGame::Stroop(g), GameInput::Answer(says_match)) => g.answer(says_match, ctx),
            (MiniGame::Simon(g), GameInput::Panel(panel)) => g.press(panel, ctx),
            (MiniGame::Memory(g), GameInput::Card(index)) => g.tap(index, ctx),
            (_, input) => log::debug!("Ignoring input {:?} for this game", input),
        }
    }

    pub fn round(&self) -> u32 {
        match self {
            MiniGame::Reaction(g) => g.round(),
            MiniGame::Stroop(g) => g.round(),
            MiniGame::Simon(g) => g.round(),
            MiniGame::Memory(g) => g.round(),
        }
    }
}

/// Drives a single game against a private scheduler, without a session
#[cfg(test)]
pub(crate) mod harness {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;

    pub struct Harness {
        pub attempt: Attempt,
        pub timers: Scheduler<Timer>,
        pub rng: Pcg32,
        pub signals: Vec<Signal>,
        pub viewport: Viewport,
    }

    impl Harness {
        pub fn new(level: Level, seed: u64) -> Self {
            Self {
                attempt: Attempt::new(1, level),
                timers: Scheduler::new(0.0),
                rng: Pcg32::seed_from_u64(seed),
                signals: Vec::new(),
                viewport: Viewport::default(),
            }
        }

        pub fn ctx(&mut self) -> RoundCtx<'_> {
            RoundCtx {
                attempt: &mut self.attempt,
                timers: &mut self.timers,
                rng: &mut self.rng,
                signals: &mut self.signals,
                viewport: self.viewport,
            }
        }

        pub fn now(&self) -> f64 {
            self.timers.now()
        }

        /// Fire every game timer due up to `until`
        pub fn run_until<G: RoundGame>(&mut self, game: &mut G, until: f64)
        where
            G::Timer: TryFrom<GameTimer>,
        {
            while let Some(task) = self.timers.pop_due(until) {
                if let Timer::Game { timer, .. } = task {
                    if let Ok(t) = G::Timer::try_from(timer) {
                        let mut ctx = self.ctx();
                        game.on_timer(t, &mut ctx);
                    }
                }
            }
            self.timers.set_now(until);
        }

        /// Advance by `dt` milliseconds
        pub fn advance<G: RoundGame>(&mut self, game: &mut G, dt: f64)
        where
            G::Timer: TryFrom<GameTimer>,
        {
            let until = self.now() + dt;
            self.run_until(game, until);
        }

        /// Fire timers until the queue is empty
        pub fn settle<G: RoundGame>(&mut self, game: &mut G)
        where
            G::Timer: TryFrom<GameTimer>,
        {
            while let Some(due) = self.timers.next_due() {
                self.run_until(game, due);
            }
        }

        pub fn take_signals(&mut self) -> Vec<Signal> {
            std::mem::take(&mut self.signals)
        }
    }

    macro_rules! impl_try_from_game_timer {
        ($variant:ident, $ty:ty) => {
            impl TryFrom<GameTimer> for $ty {
                type Error = ();

                fn try_from(t: GameTimer) -> Result<Self, ()> {
                    match t {
                        GameTimer::$variant(inner) => Ok(inner),
                        _ => Err(()),
                    }
                }
            }
        };
    }

    impl_try_from_game_timer!(Reaction, ReactionTimer);
    impl_try_from_game_timer!(Stroop, StroopTimer);
    impl_try_from_game_timer!(Simon, SimonTimer);
    impl_try_from_game_timer!(Memory, MemoryTimer);
}
