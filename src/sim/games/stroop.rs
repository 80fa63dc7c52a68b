//! Level 2: does the word name its own ink colour?

use rand::Rng;

use super::{RoundCtx, RoundGame};
use crate::consts::{ROUNDS_PER_LEVEL, STROOP_NEXT_MS};

/// Colour words and the ink they stand for, index-aligned
pub const VOCABULARY: [(&str, &str); 6] = [
    ("YELLOW", "#f39c12"),
    ("RED", "#e74c3c"),
    ("BLUE", "#3498db"),
    ("GREEN", "#2ecc71"),
    ("PURPLE", "#9b59b6"),
    ("ORANGE", "#e67e22"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StroopTimer {
    NextRound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StroopEvent {
    /// Show `word` in `color`, answer buttons enabled
    Word {
        word: &'static str,
        color: &'static str,
    },
    /// Answer taken, buttons disabled
    Answered { correct: bool },
}

#[derive(Debug, Clone, Default)]
pub struct StroopGame {
    round: u32,
    word: usize,
    color: usize,
    answered: bool,
}

impl StroopGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Word and ink are the same colour this round
    pub fn matches(&self) -> bool {
        self.word == self.color
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    fn next_round(&mut self, ctx: &mut RoundCtx<'_>) {
        self.round += 1;
        self.answered = false;

        let n = VOCABULARY.len();
        self.word = ctx.rng().random_range(0..n);
        self.color = ctx.rng().random_range(0..n);

        ctx.announce_round(self.round);
        ctx.emit(StroopEvent::Word {
            word: VOCABULARY[self.word].0,
            color: VOCABULARY[self.color].1,
        });
        ctx.timing_start();
    }

    /// Player answered "matches" (`true`) or "does not match" (`false`).
    /// Only the first answer of a round counts.
    pub fn answer(&mut self, says_match: bool, ctx: &mut RoundCtx<'_>) {
        if self.answered || self.round == 0 {
            return;
        }
        self.answered = true;

        let correct = says_match == self.matches();
        ctx.timing_stop();
        ctx.mark_round(correct);
        ctx.emit(StroopEvent::Answered { correct });
        log::debug!("Stroop round {}: correct={}", self.round, correct);

        if self.round < ROUNDS_PER_LEVEL {
            ctx.schedule(STROOP_NEXT_MS, StroopTimer::NextRound);
        } else {
            ctx.finish_level();
        }
    }
}

impl RoundGame for StroopGame {
    type Timer = StroopTimer;

    fn start(&mut self, ctx: &mut RoundCtx<'_>) {
        self.next_round(ctx);
    }

    fn on_timer(&mut self, timer: StroopTimer, ctx: &mut RoundCtx<'_>) {
        match timer {
            StroopTimer::NextRound => self.next_round(ctx),
        }
    }

    fn round(&self) -> u32 {
        self.round
    }
}
