//! Level 3: watch four panels flash, then repeat the sequence
//!
//! Playback is a chain of timers tagged with a playback token. Starting a new
//! playback bumps the token, so every step of an older chain finds itself
//! stale at its next firing and stops without touching the board.
//!
//! A round only counts if it was played cleanly: one wrong tap replays the
//! sequence, and the round stays lost even if the replay is repeated perfectly.

use rand::Rng;

use super::{RoundCtx, RoundGame};
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimonTimer {
    /// Start (or restart) playback of the current sequence
    Playback,
    /// Turn off the flash of `step`
    FlashOff { token: u64, step: usize },
    /// Flash `step` after the gap
    FlashStep { token: u64, step: usize },
    /// End the short flash of a player tap
    PressRelease { panel: usize },
    NextRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimonEvent {
    /// Playback flash
    Flash { panel: usize, on: bool },
    /// Feedback flash for a player tap
    Press { panel: usize, on: bool },
    /// Panels accept taps
    InputEnabled(bool),
}

/// Sequence length for a 1-based round
pub fn sequence_length(round: u32) -> usize {
    (round as usize)
        .checked_sub(1)
        .and_then(|i| SIMON_LENGTHS.get(i).copied())
        .unwrap_or(SIMON_FALLBACK_LENGTH)
}

/// Random panel sequence with no panel repeated back to back
pub fn generate_sequence(len: usize, rng: &mut impl Rng) -> Vec<usize> {
    let mut sequence = Vec::with_capacity(len);
    let mut prev = None;
    for _ in 0..len {
        let mut panel = rng.random_range(0..SIMON_PANELS);
        while Some(panel) == prev {
            panel = rng.random_range(0..SIMON_PANELS);
        }
        sequence.push(panel);
        prev = Some(panel);
    }
    sequence
}

#[derive(Debug, Clone, Default)]
pub struct SimonGame {
    round: u32,
    sequence: Vec<usize>,
    /// Player's echo so far
    entered: Vec<usize>,
    locked: bool,
    failed_this_round: bool,
    play_token: u64,
}

impl SimonGame {
    pub fn new() -> Self {
        Self {
            locked: true,
            ..Default::default()
        }
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    /// Steps of the sequence already echoed this try
    pub fn entered_len(&self) -> usize {
        self.entered.len()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn failed_this_round(&self) -> bool {
        self.failed_this_round
    }

    fn next_round(&mut self, ctx: &mut RoundCtx<'_>) {
        self.round += 1;
        self.entered.clear();
        self.failed_this_round = false;
        self.locked = true;
        self.sequence = generate_sequence(sequence_length(self.round), ctx.rng());

        ctx.announce_round(self.round);
        ctx.status("Memorize...");
        ctx.schedule(SIMON_LEAD_IN_MS, SimonTimer::Playback);
    }

    /// Play the current sequence from the start, cancelling any playback in flight
    pub fn replay(&mut self, ctx: &mut RoundCtx<'_>) {
        self.locked = true;
        self.entered.clear();
        self.play_token += 1;
        ctx.emit(SimonEvent::InputEnabled(false));
        self.play_step(self.play_token, 0, ctx);
    }

    fn play_step(&mut self, token: u64, step: usize, ctx: &mut RoundCtx<'_>) {
        if token != self.play_token {
            return;
        }
        match self.sequence.get(step) {
            Some(&panel) => {
                ctx.emit(SimonEvent::Flash { panel, on: true });
                ctx.schedule(SIMON_FLASH_ON_MS, SimonTimer::FlashOff { token, step });
            }
            None => {
                self.locked = false;
                ctx.emit(SimonEvent::InputEnabled(true));
                ctx.status("Your turn!");
                ctx.timing_start();
            }
        }
    }

    /// Player tapped `panel`
    pub fn press(&mut self, panel: usize, ctx: &mut RoundCtx<'_>) {
        if self.locked || panel >= SIMON_PANELS {
            return;
        }

        self.entered.push(panel);
        ctx.emit(SimonEvent::Press { panel, on: true });
        ctx.schedule(SIMON_PRESS_MS, SimonTimer::PressRelease { panel });

        let idx = self.entered.len() - 1;
        if self.sequence.get(idx) != Some(&panel) {
            self.failed_this_round = true;
            self.entered.clear();
            self.locked = true;
            ctx.emit(SimonEvent::InputEnabled(false));
            ctx.status("Wrong! Watch again...");
            ctx.timing_stop();
            ctx.schedule(SIMON_RETRY_MS, SimonTimer::Playback);
            return;
        }

        if self.entered.len() == self.sequence.len() {
            self.locked = true;
            ctx.emit(SimonEvent::InputEnabled(false));
            ctx.timing_stop();
            ctx.mark_round(!self.failed_this_round);
            log::debug!(
                "Simon round {} done, clean={}",
                self.round,
                !self.failed_this_round
            );

            if self.round < ROUNDS_PER_LEVEL {
                ctx.status("Next round...");
                ctx.schedule(SIMON_NEXT_MS, SimonTimer::NextRound);
            } else {
                ctx.status("Done!");
                ctx.finish_level();
            }
            return;
        }

        let rest = self.sequence.len() - self.entered.len();
        ctx.status(format!("{} more...", rest));
    }
}

impl RoundGame for SimonGame {
    type Timer = SimonTimer;

    fn start(&mut self, ctx: &mut RoundCtx<'_>) {
        self.next_round(ctx);
    }

    fn on_timer(&mut self, timer: SimonTimer, ctx: &mut RoundCtx<'_>) {
        match timer {
            SimonTimer::Playback => self.replay(ctx),
            SimonTimer::FlashOff { token, step } => {
                if token != self.play_token {
                    return;
                }
                if let Some(&panel) = self.sequence.get(step) {
                    ctx.emit(SimonEvent::Flash { panel, on: false });
                }
                ctx.schedule(
                    SIMON_FLASH_OFF_MS,
                    SimonTimer::FlashStep {
                        token,
                        step: step + 1,
                    },
                );
            }
            SimonTimer::FlashStep { token, step } => self.play_step(token, step, ctx),
            SimonTimer::PressRelease { panel } => {
                ctx.emit(SimonEvent::Press { panel, on: false });
            }
            SimonTimer::NextRound => self.next_round(ctx),
        }
    }

    fn round(&self) -> u32 {
        self.round
    }
}
