//! Level 1: tap the field as soon as it appears
//!
//! Every round waits a random delay, then shows the target somewhere below the
//! header. Time runs from appearance to the first tap. A round cannot be lost.

use glam::Vec2;
use rand::Rng;

use super::{RoundCtx, RoundGame};
use crate::consts::*;
use crate::sim::state::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTimer {
    /// Show the target for `round`
    Show { round: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReactionEvent {
    /// Round set up, target hidden
    Waiting,
    /// Target visible with its top-left corner at `pos`
    TargetShown { pos: Vec2, size: f32 },
    /// Target hit and removed
    TargetHit,
}

/// Random top-left corner for the target inside `area`, clear of the header
/// and the edges
pub fn target_position(area: Viewport, rng: &mut impl Rng) -> Vec2 {
    let max_x = (area.width - TARGET_SIZE - TARGET_PAD).max(0.0);
    let max_y = (area.height - TARGET_SIZE - TARGET_PAD - TARGET_TOP_SAFE).max(0.0);
    Vec2::new(
        TARGET_PAD + rng.random::<f32>() * max_x,
        TARGET_TOP_SAFE + rng.random::<f32>() * max_y,
    )
}

#[derive(Debug, Clone, Default)]
pub struct ReactionField {
    round: u32,
    /// Where the target is, while it is visible
    target: Option<Vec2>,
}

impl ReactionField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    fn next_round(&mut self, ctx: &mut RoundCtx<'_>) {
        self.round += 1;
        self.target = None;
        ctx.announce_round(self.round);
        ctx.emit(ReactionEvent::Waiting);
        ctx.status("Wait for the field...");

        let delay = REACTION_DELAY_MIN_MS + ctx.rng().random::<f64>() * REACTION_DELAY_SPAN_MS;
        log::debug!("Reaction round {}: target in {:.0} ms", self.round, delay);
        ctx.schedule(delay, ReactionTimer::Show { round: self.round });
    }

    /// Player hit the target
    pub fn hit(&mut self, ctx: &mut RoundCtx<'_>) {
        if self.target.take().is_none() {
            return;
        }
        ctx.emit(ReactionEvent::TargetHit);
        ctx.timing_stop();
        ctx.mark_round(true);

        if self.round < ROUNDS_PER_LEVEL {
            self.next_round(ctx);
        } else {
            ctx.finish_level();
        }
    }
}

impl RoundGame for ReactionField {
    type Timer = ReactionTimer;

    fn start(&mut self, ctx: &mut RoundCtx<'_>) {
        self.next_round(ctx);
    }

    fn on_timer(&mut self, timer: ReactionTimer, ctx: &mut RoundCtx<'_>) {
        match timer {
            ReactionTimer::Show { round } if round == self.round && self.target.is_none() => {
                let pos = target_position(ctx.viewport(), ctx.rng());
                self.target = Some(pos);
                ctx.status("TAP!");
                ctx.emit(ReactionEvent::TargetShown {
                    pos,
                    size: TARGET_SIZE,
                });
                ctx.timing_start();
            }
            ReactionTimer::Show { .. } => {}
        }
    }

    fn round(&self) -> u32 {
        self.round
    }
}
