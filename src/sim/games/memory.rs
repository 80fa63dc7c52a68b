//! Level 4: card matching
//!
//! Each round previews the shuffled board, hides it, then the player turns
//! cards two at a time. Taps go through a FIFO and are applied one at a time,
//! each to completion, in arrival order. A round counts only if no pair was
//! missed.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;

use super::{RoundCtx, RoundGame};
use crate::consts::*;
use crate::sim::session::StartError;
use crate::sim::state::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryTimer {
    /// Show every card of `round` face up
    Reveal { round: u32 },
    /// End the preview of `round` and unlock the board
    Hide { round: u32 },
    /// Cosmetic pulse on a fresh match is over
    HighlightClear { a: usize, b: usize },
    /// Turn a missed pair back down
    FlipBack { a: usize, b: usize },
    NextRound,
}

/// How a card currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFace {
    Down,
    Up,
    Matched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub value: u8,
    pub face: CardFace,
}

impl Card {
    /// Letter printed on the card front
    pub fn symbol(&self) -> char {
        (b'A' + self.value.saturating_sub(1)) as char
    }
}

/// Board geometry in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub cols: usize,
    pub rows: usize,
    pub card_w: f32,
    pub card_h: f32,
}

impl GridLayout {
    /// Fit `count` cards into `area`. `None` if even minimum-size cards overflow.
    pub fn fit(count: usize, area: Viewport) -> Option<Self> {
        let cols = if count == 6 { 3 } else { 4 };
        let rows = count.div_ceil(cols);

        let fit_w = (area.width - CARD_GAP * (cols as f32 - 1.0)) / cols as f32;
        let fit_h = (area.height - CARD_GAP * (rows as f32 - 1.0)) / rows as f32;
        if fit_w < CARD_MIN_W || fit_h < CARD_MIN_H {
            return None;
        }

        Some(Self {
            cols,
            rows,
            card_w: fit_w.clamp(CARD_MIN_W, CARD_MAX_W),
            card_h: fit_h.clamp(CARD_MIN_H, CARD_MAX_H),
        })
    }

    /// Smallest allowed cards, used when a resize shrank the area mid-level
    pub fn minimum(count: usize) -> Self {
        let cols = if count == 6 { 3 } else { 4 };
        Self {
            cols,
            rows: count.div_ceil(cols),
            card_w: CARD_MIN_W,
            card_h: CARD_MIN_H,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemoryEvent {
    /// New face-down board
    Board {
        layout: GridLayout,
        symbols: Vec<char>,
    },
    /// Whole-board preview on/off
    Preview(bool),
    Card { index: usize, face: CardFace },
    /// Match pulse on/off (cosmetic)
    Highlight { a: usize, b: usize, on: bool },
    InputEnabled(bool),
}

/// Card count for a 1-based round
pub fn card_count(round: u32) -> usize {
    (round as usize)
        .checked_sub(1)
        .and_then(|i| MEMORY_CARDS.get(i).copied())
        .unwrap_or(MEMORY_FALLBACK_CARDS)
}

/// Preview duration for a 1-based round
pub fn preview_ms(round: u32) -> f64 {
    (round as usize)
        .checked_sub(1)
        .and_then(|i| MEMORY_PREVIEW_MS.get(i).copied())
        .unwrap_or(MEMORY_FALLBACK_PREVIEW_MS)
}

/// `count / 2` values, each twice, shuffled
pub fn build_deck(count: usize, rng: &mut impl Rng) -> Vec<u8> {
    let pairs = (count / 2) as u8;
    let mut values: Vec<u8> = (1..=pairs).flat_map(|v| [v, v]).collect();
    values.shuffle(rng);
    values
}

#[derive(Debug, Clone)]
pub struct MemoryGame {
    round: u32,
    cards: Vec<Card>,
    locked: bool,
    /// First card of the pair being turned
    first: Option<usize>,
    matched: usize,
    missed_this_round: bool,
    /// Pending taps, oldest first
    queue: VecDeque<usize>,
}

impl MemoryGame {
    /// Refuses a viewport that cannot hold the largest board
    pub fn new(viewport: Viewport) -> Result<Self, StartError> {
        let largest = MEMORY_CARDS
            .iter()
            .copied()
            .chain([MEMORY_FALLBACK_CARDS])
            .max()
            .unwrap_or(MEMORY_FALLBACK_CARDS);
        if GridLayout::fit(largest, viewport).is_none() {
            return Err(StartError::BoardTooSmall {
                width: viewport.width,
                height: viewport.height,
            });
        }

        Ok(Self {
            round: 0,
            cards: Vec::new(),
            locked: true,
            first: None,
            matched: 0,
            missed_this_round: false,
            queue: VecDeque::new(),
        })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn missed_this_round(&self) -> bool {
        self.missed_this_round
    }

    fn next_round(&mut self, ctx: &mut RoundCtx<'_>) {
        self.round += 1;
        self.locked = true;
        self.first = None;
        self.matched = 0;
        self.missed_this_round = false;
        self.queue.clear();

        let count = card_count(self.round);
        self.cards = build_deck(count, ctx.rng())
            .into_iter()
            .map(|value| Card {
                value,
                face: CardFace::Down,
            })
            .collect();

        let layout = GridLayout::fit(count, ctx.viewport()).unwrap_or_else(|| {
            log::warn!("Memory board does not fit, using minimum card size");
            GridLayout::minimum(count)
        });

        ctx.announce_round(self.round);
        ctx.emit(MemoryEvent::Board {
            layout,
            symbols: self.cards.iter().map(Card::symbol).collect(),
        });
        ctx.schedule(
            MEMORY_CLOSED_BEFORE_REVEAL_MS,
            MemoryTimer::Reveal { round: self.round },
        );
    }

    /// Player tapped card `index`. Dispatch runs one tap at a time, so the
    /// queue only ever holds flips still waiting behind the current one, in
    /// arrival order.
    pub fn tap(&mut self, index: usize, ctx: &mut RoundCtx<'_>) {
        self.queue.push_back(index);
        while let Some(next) = self.queue.pop_front() {
            self.flip(next, ctx);
        }
    }

    fn set_face(&mut self, index: usize, face: CardFace, ctx: &mut RoundCtx<'_>) {
        if let Some(card) = self.cards.get_mut(index) {
            card.face = face;
            ctx.emit(MemoryEvent::Card { index, face });
        }
    }

    fn flip(&mut self, index: usize, ctx: &mut RoundCtx<'_>) {
        if self.locked {
            return;
        }
        match self.cards.get(index) {
            Some(card) if card.face == CardFace::Down => {}
            _ => return,
        }

        self.set_face(index, CardFace::Up, ctx);

        let Some(a) = self.first.take() else {
            self.first = Some(index);
            return;
        };
        let b = index;
        self.locked = true;

        if self.cards[a].value == self.cards[b].value {
            self.set_face(a, CardFace::Matched, ctx);
            self.set_face(b, CardFace::Matched, ctx);
            ctx.emit(MemoryEvent::Highlight { a, b, on: true });
            ctx.schedule(MEMORY_HIGHLIGHT_MS, MemoryTimer::HighlightClear { a, b });
            self.matched += 2;
            self.locked = false;

            if self.matched == self.cards.len() {
                self.locked = true;
                ctx.emit(MemoryEvent::InputEnabled(false));
                ctx.timing_stop();
                ctx.mark_round(!self.missed_this_round);
                log::debug!(
                    "Memory round {} cleared, clean={}",
                    self.round,
                    !self.missed_this_round
                );

                if self.round < ROUNDS_PER_LEVEL {
                    ctx.schedule(MEMORY_NEXT_MS, MemoryTimer::NextRound);
                } else {
                    ctx.finish_level();
                }
            }
        } else {
            self.missed_this_round = true;
            ctx.schedule(MEMORY_FLIP_BACK_MS, MemoryTimer::FlipBack { a, b });
        }
    }
}

impl RoundGame for MemoryGame {
    type Timer = MemoryTimer;

    fn start(&mut self, ctx: &mut RoundCtx<'_>) {
        self.next_round(ctx);
    }

    fn on_timer(&mut self, timer: MemoryTimer, ctx: &mut RoundCtx<'_>) {
        match timer {
            MemoryTimer::Reveal { round } if round == self.round => {
                for card in &mut self.cards {
                    card.face = CardFace::Up;
                }
                ctx.emit(MemoryEvent::Preview(true));
                ctx.schedule(preview_ms(round), MemoryTimer::Hide { round });
            }
            MemoryTimer::Hide { round } if round == self.round => {
                for card in &mut self.cards {
                    card.face = CardFace::Down;
                }
                self.locked = false;
                ctx.emit(MemoryEvent::Preview(false));
                ctx.emit(MemoryEvent::InputEnabled(true));
                ctx.timing_start();
            }
            MemoryTimer::Reveal { .. } | MemoryTimer::Hide { .. } => {}
            MemoryTimer::HighlightClear { a, b } => {
                ctx.emit(MemoryEvent::Highlight { a, b, on: false });
            }
            MemoryTimer::FlipBack { a, b } => {
                self.set_face(a, CardFace::Down, ctx);
                self.set_face(b, CardFace::Down, ctx);
                self.locked = false;
            }
            MemoryTimer::NextRound => self.next_round(ctx),
        }
    }

    fn round(&self) -> u32 {
        self.round
    }
}
