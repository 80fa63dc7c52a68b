//! Confetti for the final win
//!
//! Pieces fall from above the screen, drift, spin and come to rest on the
//! bottom edge. Stepped once per animation frame. Purely decorative.

use glam::Vec2;
use rand::Rng;

const COLORS: [&str; 6] = ["#ffd700", "#00d4aa", "#667eea", "#f5576c", "#ffffff", "#9b59b6"];

/// Pieces rest this far above the bottom edge
const FLOOR_OFFSET: f32 = 6.0;
/// Horizontal wrap margin
const WRAP_MARGIN: f32 = 20.0;
const DRIFT_DAMPING: f32 = 0.996;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiPiece {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Half-width of the piece
    pub size: f32,
    pub rot: f32,
    pub spin: f32,
    pub color: &'static str,
    pub settled: bool,
}

impl ConfettiPiece {
    fn spawn(bounds: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            pos: Vec2::new(
                rng.random::<f32>() * bounds.x,
                -WRAP_MARGIN - rng.random::<f32>() * bounds.y * 0.7,
            ),
            vel: Vec2::new(
                (rng.random::<f32>() - 0.5) * 1.6,
                2.2 + rng.random::<f32>() * 4.2,
            ),
            size: 3.0 + rng.random::<f32>() * 4.0,
            rot: rng.random::<f32>() * std::f32::consts::PI,
            spin: (rng.random::<f32>() - 0.5) * 0.22,
            color: COLORS[rng.random_range(0..COLORS.len())],
            settled: false,
        }
    }

    fn step(&mut self, bounds: Vec2) {
        if self.settled {
            return;
        }
        self.pos += self.vel;
        self.rot += self.spin;
        self.vel.x *= DRIFT_DAMPING;

        let floor = bounds.y - FLOOR_OFFSET;
        if self.pos.y >= floor {
            self.pos.y = floor;
            self.vel = Vec2::ZERO;
            self.spin = 0.0;
            self.settled = true;
        }

        if self.pos.x < -WRAP_MARGIN {
            self.pos.x = bounds.x + WRAP_MARGIN;
        }
        if self.pos.x > bounds.x + WRAP_MARGIN {
            self.pos.x = -WRAP_MARGIN;
        }
    }
}

/// A running confetti shower
#[derive(Debug, Clone)]
pub struct Confetti {
    pieces: Vec<ConfettiPiece>,
    bounds: Vec2,
}

impl Confetti {
    pub fn new(count: usize, bounds: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            pieces: (0..count).map(|_| ConfettiPiece::spawn(bounds, rng)).collect(),
            bounds,
        }
    }

    /// New drawing area; pieces stay where they are
    pub fn resize(&mut self, bounds: Vec2) {
        self.bounds = bounds;
    }

    /// Advance one animation frame
    pub fn step(&mut self) {
        let bounds = self.bounds;
        for piece in &mut self.pieces {
            piece.step(bounds);
        }
    }

    pub fn pieces(&self) -> &[ConfettiPiece] {
        &self.pieces
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn all_settled(&self) -> bool {
        self.pieces.iter().all(|p| p.settled)
    }
}
