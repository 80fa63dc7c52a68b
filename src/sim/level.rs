//! Level table

use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_COUNT;

/// The four levels, one mini-game each
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Reaction,
    Stroop,
    Simon,
    Memory,
}

impl Level {
    pub const ALL: [Level; LEVEL_COUNT as usize] = [Level::Reaction, Level::Stroop, Level::Simon, Level::Memory];

    /// Level ID as shown to the player and persisted (1-4)
    pub fn id(self) -> u8 {
        match self {
            Level::Reaction => 1,
            Level::Stroop => 2,
            Level::Simon => 3,
            Level::Memory => 4,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Level::Reaction),
            2 => Some(Level::Stroop),
            3 => Some(Level::Simon),
            4 => Some(Level::Memory),
            _ => None,
        }
    }

    /// Time budget before device tuning
    pub fn base_max_time_ms(self) -> u64 {
        match self {
            Level::Reaction => 4000,
            Level::Stroop => 3500,
            Level::Simon => 15000,
            Level::Memory => 20000,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::Reaction => "Reaction Field",
            Level::Stroop => "Color Game",
            Level::Simon => "Simon Sequence",
            Level::Memory => "Memory",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Level::Reaction => "Tap the field as soon as it appears.",
            Level::Stroop => "Does the word match its ink colour? Answer true or false.",
            Level::Simon => "Watch the panels flash, then repeat the sequence.",
            Level::Memory => "Memorise the cards, then find every pair.",
        }
    }

    /// Level before this one, which must be completed to unlock it
    pub fn previous(self) -> Option<Self> {
        Self::from_id(self.id() - 1)
    }

    /// Following level, saturating at the last one
    pub fn next_or_last(self) -> Self {
        Self::from_id(self.id() + 1).unwrap_or(Level::Memory)
    }

    pub fn is_last(self) -> bool {
        self == Level::Memory
    }
}
