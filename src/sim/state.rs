//! Screens, player actions and the signals the core publishes
//!
//! The core never renders. It emits `Signal`s that the shell turns into DOM
//! updates, and accepts `Action`s the shell collects from input events.

use glam::Vec2;

use super::games::memory::MemoryEvent;
use super::games::reaction::ReactionEvent;
use super::games::simon::SimonEvent;
use super::games::stroop::StroopEvent;
use super::level::Level;
use crate::consts::ROUNDS_PER_LEVEL;

/// Navigation screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Menu,
    LevelPrep,
    Countdown,
    Game,
    Results,
    /// Shown instead of the results after the final level is passed
    EndMenu,
}

impl Screen {
    /// Screen name used by the presentation layer
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Start => "start",
            Screen::Menu => "menu",
            Screen::LevelPrep => "level-prep",
            Screen::Countdown => "countdown",
            Screen::Game => "game",
            Screen::Results => "results",
            Screen::EndMenu => "end-menu",
        }
    }
}

/// Game area size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(480.0, 720.0)
    }
}

/// In-game input, routed to the running mini-game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameInput {
    /// Reaction target tapped
    TargetHit,
    /// Stroop answer ("the word matches its colour")
    Answer(bool),
    /// Simon panel tapped
    Panel(usize),
    /// Memory card tapped
    Card(usize),
}

/// Player actions collected by the shell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Start,
    SelectLevel(u8),
    MenuBack,
    PrepBack,
    /// "Start level" on the prep screen: runs the countdown
    BeginLevel,
    /// In-level back button
    LeaveLevel,
    Retry,
    NextLevel,
    ResultsToMenu,
    EndRestart,
    EndToMenu,
    ResetProgress,
    ShowEndResults(bool),
    /// Game area size changed
    Resize { width: f32, height: f32 },
    /// Window size changed
    ResizeScreen { width: f32, height: f32 },
    Game(GameInput),
}

/// One tap-guard key per level button
const LEVEL_BUTTON_KEYS: [&str; 4] = ["level-1", "level-2", "level-3", "level-4"];

impl Action {
    /// Control identity for tap de-duplication (None: never de-duplicated)
    pub fn tap_key(&self) -> Option<&'static str> {
        match self {
            Action::Start => Some("start"),
            Action::SelectLevel(id) => Some(
                LEVEL_BUTTON_KEYS
                    .get(usize::from(*id).wrapping_sub(1))
                    .copied()
                    .unwrap_or("select-level"),
            ),
            Action::MenuBack => Some("menu-back"),
            Action::PrepBack => Some("prep-back"),
            Action::BeginLevel => Some("begin-level"),
            Action::LeaveLevel => Some("leave-level"),
            Action::Retry => Some("retry"),
            Action::NextLevel => Some("next-level"),
            Action::ResultsToMenu => Some("results-menu"),
            Action::EndRestart => Some("end-restart"),
            Action::EndToMenu => Some("end-menu"),
            Action::ResetProgress => Some("reset-progress"),
            Action::ShowEndResults(true) => Some("end-results"),
            Action::ShowEndResults(false) => Some("end-results-close"),
            Action::Resize { .. } | Action::ResizeScreen { .. } | Action::Game(_) => None,
        }
    }
}

/// Result of a finished level attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelResult {
    pub level: Level,
    pub total_ms: u64,
    pub max_time_ms: u64,
    pub round_correct: u32,
    pub passed: bool,
    /// Passed and the time beat the stored best
    pub new_best: bool,
}

impl LevelResult {
    /// Whether a "next level" button applies
    pub fn has_next(&self) -> bool {
        self.passed && !self.level.is_last()
    }

    pub fn stats_text(&self) -> String {
        format!(
            "Time: {} ms / {} ms\nCorrect: {}/{}",
            self.total_ms, self.max_time_ms, self.round_correct, ROUNDS_PER_LEVEL
        )
    }

    pub fn status_text(&self) -> &'static str {
        if self.passed { "PASSED" } else { "NOT PASSED" }
    }
}

/// One row of the end-menu best times table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestTimeRow {
    pub level: Level,
    pub best_ms: Option<u64>,
}

impl BestTimeRow {
    pub fn time_text(&self) -> String {
        match self.best_ms {
            Some(ms) => format!("{} ms", ms),
            None => "-".to_string(),
        }
    }
}

/// Everything the presentation layer needs to know
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Screen(Screen),
    /// Unlock state of levels 1-4
    Levels([bool; 4]),
    LevelPrep {
        level: Level,
        name: &'static str,
        description: &'static str,
        max_time_ms: u64,
    },
    /// Countdown display ("3", "2", "1", "GO!")
    Countdown(&'static str),
    /// Level name and round number for the in-game header
    Round { level: Level, round: u32 },
    /// In-game status line
    Status(String),
    /// Blocking notice (locked level, start failure)
    Notice(String),
    Result(LevelResult),
    /// Best times panel; `None` hides it
    EndResults(Option<Vec<BestTimeRow>>),
    /// Confetti started (true) or stopped and cleared (false)
    Confetti(bool),
    Reaction(ReactionEvent),
    Stroop(StroopEvent),
    Simon(SimonEvent),
    Memory(MemoryEvent),
}

impl From<ReactionEvent> for Signal {
    fn from(e: ReactionEvent) -> Self {
        Signal::Reaction(e)
    }
}

impl From<StroopEvent> for Signal {
    fn from(e: StroopEvent) -> Self {
        Signal::Stroop(e)
    }
}

impl From<SimonEvent> for Signal {
    fn from(e: SimonEvent) -> Self {
        Signal::Simon(e)
    }
}

impl From<MemoryEvent> for Signal {
    fn from(e: MemoryEvent) -> Self {
        Signal::Memory(e)
    }
}
