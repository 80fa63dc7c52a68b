//! Session controller
//!
//! Owns everything that outlives a single mini-game: the current screen, the
//! level attempt being scored, progress, the countdown and the end-of-game
//! celebration. All state changes happen in `dispatch` (player actions) and
//! `advance_to` (timers), both called from the one UI thread.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::confetti::Confetti;
use super::games::{GameTimer, MiniGame, RoundCtx};
use super::level::Level;
use super::state::{Action, BestTimeRow, GameInput, LevelResult, Screen, Signal, Viewport};
use super::timers::Scheduler;
use super::timing::TimingAccumulator;
use crate::consts::*;
use crate::persistence::KeyValueStore;
use crate::platform::TapGuard;
use crate::progress::Progress;
use crate::settings::Settings;

/// Countdown display, one entry per step
const COUNTDOWN_STEPS: [&str; 4] = ["3", "2", "1", "GO!"];

/// Why a level could not be started
#[derive(Debug, Clone, PartialEq)]
pub enum StartError {
    /// Countdown finished without a level chosen
    NoLevelSelected,
    /// The game area cannot hold the largest Memory board
    BoardTooSmall { width: f32, height: f32 },
}

impl std::fmt::Display for StartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartError::NoLevelSelected => write!(f, "No level selected"),
            StartError::BoardTooSmall { width, height } => {
                write!(f, "Game area {}x{} is too small for the board", width, height)
            }
        }
    }
}

impl std::error::Error for StartError {}

/// Scheduled work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Show countdown step `step`; one past the last step starts the level
    Countdown { step: usize },
    /// Timer of the mini-game running in attempt `attempt`
    Game { attempt: u64, timer: GameTimer },
    ConfettiStop,
}

/// Scoring state of one level attempt
#[derive(Debug, Clone)]
pub struct Attempt {
    id: u64,
    level: Level,
    round_correct: u32,
    timing: TimingAccumulator,
    finish_requested: bool,
    finished: bool,
}

impl Attempt {
    pub fn new(id: u64, level: Level) -> Self {
        Self {
            id,
            level,
            round_correct: 0,
            timing: TimingAccumulator::new(),
            finish_requested: false,
            finished: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn round_correct(&self) -> u32 {
        self.round_correct
    }

    pub fn timing(&self) -> &TimingAccumulator {
        &self.timing
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn finish_requested(&self) -> bool {
        self.finish_requested
    }

    pub fn timing_start(&mut self, now: f64) {
        self.timing.start(now);
    }

    pub fn timing_stop(&mut self, now: f64) {
        self.timing.stop(now);
    }

    /// Count a correct round; never exceeds the rounds in a level
    pub fn mark_round(&mut self, correct: bool) {
        if correct && self.round_correct < ROUNDS_PER_LEVEL {
            self.round_correct += 1;
        }
    }

    pub fn request_finish(&mut self) {
        self.finish_requested = true;
    }

    fn take_finish_request(&mut self) -> bool {
        std::mem::take(&mut self.finish_requested)
    }
}

/// The game session: screens, scoring, progress and celebration
pub struct Session {
    settings: Settings,
    progress: Progress,
    store: Box<dyn KeyValueStore>,
    rng: Pcg32,
    timers: Scheduler<Timer>,
    /// Game area, for target placement and board layout
    viewport: Viewport,
    /// Whole window, for the confetti
    screen_size: Vec2,
    screen: Screen,
    current_level: Option<Level>,
    attempt: Option<Attempt>,
    game: Option<MiniGame>,
    next_attempt_id: u64,
    confetti: Option<Confetti>,
    end_results_open: bool,
    tap_guard: TapGuard<&'static str>,
    signals: Vec<Signal>,
}

impl Session {
    /// Load settings and progress from `store` and show the start screen
    pub fn new(store: Box<dyn KeyValueStore>, seed: u64, now: f64) -> Self {
        let settings = Settings::load(store.as_ref());
        let progress = Progress::load(store.as_ref());

        let mut session = Self {
            settings,
            progress,
            store,
            rng: Pcg32::seed_from_u64(seed),
            timers: Scheduler::new(now),
            viewport: Viewport::default(),
            screen_size: Viewport::default().size(),
            screen: Screen::Start,
            current_level: None,
            attempt: None,
            game: None,
            next_attempt_id: 1,
            confetti: None,
            end_results_open: false,
            tap_guard: TapGuard::new(TAP_GUARD_MS),
            signals: Vec::new(),
        };
        session.publish_levels();
        session.show_screen(Screen::Start);
        session
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn current_level(&self) -> Option<Level> {
        self.current_level
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        self.attempt.as_ref()
    }

    pub fn game(&self) -> Option<&MiniGame> {
        self.game.as_ref()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn confetti(&self) -> Option<&Confetti> {
        self.confetti.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn now(&self) -> f64 {
        self.timers.now()
    }

    /// Due time of the next pending timer
    pub fn next_due(&self) -> Option<f64> {
        self.timers.next_due()
    }

    /// Replace the settings and persist them
    pub fn set_settings(&mut self, settings: Settings) {
        settings.save(self.store.as_mut());
        self.settings = settings;
    }

    /// Take everything published since the last call
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    /// Run every timer due up to `now`, in order
    pub fn advance_to(&mut self, now: f64) {
        while let Some(task) = self.timers.pop_due(now) {
            self.fire(task);
        }
        self.timers.set_now(now);
    }

    /// Animation frame: run due timers, then move the confetti
    pub fn frame(&mut self, now: f64) {
        self.advance_to(now);
        if let Some(confetti) = self.confetti.as_mut() {
            confetti.step();
        }
    }

    /// Handle a player action at time `now`
    pub fn dispatch(&mut self, action: Action, now: f64) {
        self.advance_to(now);

        if let Some(key) = action.tap_key() {
            if !self.tap_guard.accept(key, now) {
                log::debug!("Dropped duplicate tap on {}", key);
                return;
            }
        }
        if !action_allowed(&action, self.screen) {
            log::debug!("Ignoring {:?} on {} screen", action, self.screen.as_str());
            return;
        }

        match action {
            Action::Start => self.show_screen(Screen::Menu),
            Action::SelectLevel(id) => self.select_level(id),
            Action::MenuBack => self.show_screen(Screen::Start),
            Action::PrepBack => self.show_screen(Screen::Menu),
            Action::BeginLevel => self.begin_countdown(),
            Action::LeaveLevel => {
                self.timing_stop();
                self.abandon_attempt();
                self.show_screen(Screen::Menu);
            }
            Action::Retry => {
                if let Some(level) = self.current_level {
                    self.open_level_prep(level);
                }
            }
            Action::NextLevel => {
                if let Some(level) = self.current_level {
                    self.open_level_prep(level.next_or_last());
                }
            }
            Action::ResultsToMenu | Action::EndToMenu => {
                self.hide_end_menu();
                self.show_screen(Screen::Menu);
            }
            Action::EndRestart => {
                self.hide_end_menu();
                self.open_level_prep(Level::Reaction);
            }
            Action::ResetProgress => self.reset_progress(),
            Action::ShowEndResults(show) => self.toggle_end_results(show),
            Action::Resize { width, height } => self.viewport = Viewport::new(width, height),
            Action::ResizeScreen { width, height } => self.resize_screen(Vec2::new(width, height)),
            Action::Game(input) => self.game_input(input),
        }
    }

    // ---------- Level attempt ----------

    /// Reset scoring, build the level's mini-game and start it.
    /// On failure the player is told and sent back to the menu.
    pub fn start_level(&mut self, level: Level) -> Result<(), StartError> {
        self.abandon_attempt();
        self.current_level = Some(level);

        let game = match MiniGame::for_level(level, self.viewport) {
            Ok(game) => game,
            Err(e) => {
                self.report_start_error(&e);
                return Err(e);
            }
        };

        let id = self.next_attempt_id;
        self.next_attempt_id += 1;
        self.attempt = Some(Attempt::new(id, level));
        self.game = Some(game);
        log::info!("Starting level {} ({})", level.id(), level.name());

        self.show_screen(Screen::Game);
        self.with_game(|game, ctx| game.start(ctx));
        Ok(())
    }

    /// Start measuring (no-op while measuring)
    pub fn timing_start(&mut self) {
        let now = self.timers.now();
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.timing_start(now);
        }
    }

    /// Stop measuring and add the interval (no-op while stopped)
    pub fn timing_stop(&mut self) {
        let now = self.timers.now();
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.timing_stop(now);
        }
    }

    pub fn mark_round(&mut self, correct: bool) {
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.mark_round(correct);
        }
    }

    /// Score the attempt, record progress and show the outcome.
    /// Returns `None` when there is no unfinished attempt.
    pub fn finish_level(&mut self) -> Option<LevelResult> {
        let now = self.timers.now();
        let attempt = self.attempt.as_mut().filter(|a| !a.is_finished())?;
        attempt.timing_stop(now);
        attempt.finished = true;

        let level = attempt.level();
        let attempt_id = attempt.id();
        let total_ms = attempt.timing().total_ms();
        let round_correct = attempt.round_correct();
        let max_time_ms = self.settings.max_time_ms(level);
        let passed = total_ms <= max_time_ms && round_correct == ROUNDS_PER_LEVEL;

        self.game = None;
        self.timers
            .cancel_where(|t| matches!(t, Timer::Game { attempt, .. } if *attempt == attempt_id));

        let mut new_best = false;
        if passed {
            let record = self.progress.record_pass(level, total_ms);
            if record.newly_completed {
                self.progress.save_completed(self.store.as_mut());
                self.publish_levels();
            }
            if record.new_best {
                self.progress.save_best_times(self.store.as_mut());
            }
            new_best = record.new_best;
        }

        let result = LevelResult {
            level,
            total_ms,
            max_time_ms,
            round_correct,
            passed,
            new_best,
        };
        log::info!(
            "Level {} finished: {} ms / {} ms, {}/{} correct, {}",
            level.id(),
            total_ms,
            max_time_ms,
            round_correct,
            ROUNDS_PER_LEVEL,
            result.status_text()
        );

        self.emit(Signal::Result(result));
        if passed && level.is_last() {
            self.show_end_menu();
        } else {
            self.hide_end_menu();
            self.show_screen(Screen::Results);
        }
        Some(result)
    }

    fn with_game(&mut self, f: impl FnOnce(&mut MiniGame, &mut RoundCtx<'_>)) {
        let (Some(game), Some(attempt)) = (self.game.as_mut(), self.attempt.as_mut()) else {
            return;
        };
        let mut ctx = RoundCtx {
            attempt,
            timers: &mut self.timers,
            rng: &mut self.rng,
            signals: &mut self.signals,
            viewport: self.viewport,
        };
        f(game, &mut ctx);

        let finish = self
            .attempt
            .as_mut()
            .is_some_and(|attempt| attempt.take_finish_request());
        if finish {
            self.finish_level();
        }
    }

    /// Drop the running mini-game and every timer it scheduled
    fn abandon_attempt(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            let id = attempt.id();
            self.timers
                .cancel_where(|t| matches!(t, Timer::Game { attempt, .. } if *attempt == id));
            if !attempt.is_finished() {
                log::info!("Abandoned level {}", attempt.level().id());
            }
        }
        self.game = None;
    }

    fn report_start_error(&mut self, e: &StartError) {
        log::error!("Failed to start level: {}", e);
        self.emit(Signal::Notice(
            "Could not start the level. Please reload the page.".to_string(),
        ));
        self.show_screen(Screen::Menu);
    }

    fn game_input(&mut self, input: GameInput) {
        if self.screen != Screen::Game {
            return;
        }
        self.with_game(|game, ctx| game.on_input(input, ctx));
    }

    // ---------- Timers ----------

    fn fire(&mut self, task: Timer) {
        match task {
            Timer::Countdown { step } => self.countdown_step(step),
            Timer::Game { attempt, timer } => {
                let current = self.attempt.as_ref().map(Attempt::id);
                if current == Some(attempt) {
                    self.with_game(|game, ctx| game.on_timer(timer, ctx));
                }
            }
            Timer::ConfettiStop => self.stop_confetti(),
        }
    }

    // ---------- Navigation ----------

    fn show_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.emit(Signal::Screen(screen));
    }

    fn publish_levels(&mut self) {
        let unlocked = self.progress.unlocked();
        self.emit(Signal::Levels(unlocked));
    }

    fn select_level(&mut self, id: u8) {
        let Some(level) = Level::from_id(id) else {
            log::warn!("Unknown level {}", id);
            return;
        };
        self.open_level_prep(level);
    }

    /// Emit the lock notice and return false when `level` is still locked
    fn check_unlocked(&mut self, level: Level) -> bool {
        if self.progress.is_unlocked(level) {
            return true;
        }
        let required = level.previous().map(Level::id).unwrap_or(1);
        log::debug!("Level {} is locked", level.id());
        self.emit(Signal::Notice(format!("Complete level {} first.", required)));
        false
    }

    fn open_level_prep(&mut self, level: Level) {
        if self.check_unlocked(level) {
            self.show_level_prep(level);
        }
    }

    fn show_level_prep(&mut self, level: Level) {
        self.current_level = Some(level);
        let max_time_ms = self.settings.max_time_ms(level);
        self.emit(Signal::LevelPrep {
            level,
            name: level.name(),
            description: level.description(),
            max_time_ms,
        });
        self.show_screen(Screen::LevelPrep);
    }

    fn begin_countdown(&mut self) {
        match { self.current_level } {
            Some(level) if !self.check_unlocked(level) => return,
            _ => {}
        }
        self.hide_end_menu();
        self.timers
            .cancel_where(|t| matches!(t, Timer::Countdown { .. }));
        self.show_screen(Screen::Countdown);
        self.countdown_step(0);
    }

    fn countdown_step(&mut self, step: usize) {
        if self.screen != Screen::Countdown {
            return;
        }
        match COUNTDOWN_STEPS.get(step) {
            Some(&text) => {
                self.emit(Signal::Countdown(text));
                let delay = if step + 1 < COUNTDOWN_STEPS.len() {
                    COUNTDOWN_STEP_MS
                } else {
                    COUNTDOWN_GO_MS
                };
                self.timers.schedule(delay, Timer::Countdown { step: step + 1 });
            }
            None => match self.current_level {
                Some(level) => {
                    // Failure is reported inside start_level
                    let _ = self.start_level(level);
                }
                None => self.report_start_error(&StartError::NoLevelSelected),
            },
        }
    }

    fn reset_progress(&mut self) {
        self.progress.reset();
        Progress::clear_store(self.store.as_mut());
        log::info!("Progress reset");
        self.publish_levels();
        self.hide_end_menu();
        self.show_screen(Screen::Menu);
    }

    fn toggle_end_results(&mut self, show: bool) {
        self.end_results_open = show;
        if show {
            let rows = Level::ALL
                .iter()
                .map(|&level| BestTimeRow {
                    level,
                    best_ms: self.progress.best_time(level),
                })
                .collect();
            self.emit(Signal::EndResults(Some(rows)));
        } else {
            self.emit(Signal::EndResults(None));
        }
    }

    /// New window size; a running confetti keeps its pieces
    fn resize_screen(&mut self, size: Vec2) {
        self.screen_size = size;
        if let Some(confetti) = self.confetti.as_mut() {
            confetti.resize(size);
        }
    }

    // ---------- End menu ----------

    fn show_end_menu(&mut self) {
        self.show_screen(Screen::EndMenu);
        if self.end_results_open {
            self.toggle_end_results(false);
        }
        self.start_confetti();
    }

    fn hide_end_menu(&mut self) {
        if self.end_results_open {
            self.toggle_end_results(false);
        }
        self.stop_confetti();
    }

    fn start_confetti(&mut self) {
        self.stop_confetti();
        let count = self.settings.confetti_pieces();
        if count == 0 {
            return;
        }
        self.confetti = Some(Confetti::new(count, self.screen_size, &mut self.rng));
        self.timers.schedule(CONFETTI_DURATION_MS, Timer::ConfettiStop);
        self.emit(Signal::Confetti(true));
    }

    fn stop_confetti(&mut self) {
        self.timers.cancel_where(|t| matches!(t, Timer::ConfettiStop));
        if self.confetti.take().is_some() {
            self.emit(Signal::Confetti(false));
        }
    }

    fn emit(&mut self, signal: Signal) {
        self.signals.push(signal);
    }
}

/// Screens each action belongs to
fn action_allowed(action: &Action, screen: Screen) -> bool {
    match action {
        Action::Start => screen == Screen::Start,
        Action::SelectLevel(_) | Action::MenuBack => screen == Screen::Menu,
        Action::PrepBack | Action::BeginLevel => screen == Screen::LevelPrep,
        Action::LeaveLevel => screen == Screen::Game,
        Action::Retry | Action::NextLevel | Action::ResultsToMenu => screen == Screen::Results,
        Action::EndRestart
        | Action::EndToMenu
        | Action::ResetProgress
        | Action::ShowEndResults(_) => screen == Screen::EndMenu,
        Action::Resize { .. } | Action::ResizeScreen { .. } | Action::Game(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    fn session() -> Session {
        Session::new(Box::new(MemoryStorage::new()), 1, 0.0)
    }

    /// Session with a Reaction attempt running and no game timers pending
    fn running(level: Level) -> Session {
        let mut s = session();
        s.start_level(level).expect("start");
        s.timers.cancel_where(|t| matches!(t, Timer::Game { .. }));
        s
    }

    #[test]
    fn test_starts_on_start_screen() {
        let mut s = session();
        assert_eq!(s.screen(), Screen::Start);
        let signals = s.drain_signals();
        assert!(signals.contains(&Signal::Levels([true, false, false, false])));
        assert!(signals.contains(&Signal::Screen(Screen::Start)));
    }

    #[test]
    fn test_timing_through_session() {
        let mut s = running(Level::Reaction);
        s.advance_to(100.0);
        s.timing_start();
        s.advance_to(250.0);
        s.timing_start();
        s.advance_to(400.0);
        s.timing_stop();
        s.timing_stop();
        assert_eq!(s.attempt().map(|a| a.timing().sum_ms()), Some(300.0));
    }

    #[test]
    fn test_round_correct_saturates() {
        let mut s = running(Level::Stroop);
        for _ in 0..8 {
            s.mark_round(true);
        }
        s.mark_round(false);
        assert_eq!(s.attempt().map(Attempt::round_correct), Some(5));
    }

    #[test]
    fn test_pass_records_progress() {
        let mut s = running(Level::Reaction);
        s.timing_start();
        s.advance_to(3000.0);
        for _ in 0..5 {
            s.mark_round(true);
        }
        let result = s.finish_level().expect("result");
        assert!(result.passed);
        assert_eq!(result.total_ms, 3000);
        assert!(s.progress().is_completed(Level::Reaction));
        assert_eq!(s.progress().best_time(Level::Reaction), Some(3000));
        assert_eq!(s.screen(), Screen::Results);
        assert!(s.store.get("completedLevels").is_some());

        // Finishing twice does nothing
        assert!(s.finish_level().is_none());
    }

    #[test]
    fn test_wrong_round_fails_regardless_of_time() {
        let mut s = running(Level::Stroop);
        for _ in 0..4 {
            s.mark_round(true);
        }
        s.mark_round(false);
        let result = s.finish_level().expect("result");
        assert!(!result.passed);
        assert_eq!(result.round_correct, 4);
        assert!(!s.progress().is_completed(Level::Stroop));
    }

    #[test]
    fn test_over_budget_fails() {
        let mut s = running(Level::Reaction);
        s.timing_start();
        s.advance_to(4001.0);
        for _ in 0..5 {
            s.mark_round(true);
        }
        let result = s.finish_level().expect("result");
        assert_eq!(result.total_ms, 4001);
        assert!(!result.passed);
    }

    #[test]
    fn test_budget_is_inclusive() {
        let mut s = running(Level::Reaction);
        s.timing_start();
        s.advance_to(4000.4);
        for _ in 0..5 {
            s.mark_round(true);
        }
        assert!(s.finish_level().is_some_and(|r| r.passed && r.total_ms == 4000));
    }

    #[test]
    fn test_locked_level_rejected() {
        let mut s = session();
        s.dispatch(Action::Start, 0.0);
        s.drain_signals();

        s.dispatch(Action::SelectLevel(3), 10.0);
        assert_eq!(s.screen(), Screen::Menu);
        assert_eq!(
            s.drain_signals(),
            vec![Signal::Notice("Complete level 2 first.".to_string())]
        );
        assert_eq!(s.current_level(), None);

        s.dispatch(Action::SelectLevel(1), 500.0);
        assert_eq!(s.screen(), Screen::LevelPrep);
        assert_eq!(s.current_level(), Some(Level::Reaction));
    }

    #[test]
    fn test_duplicate_tap_dropped() {
        let mut s = session();
        s.dispatch(Action::Start, 0.0);
        s.dispatch(Action::MenuBack, 50.0);
        assert_eq!(s.screen(), Screen::Start);
        // Second "start" inside the guard window
        s.dispatch(Action::Start, 100.0);
        assert_eq!(s.screen(), Screen::Start);
        s.dispatch(Action::Start, 200.0);
        assert_eq!(s.screen(), Screen::Menu);
    }

    #[test]
    fn test_countdown_reaches_game() {
        let mut s = session();
        s.dispatch(Action::Start, 0.0);
        s.dispatch(Action::SelectLevel(1), 0.0);
        s.dispatch(Action::BeginLevel, 0.0);
        assert_eq!(s.screen(), Screen::Countdown);

        let go_at = 3.0 * COUNTDOWN_STEP_MS + COUNTDOWN_GO_MS;
        s.advance_to(go_at - 1.0);
        assert_eq!(s.screen(), Screen::Countdown);
        s.advance_to(go_at);
        assert_eq!(s.screen(), Screen::Game);
        assert!(s.game().is_some());

        let steps: Vec<&str> = s
            .drain_signals()
            .into_iter()
            .filter_map(|sig| match sig {
                Signal::Countdown(text) => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(steps, vec!["3", "2", "1", "GO!"]);
    }

    #[test]
    fn test_start_failure_returns_to_menu() {
        let mut s = session();
        s.dispatch(
            Action::Resize {
                width: 120.0,
                height: 90.0,
            },
            0.0,
        );
        let err = s.start_level(Level::Memory);
        assert!(matches!(err, Err(StartError::BoardTooSmall { .. })));
        assert_eq!(s.screen(), Screen::Menu);
        assert!(s.game().is_none());
        assert!(
            s.drain_signals()
                .iter()
                .any(|sig| matches!(sig, Signal::Notice(_)))
        );
    }

    #[test]
    fn test_leaving_cancels_game_timers() {
        let mut s = session();
        s.start_level(Level::Reaction).expect("start");
        s.current_level = Some(Level::Reaction);
        s.dispatch(Action::LeaveLevel, 10.0);
        assert_eq!(s.screen(), Screen::Menu);
        assert!(s.game().is_none());
        assert!(s.attempt().is_none());
        assert!(s.next_due().is_none());
    }

    #[test]
    fn test_stale_attempt_timer_is_discarded() {
        let mut s = session();
        s.start_level(Level::Reaction).expect("start");
        // A timer left over from an earlier attempt
        s.timers.schedule(
            1.0,
            Timer::Game {
                attempt: 999,
                timer: GameTimer::Reaction(crate::sim::games::ReactionTimer::Show { round: 1 }),
            },
        );
        s.advance_to(5.0);
        let shown = match s.game() {
            Some(MiniGame::Reaction(g)) => g.target().is_some(),
            _ => false,
        };
        assert!(!shown);
    }

    #[test]
    fn test_final_level_pass_runs_confetti() {
        let mut s = running(Level::Memory);
        s.timing_start();
        s.advance_to(10_000.0);
        for _ in 0..5 {
            s.mark_round(true);
        }
        let result = s.finish_level().expect("result");
        assert!(result.passed && !result.has_next());
        assert_eq!(s.screen(), Screen::EndMenu);
        assert!(s.confetti().is_some());

        s.frame(10_000.0 + CONFETTI_DURATION_MS - 1.0);
        assert!(s.confetti().is_some());
        s.frame(10_000.0 + CONFETTI_DURATION_MS);
        assert!(s.confetti().is_none());
        assert!(s.drain_signals().contains(&Signal::Confetti(false)));
    }

    #[test]
    fn test_confetti_disabled_in_settings() {
        let mut s = running(Level::Memory);
        s.set_settings(Settings {
            confetti: false,
            ..Settings::default()
        });
        for _ in 0..5 {
            s.mark_round(true);
        }
        s.finish_level();
        assert_eq!(s.screen(), Screen::EndMenu);
        assert!(s.confetti().is_none());
    }

    #[test]
    fn test_reset_progress_relocks() {
        let mut s = running(Level::Memory);
        s.progress.record_pass(Level::Reaction, 1000);
        s.progress.record_pass(Level::Stroop, 1000);
        s.progress.record_pass(Level::Simon, 1000);
        for _ in 0..5 {
            s.mark_round(true);
        }
        s.finish_level();
        assert_eq!(s.screen(), Screen::EndMenu);

        s.dispatch(Action::ShowEndResults(true), 0.0);
        let rows = s.drain_signals().into_iter().find_map(|sig| match sig {
            Signal::EndResults(rows) => rows,
            _ => None,
        });
        assert_eq!(rows.map(|r| r.len()), Some(4));

        s.dispatch(Action::ResetProgress, 0.0);
        assert_eq!(s.screen(), Screen::Menu);
        assert_eq!(s.progress().unlocked(), [true, false, false, false]);
        assert_eq!(s.progress().best_time(Level::Reaction), None);
        assert!(s.confetti().is_none());
        assert_eq!(s.store.get("completedLevels"), None);
        assert_eq!(s.store.get("bestTimesByLevel"), None);
    }

    #[test]
    fn test_progress_survives_new_session_on_same_store() {
        let mut store = MemoryStorage::new();
        store.set("completedLevels", "[1,2]");
        let s = Session::new(Box::new(store), 1, 0.0);
        assert_eq!(s.progress().unlocked(), [true, true, true, false]);
    }

    fn failed(level: Level) -> Session {
        let mut s = running(level);
        s.mark_round(false);
        s.finish_level().expect("result");
        s.drain_signals();
        s
    }

    #[test]
    fn test_next_level_stays_locked_after_fail() {
        let mut s = failed(Level::Reaction);
        assert_eq!(s.screen(), Screen::Results);

        s.dispatch(Action::NextLevel, 1000.0);
        assert_eq!(s.screen(), Screen::Results);
        assert_eq!(s.current_level(), Some(Level::Reaction));
        assert_eq!(
            s.drain_signals(),
            vec![Signal::Notice("Complete level 1 first.".to_string())]
        );
    }

    #[test]
    fn test_begin_rechecks_lock() {
        let mut s = session();
        s.current_level = Some(Level::Stroop);
        s.screen = Screen::LevelPrep;
        s.dispatch(Action::BeginLevel, 1000.0);
        assert_eq!(s.screen(), Screen::LevelPrep);
        assert!(s.attempt().is_none());
        assert!(
            s.drain_signals()
                .contains(&Signal::Notice("Complete level 1 first.".to_string()))
        );
    }

    #[test]
    fn test_retry_reopens_prep() {
        let mut s = failed(Level::Reaction);
        s.dispatch(Action::Retry, 1000.0);
        assert_eq!(s.screen(), Screen::LevelPrep);
        assert_eq!(s.current_level(), Some(Level::Reaction));
    }

    #[test]
    fn test_end_restart_opens_first_level() {
        let mut s = running(Level::Memory);
        for _ in 0..5 {
            s.mark_round(true);
        }
        s.finish_level();
        assert_eq!(s.screen(), Screen::EndMenu);

        s.dispatch(Action::EndRestart, 1000.0);
        assert_eq!(s.screen(), Screen::LevelPrep);
        assert_eq!(s.current_level(), Some(Level::Reaction));
    }

    #[test]
    fn test_confetti_fills_the_window() {
        let mut s = running(Level::Memory);
        s.dispatch(Action::Resize { width: 300.0, height: 200.0 }, 0.0);
        s.dispatch(Action::ResizeScreen { width: 1280.0, height: 720.0 }, 0.0);
        for _ in 0..5 {
            s.mark_round(true);
        }
        s.finish_level();
        assert_eq!(s.confetti().map(Confetti::bounds), Some(Vec2::new(1280.0, 720.0)));
        assert_eq!(s.viewport().size(), Vec2::new(300.0, 200.0));

        s.dispatch(Action::ResizeScreen { width: 640.0, height: 480.0 }, 10.0);
        assert_eq!(s.confetti().map(Confetti::bounds), Some(Vec2::new(640.0, 480.0)));
        assert_eq!(s.confetti().map(|c| c.pieces().len()), Some(CONFETTI_PIECES));
    }

    #[test]
    fn test_different_level_buttons_not_deduplicated() {
        let mut s = session();
        s.progress.record_pass(Level::Reaction, 1000);
        s.dispatch(Action::Start, 0.0);
        s.dispatch(Action::SelectLevel(1), 300.0);
        s.dispatch(Action::PrepBack, 350.0);
        assert_eq!(s.screen(), Screen::Menu);
        s.dispatch(Action::SelectLevel(2), 400.0);
        assert_eq!(s.current_level(), Some(Level::Stroop));
    }

    #[test]
    fn test_actions_only_on_their_screen() {
        let mut s = session();
        s.dispatch(Action::BeginLevel, 0.0);
        assert_eq!(s.screen(), Screen::Start);
        s.dispatch(Action::Retry, 0.0);
        assert_eq!(s.screen(), Screen::Start);
        s.dispatch(Action::ResetProgress, 0.0);
        assert_eq!(s.screen(), Screen::Start);
    }
}
