//! Scripted sessions driven through the public API, on virtual time

use reflex_arcade::consts::*;
use reflex_arcade::persistence::{KeyValueStore, MemoryStorage};
use reflex_arcade::sim::{Action, GameInput, Level, MiniGame, Screen, Session, Signal, autoplay_input};

fn new_session() -> Session {
    Session::new(Box::new(MemoryStorage::new()), 7, 0.0)
}

/// Advance to the next timer
fn step(session: &mut Session, now: &mut f64) {
    let due = session.next_due().expect("pending timer");
    *now = due.max(*now);
    session.advance_to(*now);
}

/// Walk start -> menu -> prep -> countdown -> game for `level`
fn enter_level(session: &mut Session, level: Level, now: &mut f64) {
    if session.screen() == Screen::Start {
        session.dispatch(Action::Start, *now);
    }
    *now += 200.0;
    session.dispatch(Action::SelectLevel(level.id()), *now);
    *now += 200.0;
    session.dispatch(Action::BeginLevel, *now);
    while session.screen() == Screen::Countdown {
        step(session, now);
    }
    assert_eq!(session.screen(), Screen::Game);
}

/// Finish the running level with perfect play, one move every `move_ms`
fn autoplay(session: &mut Session, now: &mut f64, move_ms: f64) {
    while session.screen() == Screen::Game {
        match session.game().and_then(autoplay_input) {
            Some(input) => {
                *now += move_ms;
                session.dispatch(Action::Game(input), *now);
            }
            None => step(session, now),
        }
    }
}

fn last_result(session: &mut Session) -> Option<reflex_arcade::sim::LevelResult> {
    session
        .drain_signals()
        .into_iter()
        .filter_map(|s| match s {
            Signal::Result(r) => Some(r),
            _ => None,
        })
        .last()
}

#[test]
fn reaction_level_passes_and_records_best_time() {
    let mut session = new_session();
    let mut now = 0.0;
    enter_level(&mut session, Level::Reaction, &mut now);

    // Each target is hit 600 ms after it appears: 5 x 600 = 3000 ms
    autoplay(&mut session, &mut now, 600.0);

    let result = last_result(&mut session).expect("result");
    assert_eq!(result.total_ms, 3000);
    assert_eq!(result.round_correct, 5);
    assert!(result.passed);
    assert!(result.new_best);
    assert_eq!(session.screen(), Screen::Results);
    assert_eq!(session.progress().best_time(Level::Reaction), Some(3000));
    assert!(session.progress().is_unlocked(Level::Stroop));
}

#[test]
fn slower_pass_keeps_previous_best() {
    let mut session = new_session();
    let mut now = 0.0;
    enter_level(&mut session, Level::Reaction, &mut now);
    autoplay(&mut session, &mut now, 400.0);
    assert_eq!(session.progress().best_time(Level::Reaction), Some(2000));

    now += 200.0;
    session.dispatch(Action::Retry, now);
    now += 200.0;
    session.dispatch(Action::BeginLevel, now);
    while session.screen() == Screen::Countdown {
        step(&mut session, &mut now);
    }
    autoplay(&mut session, &mut now, 500.0);

    let result = last_result(&mut session).expect("result");
    assert!(result.passed && !result.new_best);
    assert_eq!(session.progress().best_time(Level::Reaction), Some(2000));
}

#[test]
fn one_wrong_stroop_answer_fails_the_level() {
    let mut store = MemoryStorage::new();
    store.set("completedLevels", "[1]");
    let mut session = Session::new(Box::new(store), 3, 0.0);
    let mut now = 0.0;
    enter_level(&mut session, Level::Stroop, &mut now);

    let mut answered = 0;
    while session.screen() == Screen::Game {
        let answer = match session.game() {
            Some(MiniGame::Stroop(g)) if !g.is_answered() => Some(g.matches()),
            _ => None,
        };
        match answer {
            Some(right) => {
                answered += 1;
                let given = if answered == 2 { !right } else { right };
                now += 250.0;
                session.dispatch(Action::Game(GameInput::Answer(given)), now);
            }
            None => step(&mut session, &mut now),
        }
    }

    let result = last_result(&mut session).expect("result");
    assert_eq!(result.round_correct, 4);
    assert!(result.total_ms <= result.max_time_ms);
    assert!(!result.passed);
    assert_eq!(result.status_text(), "NOT PASSED");
    assert!(!session.progress().is_completed(Level::Stroop));
    assert!(!session.progress().is_unlocked(Level::Simon));
}

#[test]
fn locked_level_shows_notice() {
    let mut session = new_session();
    session.dispatch(Action::Start, 0.0);
    session.drain_signals();

    session.dispatch(Action::SelectLevel(2), 500.0);
    assert_eq!(session.screen(), Screen::Menu);
    assert_eq!(
        session.drain_signals(),
        vec![Signal::Notice("Complete level 1 first.".to_string())]
    );
}

#[test]
fn countdown_takes_three_steps_and_go() {
    let mut session = new_session();
    session.dispatch(Action::Start, 0.0);
    session.dispatch(Action::SelectLevel(1), 200.0);
    session.dispatch(Action::BeginLevel, 1000.0);

    let go = 1000.0 + 3.0 * COUNTDOWN_STEP_MS + COUNTDOWN_GO_MS;
    session.advance_to(go - 0.5);
    assert_eq!(session.screen(), Screen::Countdown);
    session.advance_to(go);
    assert_eq!(session.screen(), Screen::Game);
}

#[test]
fn full_run_celebrates_then_reset_relocks() {
    let mut session = new_session();
    let mut now = 0.0;
    for level in Level::ALL {
        session.start_level(level).expect("start");
        autoplay(&mut session, &mut now, 250.0);
        assert!(session.progress().is_completed(level));
    }
    assert_eq!(session.screen(), Screen::EndMenu);
    assert!(session.confetti().is_some());

    let finished = now;
    session.frame(finished + CONFETTI_DURATION_MS - 1.0);
    assert!(session.confetti().is_some());
    session.frame(finished + CONFETTI_DURATION_MS);
    assert!(session.confetti().is_none());

    now = finished + CONFETTI_DURATION_MS + 100.0;
    session.dispatch(Action::ResetProgress, now);
    assert_eq!(session.screen(), Screen::Menu);
    assert_eq!(session.progress().unlocked(), [true, false, false, false]);
    for level in Level::ALL {
        assert_eq!(session.progress().best_time(level), None);
    }
}

#[test]
fn leaving_mid_level_discards_the_attempt() {
    let mut session = new_session();
    let mut now = 0.0;
    enter_level(&mut session, Level::Reaction, &mut now);
    session.dispatch(Action::LeaveLevel, now + 100.0);
    assert_eq!(session.screen(), Screen::Menu);
    assert!(session.attempt().is_none());
    session.drain_signals();

    // Nothing from the abandoned attempt fires later
    session.advance_to(now + 10_000.0);
    assert!(
        session
            .drain_signals()
            .iter()
            .all(|s| !matches!(s, Signal::Reaction(_) | Signal::Result(_)))
    );
}

#[test]
fn malformed_storage_starts_fresh() {
    let mut store = MemoryStorage::new();
    store.set("completedLevels", "{not json");
    store.set("bestTimesByLevel", "[1,2,3]");
    store.set("reflexArcadeSettings", "???");
    let session = Session::new(Box::new(store), 1, 0.0);
    assert_eq!(session.progress().unlocked(), [true, false, false, false]);
    assert_eq!(session.progress().best_time(Level::Reaction), None);
    assert_eq!(session.settings().time_scale, 1.0);
}
