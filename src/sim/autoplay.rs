//! Demo player
//!
//! Reads the running mini-game and answers the way a perfect player would.
//! Used by the native headless run and by tests that play whole levels.

use super::games::memory::CardFace;
use super::games::{MiniGame, RoundGame};
use super::state::GameInput;

/// The input a perfect player would give right now, if any
pub fn autoplay_input(game: &MiniGame) -> Option<GameInput> {
    match game {
        MiniGame::Reaction(g) => g.target().map(|_| GameInput::TargetHit),
        MiniGame::Stroop(g) => {
            (g.round() > 0 && !g.is_answered()).then(|| GameInput::Answer(g.matches()))
        }
        MiniGame::Simon(g) => {
            if g.is_locked() {
                return None;
            }
            g.sequence().get(g.entered_len()).map(|&p| GameInput::Panel(p))
        }
        MiniGame::Memory(g) => {
            if g.is_locked() {
                return None;
            }
            let cards = g.cards();
            let down = |i: &usize| cards[*i].face == CardFace::Down;

            // Finish an open pair first
            if let Some(open) = cards.iter().position(|c| c.face == CardFace::Up) {
                let value = cards[open].value;
                return (0..cards.len())
                    .filter(down)
                    .find(|&i| cards[i].value == value)
                    .map(GameInput::Card);
            }
            (0..cards.len()).find(down).map(GameInput::Card)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::sim::level::Level;
    use crate::sim::session::Session;
    use crate::sim::state::{Action, Screen};

    /// Play `level` to the end with perfect input, 300 ms per move
    fn play(session: &mut Session, level: Level, mut now: f64) -> f64 {
        session.start_level(level).expect("start");
        while session.screen() == Screen::Game {
            let input = session.game().and_then(autoplay_input);
            match input {
                Some(input) => {
                    now += 300.0;
                    session.dispatch(Action::Game(input), now);
                }
                None => {
                    now = session.next_due().unwrap_or(now + 1.0).max(now);
                    session.advance_to(now);
                }
            }
        }
        now
    }

    #[test]
    fn test_autoplay_passes_every_level() {
        let mut session = Session::new(Box::new(MemoryStorage::new()), 11, 0.0);
        let mut now = 0.0;
        for level in Level::ALL {
            now = play(&mut session, level, now);
            assert!(session.progress().is_completed(level), "level {}", level.id());
        }
        assert_eq!(session.screen(), Screen::EndMenu);
        assert_eq!(session.progress().unlocked(), [true; 4]);
    }
}
