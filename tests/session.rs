// Integration tests (native) for the `spanish-rain` session engine.
// These play whole stages against the bundled world file with a bot that
// answers every word as soon as it appears.

use spanish_rain::sim::{InputEvent, SessionEngine, SessionEvent, SessionPhase, StageClearSummary};
use spanish_rain::{GameMode, MemoryStore, ProgressStore, Tuning, WordCatalog};

const WORLD1: &str = include_str!("../data/world1.json");

fn engine() -> SessionEngine {
    let mut catalog = WordCatalog::new();
    catalog.load_world_json(1, WORLD1).unwrap();
    SessionEngine::new(catalog, ProgressStore::new(MemoryStore::new()), Tuning::default(), 2024)
}

// Play until the session ends, typing `pick(word)` for every word on screen.
// Returns every event and the largest number of words seen at once.
fn play(
    engine: &mut SessionEngine,
    pick: impl Fn(&spanish_rain::sim::FallingWord) -> String,
) -> (Vec<SessionEvent>, usize) {
    let mut events = Vec::new();
    let mut max_on_screen = 0;
    let mut now = 0.0;
    while engine.phase() == SessionPhase::Running && now < 300_000.0 {
        engine.tick(now);
        max_on_screen = max_on_screen.max(engine.active_words().len());

        let answers: Vec<String> = engine.active_words().iter().map(&pick).collect();
        for answer in answers {
            engine.handle_input(InputEvent::Set(answer), now + 5.0);
            engine.handle_input(InputEvent::Submit, now + 5.0);
        }
        events.extend(engine.drain_events());
        now += 100.0;
    }
    (events, max_on_screen)
}

fn stage_clear(events: &[SessionEvent]) -> &StageClearSummary {
    let cleared: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::StageCleared(summary) => Some(summary),
            _ => None,
        })
        .collect();
    assert_eq!(cleared.len(), 1, "events: {:?}", events);
    cleared[0]
}

// Fresh player, perfect run on 1-1: three stars and the next stage opens.
#[test]
fn perfect_first_stage_gets_three_stars() {
    let mut engine = engine();
    engine.start(1, 1, GameMode::EsToKo, None, 0.0);
    assert_eq!(engine.state().speed_modifier, 1.0);
    assert!(!engine.store().is_stage_unlocked(1, 2));

    let (events, max_on_screen) = play(&mut engine, |w| w.korean.clone());

    assert_eq!(engine.phase(), SessionPhase::StageClear);
    assert!(max_on_screen <= 3);
    let summary = stage_clear(&events);
    assert_eq!(summary.stars, 3);
    assert_eq!(summary.accuracy, 100);
    assert_eq!(summary.correct_count, 18);
    assert_eq!(summary.wrong_count, 0);
    assert_eq!(summary.max_combo, 18);
    assert!(summary.new_best);
    assert!(!events.iter().any(|e| matches!(e, SessionEvent::WordMissed { .. })));

    assert!(engine.store().is_stage_unlocked(1, 2));
    assert_eq!(engine.store().current_progress(), (1, 2));
    assert_eq!(engine.store().stats().total_correct, 18);
}

// Every answer came within the bonus window, so each scored combo + 50.
#[test]
fn fast_answers_earn_speed_bonus() {
    let mut engine = engine();
    engine.start(1, 1, GameMode::EsToKo, None, 0.0);
    let (events, _) = play(&mut engine, |w| w.korean.clone());

    let tuning = Tuning::default();
    let expected: u64 = (1..=18).map(|combo| tuning.points_for_combo(combo) + 50).sum();
    assert_eq!(stage_clear(&events).score, expected);
}

// On the numbers stage, typing digits is as good as typing the word.
#[test]
fn numeral_stage_accepts_digits() {
    let mut engine = engine();
    engine.start(1, 2, GameMode::KoToEs, None, 0.0);
    // Korean side of this stage is the digit itself
    let (events, _) = play(&mut engine, |w| w.korean.clone());
    assert_eq!(stage_clear(&events).accuracy, 100);
}

// Ignoring every word loses the stage with exactly one game-over event.
#[test]
fn idle_player_loses_once() {
    let mut engine = engine();
    engine.start(1, 1, GameMode::EsToKo, None, 0.0);
    let mut events = Vec::new();
    let mut now = 0.0;
    while engine.phase() == SessionPhase::Running && now < 300_000.0 {
        engine.tick(now);
        events.extend(engine.drain_events());
        now += 16.0;
    }

    assert_eq!(engine.phase(), SessionPhase::GameOver);
    assert_eq!(engine.state().lives, 0);
    let game_overs = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::GameOver(_)))
        .count();
    assert_eq!(game_overs, 1);
    assert!(engine.store().stage_result("1-1").is_none());
    assert_eq!(engine.store().wrong_words().len(), 3);

    // The missed words come back boosted on the retry
    engine.start(1, 1, GameMode::EsToKo, None, now);
    assert!(engine.pool().iter().filter(|e| e.is_review).count() >= 3);
}
