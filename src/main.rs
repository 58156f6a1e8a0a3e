//! Spanish Rain entry point
//!
//! The browser build is driven from `spanish_rain::web`. Natively this runs
//! a headless autoplay of one stage against the word files in a directory:
//!
//! ```text
//! spanish-rain [data-dir] [world-stage]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use std::path::PathBuf;

    use spanish_rain::platform::now_ms;
    use spanish_rain::sim::{InputEvent, SessionEngine, SessionEvent, SessionPhase};
    use spanish_rain::{GameMode, MemoryStore, ProgressStore, Tuning, WordCatalog, parse_stage_id};

    /// Simulated frame length (60 Hz)
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// The bot answers a word this long after it appeared
    const REACTION_MS: f64 = 1200.0;
    /// Give up after ten simulated minutes
    const MAX_RUN_MS: f64 = 10.0 * 60.0 * 1000.0;

    pub fn run() -> Result<(), String> {
        let mut args = std::env::args().skip(1);
        let dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
        let stage_id = args.next().unwrap_or_else(|| "1-1".to_string());
        let (world_id, stage_num) = parse_stage_id(&stage_id).map_err(|e| e.to_string())?;

        let mut catalog = WordCatalog::new();
        let worlds = catalog.load_dir(&dir).map_err(|e| e.to_string())?;
        log::info!(
            "Loaded {} worlds ({} words) from {}",
            worlds,
            catalog.total_word_count(),
            dir.display()
        );

        let store = ProgressStore::new(MemoryStore::new());
        let mut engine = SessionEngine::new(catalog, store, Tuning::default(), now_ms() as u64);
        log::info!(
            "Stage {}: {}",
            stage_id,
            engine.catalog().stage_category(world_id, stage_num)
        );

        let mut now = 0.0;
        engine.start(world_id, stage_num, GameMode::EsToKo, None, now);
        while engine.phase() == SessionPhase::Running && now < MAX_RUN_MS {
            engine.tick(now);

            let mode = engine.state().mode;
            let due = engine
                .active_words()
                .iter()
                .find(|w| now - w.spawned_at >= REACTION_MS)
                .map(|w| w.answer(mode).to_string());
            if let Some(answer) = due {
                engine.handle_input(InputEvent::Set(answer), now);
                engine.handle_input(InputEvent::Submit, now);
            }

            for event in engine.drain_events() {
                report(&event);
            }
            now += FRAME_MS;
        }

        if engine.phase() == SessionPhase::Running {
            engine.stop();
            log::warn!("Stopped after {:.0} s without finishing", now / 1000.0);
        }
        let stats = engine.store().stats();
        log::info!(
            "Totals: {} points, {} correct, {} wrong",
            stats.total_score,
            stats.total_correct,
            stats.total_wrong
        );
        Ok(())
    }

    fn report(event: &SessionEvent) {
        match event {
            SessionEvent::WordSpawned { word } => {
                log::debug!("spawn {} ({})", word.spanish, word.korean)
            }
            SessionEvent::CorrectAnswer { word, points, combo } => {
                log::info!("✓ {} +{} (combo {})", word.spanish, points, combo)
            }
            SessionEvent::WrongAnswer { hints } => log::info!("✗ {}", hints),
            SessionEvent::WordMissed { word, lives } => {
                log::info!("missed {} ({} lives left)", word.spanish, lives)
            }
            SessionEvent::StageCleared(summary) => println!(
                "Stage {}-{} cleared: {} stars, {} points, {}% accuracy, max combo {}, {:.1} s",
                summary.world_id,
                summary.stage_num,
                summary.stars,
                summary.score,
                summary.accuracy,
                summary.max_combo,
                summary.elapsed_ms / 1000.0
            ),
            SessionEvent::GameOver(summary) => println!(
                "Game over on {}-{}: {} points",
                summary.world_id, summary.stage_num, summary.score
            ),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Spanish Rain (native) starting...");

    if let Err(e) = autoplay::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is spanish_rain::web::wasm_start
}
