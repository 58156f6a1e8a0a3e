//! Session engine
//!
//! The host owns the frame loop and calls [`SessionEngine::tick`] once per
//! animation frame with a millisecond timestamp. Input edits come in
//! through [`SessionEngine::handle_input`]. Everything the host needs to
//! react to (sounds, effects, result screens) is queued as a
//! [`SessionEvent`] and drained with [`SessionEngine::drain_events`].

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{
    DisplayState, FallingWord, GameMode, GameOverSummary, InputEvent, SessionEvent, SessionPhase,
    SessionState, StageClearSummary,
};
use crate::catalog::{StageKind, WordCatalog};
use crate::consts::BASELINE_FPS;
use crate::matcher::{answers_match, is_prefix_match};
use crate::persistence::ProgressStore;
use crate::pool::{PoolEntry, WordPoolBuilder, pick_random_word};
use crate::tuning::{Tuning, adaptive_speed_modifier};
use crate::worlds;

pub struct SessionEngine {
    catalog: WordCatalog,
    store: ProgressStore,
    tuning: Tuning,
    rng: Pcg32,
    state: SessionState,
    words: Vec<FallingWord>,
    pool: Vec<PoolEntry>,
    events: Vec<SessionEvent>,
}

impl SessionEngine {
    pub fn new(catalog: WordCatalog, store: ProgressStore, tuning: Tuning, seed: u64) -> Self {
        let state = SessionState::new(1, 1, GameMode::default(), &tuning);
        Self {
            catalog,
            store,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            state,
            words: Vec::new(),
            pool: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &WordCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut WordCatalog {
        &mut self.catalog
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProgressStore {
        &mut self.store
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Lives and the clear target are read at the next `start`
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn active_words(&self) -> &[FallingWord] {
        &self.words
    }

    pub fn pool(&self) -> &[PoolEntry] {
        &self.pool
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Stage following the current one, if any
    pub fn next_stage(&self) -> Option<(u32, u32)> {
        worlds::next_stage(self.state.world_id, self.state.stage_num)
    }

    // === Lifecycle ===

    /// Start a fresh session
    ///
    /// A non-empty `custom_pool` makes this a review run: the pool is used
    /// as given, difficulty is not adapted and the result is not stored.
    pub fn start(
        &mut self,
        world_id: u32,
        stage_num: u32,
        mode: GameMode,
        custom_pool: Option<Vec<PoolEntry>>,
        now: f64,
    ) {
        let custom_pool = custom_pool.filter(|pool| !pool.is_empty());
        let is_review_mode = custom_pool.is_some();
        let kind = self.catalog.stage_kind(world_id, stage_num);

        if worlds::world_config(world_id).is_none() {
            log::warn!("Unknown world {}, using default speed", world_id);
        }

        let speed_modifier = if is_review_mode {
            1.0
        } else {
            let last_accuracy = self
                .store
                .stage_result(&crate::get_stage_id(world_id, stage_num))
                .and_then(|result| result.last_accuracy);
            adaptive_speed_modifier(last_accuracy)
        };

        let pool = match custom_pool {
            Some(pool) => pool,
            None => self.build_pool(world_id, stage_num, kind),
        };
        if pool.is_empty() {
            log::warn!("Stage {}-{} has no words to spawn", world_id, stage_num);
        }

        let mut state = SessionState::new(world_id, stage_num, mode, &self.tuning);
        state.kind = kind;
        state.phase = SessionPhase::Running;
        state.started_at = now;
        state.speed_modifier = speed_modifier;
        state.is_review_mode = is_review_mode;
        state.current_speed = worlds::calculate_speed(world_id, stage_num, 0.0) * speed_modifier;

        self.state = state;
        self.pool = pool;
        self.words.clear();

        log::info!(
            "Stage {}-{} started ({:?}, {} pool entries, speed x{:.2})",
            world_id,
            stage_num,
            kind,
            self.pool.len(),
            speed_modifier
        );
    }

    /// Boss, then review, then normal; empty special pools fall back
    fn build_pool(&self, world_id: u32, stage_num: u32, kind: StageKind) -> Vec<PoolEntry> {
        let builder = WordPoolBuilder::new(&self.catalog, &self.store, &self.tuning);
        let special = match kind {
            StageKind::Boss => builder.create_boss_pool(world_id, stage_num),
            StageKind::Review => builder.create_review_pool(),
            StageKind::Normal => Vec::new(),
        };
        if !special.is_empty() {
            return special;
        }
        if kind != StageKind::Normal {
            log::warn!(
                "{:?} pool for {}-{} is empty, using the stage pool",
                kind,
                world_id,
                stage_num
            );
        }
        builder.create_word_pool(world_id, stage_num)
    }

    pub fn pause(&mut self, now: f64) {
        if self.state.phase != SessionPhase::Running {
            return;
        }
        self.state.phase = SessionPhase::Paused;
        self.state.paused_at = Some(now);
        log::info!("Paused");
    }

    /// Resume, shifting every timestamp so the pause does not count
    pub fn resume(&mut self, now: f64) {
        if self.state.phase != SessionPhase::Paused {
            return;
        }
        let paused_for = self
            .state
            .paused_at
            .take()
            .map_or(0.0, |at| (now - at).max(0.0));
        self.state.paused_total_ms += paused_for;
        if let Some(last) = self.state.last_spawn_at.as_mut() {
            *last += paused_for;
        }
        for word in &mut self.words {
            word.spawned_at += paused_for;
        }
        self.state.last_frame_at = Some(now);
        self.state.phase = SessionPhase::Running;
        log::info!("Resumed after {:.0} ms", paused_for);
    }

    /// Abandon the session; nothing is recorded
    pub fn stop(&mut self) {
        if matches!(self.state.phase, SessionPhase::Running | SessionPhase::Paused) {
            log::info!("Stage {} stopped", self.state.stage_id());
        }
        self.state.phase = SessionPhase::Idle;
        self.state.input.clear();
        self.words.clear();
    }

    // === Frame update ===

    pub fn tick(&mut self, now: f64) {
        if !self.state.is_running() {
            return;
        }
        if self.check_stage_clear() {
            return;
        }

        let dt_ms = self
            .state
            .last_frame_at
            .map_or(0.0, |last| (now - last).max(0.0));
        self.state.last_frame_at = Some(now);
        self.state.elapsed_ms = now - self.state.started_at - self.state.paused_total_ms;

        let progress = self.state.progress_ratio();
        self.state.current_speed =
            worlds::calculate_speed(self.state.world_id, self.state.stage_num, progress as f32)
                * self.state.speed_modifier;

        self.try_spawn(now, progress);
        self.update_words(dt_ms);
        self.check_stage_clear();
    }

    fn try_spawn(&mut self, now: f64, progress: f64) {
        if self.words.len() >= self.tuning.max_active_words {
            return;
        }
        let interval = self.tuning.spawn_interval_for(progress);
        if self
            .state
            .last_spawn_at
            .is_some_and(|last| now - last < interval)
        {
            return;
        }

        let on_screen: Vec<&str> = self.words.iter().map(|w| w.spanish.as_str()).collect();
        let Some(entry) = pick_random_word(&self.pool, &on_screen, &mut self.rng).cloned() else {
            return;
        };

        let margin = self.tuning.spawn_margin;
        let span = (self.tuning.canvas_width - 2.0 * margin).max(0.0);
        let word = FallingWord {
            id: self.state.allocate_word_id(),
            spanish: entry.spanish,
            korean: entry.korean,
            x: margin + self.rng.random::<f32>() * span,
            y: self.tuning.spawn_y,
            speed: self.state.current_speed,
            matched: false,
            is_review: entry.is_review,
            spawned_at: now,
        };
        self.state.last_spawn_at = Some(now);
        self.words.push(word.clone());
        self.refresh_matches();
        self.events.push(SessionEvent::WordSpawned { word });
    }

    fn update_words(&mut self, dt_ms: f64) {
        let frames = (dt_ms / 1000.0) as f32 * BASELINE_FPS;
        for word in &mut self.words {
            word.y += word.speed * frames;
        }

        let death_line = self.tuning.death_line_y;
        let mut i = 0;
        while i < self.words.len() && self.state.is_running() {
            if self.words[i].y >= death_line {
                let word = self.words.remove(i);
                self.handle_missed_word(word);
            } else {
                i += 1;
            }
        }
    }

    fn check_stage_clear(&mut self) -> bool {
        if self.state.is_running() && self.state.correct_count >= self.state.target_correct {
            self.handle_stage_clear();
            return true;
        }
        false
    }

    // === Input ===

    /// Apply an edit to the answer field; ignored unless running
    pub fn handle_input(&mut self, event: InputEvent, now: f64) {
        if !self.state.is_running() {
            return;
        }
        match event {
            InputEvent::Char(c) => self.state.input.push(c),
            InputEvent::Backspace => {
                self.state.input.pop();
            }
            InputEvent::Set(text) => self.state.input = text,
            InputEvent::Submit => {
                self.check_answer(now);
                return;
            }
        }
        self.refresh_matches();
    }

    /// Browser key name; returns whether the key was used
    pub fn handle_key(&mut self, key: &str, now: f64) -> bool {
        match InputEvent::from_key(key) {
            Some(event) => {
                self.handle_input(event, now);
                true
            }
            None => false,
        }
    }

    fn refresh_matches(&mut self) {
        let mode = self.state.mode;
        let input = &self.state.input;
        for word in &mut self.words {
            word.matched = is_prefix_match(word.answer(mode), input);
        }
    }

    /// Submit the current input against every word on screen
    ///
    /// Returns `None` for a blank submit, otherwise whether a word matched.
    pub fn check_answer(&mut self, now: f64) -> Option<bool> {
        if !self.state.is_running() || self.state.input.trim().is_empty() {
            return None;
        }

        let mode = self.state.mode;
        let input = std::mem::take(&mut self.state.input);
        let hit = self
            .words
            .iter()
            .position(|word| answers_match(word.answer(mode), &input));

        match hit {
            Some(index) => {
                let word = self.words.remove(index);
                self.handle_correct_answer(word, now);
            }
            None => self.handle_wrong_answer(&input),
        }
        self.refresh_matches();
        Some(hit.is_some())
    }

    fn handle_correct_answer(&mut self, word: FallingWord, now: f64) {
        let state = &mut self.state;
        state.combo += 1;
        state.max_combo = state.max_combo.max(state.combo);

        let mut points = self.tuning.points_for_combo(state.combo);
        if now - word.spawned_at < self.tuning.speed_bonus_threshold_ms {
            points += self.tuning.speed_bonus_points;
        }
        state.score += points;
        state.correct_count += 1;

        log::debug!(
            "Correct '{}' +{} (combo {}, {}/{})",
            word.spanish,
            points,
            state.combo,
            state.correct_count,
            state.target_correct
        );
        let combo = state.combo;
        self.store.record_correct_word(&word.spanish);
        self.events.push(SessionEvent::CorrectAnswer {
            word,
            points,
            combo,
        });
    }

    fn handle_wrong_answer(&mut self, input: &str) {
        self.state.combo = 0;
        self.state.wrong_count += 1;

        let mode = self.state.mode;
        let hints = self
            .words
            .iter()
            .map(|w| format!("{} = {}", w.prompt(mode), w.answer(mode)))
            .collect::<Vec<_>>()
            .join("  |  ");
        log::debug!("Wrong answer '{}'", input);
        self.events.push(SessionEvent::WrongAnswer { hints });
    }

    fn handle_missed_word(&mut self, word: FallingWord) {
        self.state.lives = self.state.lives.saturating_sub(1);
        self.state.combo = 0;
        self.state.wrong_count += 1;
        self.store.record_wrong_word(&word.spanish, &word.korean);

        log::debug!("Missed '{}', {} lives left", word.spanish, self.state.lives);
        let lives = self.state.lives;
        self.events.push(SessionEvent::WordMissed { word, lives });

        if lives == 0 {
            self.handle_game_over();
        }
    }

    // === Terminal transitions ===

    fn handle_stage_clear(&mut self) {
        self.state.phase = SessionPhase::StageClear;
        self.state.input.clear();
        self.words.clear();

        let accuracy = self.state.accuracy();
        let stars = self.tuning.stars_for_accuracy(accuracy);
        let stage_id = self.state.stage_id();

        let new_best = !self.state.is_review_mode
            && self
                .store
                .save_stage_result(&stage_id, stars, self.state.score, accuracy);
        self.store.update_stats(
            self.state.score,
            self.state.correct_count,
            self.state.wrong_count,
        );

        log::info!(
            "Stage {} cleared: {} stars, {} points, {}% accuracy",
            stage_id,
            stars,
            self.state.score,
            accuracy
        );
        self.events.push(SessionEvent::StageCleared(StageClearSummary {
            world_id: self.state.world_id,
            stage_num: self.state.stage_num,
            stars,
            score: self.state.score,
            max_combo: self.state.max_combo,
            accuracy,
            elapsed_ms: self.state.elapsed_ms,
            correct_count: self.state.correct_count,
            wrong_count: self.state.wrong_count,
            is_review_mode: self.state.is_review_mode,
            new_best,
        }));
    }

    fn handle_game_over(&mut self) {
        self.state.phase = SessionPhase::GameOver;
        self.state.input.clear();
        self.words.clear();

        self.store
            .update_stats(0, self.state.correct_count, self.state.wrong_count);

        log::info!(
            "Game over on {} with {} points",
            self.state.stage_id(),
            self.state.score
        );
        self.events.push(SessionEvent::GameOver(GameOverSummary {
            world_id: self.state.world_id,
            stage_num: self.state.stage_num,
            score: self.state.score,
            correct_count: self.state.correct_count,
            wrong_count: self.state.wrong_count,
            is_review_mode: self.state.is_review_mode,
        }));
    }

    // === Display ===

    pub fn snapshot(&self) -> DisplayState {
        DisplayState {
            score: self.state.score,
            lives: self.state.lives,
            combo: self.state.combo,
            progress: (self.state.progress_ratio() * 100.0).round() as u32,
            current_input: self.state.input.clone(),
            is_running: self.state.is_running(),
            is_paused: self.state.is_paused(),
        }
    }
}
