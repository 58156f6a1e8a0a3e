//! Browser bindings
//!
//! `WebGame` wraps a [`SessionEngine`] for the page script. The script owns
//! the `requestAnimationFrame` loop, DOM wiring and drawing; it passes frame
//! timestamps in and reads state back as JSON strings.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::catalog::WordCatalog;
use crate::persistence::{MemoryStore, ProgressStore};
use crate::platform::LocalStorage;
use crate::pool::WordPoolBuilder;
use crate::settings::Settings;
use crate::sim::{GameMode, InputEvent, SessionEngine};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Spanish Rain starting...");
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))
}

#[wasm_bindgen]
pub struct WebGame {
    engine: SessionEngine,
    settings: Settings,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WebGame {
        let mut store = match LocalStorage::open() {
            Some(storage) => ProgressStore::new(storage),
            None => {
                log::warn!("localStorage unavailable, progress will not persist");
                ProgressStore::new(MemoryStore::new())
            }
        };
        store.init();
        let settings = Settings::load(store.backend());
        let engine = SessionEngine::new(WordCatalog::new(), store, Tuning::default(), seed);
        WebGame { engine, settings }
    }

    /// Replace the balance values from a JSON object
    pub fn set_tuning(&mut self, json: &str) -> Result<(), JsError> {
        let tuning = Tuning::from_json(json).map_err(|e| JsError::new(&e.to_string()))?;
        self.engine.set_tuning(tuning);
        Ok(())
    }

    /// Add one world's word file; returns the number of stages read
    pub fn load_world(&mut self, world_id: u32, json: &str) -> Result<usize, JsError> {
        self.engine
            .catalog_mut()
            .load_world_json(world_id, json)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.catalog().is_loaded()
    }

    pub fn start(&mut self, world_id: u32, stage_num: u32, now: f64) {
        self.engine
            .start(world_id, stage_num, self.settings.mode, None, now);
    }

    /// Replay the most-missed words; false when there are too few
    pub fn start_review(&mut self, world_id: u32, stage_num: u32, now: f64) -> bool {
        let pool = WordPoolBuilder::new(
            self.engine.catalog(),
            self.engine.store(),
            self.engine.tuning(),
        )
        .create_review_pool();
        if pool.is_empty() {
            return false;
        }
        self.engine
            .start(world_id, stage_num, self.settings.mode, Some(pool), now);
        true
    }

    pub fn tick(&mut self, now: f64) {
        self.engine.tick(now);
    }

    /// `KeyboardEvent.key`; returns whether the key was consumed
    pub fn key(&mut self, key: &str, now: f64) -> bool {
        self.engine.handle_key(key, now)
    }

    pub fn set_input(&mut self, text: &str, now: f64) {
        self.engine
            .handle_input(InputEvent::Set(text.to_string()), now);
    }

    pub fn submit(&mut self, now: f64) {
        self.engine.handle_input(InputEvent::Submit, now);
    }

    pub fn pause(&mut self, now: f64) {
        self.engine.pause(now);
    }

    pub fn resume(&mut self, now: f64) {
        self.engine.resume(now);
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        to_json(&self.engine.snapshot())
    }

    pub fn words(&self) -> Result<String, JsError> {
        to_json(self.engine.active_words())
    }

    pub fn drain_events(&mut self) -> Result<String, JsError> {
        to_json(&self.engine.drain_events())
    }

    /// `[world, stage]` after the current session, empty after the last stage
    pub fn next_stage(&self) -> Vec<u32> {
        self.engine
            .next_stage()
            .map(|(w, s)| vec![w, s])
            .unwrap_or_default()
    }

    pub fn stage_category(&self, world_id: u32, stage_num: u32) -> String {
        self.engine.catalog().stage_category(world_id, stage_num)
    }

    pub fn is_stage_unlocked(&self, world_id: u32, stage_num: u32) -> bool {
        self.engine.store().is_stage_unlocked(world_id, stage_num)
    }

    pub fn current_progress(&self) -> Vec<u32> {
        let (world, stage) = self.engine.store().current_progress();
        vec![world, stage]
    }

    pub fn stats(&self) -> Result<String, JsError> {
        to_json(&self.engine.store().stats())
    }

    pub fn clear_progress(&mut self) {
        self.engine.store_mut().clear_all();
    }

    pub fn mode(&self) -> Result<String, JsError> {
        to_json(&self.settings.mode)
    }

    pub fn toggle_mode(&mut self) -> bool {
        self.settings.toggle_mode();
        self.settings.save(self.engine.store_mut().backend_mut());
        self.settings.mode == GameMode::KoToEs
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.settings.sound_enabled = enabled;
        self.settings.save(self.engine.store_mut().backend_mut());
    }

    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.settings.music_enabled = enabled;
        self.settings.save(self.engine.store_mut().backend_mut());
    }

    pub fn sound_enabled(&self) -> bool {
        self.settings.sound_enabled
    }

    pub fn music_enabled(&self) -> bool {
        self.settings.music_enabled
    }
}
