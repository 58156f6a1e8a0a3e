//! Spanish Rain - falling-word vocabulary game
//!
//! Core modules:
//! - `sim`: Session engine (spawning, matching, scoring, stage progression)
//! - `catalog`: Per-world stage word lists
//! - `pool`: Weighted word pools with review boosting
//! - `matcher`: Answer normalization and numeral equivalence
//! - `persistence`: Key-value storage and the progress store
//! - `platform`: Browser storage backend and clock
//! - `tuning`: Data-driven game balance
//! - `worlds`: Static world table and speed curve
//! - `web`: wasm-bindgen wrapper for the page script (wasm32 only)

pub mod catalog;
pub mod error;
pub mod matcher;
pub mod persistence;
pub mod platform;
pub mod pool;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;
pub mod worlds;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use catalog::{StageSchedule, StageWord, WordCatalog};
pub use error::{CatalogError, StageIdError, StoreError};
pub use persistence::{KeyValueStore, MemoryStore, ProgressStore};
pub use pool::PoolEntry;
pub use settings::Settings;
pub use sim::{GameMode, InputEvent, SessionEngine, SessionEvent};
pub use stats::PlayStats;
pub use tuning::{BossRecall, Tuning};
pub use worlds::WorldConfig;

/// Game configuration constants
pub mod consts {
    /// Canvas width in logical pixels
    pub const CANVAS_WIDTH: f32 = 1000.0;
    /// Words crossing this y coordinate are missed
    pub const DEATH_LINE_Y: f32 = 645.0;
    /// Spawn height (just above the viewport)
    pub const SPAWN_Y: f32 = -30.0;
    /// Horizontal margin kept free on both sides when spawning
    pub const SPAWN_MARGIN: f32 = 100.0;

    /// Headwords introduced per stage
    pub const WORDS_PER_STAGE: usize = 10;
    /// Correct answers needed to clear a stage (review words included)
    pub const WORDS_TO_CLEAR: u32 = 18;
    /// Maximum words falling at once
    pub const MAX_ACTIVE_WORDS: usize = 3;
    pub const SPAWN_INTERVAL_MS: f64 = 2000.0;
    pub const MIN_SPAWN_INTERVAL_MS: f64 = 800.0;

    pub const INITIAL_LIVES: u32 = 3;
    pub const BASE_SCORE: u64 = 100;
    /// Multiplier gained per combo step (10%)
    pub const COMBO_MULTIPLIER: f64 = 0.1;
    pub const MAX_COMBO_MULTIPLIER: f64 = 3.0;
    /// Answers faster than this (ms after spawn) earn the speed bonus
    pub const SPEED_BONUS_THRESHOLD_MS: f64 = 3000.0;
    pub const SPEED_BONUS_POINTS: u64 = 50;

    pub const THREE_STAR_ACCURACY: u32 = 100;
    pub const TWO_STAR_ACCURACY: u32 = 90;

    /// Extra pool copies per recorded mistake on a stage word
    pub const WRONG_WORD_FREQUENCY_BOOST: u32 = 2;
    /// Cap on extra copies of a single stage word
    pub const MAX_STAGE_WORD_BOOST: u32 = 10;
    /// Copy range for mistakes carried over from other stages
    pub const MIN_CROSS_STAGE_COPIES: u32 = 1;
    pub const MAX_CROSS_STAGE_COPIES: u32 = 3;
    pub const REVIEW_STAGE_INTERVAL: u32 = 5;
    /// Ten regular stages then a boss
    pub const BOSS_STAGE_INTERVAL: u32 = 11;
    pub const MIN_WRONG_FOR_REVIEW: usize = 5;
    pub const REVIEW_POOL_SIZE: usize = 10;

    /// Fall speed used when a world id is unknown
    pub const DEFAULT_SPEED: f32 = 0.5;
    /// Fall speeds are expressed in pixels per frame at this rate
    pub const BASELINE_FPS: f32 = 60.0;
}

/// Build the `"{world}-{stage}"` identifier used as a storage key
pub fn get_stage_id(world_id: u32, stage_num: u32) -> String {
    format!("{}-{}", world_id, stage_num)
}

/// Parse a `"{world}-{stage}"` identifier
pub fn parse_stage_id(stage_id: &str) -> Result<(u32, u32), StageIdError> {
    let malformed = || StageIdError::Malformed(stage_id.to_string());
    let (world, stage) = stage_id.split_once('-').ok_or_else(malformed)?;
    let world_id = world.trim().parse().map_err(|_| malformed())?;
    let stage_num = stage.trim().parse().map_err(|_| malformed())?;
    Ok((world_id, stage_num))
}
