//! Session simulation module
//!
//! All gameplay logic lives here. Kept free of platform dependencies:
//! - Time comes in as host timestamps (ms)
//! - Seeded RNG only
//! - Persistence only through `ProgressStore`

pub mod engine;
pub mod state;

pub use engine::SessionEngine;
pub use state::{
    DisplayState, FallingWord, GameMode, GameOverSummary, InputEvent, SessionEvent, SessionPhase,
    SessionState, StageClearSummary,
};
