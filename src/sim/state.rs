//! Session state and event types
//!
//! One `SessionState` per stage attempt, replaced wholesale on every start.

use serde::{Deserialize, Serialize};

use crate::catalog::StageKind;
use crate::get_stage_id;
use crate::tuning::Tuning;

/// Typing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    /// Spanish falls, Korean is typed
    #[default]
    EsToKo,
    /// Korean falls, Spanish is typed
    KoToEs,
}

impl GameMode {
    pub fn flipped(self) -> Self {
        match self {
            GameMode::EsToKo => GameMode::KoToEs,
            GameMode::KoToEs => GameMode::EsToKo,
        }
    }

    /// Text drawn on the falling word
    pub fn prompt<'a>(self, spanish: &'a str, korean: &'a str) -> &'a str {
        match self {
            GameMode::EsToKo => spanish,
            GameMode::KoToEs => korean,
        }
    }

    /// Text the player has to type
    pub fn answer<'a>(self, spanish: &'a str, korean: &'a str) -> &'a str {
        self.flipped().prompt(spanish, korean)
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No session started, or stopped
    #[default]
    Idle,
    Running,
    Paused,
    StageClear,
    GameOver,
}

/// A word on its way down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallingWord {
    pub id: u32,
    pub spanish: String,
    pub korean: String,
    pub x: f32,
    pub y: f32,
    /// Pixels per frame at the 60fps baseline
    pub speed: f32,
    /// Current input is a prefix of this word's answer
    pub matched: bool,
    pub is_review: bool,
    pub spawned_at: f64,
}

impl FallingWord {
    pub fn prompt(&self, mode: GameMode) -> &str {
        mode.prompt(&self.spanish, &self.korean)
    }

    pub fn answer(&self, mode: GameMode) -> &str {
        mode.answer(&self.spanish, &self.korean)
    }
}

/// Per-session counters and timing (ms timestamps from the host clock)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub world_id: u32,
    pub stage_num: u32,
    pub kind: StageKind,
    pub mode: GameMode,
    pub phase: SessionPhase,
    pub score: u64,
    pub lives: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub target_correct: u32,
    pub started_at: f64,
    /// Play time so far, paused time excluded
    pub elapsed_ms: f64,
    pub last_frame_at: Option<f64>,
    pub last_spawn_at: Option<f64>,
    pub current_speed: f32,
    pub speed_modifier: f32,
    /// Custom-pool run; results are not stored
    pub is_review_mode: bool,
    pub input: String,
    pub(crate) paused_at: Option<f64>,
    pub(crate) paused_total_ms: f64,
    pub(crate) next_word_id: u32,
}

impl SessionState {
    pub fn new(world_id: u32, stage_num: u32, mode: GameMode, tuning: &Tuning) -> Self {
        Self {
            world_id,
            stage_num,
            kind: StageKind::Normal,
            mode,
            phase: SessionPhase::Idle,
            score: 0,
            lives: tuning.initial_lives,
            combo: 0,
            max_combo: 0,
            correct_count: 0,
            wrong_count: 0,
            target_correct: tuning.words_to_clear,
            started_at: 0.0,
            elapsed_ms: 0.0,
            last_frame_at: None,
            last_spawn_at: None,
            current_speed: 0.0,
            speed_modifier: 1.0,
            is_review_mode: false,
            input: String::new(),
            paused_at: None,
            paused_total_ms: 0.0,
            next_word_id: 1,
        }
    }

    pub fn stage_id(&self) -> String {
        get_stage_id(self.world_id, self.stage_num)
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    /// Correct answers over the clear target, 0..=1
    pub fn progress_ratio(&self) -> f64 {
        if self.target_correct == 0 {
            return 1.0;
        }
        (self.correct_count as f64 / self.target_correct as f64).min(1.0)
    }

    /// Percent of answers that were right; 100 with no attempts
    pub fn accuracy(&self) -> u32 {
        let total = self.correct_count + self.wrong_count;
        if total == 0 {
            return 100;
        }
        (100.0 * self.correct_count as f64 / total as f64).round() as u32
    }

    pub(crate) fn allocate_word_id(&mut self) -> u32 {
        let id = self.next_word_id;
        self.next_word_id += 1;
        id
    }
}

/// Outcome of a cleared stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageClearSummary {
    pub world_id: u32,
    pub stage_num: u32,
    pub stars: u8,
    pub score: u64,
    pub max_combo: u32,
    pub accuracy: u32,
    pub elapsed_ms: f64,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub is_review_mode: bool,
    /// The stored stage record changed
    pub new_best: bool,
}

/// Outcome of a lost stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverSummary {
    pub world_id: u32,
    pub stage_num: u32,
    pub score: u64,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub is_review_mode: bool,
}

/// Events for the host, drained after each call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    WordSpawned {
        word: FallingWord,
    },
    CorrectAnswer {
        word: FallingWord,
        points: u64,
        combo: u32,
    },
    /// `hints` lists every word on screen as "prompt = answer"
    WrongAnswer {
        hints: String,
    },
    WordMissed {
        word: FallingWord,
        lives: u32,
    },
    StageCleared(StageClearSummary),
    GameOver(GameOverSummary),
}

/// What the HUD shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    pub score: u64,
    pub lives: u32,
    pub combo: u32,
    /// Percent towards the clear target, capped at 100
    pub progress: u32,
    pub current_input: String,
    pub is_running: bool,
    pub is_paused: bool,
}

/// Raw edits to the answer field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Backspace,
    /// Replace the whole field (IME composition, paste)
    Set(String),
    Submit,
}

impl InputEvent {
    /// Map a browser `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Backspace" => Some(InputEvent::Backspace),
            "Enter" => Some(InputEvent::Submit),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(InputEvent::Char(c)),
                    _ => None,
                }
            }
        }
    }
}
