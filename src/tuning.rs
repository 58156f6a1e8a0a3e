//! Data-driven game balance
//!
//! Every field defaults to the matching constant in [`crate::consts`], so a
//! tuning file only needs to name the values it overrides.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which earlier stages a boss stage recalls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossRecall {
    /// Stages since the previous boss in the same world
    #[default]
    Episode,
    /// Every earlier stage in the same world
    World,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub canvas_width: f32,
    pub death_line_y: f32,
    pub spawn_y: f32,
    pub spawn_margin: f32,

    pub words_to_clear: u32,
    pub max_active_words: usize,
    pub spawn_interval_ms: f64,
    pub min_spawn_interval_ms: f64,

    pub initial_lives: u32,
    pub base_score: u64,
    pub combo_multiplier: f64,
    pub max_combo_multiplier: f64,
    pub speed_bonus_threshold_ms: f64,
    pub speed_bonus_points: u64,

    pub three_star_accuracy: u32,
    pub two_star_accuracy: u32,

    pub wrong_word_frequency_boost: u32,
    pub max_stage_word_boost: u32,
    pub min_wrong_for_review: usize,
    pub review_pool_size: usize,
    pub boss_recall: BossRecall,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            death_line_y: DEATH_LINE_Y,
            spawn_y: SPAWN_Y,
            spawn_margin: SPAWN_MARGIN,

            words_to_clear: WORDS_TO_CLEAR,
            max_active_words: MAX_ACTIVE_WORDS,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            min_spawn_interval_ms: MIN_SPAWN_INTERVAL_MS,

            initial_lives: INITIAL_LIVES,
            base_score: BASE_SCORE,
            combo_multiplier: COMBO_MULTIPLIER,
            max_combo_multiplier: MAX_COMBO_MULTIPLIER,
            speed_bonus_threshold_ms: SPEED_BONUS_THRESHOLD_MS,
            speed_bonus_points: SPEED_BONUS_POINTS,

            three_star_accuracy: THREE_STAR_ACCURACY,
            two_star_accuracy: TWO_STAR_ACCURACY,

            wrong_word_frequency_boost: WRONG_WORD_FREQUENCY_BOOST,
            max_stage_word_boost: MAX_STAGE_WORD_BOOST,
            min_wrong_for_review: MIN_WRONG_FOR_REVIEW,
            review_pool_size: REVIEW_POOL_SIZE,
            boss_recall: BossRecall::Episode,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Combo multiplier for the given combo count (combo 1 = x1.0)
    pub fn combo_multiplier_for(&self, combo: u32) -> f64 {
        let steps = combo.saturating_sub(1) as f64;
        (1.0 + steps * self.combo_multiplier).min(self.max_combo_multiplier)
    }

    /// Points for a correct answer before the speed bonus
    pub fn points_for_combo(&self, combo: u32) -> u64 {
        (self.base_score as f64 * self.combo_multiplier_for(combo)).floor() as u64
    }

    /// Stars for a cleared stage; never below one
    pub fn stars_for_accuracy(&self, accuracy: u32) -> u8 {
        if accuracy >= self.three_star_accuracy {
            3
        } else if accuracy >= self.two_star_accuracy {
            2
        } else {
            1
        }
    }

    /// Spawn interval shrinks as the stage progresses, down to the floor
    pub fn spawn_interval_for(&self, progress_ratio: f64) -> f64 {
        (self.spawn_interval_ms * (1.0 - progress_ratio * 0.5)).max(self.min_spawn_interval_ms)
    }
}

/// Speed modifier from the previous accuracy on the same stage
pub fn adaptive_speed_modifier(last_accuracy: Option<u32>) -> f32 {
    match last_accuracy {
        Some(acc) if acc < 60 => 0.50,
        Some(acc) if acc < 75 => 0.65,
        Some(acc) if acc < 85 => 0.80,
        _ => 1.0,
    }
}
