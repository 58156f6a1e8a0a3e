//! Aggregate play statistics
//!
//! Persisted as one JSON object, tracks totals and the daily play streak.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayStats {
    pub total_score: u64,
    pub total_games: u32,
    pub total_correct: u32,
    pub total_wrong: u32,
    /// Consecutive days with at least one finished session
    pub current_streak: u32,
    pub last_play_date: Option<NaiveDate>,
}

impl PlayStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one finished session into the totals and advance the streak
    pub fn record_session(&mut self, score: u64, correct: u32, wrong: u32, today: NaiveDate) {
        self.total_score += score;
        self.total_games += 1;
        self.total_correct += correct;
        self.total_wrong += wrong;

        self.current_streak = match self.last_play_date {
            Some(last) if last == today => self.current_streak.max(1),
            Some(last) if today.pred_opt() == Some(last) => self.current_streak + 1,
            _ => 1,
        };
        self.last_play_date = Some(today);
    }

    /// Lifetime accuracy in percent (100 with no attempts)
    pub fn accuracy(&self) -> u32 {
        let total = self.total_correct + self.total_wrong;
        if total == 0 {
            return 100;
        }
        (100.0 * self.total_correct as f64 / total as f64).round() as u32
    }
}
