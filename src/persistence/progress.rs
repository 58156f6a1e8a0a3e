//! Player progress: stage results, wrong-word table, play stats

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{KeyValueStore, PROGRESS_KEY, STATS_KEY, WRONG_WORDS_KEY, read_json, write_json};
use crate::get_stage_id;
use crate::stats::PlayStats;
use crate::worlds::{self, WORLDS};

/// Best recorded result for one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResult {
    /// 1 to 3
    pub stars: u8,
    pub best_score: u64,
    /// Accuracy (percent) of the run that produced this record
    #[serde(default)]
    pub last_accuracy: Option<u32>,
    pub cleared_at: DateTime<Utc>,
}

impl StageResult {
    /// Better means more stars, or equal stars and a higher score
    pub fn is_improved_by(&self, stars: u8, score: u64) -> bool {
        stars > self.stars || (stars == self.stars && score > self.best_score)
    }
}

/// A word the player has missed, weighted by how often
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrongWordRecord {
    #[serde(rename = "es")]
    pub spanish: String,
    #[serde(rename = "ko")]
    pub korean: String,
    pub wrong_count: u32,
    #[serde(rename = "lastWrong")]
    pub last_wrong_at: DateTime<Utc>,
}

type StageResults = HashMap<String, StageResult>;

pub struct ProgressStore {
    backend: Box<dyn KeyValueStore>,
    clock: Box<dyn Fn() -> DateTime<Local>>,
}

impl ProgressStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            clock: Box::new(Local::now),
        }
    }

    /// Replace the wall clock (streaks and timestamps read from it)
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Local> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn KeyValueStore {
        self.backend.as_mut()
    }

    fn now(&self) -> DateTime<Local> {
        (self.clock)()
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match read_json(self.backend(), key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                log::warn!("ProgressStore: read of '{}' failed: {}", key, e);
                T::default()
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        match write_json(self.backend_mut(), key, value) {
            Ok(()) => true,
            Err(e) => {
                log::error!("ProgressStore: write of '{}' failed: {}", key, e);
                false
            }
        }
    }

    fn is_present(&self, key: &str) -> bool {
        matches!(self.backend().get(key), Ok(Some(_)))
    }

    /// Seed empty structures on first run
    pub fn init(&mut self) {
        if !self.is_present(PROGRESS_KEY) {
            self.save(PROGRESS_KEY, &StageResults::new());
        }
        if !self.is_present(WRONG_WORDS_KEY) {
            self.save(WRONG_WORDS_KEY, &Vec::<WrongWordRecord>::new());
        }
        if !self.is_present(STATS_KEY) {
            self.save(STATS_KEY, &PlayStats::new());
        }
    }

    // === Stage results ===

    pub fn stage_result(&self, stage_id: &str) -> Option<StageResult> {
        self.load::<StageResults>(PROGRESS_KEY).remove(stage_id)
    }

    /// Store a clear result if it beats the existing record
    ///
    /// Returns whether the stored record changed.
    pub fn save_stage_result(&mut self, stage_id: &str, stars: u8, score: u64, accuracy: u32) -> bool {
        let mut results: StageResults = self.load(PROGRESS_KEY);
        let improved = results
            .get(stage_id)
            .is_none_or(|existing| existing.is_improved_by(stars, score));
        if !improved {
            return false;
        }

        results.insert(
            stage_id.to_string(),
            StageResult {
                stars,
                best_score: score,
                last_accuracy: Some(accuracy),
                cleared_at: self.now().with_timezone(&Utc),
            },
        );
        self.save(PROGRESS_KEY, &results)
    }

    /// The first stage is always open; every other stage needs its
    /// predecessor cleared with at least one star
    pub fn is_stage_unlocked(&self, world_id: u32, stage_num: u32) -> bool {
        let Some(first) = WORLDS.first() else {
            return false;
        };
        if world_id == first.id && stage_num == 1 {
            return true;
        }
        match worlds::previous_stage(world_id, stage_num) {
            Some((w, s)) => self
                .stage_result(&get_stage_id(w, s))
                .is_some_and(|r| r.stars >= 1),
            None => false,
        }
    }

    /// Furthest unlocked stage, scanning worlds in order
    pub fn current_progress(&self) -> (u32, u32) {
        let results: StageResults = self.load(PROGRESS_KEY);
        let cleared = |w: u32, s: u32| results.get(&get_stage_id(w, s)).is_some_and(|r| r.stars >= 1);

        let mut last_unlocked = (1, 1);
        let mut previous_cleared = true;
        for world in WORLDS {
            for stage in 1..=world.stages {
                if !previous_cleared {
                    return last_unlocked;
                }
                last_unlocked = (world.id, stage);
                previous_cleared = cleared(world.id, stage);
            }
        }
        last_unlocked
    }

    // === Wrong words ===

    pub fn record_wrong_word(&mut self, spanish: &str, korean: &str) {
        let now = self.now().with_timezone(&Utc);
        let mut words: Vec<WrongWordRecord> = self.load(WRONG_WORDS_KEY);
        match words.iter_mut().find(|w| w.spanish == spanish) {
            Some(record) => {
                record.wrong_count += 1;
                record.last_wrong_at = now;
            }
            None => words.push(WrongWordRecord {
                spanish: spanish.to_string(),
                korean: korean.to_string(),
                wrong_count: 1,
                last_wrong_at: now,
            }),
        }
        self.save(WRONG_WORDS_KEY, &words);
    }

    /// Decay a word's wrong count, dropping it at zero
    pub fn record_correct_word(&mut self, spanish: &str) {
        let mut words: Vec<WrongWordRecord> = self.load(WRONG_WORDS_KEY);
        let Some(index) = words.iter().position(|w| w.spanish == spanish) else {
            return;
        };
        let record = &mut words[index];
        record.wrong_count = record.wrong_count.saturating_sub(1);
        if record.wrong_count == 0 {
            words.remove(index);
        }
        self.save(WRONG_WORDS_KEY, &words);
    }

    pub fn wrong_words(&self) -> Vec<WrongWordRecord> {
        self.load(WRONG_WORDS_KEY)
    }

    /// Most-missed words first
    pub fn words_for_review(&self, limit: usize) -> Vec<WrongWordRecord> {
        let mut words = self.wrong_words();
        words.sort_by(|a, b| b.wrong_count.cmp(&a.wrong_count));
        words.truncate(limit);
        words
    }

    // === Stats ===

    pub fn update_stats(&mut self, score: u64, correct: u32, wrong: u32) {
        let today = self.now().date_naive();
        let mut stats: PlayStats = self.load(STATS_KEY);
        stats.record_session(score, correct, wrong, today);
        self.save(STATS_KEY, &stats);
    }

    pub fn stats(&self) -> PlayStats {
        self.load(STATS_KEY)
    }

    /// Erase everything this store owns, then reseed
    pub fn clear_all(&mut self) {
        for key in [PROGRESS_KEY, WRONG_WORDS_KEY, STATS_KEY] {
            if let Err(e) = self.backend_mut().remove(key) {
                log::error!("ProgressStore: remove of '{}' failed: {}", key, e);
            }
        }
        self.init();
        log::info!("ProgressStore: all progress cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use chrono::TimeZone;
    use std::cell::Cell;
    use std::rc::Rc;

    fn store() -> ProgressStore {
        ProgressStore::new(MemoryStore::new())
    }

    #[test]
    fn test_stage_result_merge_only_improves() {
        let mut store = store();
        assert!(store.save_stage_result("1-1", 2, 1500, 92));

        // Fewer stars
        assert!(!store.save_stage_result("1-1", 1, 9000, 50));
        // Same stars, lower score
        assert!(!store.save_stage_result("1-1", 2, 1400, 91));
        // Same stars, same score
        assert!(!store.save_stage_result("1-1", 2, 1500, 95));

        let kept = store.stage_result("1-1").unwrap();
        assert_eq!(kept.stars, 2);
        assert_eq!(kept.best_score, 1500);
        assert_eq!(kept.last_accuracy, Some(92));

        // Same stars, higher score
        assert!(store.save_stage_result("1-1", 2, 1600, 90));
        // More stars
        assert!(store.save_stage_result("1-1", 3, 100, 100));
        assert_eq!(store.stage_result("1-1").unwrap().stars, 3);
    }

    #[test]
    fn test_unlocking() {
        let mut store = store();
        assert!(store.is_stage_unlocked(1, 1));
        assert!(!store.is_stage_unlocked(1, 2));
        assert!(!store.is_stage_unlocked(1, 0));

        store.save_stage_result("1-1", 1, 100, 50);
        assert!(store.is_stage_unlocked(1, 2));
        assert!(!store.is_stage_unlocked(1, 3));

        // First stage of world 2 needs the last stage of world 1
        assert!(!store.is_stage_unlocked(2, 1));
        store.save_stage_result("1-33", 1, 100, 50);
        assert!(store.is_stage_unlocked(2, 1));
    }

    #[test]
    fn test_current_progress() {
        let mut store = store();
        assert_eq!(store.current_progress(), (1, 1));
        store.save_stage_result("1-1", 3, 100, 100);
        store.save_stage_result("1-2", 3, 100, 100);
        assert_eq!(store.current_progress(), (1, 3));
    }

    #[test]
    fn test_wrong_word_counts() {
        let mut store = store();
        store.record_wrong_word("perro", "개");
        store.record_wrong_word("perro", "개");
        store.record_wrong_word("gato", "고양이");

        let review = store.words_for_review(10);
        assert_eq!(review[0].spanish, "perro");
        assert_eq!(review[0].wrong_count, 2);
        assert_eq!(review.len(), 2);
        assert_eq!(store.words_for_review(1).len(), 1);

        store.record_correct_word("perro");
        assert_eq!(store.wrong_words().iter().find(|w| w.spanish == "perro").unwrap().wrong_count, 1);
        store.record_correct_word("perro");
        assert!(store.wrong_words().iter().all(|w| w.spanish != "perro"));

        // Unknown word is a no-op
        store.record_correct_word("casa");
        assert_eq!(store.wrong_words().len(), 1);
    }

    #[test]
    fn test_stats_use_injected_clock() {
        let day = Rc::new(Cell::new(1));
        let clock_day = day.clone();
        let mut store = store().with_clock(move || {
            Local
                .with_ymd_and_hms(2026, 5, clock_day.get(), 12, 0, 0)
                .unwrap()
        });

        store.update_stats(300, 18, 0);
        day.set(2);
        store.update_stats(0, 4, 3);
        let stats = store.stats();
        assert_eq!(stats.total_score, 300);
        assert_eq!(stats.total_games, 2);
        assert_eq!(stats.total_wrong, 3);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_failing_backend_degrades() {
        let mut backend = MemoryStore::new();
        backend.set_unavailable(true);
        let mut store = ProgressStore::new(backend);

        assert!(!store.save_stage_result("1-1", 3, 100, 100));
        store.record_wrong_word("perro", "개");
        store.update_stats(1, 1, 1);
        assert!(store.stage_result("1-1").is_none());
        assert!(store.wrong_words().is_empty());
        assert_eq!(store.stats(), PlayStats::default());
    }

    #[test]
    fn test_reads_camel_case_layout() {
        let mut backend = MemoryStore::new();
        backend
            .set(
                PROGRESS_KEY,
                r#"{"2-4":{"stars":2,"bestScore":1800,"clearedAt":"2025-11-02T10:00:00.000Z"}}"#,
            )
            .unwrap();
        backend
            .set(
                WRONG_WORDS_KEY,
                r#"[{"es":"mesa","ko":"탁자","wrongCount":3,"lastWrong":"2025-11-02T10:00:00.000Z"}]"#,
            )
            .unwrap();
        let store = ProgressStore::new(backend);

        let result = store.stage_result("2-4").unwrap();
        assert_eq!(result.best_score, 1800);
        assert_eq!(result.last_accuracy, None);
        assert_eq!(store.wrong_words()[0].wrong_count, 3);
    }

    #[test]
    fn test_init_and_clear_all() {
        let mut store = store();
        store.init();
        assert!(store.backend().get(PROGRESS_KEY).unwrap().is_some());

        store.save_stage_result("1-1", 3, 100, 100);
        store.record_wrong_word("perro", "개");
        store.clear_all();
        assert!(store.stage_result("1-1").is_none());
        assert!(store.wrong_words().is_empty());
        assert_eq!(store.backend().get(WRONG_WORDS_KEY).unwrap().as_deref(), Some("[]"));
    }
}
