//! Weighted word pools
//!
//! Weight is expressed by duplication: a word that should come up three
//! times as often appears three times, and the sampler picks uniformly.
//! Previously missed words get extra copies in their own stage and also
//! leak into unrelated stages so they keep resurfacing.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{StageWord, WordCatalog};
use crate::consts::{MAX_CROSS_STAGE_COPIES, MIN_CROSS_STAGE_COPIES};
use crate::persistence::{ProgressStore, WrongWordRecord};
use crate::tuning::{BossRecall, Tuning};

/// One sampling slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolEntry {
    #[serde(rename = "es")]
    pub spanish: String,
    #[serde(rename = "ko")]
    pub korean: String,
    /// Added because the player missed this word before
    pub is_review: bool,
}

impl PoolEntry {
    pub fn new(spanish: impl Into<String>, korean: impl Into<String>, is_review: bool) -> Self {
        Self {
            spanish: spanish.into(),
            korean: korean.into(),
            is_review,
        }
    }

    fn from_word(word: &StageWord, is_review: bool) -> Self {
        Self::new(word.spanish.clone(), word.korean.clone(), is_review)
    }
}

fn push_copies(pool: &mut Vec<PoolEntry>, entry: PoolEntry, copies: u32) {
    pool.extend(std::iter::repeat_n(entry, copies as usize));
}

pub struct WordPoolBuilder<'a> {
    catalog: &'a WordCatalog,
    store: &'a ProgressStore,
    tuning: &'a Tuning,
}

impl<'a> WordPoolBuilder<'a> {
    pub fn new(catalog: &'a WordCatalog, store: &'a ProgressStore, tuning: &'a Tuning) -> Self {
        Self {
            catalog,
            store,
            tuning,
        }
    }

    /// Extra review copies for a word of the stage being played
    fn stage_boost(&self, wrong_count: u32) -> u32 {
        wrong_count
            .saturating_mul(self.tuning.wrong_word_frequency_boost)
            .min(self.tuning.max_stage_word_boost)
    }

    /// Base copy of each word plus boost copies for the ones missed before
    fn weighted(&self, words: &[StageWord], wrong: &[WrongWordRecord]) -> Vec<PoolEntry> {
        let mut pool: Vec<PoolEntry> = words.iter().map(|w| PoolEntry::from_word(w, false)).collect();
        for word in words {
            if let Some(record) = wrong.iter().find(|r| r.spanish == word.spanish) {
                push_copies(
                    &mut pool,
                    PoolEntry::from_word(word, true),
                    self.stage_boost(record.wrong_count),
                );
            }
        }
        pool
    }

    /// Normal stage pool with missed words boosted and carried over
    pub fn create_word_pool(&self, world_id: u32, stage_num: u32) -> Vec<PoolEntry> {
        let stage_words = self.catalog.stage_words(world_id, stage_num);
        let wrong = self.store.wrong_words();
        let mut pool = self.weighted(stage_words, &wrong);

        let in_stage: HashSet<&str> = stage_words.iter().map(|w| w.spanish.as_str()).collect();
        for record in wrong.iter().filter(|r| !in_stage.contains(r.spanish.as_str())) {
            let copies = record
                .wrong_count
                .clamp(MIN_CROSS_STAGE_COPIES, MAX_CROSS_STAGE_COPIES);
            push_copies(
                &mut pool,
                PoolEntry::new(record.spanish.clone(), record.korean.clone(), true),
                copies,
            );
        }
        pool
    }

    /// Pool of the most-missed words; empty when there are too few
    pub fn create_review_pool(&self) -> Vec<PoolEntry> {
        let review = self.store.words_for_review(self.tuning.review_pool_size);
        if review.len() < self.tuning.min_wrong_for_review {
            log::info!(
                "Review pool: {} missed words, need {}",
                review.len(),
                self.tuning.min_wrong_for_review
            );
            return Vec::new();
        }

        let mut pool = Vec::new();
        for record in review {
            let copies = record.wrong_count.saturating_add(1);
            push_copies(
                &mut pool,
                PoolEntry::new(record.spanish, record.korean, true),
                copies,
            );
        }
        pool
    }

    /// Words from the stages a boss recalls, plus its own
    pub fn create_boss_pool(&self, world_id: u32, stage_num: u32) -> Vec<PoolEntry> {
        let stages = recall_stages(
            self.catalog.schedule().boss_interval,
            self.tuning.boss_recall,
            stage_num,
        );

        let mut seen = HashSet::new();
        let words: Vec<StageWord> = stages
            .chain(std::iter::once(stage_num))
            .filter_map(|s| self.catalog.stage_data(world_id, s))
            .flat_map(|stage| stage.words.iter())
            .filter(|w| seen.insert(w.spanish.clone()))
            .cloned()
            .collect();

        self.weighted(&words, &self.store.wrong_words())
    }
}

/// Stage numbers recalled by a boss at `stage_num`, not including itself
pub fn recall_stages(boss_interval: u32, policy: BossRecall, stage_num: u32) -> RangeInclusive<u32> {
    let last = stage_num.saturating_sub(1);
    let first = match policy {
        BossRecall::World => 1,
        BossRecall::Episode if boss_interval == 0 => 1,
        BossRecall::Episode => (last / boss_interval) * boss_interval + 1,
    };
    first..=last
}

/// Uniform pick among entries whose Spanish word is not excluded
pub fn pick_random_word<'p, R: Rng + ?Sized>(
    pool: &'p [PoolEntry],
    exclude: &[&str],
    rng: &mut R,
) -> Option<&'p PoolEntry> {
    let available = || pool.iter().filter(|e| !exclude.contains(&e.spanish.as_str()));
    let count = available().count();
    if count == 0 {
        return None;
    }
    available().nth(rng.random_range(0..count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const WORLD_JSON: &str = r#"{ "stages": [
        { "words": [ {"es": "perro", "ko": "개"}, {"es": "gato", "ko": "고양이"} ] },
        { "words": [ {"es": "casa", "ko": "집"}, {"es": "perro", "ko": "개"} ] },
        { "words": [ {"es": "mesa", "ko": "탁자"} ] }
    ] }"#;

    fn catalog(boss_interval: u32) -> WordCatalog {
        let mut catalog = WordCatalog::with_schedule(crate::catalog::StageSchedule {
            review_interval: 5,
            boss_interval,
        });
        catalog.load_world_json(1, WORLD_JSON).unwrap();
        catalog
    }

    fn count(pool: &[PoolEntry], es: &str, review: bool) -> usize {
        pool.iter().filter(|e| e.spanish == es && e.is_review == review).count()
    }

    #[test]
    fn test_word_pool_boosts_missed_stage_word() {
        let catalog = catalog(11);
        let mut store = ProgressStore::new(MemoryStore::new());
        for _ in 0..4 {
            store.record_wrong_word("perro", "개");
        }
        let tuning = Tuning::default();
        let pool = WordPoolBuilder::new(&catalog, &store, &tuning).create_word_pool(1, 1);

        // min(4 * 2, 10) = 8 extra copies on top of the base copy
        assert_eq!(count(&pool, "perro", false), 1);
        assert_eq!(count(&pool, "perro", true), 8);
        assert_eq!(count(&pool, "gato", false), 1);
        assert_eq!(pool.len(), 10);
    }

    #[test]
    fn test_word_pool_boost_is_capped() {
        let catalog = catalog(11);
        let mut store = ProgressStore::new(MemoryStore::new());
        for _ in 0..7 {
            store.record_wrong_word("gato", "고양이");
        }
        let tuning = Tuning::default();
        let pool = WordPoolBuilder::new(&catalog, &store, &tuning).create_word_pool(1, 1);
        assert_eq!(count(&pool, "gato", true), 10);
    }

    #[test]
    fn test_word_pool_folds_in_other_stages() {
        let catalog = catalog(11);
        let mut store = ProgressStore::new(MemoryStore::new());
        store.record_wrong_word("mesa", "탁자");
        for _ in 0..5 {
            store.record_wrong_word("casa", "집");
        }
        let tuning = Tuning::default();
        let pool = WordPoolBuilder::new(&catalog, &store, &tuning).create_word_pool(1, 1);

        assert_eq!(count(&pool, "mesa", true), 1);
        assert_eq!(count(&pool, "casa", true), 3);
        assert_eq!(count(&pool, "casa", false), 0);
    }

    #[test]
    fn test_word_pool_for_missing_stage_is_only_carryover() {
        let catalog = catalog(11);
        let store = ProgressStore::new(MemoryStore::new());
        let tuning = Tuning::default();
        let pool = WordPoolBuilder::new(&catalog, &store, &tuning).create_word_pool(7, 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_review_pool_needs_enough_words() {
        let catalog = catalog(11);
        let mut store = ProgressStore::new(MemoryStore::new());
        let tuning = Tuning::default();
        for w in ["a", "b", "c", "d"] {
            store.record_wrong_word(w, w);
        }
        assert!(WordPoolBuilder::new(&catalog, &store, &tuning).create_review_pool().is_empty());

        store.record_wrong_word("e", "e");
        store.record_wrong_word("e", "e");
        let pool = WordPoolBuilder::new(&catalog, &store, &tuning).create_review_pool();
        // Four words once-missed (2 copies each) and one twice-missed (3 copies)
        assert_eq!(pool.len(), 4 * 2 + 3);
        assert!(pool.iter().all(|e| e.is_review));
    }

    #[test]
    fn test_review_pool_takes_top_words() {
        let catalog = catalog(11);
        let mut store = ProgressStore::new(MemoryStore::new());
        let tuning = Tuning {
            review_pool_size: 2,
            min_wrong_for_review: 2,
            ..Tuning::default()
        };
        store.record_wrong_word("x", "x");
        for _ in 0..3 {
            store.record_wrong_word("y", "y");
        }
        store.record_wrong_word("z", "z");
        store.record_wrong_word("z", "z");
        let pool = WordPoolBuilder::new(&catalog, &store, &tuning).create_review_pool();
        assert_eq!(count(&pool, "y", true), 4);
        assert_eq!(count(&pool, "z", true), 3);
        assert_eq!(count(&pool, "x", true), 0);
    }

    #[test]
    fn test_boss_pool_recalls_episode() {
        let catalog = catalog(3);
        let store = ProgressStore::new(MemoryStore::new());
        let tuning = Tuning::default();
        let pool = WordPoolBuilder::new(&catalog, &store, &tuning).create_boss_pool(1, 3);

        // Stages 1..=2 plus the boss stage itself, "perro" only once
        let mut names: Vec<&str> = pool.iter().map(|e| e.spanish.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["casa", "gato", "mesa", "perro"]);
    }

    #[test]
    fn test_recall_stages() {
        assert_eq!(recall_stages(11, BossRecall::Episode, 11), 1..=10);
        assert_eq!(recall_stages(11, BossRecall::Episode, 22), 12..=21);
        assert_eq!(recall_stages(11, BossRecall::World, 22), 1..=21);
        assert!(recall_stages(11, BossRecall::Episode, 1).is_empty());
    }

    #[test]
    fn test_pick_random_word_respects_exclusions() {
        let pool = vec![
            PoolEntry::new("perro", "개", false),
            PoolEntry::new("gato", "고양이", false),
            PoolEntry::new("perro", "개", true),
        ];
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            let picked = pick_random_word(&pool, &["perro"], &mut rng).unwrap();
            assert_eq!(picked.spanish, "gato");
        }
        assert!(pick_random_word(&pool, &["perro", "gato"], &mut rng).is_none());
        assert!(pick_random_word(&[], &[], &mut rng).is_none());
    }
}
