//! Word catalog
//!
//! One JSON resource per world, shaped
//! `{ "stages": [ { "category": "...", "words": [ {"es": "...", "ko": "..."} ] } ] }`
//! and indexed by `stage_num - 1`. Worlds that fail to load are simply
//! absent; lookups against them return empty results.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::consts::{BOSS_STAGE_INTERVAL, REVIEW_STAGE_INTERVAL};
use crate::error::CatalogError;
use crate::worlds;

/// A Spanish word and its Korean meaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageWord {
    #[serde(rename = "es")]
    pub spanish: String,
    #[serde(rename = "ko")]
    pub korean: String,
}

impl StageWord {
    pub fn new(spanish: impl Into<String>, korean: impl Into<String>) -> Self {
        Self {
            spanish: spanish.into(),
            korean: korean.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageData {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub words: Vec<StageWord>,
}

#[derive(Debug, Deserialize)]
struct WorldFile {
    stages: Vec<StageData>,
}

/// What kind of session a stage number starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StageKind {
    Normal,
    Review,
    Boss,
}

/// Which stage numbers are review and boss stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSchedule {
    /// Every Nth stage replays the most-missed words (0 disables)
    pub review_interval: u32,
    /// Every Nth stage recalls the preceding episode (0 disables)
    pub boss_interval: u32,
}

impl Default for StageSchedule {
    fn default() -> Self {
        Self {
            review_interval: REVIEW_STAGE_INTERVAL,
            boss_interval: BOSS_STAGE_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WordCatalog {
    worlds: BTreeMap<u32, Vec<StageData>>,
    schedule: StageSchedule,
}

impl WordCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(schedule: StageSchedule) -> Self {
        Self {
            worlds: BTreeMap::new(),
            schedule,
        }
    }

    pub fn schedule(&self) -> StageSchedule {
        self.schedule
    }

    /// Parse and register one world's word file. Returns its stage count.
    pub fn load_world_json(&mut self, world_id: u32, json: &str) -> Result<usize, CatalogError> {
        let file: WorldFile =
            serde_json::from_str(json).map_err(|source| CatalogError::Parse { world_id, source })?;
        let stages = file.stages.len();
        self.worlds.insert(world_id, file.stages);
        Ok(stages)
    }

    /// Register the outcome of fetching every world's word file
    ///
    /// Failed worlds are logged and skipped. Only fails when no world at
    /// all is usable. Returns the number of worlds loaded by this call.
    pub fn load_all<I, E>(&mut self, sources: I) -> Result<usize, CatalogError>
    where
        I: IntoIterator<Item = (u32, Result<String, E>)>,
        E: Display,
    {
        let mut loaded = 0;
        let mut attempted = 0;
        for (world_id, fetched) in sources {
            attempted += 1;
            let result = fetched
                .map_err(|e| CatalogError::Fetch {
                    world_id,
                    reason: e.to_string(),
                })
                .and_then(|json| self.load_world_json(world_id, &json));
            match result {
                Ok(_) => loaded += 1,
                Err(e) => log::warn!("WordCatalog: {}", e),
            }
        }

        if self.worlds.is_empty() {
            log::error!("WordCatalog: no world data loaded");
            return Err(CatalogError::NoWorldsLoaded);
        }

        log::info!("WordCatalog: {}/{} worlds loaded", loaded, attempted);
        Ok(loaded)
    }

    /// Load `world{N}.json` for every configured world from a directory
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_dir(&mut self, dir: &std::path::Path) -> Result<usize, CatalogError> {
        let sources = worlds::WORLDS.iter().map(|w| {
            let path = dir.join(format!("world{}.json", w.id));
            let text = std::fs::read_to_string(&path)
                .map_err(|source| CatalogError::Io { path, source });
            (w.id, text)
        });
        self.load_all(sources)
    }

    pub fn is_loaded(&self) -> bool {
        !self.worlds.is_empty()
    }

    pub fn loaded_worlds(&self) -> impl Iterator<Item = u32> + '_ {
        self.worlds.keys().copied()
    }

    pub fn stage_data(&self, world_id: u32, stage_num: u32) -> Option<&StageData> {
        let index = stage_num.checked_sub(1)? as usize;
        self.worlds.get(&world_id)?.get(index)
    }

    /// Words for a stage; empty when the world or stage is absent
    pub fn stage_words(&self, world_id: u32, stage_num: u32) -> &[StageWord] {
        match self.stage_data(world_id, stage_num) {
            Some(stage) => &stage.words,
            None => {
                log::warn!("WordCatalog: no data for stage {}-{}", world_id, stage_num);
                &[]
            }
        }
    }

    /// Category label, falling back to "{world name} {stage}"
    pub fn stage_category(&self, world_id: u32, stage_num: u32) -> String {
        let category = self
            .stage_data(world_id, stage_num)
            .and_then(|stage| stage.category.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty());

        match (category, worlds::world_config(world_id)) {
            (Some(category), _) => category.to_string(),
            (None, Some(world)) => format!("{} {}", world.name_ko, stage_num),
            (None, None) => format!("스테이지 {}", stage_num),
        }
    }

    /// Boss takes precedence over review when both intervals hit
    pub fn stage_kind(&self, world_id: u32, stage_num: u32) -> StageKind {
        if stage_num == 0 || worlds::world_config(world_id).is_none() {
            return StageKind::Normal;
        }
        let hits = |interval: u32| interval > 0 && stage_num % interval == 0;
        if hits(self.schedule.boss_interval) {
            StageKind::Boss
        } else if hits(self.schedule.review_interval) {
            StageKind::Review
        } else {
            StageKind::Normal
        }
    }

    pub fn is_boss_stage(&self, world_id: u32, stage_num: u32) -> bool {
        self.stage_kind(world_id, stage_num) == StageKind::Boss
    }

    pub fn is_review_stage(&self, world_id: u32, stage_num: u32) -> bool {
        self.stage_kind(world_id, stage_num) == StageKind::Review
    }

    pub fn total_word_count(&self) -> usize {
        self.worlds
            .values()
            .flat_map(|stages| stages.iter())
            .map(|stage| stage.words.len())
            .sum()
    }

    /// Every word in a world with its 1-based stage number
    pub fn all_world_words(&self, world_id: u32) -> Vec<(u32, &StageWord)> {
        let Some(stages) = self.worlds.get(&world_id) else {
            return Vec::new();
        };
        stages
            .iter()
            .enumerate()
            .flat_map(|(i, stage)| stage.words.iter().map(move |w| (i as u32 + 1, w)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD_JSON: &str = r#"{
        "stages": [
            { "category": "  인사  ", "words": [ {"es": "hola", "ko": "안녕"}, {"es": "adiós", "ko": "잘 가"} ] },
            { "words": [ {"es": "uno", "ko": "하나"} ] },
            { "category": "   ", "words": [] }
        ]
    }"#;

    fn catalog() -> WordCatalog {
        let mut catalog = WordCatalog::new();
        catalog.load_world_json(1, WORLD_JSON).unwrap();
        catalog
    }

    #[test]
    fn test_stage_words() {
        let catalog = catalog();
        assert_eq!(catalog.stage_words(1, 1).len(), 2);
        assert_eq!(catalog.stage_words(1, 2)[0], StageWord::new("uno", "하나"));
        assert!(catalog.stage_words(1, 4).is_empty());
        assert!(catalog.stage_words(1, 0).is_empty());
        assert!(catalog.stage_words(2, 1).is_empty());
    }

    #[test]
    fn test_stage_category_fallbacks() {
        let catalog = catalog();
        assert_eq!(catalog.stage_category(1, 1), "인사");
        assert_eq!(catalog.stage_category(1, 2), "생존·기초기능어 2");
        assert_eq!(catalog.stage_category(1, 3), "생존·기초기능어 3");
        assert_eq!(catalog.stage_category(42, 7), "스테이지 7");
    }

    #[test]
    fn test_stage_kinds() {
        let catalog = WordCatalog::with_schedule(StageSchedule {
            review_interval: 5,
            boss_interval: 11,
        });
        assert_eq!(catalog.stage_kind(1, 1), StageKind::Normal);
        assert!(catalog.is_review_stage(1, 5));
        assert!(catalog.is_review_stage(1, 10));
        assert!(catalog.is_boss_stage(1, 11));
        assert!(catalog.is_boss_stage(1, 22));
        // 55 hits both intervals; boss wins
        assert!(catalog.is_boss_stage(1, 55));
        assert!(!catalog.is_review_stage(1, 55));
        assert!(!catalog.is_boss_stage(99, 11));
    }

    #[test]
    fn test_load_all_tolerates_partial_failure() {
        let mut catalog = WordCatalog::new();
        let sources = vec![
            (1, Ok(WORLD_JSON.to_string())),
            (2, Err("404 Not Found".to_string())),
            (3, Ok("{ not json".to_string())),
        ];
        assert_eq!(catalog.load_all(sources).unwrap(), 1);
        assert!(catalog.is_loaded());
        assert_eq!(catalog.loaded_worlds().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_load_all_fails_when_nothing_loads() {
        let mut catalog = WordCatalog::new();
        let sources: Vec<(u32, Result<String, String>)> = vec![(1, Err("offline".into()))];
        assert!(matches!(
            catalog.load_all(sources),
            Err(CatalogError::NoWorldsLoaded)
        ));
        assert!(!catalog.is_loaded());
    }

    #[test]
    fn test_word_counts() {
        let catalog = catalog();
        assert_eq!(catalog.total_word_count(), 3);
        let words = catalog.all_world_words(1);
        assert_eq!(words.len(), 3);
        assert_eq!(words[2].0, 2);
        assert!(catalog.all_world_words(5).is_empty());
    }
}
