//! Player settings and preferences
//!
//! Persisted separately from progress under their own storage key.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, SETTINGS_KEY, read_json, write_json};
use crate::sim::GameMode;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Which language is shown and which is typed
    pub mode: GameMode,
    /// Sound effects
    pub sound_enabled: bool,
    /// Background music
    pub music_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::EsToKo,
            sound_enabled: true,
            music_enabled: false,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match read_json(store, SETTINGS_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings unreadable, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match write_json(store, SETTINGS_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::error!("Settings not saved: {}", e),
        }
    }

    /// Flip between the two typing directions
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.flipped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults_when_missing() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::default();
        settings.toggle_mode();
        settings.music_enabled = true;
        settings.save(&mut store);

        let loaded = Settings::load(&store);
        assert_eq!(loaded.mode, GameMode::KoToEs);
        assert!(loaded.music_enabled);
    }

    #[test]
    fn test_reads_camel_case_layout() {
        let mut store = MemoryStore::new();
        store
            .set(SETTINGS_KEY, r#"{"mode":"ko-to-es","soundEnabled":false}"#)
            .unwrap();
        let loaded = Settings::load(&store);
        assert_eq!(loaded.mode, GameMode::KoToEs);
        assert!(!loaded.sound_enabled);
        assert!(!loaded.music_enabled);
    }
}
