//! Game settings and preferences
//!
//! Persisted separately from the leaderboard under their own storage key.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_TRACK_WIDTH, PLAYER_WIDTH};
use crate::persistence::{Storage, load_json, save_json};
use crate::sim::Difficulty;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tier used for new sessions
    pub difficulty: Difficulty,

    // === Audio ===
    /// Background melody
    pub music_enabled: bool,
    /// Collision / level-up / shield cues
    pub sfx_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    // === Layout ===
    /// Play-field width in pixels (obstacle sizes follow it)
    pub track_width: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            music_enabled: true,
            sfx_enabled: true,
            master_volume: 0.8,
            track_width: DEFAULT_TRACK_WIDTH,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "candy_dodge_settings";

    /// Settings with a given starting tier
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Same settings on a play field of the measured width. Unusable
    /// measurements fall back to the default width.
    pub fn with_track_width(mut self, width: f32) -> Self {
        self.track_width = width;
        self.sanitized()
    }

    /// Pull out-of-range values back into range
    pub fn sanitized(mut self) -> Self {
        self.master_volume = if self.master_volume.is_finite() {
            self.master_volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        if !self.track_width.is_finite() || self.track_width < PLAYER_WIDTH {
            self.track_width = DEFAULT_TRACK_WIDTH;
        }
        self
    }

    /// Effective cue volume (0 when sfx are off)
    pub fn sfx_volume(&self) -> f32 {
        if self.sfx_enabled {
            self.master_volume
        } else {
            0.0
        }
    }

    /// Effective music volume (0 when music is off)
    pub fn music_volume(&self) -> f32 {
        if self.music_enabled {
            self.master_volume
        } else {
            0.0
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(storage: &dyn Storage) -> Self {
        match load_json::<Settings>(storage, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings.sanitized()
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Using default settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged
    pub fn save(&self, storage: &mut dyn Storage) {
        match save_json(storage, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Settings not saved: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStorage, NullStorage};

    #[test]
    fn test_round_trip() {
        let mut storage = MemoryStorage::new();
        let mut settings = Settings::with_difficulty(Difficulty::Insane);
        settings.music_enabled = false;
        settings.save(&mut storage);
        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(Settings::STORAGE_KEY, r#"{"difficulty":"hard"}"#)
            .unwrap();
        let settings = Settings::load(&storage);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert!(settings.sfx_enabled);
        assert_eq!(settings.track_width, DEFAULT_TRACK_WIDTH);
    }

    #[test]
    fn test_bad_values_sanitized() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                Settings::STORAGE_KEY,
                r#"{"master_volume":3.0,"track_width":10.0}"#,
            )
            .unwrap();
        let settings = Settings::load(&storage);
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.track_width, DEFAULT_TRACK_WIDTH);
    }

    #[test]
    fn test_unavailable_storage_gives_defaults() {
        assert_eq!(Settings::load(&NullStorage), Settings::default());
        let mut storage = MemoryStorage::new();
        storage.set_item(Settings::STORAGE_KEY, "nope").unwrap();
        assert_eq!(Settings::load(&storage), Settings::default());
    }

    #[test]
    fn test_measured_track_width() {
        let settings = Settings::default().with_track_width(560.0);
        assert_eq!(settings.track_width, 560.0);
        // Hidden element reports 0
        let settings = settings.with_track_width(0.0);
        assert_eq!(settings.track_width, DEFAULT_TRACK_WIDTH);
        let settings = settings.with_track_width(f32::NAN);
        assert_eq!(settings.track_width, DEFAULT_TRACK_WIDTH);
    }

    #[test]
    fn test_effective_volumes() {
        let mut settings = Settings::default();
        assert_eq!(settings.sfx_volume(), 0.8);
        settings.sfx_enabled = false;
        assert_eq!(settings.sfx_volume(), 0.0);
        assert_eq!(settings.music_volume(), 0.8);
    }
}
