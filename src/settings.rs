//! Player preferences
//!
//! Persisted separately from run snapshots, one storage key per record.
//! Corrupt or missing data always degrades to defaults.

use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

/// Storage key for accessibility preferences
pub const ACCESSIBILITY_STORAGE_KEY: &str = "ascension_accessibility_v1";

/// Storage key for audio preferences
pub const AUDIO_STORAGE_KEY: &str = "ascension_audio_v1";

/// Accessibility preferences, snapshotted into the run at level entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessibilitySettings {
    /// Tone down damage flashes and screen strobes
    pub reduced_flash: bool,
    /// Disable camera shake and player wobble
    pub reduced_shake: bool,
}

/// Audio mix preferences. Volumes are clamped to [0, 1] on load and save.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master: f32,
    /// Music volume (0.0 - 1.0)
    pub music: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx: f32,
    /// Mute all output
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master: 0.8,
            music: 0.7,
            sfx: 1.0,
            muted: false,
        }
    }
}

impl AudioSettings {
    fn normalized(self) -> Self {
        Self {
            master: clamp01(self.master),
            music: clamp01(self.music),
            sfx: clamp01(self.sfx),
            muted: self.muted,
        }
    }
}

fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Load accessibility preferences, defaulting on missing or corrupt data.
pub fn load_accessibility_settings(store: &dyn KeyValueStore) -> AccessibilitySettings {
    let Some(raw) = store.get(ACCESSIBILITY_STORAGE_KEY) else {
        return AccessibilitySettings::default();
    };

    serde_json::from_str(&raw).unwrap_or_else(|err| {
        log::warn!("corrupt accessibility settings, using defaults: {err}");
        AccessibilitySettings::default()
    })
}

/// Save accessibility preferences. Best-effort, failures are logged.
pub fn save_accessibility_settings(store: &mut dyn KeyValueStore, settings: AccessibilitySettings) {
    match serde_json::to_string(&settings) {
        Ok(json) => {
            if let Err(err) = store.set(ACCESSIBILITY_STORAGE_KEY, &json) {
                log::warn!("failed to save accessibility settings: {err}");
            }
        }
        Err(err) => log::warn!("failed to encode accessibility settings: {err}"),
    }
}

/// Load audio preferences, defaulting on missing or corrupt data.
pub fn load_audio_settings(store: &dyn KeyValueStore) -> AudioSettings {
    let Some(raw) = store.get(AUDIO_STORAGE_KEY) else {
        return AudioSettings::default();
    };

    match serde_json::from_str::<AudioSettings>(&raw) {
        Ok(settings) => settings.normalized(),
        Err(err) => {
            log::warn!("corrupt audio settings, using defaults: {err}");
            AudioSettings::default()
        }
    }
}

/// Save audio preferences, returning the normalized record that was written.
pub fn save_audio_settings(store: &mut dyn KeyValueStore, settings: AudioSettings) -> AudioSettings {
    let normalized = settings.normalized();
    match serde_json::to_string(&normalized) {
        Ok(json) => {
            if let Err(err) = store.set(AUDIO_STORAGE_KEY, &json) {
                log::warn!("failed to save audio settings: {err}");
            }
        }
        Err(err) => log::warn!("failed to encode audio settings: {err}"),
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn missing_keys_yield_defaults() {
        let store = MemoryStore::new();
        assert_eq!(
            load_accessibility_settings(&store),
            AccessibilitySettings::default()
        );
        assert_eq!(load_audio_settings(&store), AudioSettings::default());
    }

    #[test]
    fn corrupt_json_yields_defaults() {
        let mut store = MemoryStore::new();
        store.set(ACCESSIBILITY_STORAGE_KEY, "{not json").unwrap();
        store.set(AUDIO_STORAGE_KEY, "[]").unwrap();

        assert_eq!(
            load_accessibility_settings(&store),
            AccessibilitySettings::default()
        );
        assert_eq!(load_audio_settings(&store), AudioSettings::default());
    }

    #[test]
    fn partial_records_fill_missing_fields() {
        let mut store = MemoryStore::new();
        store
            .set(ACCESSIBILITY_STORAGE_KEY, r#"{"reducedFlash":true}"#)
            .unwrap();

        let settings = load_accessibility_settings(&store);
        assert!(settings.reduced_flash);
        assert!(!settings.reduced_shake);
    }

    #[test]
    fn audio_settings_round_trip_clamped() {
        let mut store = MemoryStore::new();
        let saved = save_audio_settings(
            &mut store,
            AudioSettings {
                master: 2.5,
                music: -0.4,
                sfx: 0.5,
                muted: true,
            },
        );

        assert_eq!(saved.master, 1.0);
        assert_eq!(saved.music, 0.0);
        assert_eq!(saved.sfx, 0.5);
        assert!(saved.muted);

        assert_eq!(load_audio_settings(&store), saved);
    }
}
