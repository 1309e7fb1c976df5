//! Music and sound mix coordination
//!
//! Owns the single cross-scene "now playing" handle. Playback itself lives
//! in the front end; the director only decides which track should be live
//! and at what effective volume.

use crate::settings::AudioSettings;

/// Tracks the current music handle and computes effective volumes.
#[derive(Debug, Default)]
pub struct AudioDirector {
    settings: AudioSettings,
    now_playing: Option<String>,
}

impl AudioDirector {
    pub fn new(settings: AudioSettings) -> Self {
        Self {
            settings,
            now_playing: None,
        }
    }

    /// Re-apply mix settings to whatever track is live.
    pub fn apply_settings(&mut self, settings: AudioSettings) {
        self.settings = settings;
    }

    /// Switch the live music track.
    ///
    /// Requesting the track that is already playing only refreshes the mix,
    /// so level restarts never cause an audible cut.
    pub fn play_music(&mut self, key: &str) -> bool {
        if self.now_playing.as_deref() == Some(key) {
            return false;
        }

        log::info!("music: {key}");
        self.now_playing = Some(key.to_owned());
        true
    }

    pub fn stop_music(&mut self) {
        self.now_playing = None;
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    /// Effective music volume (master x music, zero when muted).
    pub fn music_volume(&self) -> f32 {
        if self.settings.muted {
            return 0.0;
        }
        self.settings.master.clamp(0.0, 1.0) * self.settings.music.clamp(0.0, 1.0)
    }

    /// Effective volume for one sound effect at the given per-cue scale.
    pub fn sfx_volume(&self, scale: f32) -> f32 {
        if self.settings.muted {
            return 0.0;
        }
        self.settings.master.clamp(0.0, 1.0)
            * self.settings.sfx.clamp(0.0, 1.0)
            * scale.clamp(0.0, 1.0)
    }
}
