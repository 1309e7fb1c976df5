//! Run and level records
//!
//! Everything that crosses a scene boundary or lands in storage lives here.
//! Wire names stay camelCase so persisted snapshots and leaderboard payloads
//! read the same from every front end.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_HEALTH;
use crate::settings::AccessibilitySettings;

/// The six gauntlet levels, in no particular order. Play order is
/// [`LEVEL_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelId {
    BurningMonk,
    Snap,
    PixelBoss,
    JinSakai,
    Ronin45,
    Godmode,
}

/// Gauntlet play order
pub const LEVEL_ORDER: [LevelId; 6] = [
    LevelId::BurningMonk,
    LevelId::Snap,
    LevelId::PixelBoss,
    LevelId::JinSakai,
    LevelId::Ronin45,
    LevelId::Godmode,
];

impl LevelId {
    /// Display label used on transition cards and the HUD
    pub fn label(self) -> &'static str {
        match self {
            LevelId::BurningMonk => "Level 1: The Burning Monk",
            LevelId::Snap => "Level 2: The Snap",
            LevelId::PixelBoss => "Level 3: Pixel Boss",
            LevelId::JinSakai => "Level 4: Jin Sakai",
            LevelId::Ronin45 => "Level 5: The 45 Ronin",
            LevelId::Godmode => "Level 6: GODMODE",
        }
    }

    /// Music track key handed to the audio director at scene entry
    pub fn music_key(self) -> &'static str {
        match self {
            LevelId::BurningMonk => "theme_burning_monk",
            LevelId::Snap => "theme_snap",
            LevelId::PixelBoss => "theme_pixel_boss",
            LevelId::JinSakai => "theme_jin_sakai",
            LevelId::Ronin45 => "theme_ronin",
            LevelId::Godmode => "theme_godmode",
        }
    }

    /// Par time for the time bonus. Finishing faster earns points.
    pub fn target_ms(self) -> u64 {
        match self {
            LevelId::BurningMonk => 20_000,
            LevelId::Snap => 45_000,
            LevelId::PixelBoss => 50_000,
            LevelId::JinSakai => 40_000,
            LevelId::Ronin45 => 55_000,
            LevelId::Godmode => 90_000,
        }
    }
}

/// Mutable record carried through one full gauntlet attempt.
///
/// Passed by value at every scene boundary; each level attempt owns a
/// private copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    /// Current HP in [0, MAX_HEALTH], reset to full at every level entry
    pub health: f32,
    /// Cumulative score, floored at zero
    pub score: f64,
    /// Restarts across the whole run
    pub deaths: u32,
    /// Level currently executing
    pub current_level: LevelId,
    /// Time spent in levels, accumulated across restarts. Excludes pauses.
    pub elapsed_ms: u64,
    /// Preference snapshot, immutable for the duration of a level
    pub accessibility: AccessibilitySettings,
}

impl RunState {
    /// Fresh run at the first level.
    pub fn new(accessibility: AccessibilitySettings) -> Self {
        Self {
            health: MAX_HEALTH,
            score: 0.0,
            deaths: 0,
            current_level: LEVEL_ORDER[0],
            elapsed_ms: 0,
            accessibility,
        }
    }
}

/// Immutable record of one completed level attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelResult {
    pub level: LevelId,
    pub success: bool,
    pub duration_ms: u64,
    pub damage_taken: f32,
    pub deaths_in_level: u32,
    pub score_delta: f64,
}

/// Everything needed to reconstruct a level attempt: the resume and
/// restart payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSnapshot {
    pub run_state: RunState,
    pub level_index: usize,
    pub deaths_in_level: u32,
    pub results: Vec<LevelResult>,
}

/// The currently active gameplay modifier set.
///
/// Written only by the mutation scheduler (plus the lifecycle's reset at
/// attempt boundaries); read by movement and the HUD every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationEffects {
    pub gravity_multiplier: f32,
    pub reverse_controls: bool,
    pub darkness_mask: bool,
    pub speed_multiplier: f32,
    pub active_label: &'static str,
}

impl Default for MutationEffects {
    fn default() -> Self {
        Self {
            gravity_multiplier: 1.0,
            reverse_controls: false,
            darkness_mask: false,
            speed_multiplier: 1.0,
            active_label: "None",
        }
    }
}

/// Phase of a single level attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhase {
    /// 3-2-1 countdown, gameplay suppressed
    Countdown,
    /// Live gameplay
    Active,
    /// Frozen, time excluded from the attempt clock
    Paused,
    /// Health hit zero, prompt showing
    Restarting,
    /// Objective met, attempt finished
    Complete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ids_use_wire_names() {
        let json = serde_json::to_string(&LevelId::BurningMonk).unwrap();
        assert_eq!(json, r#""burningMonk""#);
        let json = serde_json::to_string(&LevelId::Ronin45).unwrap();
        assert_eq!(json, r#""ronin45""#);

        let parsed: LevelId = serde_json::from_str(r#""jinSakai""#).unwrap();
        assert_eq!(parsed, LevelId::JinSakai);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let snapshot = LevelSnapshot {
            run_state: RunState::new(AccessibilitySettings::default()),
            level_index: 2,
            deaths_in_level: 1,
            results: Vec::new(),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""levelIndex":2"#));
        assert!(json.contains(r#""deathsInLevel":1"#));
        assert!(json.contains(r#""currentLevel":"burningMonk""#));
        assert!(json.contains(r#""elapsedMs":0"#));

        let back: LevelSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn neutral_effects_change_nothing() {
        let effects = MutationEffects::default();
        assert_eq!(effects.gravity_multiplier, 1.0);
        assert_eq!(effects.speed_multiplier, 1.0);
        assert!(!effects.reverse_controls);
        assert_eq!(effects.active_label, "None");
    }
}
