//! Run orchestration
//!
//! The gauntlet sequences the six levels, carrying the run state forward
//! between them. Everything crossing the scene boundary travels as a
//! [`ScenePayload`], switched on exhaustively here; the orchestrator decides
//! whether a payload means "enter a level" or "the run is over" and keeps
//! the music in step with the scene.

use serde::{Deserialize, Serialize};

use crate::audio::AudioDirector;
use crate::consts::MAX_HEALTH;
use crate::level::{LEVEL_ORDER, LevelOutcome, LevelResult, LevelSnapshot, RunState};
use crate::settings::{AccessibilitySettings, load_accessibility_settings};
use crate::storage::KeyValueStore;

/// Scene transition payload, the only cross-component wire format. Plain
/// data, JSON-serializable, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScenePayload {
    /// Start a fresh run at the first level.
    #[serde(rename = "newRun", rename_all = "camelCase")]
    NewRun {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accessibility: Option<AccessibilitySettings>,
    },
    /// Pick a persisted run back up at the level it was attempting.
    #[serde(rename = "resumeRun", rename_all = "camelCase")]
    ResumeRun {
        run_state: RunState,
        level_index: usize,
        deaths_in_level: u32,
        results: Vec<LevelResult>,
    },
    /// A level's objective was met.
    #[serde(rename = "levelComplete", rename_all = "camelCase")]
    LevelComplete {
        run_state: RunState,
        level_index: usize,
        result: LevelResult,
        results: Vec<LevelResult>,
    },
    /// Health hit zero and the player chose to retry.
    #[serde(rename = "levelFailed", rename_all = "camelCase")]
    LevelFailed {
        run_state: RunState,
        level_index: usize,
        deaths_in_level: u32,
        results: Vec<LevelResult>,
    },
}

/// Translate a level outcome into the next gauntlet payload.
///
/// Abandonment has no gauntlet payload: the driver goes straight to the
/// results flow with the outcome's run state, so this returns `None`.
pub fn outcome_payload(outcome: LevelOutcome) -> Option<ScenePayload> {
    match outcome {
        LevelOutcome::Retry(snapshot) => Some(ScenePayload::LevelFailed {
            run_state: snapshot.run_state,
            level_index: snapshot.level_index,
            deaths_in_level: snapshot.deaths_in_level,
            results: snapshot.results,
        }),
        LevelOutcome::Completed {
            run_state,
            level_index,
            result,
            results,
        } => Some(ScenePayload::LevelComplete {
            run_state,
            level_index,
            result,
            results,
        }),
        LevelOutcome::Abandoned { .. } => None,
    }
}

/// What the driver should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum GauntletAction {
    /// Enter the level described by the snapshot.
    StartLevel(LevelSnapshot),
    /// All six levels cleared; hand the run to the results flow.
    RunComplete {
        run_state: RunState,
        results: Vec<LevelResult>,
    },
}

/// Sequences levels and carries the run between them.
pub struct GauntletOrchestrator {
    audio: AudioDirector,
}

impl GauntletOrchestrator {
    pub fn new(audio: AudioDirector) -> Self {
        Self { audio }
    }

    pub fn audio(&self) -> &AudioDirector {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioDirector {
        &mut self.audio
    }

    /// Resolve one scene transition.
    pub fn handle(&mut self, payload: ScenePayload, store: &dyn KeyValueStore) -> GauntletAction {
        match payload {
            ScenePayload::NewRun { accessibility } => {
                let accessibility =
                    accessibility.unwrap_or_else(|| load_accessibility_settings(store));
                let run_state = RunState::new(accessibility);
                self.start_level(0, run_state, Vec::new(), 0)
            }
            ScenePayload::ResumeRun {
                run_state,
                level_index,
                deaths_in_level,
                results,
            } => self.start_level(
                clamp_level_index(level_index),
                run_state,
                results,
                deaths_in_level,
            ),
            ScenePayload::LevelComplete {
                run_state,
                level_index,
                result,
                mut results,
            } => {
                results.push(result);
                let next_index = level_index + 1;
                if next_index >= LEVEL_ORDER.len() {
                    let _ = self.audio.play_music("theme_results");
                    log::info!(
                        "gauntlet complete: score {:.0}, {} deaths, {}s",
                        run_state.score,
                        run_state.deaths,
                        run_state.elapsed_ms / 1_000,
                    );
                    return GauntletAction::RunComplete { run_state, results };
                }
                self.start_level(next_index, run_state, results, 0)
            }
            ScenePayload::LevelFailed {
                run_state,
                level_index,
                deaths_in_level,
                results,
            } => self.start_level(
                clamp_level_index(level_index),
                run_state,
                results,
                deaths_in_level,
            ),
        }
    }

    fn start_level(
        &mut self,
        level_index: usize,
        mut run_state: RunState,
        results: Vec<LevelResult>,
        deaths_in_level: u32,
    ) -> GauntletAction {
        let level = LEVEL_ORDER[level_index];
        run_state.current_level = level;
        run_state.health = MAX_HEALTH;
        let _ = self.audio.play_music(level.music_key());

        GauntletAction::StartLevel(LevelSnapshot {
            run_state,
            level_index,
            deaths_in_level,
            results,
        })
    }
}

/// A snapshot from a newer build (or a corrupted one) may point past the
/// last level; degrade to the final level rather than indexing out.
fn clamp_level_index(level_index: usize) -> usize {
    if level_index >= LEVEL_ORDER.len() {
        log::warn!("snapshot level index {level_index} out of range, clamping");
        return LEVEL_ORDER.len() - 1;
    }
    level_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelId;
    use crate::settings::{AudioSettings, save_accessibility_settings};
    use crate::storage::MemoryStore;

    fn orchestrator() -> GauntletOrchestrator {
        GauntletOrchestrator::new(AudioDirector::new(AudioSettings::default()))
    }

    fn result_for(level: LevelId) -> LevelResult {
        LevelResult {
            level,
            success: true,
            duration_ms: 20_000,
            damage_taken: 5.0,
            deaths_in_level: 0,
            score_delta: 1_000.0,
        }
    }

    #[test]
    fn new_run_starts_the_first_level_at_full_health() {
        let store = MemoryStore::new();
        let mut gauntlet = orchestrator();

        let action = gauntlet.handle(ScenePayload::NewRun { accessibility: None }, &store);
        let GauntletAction::StartLevel(snapshot) = action else {
            panic!("expected a level start");
        };

        assert_eq!(snapshot.level_index, 0);
        assert_eq!(snapshot.deaths_in_level, 0);
        assert_eq!(snapshot.run_state.current_level, LevelId::BurningMonk);
        assert_eq!(snapshot.run_state.health, MAX_HEALTH);
        assert_eq!(snapshot.run_state.score, 0.0);
        assert_eq!(
            gauntlet.audio().now_playing(),
            Some(LevelId::BurningMonk.music_key())
        );
    }

    #[test]
    fn new_run_reads_stored_accessibility_when_not_supplied() {
        let mut store = MemoryStore::new();
        save_accessibility_settings(
            &mut store,
            AccessibilitySettings {
                reduced_flash: true,
                reduced_shake: false,
            },
        );

        let action = orchestrator().handle(ScenePayload::NewRun { accessibility: None }, &store);
        let GauntletAction::StartLevel(snapshot) = action else {
            panic!("expected a level start");
        };
        assert!(snapshot.run_state.accessibility.reduced_flash);

        // An explicit snapshot wins over storage.
        let action = orchestrator().handle(
            ScenePayload::NewRun {
                accessibility: Some(AccessibilitySettings::default()),
            },
            &store,
        );
        let GauntletAction::StartLevel(snapshot) = action else {
            panic!("expected a level start");
        };
        assert!(!snapshot.run_state.accessibility.reduced_flash);
    }

    #[test]
    fn completion_merges_the_result_and_advances() {
        let store = MemoryStore::new();
        let mut gauntlet = orchestrator();

        let mut run_state = RunState::new(AccessibilitySettings::default());
        run_state.score = 1_000.0;
        run_state.health = 40.0;

        let action = gauntlet.handle(
            ScenePayload::LevelComplete {
                run_state,
                level_index: 0,
                result: result_for(LevelId::BurningMonk),
                results: Vec::new(),
            },
            &store,
        );

        let GauntletAction::StartLevel(snapshot) = action else {
            panic!("expected the next level");
        };
        assert_eq!(snapshot.level_index, 1);
        assert_eq!(snapshot.deaths_in_level, 0);
        assert_eq!(snapshot.run_state.current_level, LevelId::Snap);
        assert_eq!(snapshot.run_state.health, MAX_HEALTH);
        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(snapshot.results[0].level, LevelId::BurningMonk);
        assert_eq!(
            gauntlet.audio().now_playing(),
            Some(LevelId::Snap.music_key())
        );
    }

    #[test]
    fn final_completion_ends_the_run_with_all_results() {
        let store = MemoryStore::new();
        let mut gauntlet = orchestrator();

        let prior: Vec<LevelResult> = LEVEL_ORDER[..5].iter().map(|&l| result_for(l)).collect();
        let action = gauntlet.handle(
            ScenePayload::LevelComplete {
                run_state: RunState::new(AccessibilitySettings::default()),
                level_index: 5,
                result: result_for(LevelId::Godmode),
                results: prior,
            },
            &store,
        );

        let GauntletAction::RunComplete { results, .. } = action else {
            panic!("expected run completion");
        };
        assert_eq!(results.len(), 6);
        assert_eq!(results[5].level, LevelId::Godmode);
        assert_eq!(gauntlet.audio().now_playing(), Some("theme_results"));
    }

    #[test]
    fn failure_retries_the_same_level_and_keeps_deaths() {
        let store = MemoryStore::new();
        let mut run_state = RunState::new(AccessibilitySettings::default());
        run_state.deaths = 3;

        let action = orchestrator().handle(
            ScenePayload::LevelFailed {
                run_state,
                level_index: 2,
                deaths_in_level: 2,
                results: vec![result_for(LevelId::BurningMonk)],
            },
            &store,
        );

        let GauntletAction::StartLevel(snapshot) = action else {
            panic!("expected a retry");
        };
        assert_eq!(snapshot.level_index, 2);
        assert_eq!(snapshot.deaths_in_level, 2);
        assert_eq!(snapshot.run_state.deaths, 3);
        assert_eq!(snapshot.run_state.current_level, LevelId::PixelBoss);
        assert_eq!(snapshot.run_state.health, MAX_HEALTH);
    }

    #[test]
    fn resume_clamps_an_out_of_range_level_index() {
        let store = MemoryStore::new();
        let action = orchestrator().handle(
            ScenePayload::ResumeRun {
                run_state: RunState::new(AccessibilitySettings::default()),
                level_index: 11,
                deaths_in_level: 0,
                results: Vec::new(),
            },
            &store,
        );

        let GauntletAction::StartLevel(snapshot) = action else {
            panic!("expected a level start");
        };
        assert_eq!(snapshot.level_index, LEVEL_ORDER.len() - 1);
        assert_eq!(snapshot.run_state.current_level, LevelId::Godmode);
    }

    #[test]
    fn outcomes_map_onto_payloads() {
        let snapshot = LevelSnapshot {
            run_state: RunState::new(AccessibilitySettings::default()),
            level_index: 1,
            deaths_in_level: 1,
            results: Vec::new(),
        };

        let payload = outcome_payload(LevelOutcome::Retry(snapshot.clone()));
        assert!(matches!(
            payload,
            Some(ScenePayload::LevelFailed {
                level_index: 1,
                deaths_in_level: 1,
                ..
            })
        ));

        let payload = outcome_payload(LevelOutcome::Completed {
            run_state: snapshot.run_state.clone(),
            level_index: 1,
            result: result_for(LevelId::Snap),
            results: Vec::new(),
        });
        assert!(matches!(
            payload,
            Some(ScenePayload::LevelComplete { level_index: 1, .. })
        ));

        let payload = outcome_payload(LevelOutcome::Abandoned {
            run_state: snapshot.run_state,
            level_index: 1,
            deaths_in_level: 1,
            results: Vec::new(),
        });
        assert!(payload.is_none());
    }

    #[test]
    fn payloads_use_the_tagged_wire_format() {
        let json = serde_json::to_string(&ScenePayload::NewRun {
            accessibility: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"newRun"}"#);

        let payload = ScenePayload::LevelFailed {
            run_state: RunState::new(AccessibilitySettings::default()),
            level_index: 4,
            deaths_in_level: 2,
            results: Vec::new(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(r#""type":"levelFailed""#));
        assert!(json.contains(r#""levelIndex":4"#));
        assert!(json.contains(r#""deathsInLevel":2"#));

        let back: ScenePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);

        let parsed: ScenePayload = serde_json::from_str(r#"{"type":"newRun"}"#).unwrap();
        assert_eq!(parsed, ScenePayload::NewRun { accessibility: None });
    }
}
