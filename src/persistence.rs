//! Resumable run snapshots
//!
//! One storage slot holds the snapshot needed to put the player back at the
//! level they were attempting. Persistence is best-effort continuity, never
//! a correctness requirement: every failure degrades to "no saved run" with
//! a logged warning.

use crate::level::LevelSnapshot;
use crate::storage::KeyValueStore;

/// Storage key for the in-progress run
pub const RUN_STORAGE_KEY: &str = "ascension_run_state_v1";

/// Persist the resume snapshot. Called at every level (re)start so the
/// stored copy always reflects the attempt in progress.
pub fn save_active_run(store: &mut dyn KeyValueStore, snapshot: &LevelSnapshot) {
    match serde_json::to_string(snapshot) {
        Ok(json) => {
            if let Err(err) = store.set(RUN_STORAGE_KEY, &json) {
                log::warn!("failed to save run state: {err}");
            }
        }
        Err(err) => log::warn!("failed to encode run state: {err}"),
    }
}

/// Load the saved run, if any. Missing or malformed data yields `None`.
pub fn load_active_run(store: &dyn KeyValueStore) -> Option<LevelSnapshot> {
    let raw = store.get(RUN_STORAGE_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            log::warn!("discarding corrupt run state: {err}");
            None
        }
    }
}

/// Drop the saved run. Called on run completion and explicit abandonment.
pub fn clear_active_run(store: &mut dyn KeyValueStore) {
    if let Err(err) = store.remove(RUN_STORAGE_KEY) {
        log::warn!("failed to clear run state: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{LEVEL_ORDER, LevelResult, RunState};
    use crate::settings::AccessibilitySettings;
    use crate::storage::MemoryStore;

    fn snapshot() -> LevelSnapshot {
        let mut run_state = RunState::new(AccessibilitySettings::default());
        run_state.score = 2_450.0;
        run_state.deaths = 2;
        run_state.current_level = LEVEL_ORDER[3];

        LevelSnapshot {
            run_state,
            level_index: 3,
            deaths_in_level: 1,
            results: vec![LevelResult {
                level: LEVEL_ORDER[0],
                success: true,
                duration_ms: 18_000,
                damage_taken: 12.0,
                deaths_in_level: 0,
                score_delta: 1_140.0,
            }],
        }
    }

    #[test]
    fn round_trips_the_active_run() {
        let mut store = MemoryStore::new();
        assert!(load_active_run(&store).is_none());

        let saved = snapshot();
        save_active_run(&mut store, &saved);
        assert_eq!(load_active_run(&store), Some(saved));

        clear_active_run(&mut store);
        assert!(load_active_run(&store).is_none());
    }

    #[test]
    fn corrupt_slot_reads_as_no_run() {
        let mut store = MemoryStore::new();
        store.set(RUN_STORAGE_KEY, "{\"runState\":").unwrap();
        assert!(load_active_run(&store).is_none());
    }

    #[test]
    fn clearing_an_empty_slot_is_fine() {
        let mut store = MemoryStore::new();
        clear_active_run(&mut store);
        assert!(load_active_run(&store).is_none());
    }
}
