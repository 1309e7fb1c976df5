//! Best-run leaderboard
//!
//! Keeps the top ten runs sorted by score (ties broken by faster clear
//! time), persisted locally and optionally mirrored to a remote basket.
//! The remote is always preferred for reads but never trusted for
//! availability: any failure falls back to local data, and publish errors
//! are logged, not surfaced.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

/// Maximum number of leaderboard entries to keep
pub const MAX_LEADERBOARD_ENTRIES: usize = 10;

/// Storage key for the local leaderboard copy
pub const LEADERBOARD_STORAGE_KEY: &str = "ascension_leaderboard_v1";

/// Schema version accepted on load; anything else is discarded
pub const ENTRY_VERSION: &str = "v1";

/// A single best-run entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Up to three sanitized characters
    pub initials: String,
    pub score: f64,
    pub clear_time_ms: u64,
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    pub version: String,
}

/// Remote mirror failure. Always recoverable.
#[derive(Debug)]
pub struct RemoteError {
    message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RemoteError {}

/// Optional remote mirror of the leaderboard.
///
/// Implementations wrap whatever transport the front end has. Drivers call
/// these off the gameplay tick (results flow only), showing a provisional
/// status until the call settles.
pub trait RemoteLeaderboard {
    fn fetch(&mut self) -> Result<Vec<LeaderboardEntry>, RemoteError>;
    fn publish(&mut self, entries: &[LeaderboardEntry]) -> Result<(), RemoteError>;
}

/// Uppercase, strip everything outside `[A-Z0-9]`, keep at most three
/// characters. Total for any input.
pub fn sanitize_initials(raw: &str) -> String {
    raw.chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .take(3)
        .collect()
}

/// Stable sort: score descending, ties broken by clear time ascending.
pub fn sort_leaderboard(entries: &[LeaderboardEntry]) -> Vec<LeaderboardEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.clear_time_ms.cmp(&b.clear_time_ms))
    });
    sorted
}

fn is_recognized(entry: &LeaderboardEntry) -> bool {
    entry.version == ENTRY_VERSION && entry.score.is_finite()
}

fn parse_local(raw: &str) -> Vec<LeaderboardEntry> {
    // Individually malformed entries are dropped rather than poisoning the
    // whole table.
    match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(values) => values
            .into_iter()
            .filter_map(|value| serde_json::from_value::<LeaderboardEntry>(value).ok())
            .collect(),
        Err(err) => {
            log::warn!("discarding corrupt local leaderboard: {err}");
            Vec::new()
        }
    }
}

fn top_ten(entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    let mut sorted = sort_leaderboard(&entries);
    sorted.retain(is_recognized);
    sorted.truncate(MAX_LEADERBOARD_ENTRIES);
    sorted
}

/// Load the leaderboard, remote first, local fallback. Always sorted,
/// version-filtered and capped at ten.
pub fn load_leaderboard<R>(
    store: &dyn KeyValueStore,
    remote: Option<&mut R>,
) -> Vec<LeaderboardEntry>
where
    R: RemoteLeaderboard + ?Sized,
{
    let mut entries = Vec::new();

    if let Some(remote) = remote {
        match remote.fetch() {
            Ok(fetched) => entries = fetched,
            Err(err) => {
                log::warn!("global leaderboard unavailable, falling back to local: {err}");
            }
        }
    }

    if entries.is_empty()
        && let Some(raw) = store.get(LEADERBOARD_STORAGE_KEY)
    {
        entries = parse_local(&raw);
    }

    top_ten(entries)
}

/// Write the local backup copy, returning what was stored.
pub fn save_leaderboard_local(
    store: &mut dyn KeyValueStore,
    entries: Vec<LeaderboardEntry>,
) -> Vec<LeaderboardEntry> {
    let sorted = top_ten(entries);
    match serde_json::to_string(&sorted) {
        Ok(json) => {
            if let Err(err) = store.set(LEADERBOARD_STORAGE_KEY, &json) {
                log::warn!("failed to save local leaderboard: {err}");
            }
        }
        Err(err) => log::warn!("failed to encode leaderboard: {err}"),
    }
    sorted
}

/// Read-merge-write a new entry.
///
/// Loads the freshest available board, merges, publishes best-effort and
/// always keeps the local backup. Returns the updated top ten.
pub fn add_leaderboard_entry<R>(
    store: &mut dyn KeyValueStore,
    mut remote: Option<&mut R>,
    entry: LeaderboardEntry,
) -> Vec<LeaderboardEntry>
where
    R: RemoteLeaderboard + ?Sized,
{
    let mut entries = load_leaderboard(store, remote.as_mut().map(|r| &mut **r));
    entries.push(entry);
    let updated = top_ten(entries);

    if let Some(remote) = remote
        && let Err(err) = remote.publish(&updated)
    {
        log::warn!("failed to publish leaderboard, kept locally: {err}");
    }

    save_leaderboard_local(store, updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    fn entry(initials: &str, score: f64, clear_time_ms: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            initials: initials.to_owned(),
            score,
            clear_time_ms,
            date_iso: "2026-02-12T00:00:00Z".to_owned(),
            version: ENTRY_VERSION.to_owned(),
        }
    }

    /// Scripted remote for exercising fallback and publish paths.
    struct FakeRemote {
        fetch_result: Option<Vec<LeaderboardEntry>>,
        published: Vec<Vec<LeaderboardEntry>>,
        publish_fails: bool,
    }

    impl FakeRemote {
        fn returning(entries: Vec<LeaderboardEntry>) -> Self {
            Self {
                fetch_result: Some(entries),
                published: Vec::new(),
                publish_fails: false,
            }
        }

        fn failing() -> Self {
            Self {
                fetch_result: None,
                published: Vec::new(),
                publish_fails: true,
            }
        }
    }

    impl RemoteLeaderboard for FakeRemote {
        fn fetch(&mut self) -> Result<Vec<LeaderboardEntry>, RemoteError> {
            self.fetch_result
                .clone()
                .ok_or_else(|| RemoteError::new("offline"))
        }

        fn publish(&mut self, entries: &[LeaderboardEntry]) -> Result<(), RemoteError> {
            if self.publish_fails {
                return Err(RemoteError::new("offline"));
            }
            self.published.push(entries.to_vec());
            Ok(())
        }
    }

    #[test]
    fn sanitizes_to_three_uppercase_alphanumerics() {
        assert_eq!(sanitize_initials("ab$1c"), "AB1");
        assert_eq!(sanitize_initials("xyz"), "XYZ");
        assert_eq!(sanitize_initials(""), "");
        assert_eq!(sanitize_initials("!!"), "");
        assert_eq!(sanitize_initials("a b c d"), "ABC");
    }

    proptest! {
        #[test]
        fn sanitize_is_total_and_bounded(raw in ".*") {
            let clean = sanitize_initials(&raw);
            prop_assert!(clean.len() <= 3);
            prop_assert!(clean.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn sorts_by_score_then_clear_time() {
        let sorted = sort_leaderboard(&[
            entry("A1", 9_000.0, 200_000),
            entry("A2", 9_300.0, 220_000),
            entry("A3", 9_300.0, 210_000),
        ]);

        assert_eq!(sorted[0].initials, "A3");
        assert_eq!(sorted[1].initials, "A2");
        assert_eq!(sorted[2].initials, "A1");
    }

    #[test]
    fn caps_at_ten_entries_across_save_and_load() {
        let mut store = MemoryStore::new();
        let entries: Vec<_> = (0..12)
            .map(|i| entry(&format!("A{i}"), 20_000.0 - f64::from(i) * 10.0, 200_000))
            .collect();

        save_leaderboard_local(&mut store, entries);
        let loaded = load_leaderboard::<FakeRemote>(&store, None);

        assert_eq!(loaded.len(), 10);
        assert_eq!(loaded[0].score, 20_000.0);
        assert_eq!(loaded[9].score, 19_910.0);
    }

    #[test]
    fn unrecognized_versions_and_junk_are_dropped_on_load() {
        let mut store = MemoryStore::new();
        let mut stale = entry("OLD", 9_999.0, 1);
        stale.version = "v0".to_owned();
        save_leaderboard_local(&mut store, vec![entry("NEW", 100.0, 1)]);

        // Splice junk alongside valid data, bypassing the save path.
        let raw = format!(
            r#"[{},{},{{"score":"high"}}]"#,
            serde_json::to_string(&stale).unwrap(),
            serde_json::to_string(&entry("NEW", 100.0, 1)).unwrap(),
        );
        store.set(LEADERBOARD_STORAGE_KEY, &raw).unwrap();

        let loaded = load_leaderboard::<FakeRemote>(&store, None);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].initials, "NEW");
    }

    #[test]
    fn remote_is_preferred_when_it_answers() {
        let mut store = MemoryStore::new();
        save_leaderboard_local(&mut store, vec![entry("LOC", 50.0, 1)]);

        let mut remote = FakeRemote::returning(vec![entry("NET", 75.0, 1)]);
        let loaded = load_leaderboard(&store, Some(&mut remote));

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].initials, "NET");
    }

    #[test]
    fn remote_failure_and_empty_remote_fall_back_to_local() {
        let mut store = MemoryStore::new();
        save_leaderboard_local(&mut store, vec![entry("LOC", 50.0, 1)]);

        let mut offline = FakeRemote::failing();
        let loaded = load_leaderboard(&store, Some(&mut offline));
        assert_eq!(loaded[0].initials, "LOC");

        let mut empty = FakeRemote::returning(Vec::new());
        let loaded = load_leaderboard(&store, Some(&mut empty));
        assert_eq!(loaded[0].initials, "LOC");
    }

    #[test]
    fn add_merges_publishes_and_backs_up_locally() {
        let mut store = MemoryStore::new();
        let mut remote = FakeRemote::returning(vec![entry("NET", 75.0, 1)]);

        let updated = add_leaderboard_entry(&mut store, Some(&mut remote), entry("ME", 90.0, 2));

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].initials, "ME");
        assert_eq!(remote.published.len(), 1);
        assert_eq!(remote.published[0], updated);

        // Local backup reflects the merge even without the remote.
        let local = load_leaderboard::<FakeRemote>(&store, None);
        assert_eq!(local, updated);
    }

    #[test]
    fn publish_failure_still_saves_locally() {
        let mut store = MemoryStore::new();
        let mut remote = FakeRemote::failing();

        let updated = add_leaderboard_entry(&mut store, Some(&mut remote), entry("ME", 90.0, 2));
        assert_eq!(updated.len(), 1);
        assert_eq!(load_leaderboard::<FakeRemote>(&store, None), updated);
    }

    #[test]
    fn incremental_adds_accumulate() {
        let mut store = MemoryStore::new();

        let _ = add_leaderboard_entry::<FakeRemote>(&mut store, None, entry("AA", 1_000.0, 500_000));
        let updated = add_leaderboard_entry::<FakeRemote>(&mut store, None, entry("BB", 1_200.0, 450_000));

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].initials, "BB");
    }

    #[test]
    fn wire_format_uses_camel_case_and_date_iso() {
        let json = serde_json::to_string(&entry("ME", 90.0, 123)).unwrap();
        assert!(json.contains(r#""clearTimeMs":123"#));
        assert!(json.contains(r#""dateISO":"#));
        assert!(json.contains(r#""version":"v1""#));
    }
}
