//! Durable key-value storage
//!
//! Everything the game persists (preferences, the active run, the local
//! leaderboard) goes through the [`KeyValueStore`] trait so the core never
//! touches a concrete backend. Ships with an in-memory store for tests and
//! a one-file-per-key store for native builds.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Storage failure surfaced by write operations.
///
/// Reads degrade to `None` instead; callers treat writes as best-effort and
/// log rather than propagate.
#[derive(Debug)]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StoreError {}

/// String key-value storage with JSON-encoded values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Volatile store backed by a map. Used by tests and the demo driver.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let _ = self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let _ = self.entries.remove(key);
        Ok(())
    }
}

/// Store that writes each key to its own file under a root directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)
            .map_err(|err| StoreError::new(format!("create {}: {err}", self.root.display())))?;
        fs::write(self.path_for(key), value)
            .map_err(|err| StoreError::new(format!("write {key}: {err}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::new(format!("remove {key}: {err}"))),
        }
    }
}
