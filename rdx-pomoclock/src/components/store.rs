//! Durable storage for the completed-interval counter.
//!
//! The store is a key-value collaborator holding a single integer. Read and
//! write failures are logged and otherwise ignored: the in-memory count held
//! by the controller stays authoritative.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub trait CounterStore: Send {
    /// The persisted count, or `None` if absent or unreadable.
    fn load(&self) -> Option<u64>;

    /// Durably records `count`. Never fails from the caller's point of view.
    fn persist(&mut self, count: u64);
}

/// A JSON object on disk, one entry per key.
///
/// Other keys present in the file are preserved on write.
pub struct JsonFileStore {
    path: PathBuf,
    key: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        serde_json::from_str(&text).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn write_count(&self, count: u64) -> Result<()> {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(self.key.clone(), Value::from(count));
        let text = serde_json::to_string_pretty(&map)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

/// Accepts a JSON number or a numeric string; anything else is absent.
fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl CounterStore for JsonFileStore {
    fn load(&self) -> Option<u64> {
        match self.read_map() {
            Ok(map) => {
                let count = map.get(&self.key).and_then(parse_count);
                debug!("Loaded '{}' = {:?} from {}", self.key, count, self.path.display());
                count
            }
            Err(e) => {
                warn!("Counter store unreadable, starting from zero: {:#}", e);
                None
            }
        }
    }

    fn persist(&mut self, count: u64) {
        if let Err(e) = self.write_count(count) {
            warn!("Failed to persist '{}' = {}: {:#}", self.key, count, e);
        }
    }
}

/// A process-local store, mostly for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, u64>,
    key: String,
}

impl MemoryStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            values: HashMap::new(),
            key: key.into(),
        }
    }

    pub fn with_count(key: impl Into<String>, count: u64) -> Self {
        let mut store = Self::new(key);
        store.values.insert(store.key.clone(), count);
        store
    }
}

impl CounterStore for MemoryStore {
    fn load(&self) -> Option<u64> {
        self.values.get(&self.key).copied()
    }

    fn persist(&mut self, count: u64) {
        self.values.insert(self.key.clone(), count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("counter.json"), "pomodoroCount");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.json");
        let mut store = JsonFileStore::new(&path, "pomodoroCount");
        store.persist(3);
        store.persist(4);

        let reopened = JsonFileStore::new(&path, "pomodoroCount");
        assert_eq!(reopened.load(), Some(4));
    }

    #[test]
    fn keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.json");
        std::fs::write(&path, r#"{"theme": "dark", "pomodoroCount": "2"}"#).unwrap();

        let mut store = JsonFileStore::new(&path, "pomodoroCount");
        assert_eq!(store.load(), Some(2));
        store.persist(5);

        let map: Map<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(map["theme"], "dark");
        assert_eq!(map["pomodoroCount"], 5);
    }

    #[test]
    fn garbage_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(JsonFileStore::new(&path, "pomodoroCount").load(), None);

        std::fs::write(&path, r#"{"pomodoroCount": "many"}"#).unwrap();
        assert_eq!(JsonFileStore::new(&path, "pomodoroCount").load(), None);
    }

    #[test]
    fn unwritable_path_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("missing/dir/counter.json"), "k");
        store.persist(1);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new("pomodoroCount");
        assert_eq!(store.load(), None);
        store.persist(9);
        assert_eq!(store.load(), Some(9));
        assert_eq!(MemoryStore::with_count("pomodoroCount", 2).load(), Some(2));
    }
}
