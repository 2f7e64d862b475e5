use std::{
    collections::BTreeMap,
    fs, io,
    path::PathBuf,
    sync::Mutex,
};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Durable key-value storage consumed by the level manager.
///
/// Implementations hold per-level best times and the last selected level.
/// The engine never touches storage directly; the host injects whichever
/// store fits its environment.
pub trait PersistenceStore: Send + Sync {
    fn record(&self, level: usize) -> Option<u64>;
    fn set_record(&self, level: usize, seconds: u64);
    fn current_level(&self) -> Option<usize>;
    fn set_current_level(&self, level: usize);
}

/// Ephemeral store for tests and hosts that manage durability themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<usize, u64>,
    level: Mutex<Option<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn record(&self, level: usize) -> Option<u64> {
        self.records.get(&level).map(|record| *record)
    }

    fn set_record(&self, level: usize, seconds: u64) {
        self.records.insert(level, seconds);
    }

    fn current_level(&self) -> Option<usize> {
        if let Ok(level) = self.level.lock() {
            *level
        } else {
            None
        }
    }

    fn set_current_level(&self, level: usize) {
        if let Ok(mut guard) = self.level.lock() {
            *guard = Some(level);
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    records: BTreeMap<usize, u64>,
    current_level: Option<usize>,
}

/// File-backed store holding one JSON document, rewritten on every mutation.
///
/// Write failures are logged and swallowed: losing a record must not take
/// the game down.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<StoreDocument>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let document = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                warn!("discarding unreadable record file {}: {}", path.display(), err);
                StoreDocument::default()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no record file at {}, starting fresh", path.display());
                StoreDocument::default()
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    fn persist(&self, document: &StoreDocument) {
        match serde_json::to_vec_pretty(document) {
            Ok(bytes) => {
                if let Err(err) = fs::write(&self.path, bytes) {
                    warn!("failed to write record file {}: {}", self.path.display(), err);
                }
            }
            Err(err) => warn!("failed to serialize records: {}", err),
        }
    }
}

impl PersistenceStore for JsonFileStore {
    fn record(&self, level: usize) -> Option<u64> {
        if let Ok(document) = self.document.lock() {
            document.records.get(&level).copied()
        } else {
            None
        }
    }

    fn set_record(&self, level: usize, seconds: u64) {
        if let Ok(mut document) = self.document.lock() {
            document.records.insert(level, seconds);
            self.persist(&document);
        }
    }

    fn current_level(&self) -> Option<usize> {
        if let Ok(document) = self.document.lock() {
            document.current_level
        } else {
            None
        }
    }

    fn set_current_level(&self, level: usize) {
        if let Ok(mut document) = self.document.lock() {
            document.current_level = Some(level);
            self.persist(&document);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("minesweeper-store-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert_eq!(store.record(0), None);
        assert_eq!(store.current_level(), None);

        store.set_record(0, 42);
        store.set_current_level(3);
        assert_eq!(store.record(0), Some(42));
        assert_eq!(store.record(1), None);
        assert_eq!(store.current_level(), Some(3));
    }

    #[test]
    fn json_file_store_survives_reopen() {
        let path = temp_path();

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set_record(2, 17);
            store.set_current_level(2);
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.record(2), Some(17));
        assert_eq!(store.current_level(), Some(2));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn json_file_store_discards_corrupt_documents() {
        let path = temp_path();
        fs::write(&path, b"not json").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.record(0), None);
        assert_eq!(store.current_level(), None);

        let _ = fs::remove_file(&path);
    }
}
