//! Key-value persistence for calculator state.
//!
//! The profit model only ever sees the `Store` trait; the file-backed
//! implementation is wired up in `main`. Writes are last-write-wins and
//! per-key, never batched: the store is a convenience cache of the current
//! form, not a source of truth.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

pub trait Store {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

impl<S: Store + ?Sized> Store for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value)
    }
}

/// In-memory store, used in tests and as the fallback when no writable
/// data directory exists.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// JSON object map on disk, loaded once at open and rewritten on every
/// `set`. A missing or corrupt file opens as empty; a failed write is
/// logged and dropped so editing never stalls on I/O.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: PathBuf) -> Self {
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(values) => values,
                Err(err) => {
                    warn!("discarding unreadable state file {}: {err}", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        info!("state file: {}", path.display());
        Self { path, values }
    }

    fn flush(&self) {
        let json = match serde_json::to_string_pretty(&self.values) {
            Ok(json) => json,
            Err(err) => {
                warn!("could not encode state: {err}");
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, json) {
            warn!("could not write {}: {err}", self.path.display());
        }
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("salePrice"), None);
        store.set("salePrice", "300,000");
        assert_eq!(store.get("salePrice"), Some("300,000".to_string()));
        store.set("salePrice", "1");
        assert_eq!(store.get("salePrice"), Some("1".to_string()));
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "homeseller-store-test-{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        let mut store = FileStore::open(path.clone());
        assert_eq!(store.get("commissionPct"), None);
        store.set("commissionPct", "6");
        store.set("closingCostsType", "percent");
        drop(store);

        let store = FileStore::open(path.clone());
        assert_eq!(store.get("commissionPct"), Some("6".to_string()));
        assert_eq!(store.get("closingCostsType"), Some("percent".to_string()));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_state_file_opens_empty() {
        let path = std::env::temp_dir().join(format!(
            "homeseller-store-corrupt-{}.json",
            std::process::id()
        ));
        fs::write(&path, "{not json").unwrap();
        let store = FileStore::open(path.clone());
        assert_eq!(store.get("salePrice"), None);
        let _ = fs::remove_file(&path);
    }
}
