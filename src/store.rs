use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Versioned storage namespace for the ledger snapshot.
pub const LEDGER_KEY: &str = "garimpo:ledger:v1";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("snapshot could not be encoded: {0}")]
    Encode(String),
}

/// Persistence capability: string-keyed JSON blobs.
///
/// The concrete backend (localStorage, a file, a device key-value store) is a
/// host concern; the core only requires this load/save shape. Failures are
/// reported, never fatal — the in-memory ledger stays the source of truth.
pub trait LedgerStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store backed by a shared map. Clones share the same entries,
/// which lets tests keep a handle on what the session persisted.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Store that remembers nothing. Lets the core run with no persistence
/// collaborator attached.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullStore;

impl LedgerStore for NullStore {
    fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_key_uses_the_versioned_namespace() {
        assert_eq!(LEDGER_KEY, "garimpo:ledger:v1");
    }

    #[test]
    fn memory_store_round_trips_and_shares_entries_across_clones() {
        let store = MemoryStore::new();
        let clone = store.clone();

        assert_eq!(store.load(LEDGER_KEY).unwrap(), None);
        store.save(LEDGER_KEY, "{}").unwrap();
        assert_eq!(clone.load(LEDGER_KEY).unwrap(), Some("{}".to_owned()));
    }

    #[test]
    fn null_store_drops_saves() {
        let store = NullStore;
        store.save(LEDGER_KEY, "{}").unwrap();
        assert_eq!(store.load(LEDGER_KEY).unwrap(), None);
    }
}
