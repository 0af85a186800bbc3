//! In-process store, used in tests and as a scratch backend

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{KeyValueStore, StoreError, validate_key};

/// A `KeyValueStore` backed by a shared in-memory map
///
/// Clones share the same map, so a test can hand one clone to the code under
/// test and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
