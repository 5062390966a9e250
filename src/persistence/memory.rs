//! In-memory key-value medium.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::KeyValueStore;
use crate::error::AnalyzerError;

/// Insertion-ordered in-memory medium.
///
/// Keys enumerate in the order they were first written; overwriting a key
/// keeps its position.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<(String, String)>>,
}

impl MemoryStore {
    /// Creates an empty medium.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium seeded with raw entries, in order.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.write();
            for (key, value) in entries {
                upsert(&mut map, key.into(), value.into());
            }
        }
        store
    }

    /// Number of entries, including foreign keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if the medium holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<(String, String)>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<(String, String)>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn upsert(entries: &mut Vec<(String, String)>, key: String, value: String) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => entries.push((key, value)),
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AnalyzerError> {
        Ok(self
            .read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AnalyzerError> {
        upsert(&mut self.write(), key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, AnalyzerError> {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|(k, _)| k != key);
        Ok(entries.len() != before)
    }

    fn list_keys(&self) -> Result<Vec<String>, AnalyzerError> {
        Ok(self.read().iter().map(|(k, _)| k.clone()).collect())
    }
}
