//! File-backed key-value medium.
//!
//! The whole medium is one JSON object on disk. It is loaded on open and
//! rewritten on every mutation through a temporary file and a rename, so a
//! crash mid-write leaves the previous contents intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use super::KeyValueStore;
use crate::error::AnalyzerError;

/// Persistent medium stored as a JSON object of string values.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens (or lazily creates) the medium at `path`.
    ///
    /// A missing file is an empty medium; nothing is written until the
    /// first mutation.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Storage`] if the file exists but cannot be
    /// read or is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AnalyzerError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                AnalyzerError::Storage(format!("{}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "history medium opened");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), AnalyzerError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Applies `mutate` and persists. The in-memory map is only updated
    /// once the write succeeded.
    fn mutate<R>(
        &self,
        mutate: impl FnOnce(&mut BTreeMap<String, String>) -> R,
    ) -> Result<R, AnalyzerError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        let result = mutate(&mut next);
        self.persist(&next)?;
        *entries = next;
        Ok(result)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AnalyzerError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AnalyzerError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn delete(&self, key: &str) -> Result<bool, AnalyzerError> {
        if self.get(key)?.is_none() {
            return Ok(false);
        }
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn list_keys(&self) -> Result<Vec<String>, AnalyzerError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.keys().cloned().collect())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn open_in(dir: &tempfile::TempDir) -> JsonFileStore {
        let Ok(store) = JsonFileStore::open(dir.path().join("history.json")) else {
            panic!("open store");
        };
        store
    }

    #[test]
    fn missing_file_is_empty() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let store = open_in(&dir);
        assert_eq!(store.list_keys().ok(), Some(Vec::new()));
        assert!(!store.path().exists());
    }

    #[test]
    fn writes_survive_reopen() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let store = open_in(&dir);
        assert!(store.set("analysis_1", "{}").is_ok());
        assert!(store.set("theme", "dark").is_ok());
        drop(store);

        let reopened = open_in(&dir);
        assert_eq!(reopened.get("analysis_1").ok().flatten().as_deref(), Some("{}"));
        assert_eq!(
            reopened.list_keys().ok(),
            Some(vec!["analysis_1".to_string(), "theme".to_string()])
        );
    }

    #[test]
    fn delete_persists() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let store = open_in(&dir);
        assert!(store.set("analysis_1", "{}").is_ok());
        assert_eq!(store.delete("analysis_1").ok(), Some(true));
        assert_eq!(store.delete("analysis_1").ok(), Some(false));
        drop(store);

        let reopened = open_in(&dir);
        assert_eq!(reopened.get("analysis_1").ok().flatten(), None);
    }

    #[test]
    fn corrupt_file_is_storage_error() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("history.json");
        let Ok(()) = std::fs::write(&path, "not json") else {
            panic!("write file");
        };
        let result = JsonFileStore::open(&path);
        assert!(matches!(result, Err(AnalyzerError::Storage(_))));
    }

    #[test]
    fn creates_parent_directories() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let Ok(store) = JsonFileStore::open(dir.path().join("nested/deeper/history.json")) else {
            panic!("open store");
        };
        assert!(store.set("k", "v").is_ok());
        assert!(store.path().exists());
    }
}
