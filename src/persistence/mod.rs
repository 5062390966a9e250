//! Persistence layer: key-value media and the analysis history store.
//!
//! [`KeyValueStore`] is the storage capability handed to
//! [`LocalAnalysisStore`]. The medium is shared with unrelated data, so the
//! store only ever touches keys under its reserved prefix. Access is
//! synchronous and each operation is atomic per key.

pub mod analysis_store;
pub mod file;
pub mod memory;

pub use analysis_store::LocalAnalysisStore;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use crate::error::AnalyzerError;

/// String-keyed, string-valued storage medium.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Storage`] if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, AnalyzerError>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Storage`] if the medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), AnalyzerError>;

    /// Removes `key`. Returns `false` if it was not present.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Storage`] if the medium cannot be written.
    fn delete(&self, key: &str) -> Result<bool, AnalyzerError>;

    /// Every key currently in the medium, each exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Storage`] if the medium cannot be read.
    fn list_keys(&self) -> Result<Vec<String>, AnalyzerError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, AnalyzerError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AnalyzerError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool, AnalyzerError> {
        (**self).delete(key)
    }

    fn list_keys(&self) -> Result<Vec<String>, AnalyzerError> {
        (**self).list_keys()
    }
}
