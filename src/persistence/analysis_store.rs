//! Local history of completed analyses.
//!
//! [`LocalAnalysisStore`] keeps one JSON-encoded [`AnalysisRecord`] per key
//! `analysis_<timestamp>` in a shared [`KeyValueStore`]. Entries that fail
//! to parse are skipped, logged, and reported on the [`EventBus`]; they stay
//! in the medium until deleted or overwritten.

use super::KeyValueStore;
use crate::domain::analysis_record::{RECORD_KEY_PREFIX, record_key};
use crate::domain::{AnalysisRecord, AnalyzerEvent, EventBus};
use crate::error::AnalyzerError;

/// Analysis history over a key-value medium.
#[derive(Debug)]
pub struct LocalAnalysisStore<S> {
    medium: S,
    events: EventBus,
}

impl<S: KeyValueStore> LocalAnalysisStore<S> {
    /// Creates a store over `medium`, reporting diagnostics on `events`.
    #[must_use]
    pub const fn new(medium: S, events: EventBus) -> Self {
        Self { medium, events }
    }

    /// The underlying medium.
    #[must_use]
    pub const fn medium(&self) -> &S {
        &self.medium
    }

    /// Writes `record` under its timestamp key.
    ///
    /// An existing entry with the same timestamp is overwritten; the
    /// overwrite is logged and flagged on the emitted event.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Serialization`] if the record cannot be
    /// encoded and [`AnalyzerError::Storage`] if the medium fails.
    pub fn save(&self, record: &AnalysisRecord) -> Result<(), AnalyzerError> {
        let key = record.key();
        let value = serde_json::to_string(record)?;
        let overwrote = self.medium.get(&key)?.is_some();
        self.medium.set(&key, &value)?;

        if overwrote {
            tracing::warn!(%key, "analysis record overwritten by one with the same timestamp");
        } else {
            tracing::info!(%key, "analysis record saved");
        }
        let _ = self.events.publish(AnalyzerEvent::RecordSaved {
            record: record.timestamp,
            overwrote,
        });
        Ok(())
    }

    /// Every parseable record, most recent first.
    ///
    /// Visits each key in the medium once, keeps those under the reserved
    /// prefix, and parses them. Records with equal timestamps keep their
    /// enumeration order. The result is a snapshot, not a live view.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Storage`] if the medium cannot be
    /// enumerated or read. Unparseable entries are never an error.
    pub fn list(&self) -> Result<Vec<AnalysisRecord>, AnalyzerError> {
        let keys = self.medium.list_keys()?;
        let mut records = Vec::new();
        for key in keys {
            if !key.starts_with(RECORD_KEY_PREFIX) {
                continue;
            }
            // Removed between enumeration and read.
            let Some(value) = self.medium.get(&key)? else {
                continue;
            };
            if let Some(record) = self.parse(&key, &value) {
                records.push(record);
            }
        }
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    /// The record saved at `timestamp`, if present and parseable.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Storage`] if the medium cannot be read.
    pub fn get(&self, timestamp: i64) -> Result<Option<AnalysisRecord>, AnalyzerError> {
        let key = record_key(timestamp);
        let Some(value) = self.medium.get(&key)? else {
            return Ok(None);
        };
        Ok(self.parse(&key, &value))
    }

    /// Removes the record saved at `timestamp`. Deleting a missing record
    /// is a no-op and returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Storage`] if the medium fails.
    pub fn delete(&self, timestamp: i64) -> Result<bool, AnalyzerError> {
        let removed = self.medium.delete(&record_key(timestamp))?;
        if removed {
            tracing::info!(timestamp, "analysis record deleted");
            let _ = self
                .events
                .publish(AnalyzerEvent::RecordDeleted { record: timestamp });
        }
        Ok(removed)
    }

    fn parse(&self, key: &str, value: &str) -> Option<AnalysisRecord> {
        match serde_json::from_str::<AnalysisRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(%key, error = %e, "skipping malformed analysis record");
                let _ = self.events.publish(AnalyzerEvent::MalformedEntry {
                    key: key.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}
