//! Completed analyses and their storage key scheme.
//!
//! The service response payload is kept as opaque JSON ([`AnalysisPayload`]);
//! only the history summary fields are read out of it, and only when present.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Reserved key prefix for history entries in a shared key-value medium.
pub const RECORD_KEY_PREFIX: &str = "analysis_";

/// Name shown for records saved without a product name.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Storage key for the record saved at `timestamp`.
#[must_use]
pub fn record_key(timestamp: i64) -> String {
    format!("{RECORD_KEY_PREFIX}{timestamp}")
}

/// Inverse of [`record_key`]. Returns `None` for foreign keys or a
/// non-numeric suffix.
#[must_use]
pub fn parse_record_key(key: &str) -> Option<i64> {
    key.strip_prefix(RECORD_KEY_PREFIX)?.parse().ok()
}

/// Response payload of a successful analysis, verbatim.
///
/// Holds the service's `extracted_data` and `analysis` objects; their
/// schema belongs to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisPayload(serde_json::Value);

impl AnalysisPayload {
    /// Wraps a raw JSON value.
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// The raw JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// The `extracted_data` sub-structure, if present.
    #[must_use]
    pub fn extracted_data(&self) -> Option<&serde_json::Value> {
        self.0.get("extracted_data")
    }

    /// The `analysis` sub-structure, if present.
    #[must_use]
    pub fn analysis(&self) -> Option<&serde_json::Value> {
        self.0.get("analysis")
    }

    /// Looks up a value by JSON pointer (`/analysis/nutritional_summary`).
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<&serde_json::Value> {
        self.0.pointer(pointer)
    }

    /// `analysis.nutritional_summary.overall_rating`, if numeric.
    #[must_use]
    pub fn overall_rating(&self) -> Option<f64> {
        self.pointer("/analysis/nutritional_summary/overall_rating")?
            .as_f64()
    }

    /// `analysis.nutritional_summary.calories_assessment`, if a string.
    #[must_use]
    pub fn calories_assessment(&self) -> Option<&str> {
        self.pointer("/analysis/nutritional_summary/calories_assessment")?
            .as_str()
    }
}

impl From<serde_json::Value> for AnalysisPayload {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// A persisted analysis.
///
/// `timestamp` is milliseconds since the Unix epoch at save time. It is
/// both the sort key and the storage key suffix, and never changes once
/// written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// Save time in epoch milliseconds.
    pub timestamp: i64,
    /// Optional user-facing label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Verbatim service payload.
    pub data: AnalysisPayload,
}

impl AnalysisRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(data: AnalysisPayload, product_name: Option<String>) -> Self {
        Self::with_timestamp(Utc::now().timestamp_millis(), data, product_name)
    }

    /// Creates a record with an explicit timestamp.
    #[must_use]
    pub const fn with_timestamp(
        timestamp: i64,
        data: AnalysisPayload,
        product_name: Option<String>,
    ) -> Self {
        Self {
            timestamp,
            product_name,
            data,
        }
    }

    /// Storage key derived from the timestamp.
    #[must_use]
    pub fn key(&self) -> String {
        record_key(self.timestamp)
    }

    /// Product name, or [`UNKNOWN_PRODUCT`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.product_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_PRODUCT)
    }

    /// Save time as a UTC datetime. `None` if out of range.
    #[must_use]
    pub fn analyzed_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}
