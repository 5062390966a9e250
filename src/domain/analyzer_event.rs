//! Diagnostic events emitted by the controller and the history store.
//!
//! Every state transition and every recovered storage fault emits an
//! [`AnalyzerEvent`] through the [`super::EventBus`], so that silently
//! skipped history entries remain observable.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{InputMode, PreviewHandle};

/// Diagnostic event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AnalyzerEvent {
    /// A submit was accepted and the request is in flight.
    SubmitStarted {
        /// Mode of the submitted input.
        mode: InputMode,
        /// Submission time.
        timestamp: DateTime<Utc>,
    },

    /// The service returned a successful analysis.
    SubmitSucceeded {
        /// Completion time.
        timestamp: DateTime<Utc>,
    },

    /// The request failed at the transport or service level.
    SubmitFailed {
        /// User-facing failure message.
        message: String,
        /// Completion time.
        timestamp: DateTime<Utc>,
    },

    /// The in-flight request was aborted by teardown.
    SubmitCancelled {
        /// Cancellation time.
        timestamp: DateTime<Utc>,
    },

    /// A preview handle was released.
    PreviewRevoked {
        /// The released handle.
        handle: PreviewHandle,
    },

    /// A record was written to the history medium.
    RecordSaved {
        /// Record timestamp (epoch ms).
        record: i64,
        /// `true` if an entry with the same key was overwritten.
        overwrote: bool,
    },

    /// A record was removed from the history medium.
    RecordDeleted {
        /// Record timestamp (epoch ms).
        record: i64,
    },

    /// A history entry could not be parsed and was skipped.
    MalformedEntry {
        /// Storage key of the skipped entry.
        key: String,
        /// Parser error text.
        reason: String,
    },
}

impl AnalyzerEvent {
    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::SubmitStarted { .. } => "submit_started",
            Self::SubmitSucceeded { .. } => "submit_succeeded",
            Self::SubmitFailed { .. } => "submit_failed",
            Self::SubmitCancelled { .. } => "submit_cancelled",
            Self::PreviewRevoked { .. } => "preview_revoked",
            Self::RecordSaved { .. } => "record_saved",
            Self::RecordDeleted { .. } => "record_deleted",
            Self::MalformedEntry { .. } => "malformed_entry",
        }
    }
}
