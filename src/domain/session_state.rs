//! Observable state of one analysis session.

use serde::Serialize;

use super::{AnalysisPayload, InputMode, PreviewHandle};

/// Outcome of the most recent submit.
///
/// Pending never carries a stale error or result: entering `Pending`
/// discards whatever the previous outcome was.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum AnalysisState {
    /// Nothing submitted yet, or the last request was cancelled.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The last request succeeded with this payload.
    Succeeded(AnalysisPayload),
    /// The last request failed with this user-facing message.
    Failed(String),
}

impl AnalysisState {
    /// Returns `true` while a request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The last error message, if the last request failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// The last payload, if the last request succeeded.
    #[must_use]
    pub const fn last_result(&self) -> Option<&AnalysisPayload> {
        match self {
            Self::Succeeded(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Point-in-time copy of a controller's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Current input mode.
    pub mode: InputMode,
    /// Outcome of the most recent submit.
    pub state: AnalysisState,
    /// Preview of the selected image, if any.
    pub preview: Option<PreviewHandle>,
}

impl SessionSnapshot {
    /// Shorthand for `self.state.is_pending()`.
    #[must_use]
    pub const fn pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Shorthand for `self.state.last_error()`.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error()
    }

    /// Shorthand for `self.state.last_result()`.
    #[must_use]
    pub const fn last_result(&self) -> Option<&AnalysisPayload> {
        self.state.last_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_match_variant() {
        assert!(AnalysisState::Pending.is_pending());
        assert!(!AnalysisState::Idle.is_pending());

        let failed = AnalysisState::Failed("unreadable label".to_string());
        assert_eq!(failed.last_error(), Some("unreadable label"));
        assert!(failed.last_result().is_none());

        let payload = AnalysisPayload::new(json!({ "analysis": {} }));
        let succeeded = AnalysisState::Succeeded(payload.clone());
        assert_eq!(succeeded.last_result(), Some(&payload));
        assert!(succeeded.last_error().is_none());
    }

    #[test]
    fn serializes_with_status_tag() {
        let value = serde_json::to_value(AnalysisState::Failed("boom".to_string())).ok();
        assert_eq!(value, Some(json!({ "status": "failed", "value": "boom" })));

        let idle = serde_json::to_value(AnalysisState::Idle).ok();
        assert_eq!(idle, Some(json!({ "status": "idle" })));
    }

    #[test]
    fn snapshot_shorthands() {
        let snapshot = SessionSnapshot {
            mode: InputMode::Url,
            state: AnalysisState::Pending,
            preview: None,
        };
        assert!(snapshot.pending());
        assert!(snapshot.last_error().is_none());
        assert!(snapshot.last_result().is_none());
    }
}
