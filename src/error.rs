//! Analyzer error types with failure-category mapping.
//!
//! [`AnalyzerError`] is the central error type for the crate. Each variant
//! maps to an [`ErrorKind`] so callers can tell usage errors (rejected before
//! any I/O) apart from transient transport or service failures.

use crate::domain::InputMode;

/// Broad failure category of an [`AnalyzerError`].
///
/// | Kind           | Recovery                                          |
/// |----------------|---------------------------------------------------|
/// | `Precondition` | caller bug; fix the call, nothing was sent        |
/// | `Transport`    | network or body failure; a new submit may follow  |
/// | `Service`      | service said `success: false`; show the message   |
/// | `Storage`      | key-value medium failure                          |
/// | `Config`       | invalid configuration value                       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected synchronously before any I/O.
    Precondition,
    /// Network failure or unparseable response.
    Transport,
    /// Logical failure reported by the analysis service.
    Service,
    /// Key-value medium failure.
    Storage,
    /// Configuration failure.
    Config,
}

/// Client-side error enum.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// A request is already pending on this controller.
    #[error("an analysis is already in progress")]
    Busy,

    /// URL input was empty or the image had no bytes.
    #[error("input is empty")]
    EmptyInput,

    /// The submitted input kind does not match the controller's mode.
    #[error("input is for {input} mode but the analyzer is in {mode} mode")]
    ModeMismatch {
        /// Current controller mode.
        mode: InputMode,
        /// Mode implied by the submitted input.
        input: InputMode,
    },

    /// Image submit without a selected image.
    #[error("no image selected")]
    NoImageSelected,

    /// The controller has been torn down.
    #[error("analyzer session has been torn down")]
    TornDown,

    /// Network failure, non-JSON body or malformed response envelope.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with `success: false`.
    #[error("{0}")]
    Service(String),

    /// The in-flight request was aborted by teardown.
    #[error("analysis cancelled")]
    Cancelled,

    /// Key-value medium I/O failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// A record could not be encoded for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AnalyzerError {
    /// Returns the failure category for this variant.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Busy
            | Self::EmptyInput
            | Self::ModeMismatch { .. }
            | Self::NoImageSelected
            | Self::TornDown => ErrorKind::Precondition,
            Self::Transport(_) | Self::Cancelled => ErrorKind::Transport,
            Self::Service(_) => ErrorKind::Service,
            Self::Storage(_) | Self::Serialization(_) => ErrorKind::Storage,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns `true` if the error was raised before any I/O happened.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(self.kind(), ErrorKind::Precondition)
    }

    /// Returns the single message shown to the user.
    ///
    /// Service messages are passed through verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Service(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for AnalyzerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_message_is_verbatim() {
        let err = AnalyzerError::Service("unreadable label".to_string());
        assert_eq!(err.user_message(), "unreadable label");
        assert_eq!(err.kind(), ErrorKind::Service);
    }

    #[test]
    fn preconditions_are_classified() {
        assert!(AnalyzerError::Busy.is_precondition());
        assert!(AnalyzerError::EmptyInput.is_precondition());
        assert!(AnalyzerError::TornDown.is_precondition());
        assert!(
            AnalyzerError::ModeMismatch {
                mode: InputMode::Url,
                input: InputMode::Image,
            }
            .is_precondition()
        );
        assert!(!AnalyzerError::Transport("down".to_string()).is_precondition());
    }

    #[test]
    fn mode_mismatch_names_both_modes() {
        let err = AnalyzerError::ModeMismatch {
            mode: InputMode::Url,
            input: InputMode::Image,
        };
        assert_eq!(
            err.to_string(),
            "input is for image mode but the analyzer is in url mode"
        );
    }

    #[test]
    fn transport_message_is_prefixed() {
        let err = AnalyzerError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), "transport error: connection refused");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn io_errors_map_to_storage() {
        let err = AnalyzerError::from(std::io::Error::other("disk full"));
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
}
