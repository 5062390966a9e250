//! Client side of the remote analysis service.
//!
//! [`AnalysisTransport`] is the seam between the session controller and the
//! network. [`HttpTransport`] is the reqwest implementation; tests supply
//! scripted transports.

use std::future::Future;

pub mod http;
pub mod wire;

pub use http::HttpTransport;
pub use wire::{AnalyzeResponse, HealthStatus};

use crate::domain::RequestInput;
use crate::error::AnalyzerError;

/// Sends analysis requests to the remote service.
///
/// Implementations issue exactly one call per invocation and never retry.
pub trait AnalysisTransport: Send + Sync {
    /// Sends one `POST /api/analyze` and returns the parsed envelope.
    ///
    /// Logical failures (`success: false`) are returned as `Ok`; the caller
    /// interprets the envelope.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Transport`] on network failure or a body
    /// that is not a response envelope.
    fn analyze(
        &self,
        input: &RequestInput,
    ) -> impl Future<Output = Result<AnalyzeResponse, AnalyzerError>> + Send;

    /// Queries `GET /api/health`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Transport`] if the service is unreachable
    /// or answers with something other than a health document.
    fn health(&self) -> impl Future<Output = Result<HealthStatus, AnalyzerError>> + Send;
}
