//! Analyzer configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`). No request timeout is configured: latency is bounded by the
//! service or the ambient transport.

use std::path::PathBuf;

use reqwest::Url;

use crate::domain::event_bus::DEFAULT_EVENT_CAPACITY;
use crate::error::AnalyzerError;

/// Default base URL of the analysis service.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

/// Default location of the file-backed history medium.
pub const DEFAULT_HISTORY_PATH: &str = "analysis_history.json";

/// Top-level analyzer configuration.
///
/// Loaded once at startup via [`AnalyzerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Base URL of the analysis service (e.g. `http://localhost:5000`).
    pub service_url: Url,

    /// File backing the persistent history medium.
    pub history_path: PathBuf,

    /// `User-Agent` header sent to the service.
    pub user_agent: String,

    /// Capacity of the diagnostics broadcast channel.
    pub event_capacity: usize,
}

impl AnalyzerConfig {
    /// Builds a configuration for `service_url` with defaults elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Config`] if `service_url` is not an
    /// absolute URL.
    pub fn new(service_url: &str) -> Result<Self, AnalyzerError> {
        Ok(Self {
            service_url: parse_service_url(service_url)?,
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            user_agent: default_user_agent(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        })
    }

    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Config`] if `ANALYZER_SERVICE_URL` is set
    /// but is not an absolute URL.
    pub fn from_env() -> Result<Self, AnalyzerError> {
        dotenvy::dotenv().ok();

        let service_url = std::env::var("ANALYZER_SERVICE_URL")
            .unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string());
        let service_url = parse_service_url(&service_url)?;

        let history_path = std::env::var("ANALYZER_HISTORY_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_HISTORY_PATH), PathBuf::from);

        let user_agent =
            std::env::var("ANALYZER_USER_AGENT").unwrap_or_else(|_| default_user_agent());

        let event_capacity = parse_env("ANALYZER_EVENT_CAPACITY", DEFAULT_EVENT_CAPACITY);

        Ok(Self {
            service_url,
            history_path,
            user_agent,
            event_capacity,
        })
    }

    /// Replaces the history file location.
    #[must_use]
    pub fn with_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = path.into();
        self
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn parse_service_url(raw: &str) -> Result<Url, AnalyzerError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AnalyzerError::Config(format!("service url {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(AnalyzerError::Config(format!(
            "service url {raw:?} cannot be used as a base"
        )));
    }
    Ok(url)
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
