//! Wire DTOs for the analysis service.

use serde::{Deserialize, Serialize};

use crate::domain::AnalysisPayload;
use crate::error::AnalyzerError;

/// JSON body of a URL-mode `POST /api/analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeUrlBody<'a> {
    /// Product page URL.
    pub url: &'a str,
}

/// Response envelope of `POST /api/analyze`.
///
/// ```json
/// { "success": true, "data": { "extracted_data": {}, "analysis": {} } }
/// { "success": false, "error": "URL is required" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Logical success flag.
    pub success: bool,
    /// Payload, present when `success` is `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalysisPayload>,
    /// User-facing message, present when `success` is `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeResponse {
    /// Successful envelope carrying `data`.
    #[must_use]
    pub const fn success(data: AnalysisPayload) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed envelope carrying `message`.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Interprets the envelope.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Service`] with the service's message when
    /// `success` is `false`, and [`AnalyzerError::Transport`] when the
    /// envelope breaks its own contract (success without data, failure
    /// without a message).
    pub fn into_result(self) -> Result<AnalysisPayload, AnalyzerError> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (true, None, _) => Err(AnalyzerError::Transport(
                "malformed response: success without data".to_string(),
            )),
            (false, _, Some(message)) => Err(AnalyzerError::Service(message)),
            (false, _, None) => Err(AnalyzerError::Transport(
                "malformed response: failure without error message".to_string(),
            )),
        }
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"healthy"` when the service is up.
    pub status: String,
}

impl HealthStatus {
    /// Returns `true` if the service reports itself healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> AnalyzeResponse {
        let Ok(response) = serde_json::from_value(value) else {
            panic!("envelope should parse");
        };
        response
    }

    #[test]
    fn success_yields_data() {
        let response = parse(json!({
            "success": true,
            "data": { "extracted_data": { "ingredients": ["sugar"] }, "analysis": {} }
        }));
        let Ok(data) = response.into_result() else {
            panic!("expected success");
        };
        assert_eq!(data.pointer("/extracted_data/ingredients/0"), Some(&json!("sugar")));
    }

    #[test]
    fn failure_yields_service_message() {
        let response = parse(json!({ "success": false, "error": "unreadable label" }));
        let Err(AnalyzerError::Service(message)) = response.into_result() else {
            panic!("expected service error");
        };
        assert_eq!(message, "unreadable label");
    }

    #[test]
    fn null_data_on_success_is_malformed() {
        let response = parse(json!({ "success": true, "data": null }));
        assert!(matches!(
            response.into_result(),
            Err(AnalyzerError::Transport(_))
        ));
    }

    #[test]
    fn failure_without_message_is_malformed() {
        let response = parse(json!({ "success": false }));
        assert!(matches!(
            response.into_result(),
            Err(AnalyzerError::Transport(_))
        ));
    }

    #[test]
    fn missing_success_flag_does_not_parse() {
        let result = serde_json::from_value::<AnalyzeResponse>(json!({ "data": {} }));
        assert!(result.is_err());
    }

    #[test]
    fn url_body_shape() {
        let body = serde_json::to_value(AnalyzeUrlBody {
            url: "http://example.com/p",
        })
        .ok();
        assert_eq!(body, Some(json!({ "url": "http://example.com/p" })));
    }

    #[test]
    fn health_status() {
        assert!(HealthStatus { status: "healthy".to_string() }.is_healthy());
        assert!(!HealthStatus { status: "degraded".to_string() }.is_healthy());
    }
}
