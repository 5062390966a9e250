//! reqwest implementation of [`AnalysisTransport`].

use reqwest::Url;
use reqwest::multipart::{Form, Part};

use super::AnalysisTransport;
use super::wire::{AnalyzeResponse, AnalyzeUrlBody, HealthStatus};
use crate::config::AnalyzerConfig;
use crate::domain::RequestInput;
use crate::error::AnalyzerError;

/// Path of the analysis endpoint.
pub const ANALYZE_PATH: &str = "/api/analyze";

/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/api/health";

/// Multipart field carrying the image bytes.
pub const IMAGE_FIELD: &str = "image";

/// HTTP transport for the analysis service.
///
/// URL input is sent as a JSON body, image input as a single-part
/// multipart form. No timeout and no retry.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Builds a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AnalyzerError::Config(format!("http client: {e}")))?;
        Ok(Self::with_client(http, config.service_url.clone()))
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, AnalyzerError> {
        self.base_url
            .join(path)
            .map_err(|e| AnalyzerError::Config(format!("endpoint {path}: {e}")))
    }

    fn analyze_request(
        &self,
        url: Url,
        input: &RequestInput,
    ) -> Result<reqwest::RequestBuilder, AnalyzerError> {
        let request = match input {
            RequestInput::Url(product_url) => self.http.post(url).json(&AnalyzeUrlBody {
                url: product_url.as_str(),
            }),
            RequestInput::Image(upload) => {
                let part = Part::bytes(upload.bytes().to_vec())
                    .file_name(upload.file_name().to_string())
                    .mime_str(upload.mime_type())?;
                self.http
                    .post(url)
                    .multipart(Form::new().part(IMAGE_FIELD, part))
            }
        };
        Ok(request)
    }
}

impl AnalysisTransport for HttpTransport {
    async fn analyze(&self, input: &RequestInput) -> Result<AnalyzeResponse, AnalyzerError> {
        let url = self.endpoint(ANALYZE_PATH)?;
        let request = self.analyze_request(url, input)?;

        let response = request.send().await?;
        let status = response.status();
        // The service reports validation failures as 4xx with a normal
        // envelope, so the body is parsed whatever the status.
        let body = response.bytes().await?;
        let envelope = serde_json::from_slice::<AnalyzeResponse>(&body).map_err(|e| {
            AnalyzerError::Transport(format!("unparseable response (HTTP {status}): {e}"))
        })?;

        tracing::debug!(%status, success = envelope.success, "analysis response received");
        Ok(envelope)
    }

    async fn health(&self) -> Result<HealthStatus, AnalyzerError> {
        let url = self.endpoint(HEALTH_PATH)?;
        let response = self.http.get(url).send().await?.error_for_status()?;
        let status = response.json::<HealthStatus>().await?;
        Ok(status)
    }
}
