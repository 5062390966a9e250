//! What the user asked to analyze.
//!
//! [`RequestInput`] is either a product page URL or a locally selected
//! image. The image's preview handle is owned separately by the controller
//! and never travels with the request.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;

/// Input mode of an analysis session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Analyze a product page by URL.
    #[default]
    Url,
    /// Analyze an uploaded product photograph.
    Image,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => f.write_str("url"),
            Self::Image => f.write_str("image"),
        }
    }
}

/// Raw image bytes selected by the user, with the metadata needed to
/// upload them as a multipart file part.
///
/// Cloning is cheap: the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    bytes: Arc<[u8]>,
    file_name: String,
    mime_type: String,
}

impl ImageUpload {
    /// Creates an upload, inferring the MIME type from the file extension.
    #[must_use]
    pub fn new(bytes: impl Into<Arc<[u8]>>, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for_file_name(&file_name).to_string();
        Self {
            bytes: bytes.into(),
            file_name,
            mime_type,
        }
    }

    /// Overrides the inferred MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Reads an image from disk.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Storage`] if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(bytes, file_name))
    }

    /// Image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File name sent with the multipart part.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type sent with the multipart part.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Number of bytes in the image.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the image has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Image bodies can be megabytes; keep them out of logs.
impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn mime_for_file_name(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// A single analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestInput {
    /// Product page URL.
    Url(String),
    /// Product photograph.
    Image(ImageUpload),
}

impl RequestInput {
    /// Convenience constructor for URL input.
    #[must_use]
    pub fn url(value: impl Into<String>) -> Self {
        Self::Url(value.into())
    }

    /// The mode this input belongs to.
    #[must_use]
    pub const fn mode(&self) -> InputMode {
        match self {
            Self::Url(_) => InputMode::Url,
            Self::Image(_) => InputMode::Image,
        }
    }

    /// Checks that the input carries something to analyze.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::EmptyInput`] for a blank URL or an image
    /// with no bytes.
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        let empty = match self {
            Self::Url(url) => url.trim().is_empty(),
            Self::Image(upload) => upload.is_empty(),
        };
        if empty {
            return Err(AnalyzerError::EmptyInput);
        }
        Ok(())
    }
}
