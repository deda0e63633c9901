use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Descriptor returned by the media host after a successful ingest.
///
/// Only `url` and `public_id` are guaranteed. Everything else the provider
/// sends back is kept so the caller receives the full descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub url: String,
    pub public_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UploadResult {
    pub fn new(url: impl Into<String>, public_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            public_id: public_id.into(),
            secure_url: None,
            resource_type: None,
            format: None,
            bytes: None,
            width: None,
            height: None,
            duration: None,
            created_at: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    /// No local path was supplied. Not a failure, nothing was touched.
    #[error("no local file path supplied")]
    NoInput,

    #[error("upload to media host failed: {0}")]
    UploadFailure(#[source] anyhow::Error),
}

impl UploadError {
    pub fn is_no_input(&self) -> bool {
        matches!(self, UploadError::NoInput)
    }
}
