use std::{collections::BTreeMap, path::Path, str::FromStr};

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::Utc;
use mime_guess::MimeGuess;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::{
    repositories::media_host::MediaHostClient, value_objects::media_upload::UploadResult,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";

/// Cloudinary decides image / video / raw from the payload.
const AUTO_RESOURCE_TYPE: &str = "auto";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl FromStr for SignatureAlgorithm {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => bail!("unsupported signature algorithm: {other}"),
        }
    }
}

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: String,
    pub signature_algorithm: SignatureAlgorithm,
}

impl CloudinaryConfig {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            cloud_name,
            api_key,
            api_secret,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            signature_algorithm: SignatureAlgorithm::default(),
        }
    }

    fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("cloud_name", &self.cloud_name),
            ("api_key", &self.api_key),
            ("api_secret", &self.api_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

// The secret never reaches logs.
impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}

pub struct CloudinaryClient {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build Cloudinary http client")?;

        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.missing_credentials().is_empty()
    }

    fn upload_endpoint(&self) -> String {
        format!(
            "{}/v1_1/{}/{}/upload",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            AUTO_RESOURCE_TYPE
        )
    }

    async fn build_form(&self, local_path: &Path, timestamp: i64) -> Result<Form> {
        let bytes = tokio::fs::read(local_path)
            .await
            .with_context(|| format!("failed to read {}", local_path.display()))?;

        let file_name = local_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let content_type = MimeGuess::from_path(local_path)
            .first_raw()
            .unwrap_or("application/octet-stream");

        let file_part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type)
            .context("invalid mime type for upload")?;

        let mut params = BTreeMap::new();
        params.insert("timestamp", timestamp.to_string());
        let signature = sign_params(
            &params,
            &self.config.api_secret,
            self.config.signature_algorithm,
        );

        Ok(Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", signature))
    }
}

#[async_trait]
impl MediaHostClient for CloudinaryClient {
    async fn ingest(&self, local_path: &Path) -> Result<UploadResult> {
        let missing = self.config.missing_credentials();
        if !missing.is_empty() {
            bail!(
                "Cloudinary credentials are not configured (missing: {})",
                missing.join(", ")
            );
        }

        let form = self.build_form(local_path, Utc::now().timestamp()).await?;

        debug!(
            local_path = %local_path.display(),
            cloud_name = %self.config.cloud_name,
            "cloudinary: sending upload request"
        );

        // Upload API reference:
        // https://cloudinary.com/documentation/image_upload_api_reference#upload
        let response = self
            .client
            .post(self.upload_endpoint())
            .multipart(form)
            .send()
            .await
            .context("failed to reach Cloudinary")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read Cloudinary response body")?;

        if !status.is_success() {
            return Err(map_error_response(status.as_u16(), &body));
        }

        let result: UploadResult = serde_json::from_str(&body)
            .context("Cloudinary returned an unexpected upload response")?;

        if result.url.trim().is_empty() {
            bail!("Cloudinary upload response has an empty url");
        }

        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn map_error_response(status: u16, body: &str) -> anyhow::Error {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => anyhow!(
            "Cloudinary rejected the upload (status {}): {}",
            status,
            envelope.error.message
        ),
        Err(_) => {
            // Keep a short preview of the response body for debugging.
            let preview = body.trim().chars().take(512).collect::<String>();
            anyhow!(
                "Cloudinary rejected the upload (status {}); body={}",
                status,
                preview
            )
        }
    }
}

/// Builds the string to sign: sorted `key=value` pairs joined with `&`
/// followed directly by the API secret.
fn string_to_sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let joined = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}{}", joined, api_secret)
}

fn sign_params(
    params: &BTreeMap<&str, String>,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let payload = string_to_sign(params, api_secret);
    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}
