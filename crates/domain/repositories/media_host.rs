use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::media_upload::UploadResult;

/// Remote service that stores media and hands back a retrievable address.
#[async_trait]
#[automock]
pub trait MediaHostClient {
    /// Sends the file at `local_path` to the host, letting the host detect
    /// the resource kind. Exactly one remote attempt per call.
    async fn ingest(&self, local_path: &Path) -> Result<UploadResult>;
}
