use std::{path::Path, sync::Arc};

use crates::{
    domain::{
        repositories::media_host::MediaHostClient,
        value_objects::media_upload::{UploadError, UploadResult},
    },
    infra::staged_file::StagedFile,
};
use tracing::{debug, info, warn};

/// Moves one locally staged file to the media host and always removes the
/// local copy once the remote call has settled.
pub struct MediaUploadUseCase<H>
where
    H: MediaHostClient + Send + Sync + 'static,
{
    media_host: Arc<H>,
}

impl<H> MediaUploadUseCase<H>
where
    H: MediaHostClient + Send + Sync + 'static,
{
    pub fn new(media_host: Arc<H>) -> Self {
        Self { media_host }
    }

    pub async fn upload(&self, local_file_path: Option<&Path>) -> Result<UploadResult, UploadError> {
        let Some(local_path) = local_file_path.filter(|path| !path.as_os_str().is_empty()) else {
            debug!("media_upload: no local file path supplied");
            return Err(UploadError::NoInput);
        };

        let staged = StagedFile::new(local_path);
        let outcome = self.media_host.ingest(staged.path()).await;
        // Removal outcome never overrides the ingest outcome; it is logged by the guard.
        staged.remove().await;

        match outcome {
            Ok(result) => {
                info!(
                    local_path = %local_path.display(),
                    public_id = %result.public_id,
                    url = %result.url,
                    "media_upload: file uploaded"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(
                    local_path = %local_path.display(),
                    error = ?err,
                    "media_upload: upload failed"
                );
                Err(UploadError::UploadFailure(err))
            }
        }
    }

    /// Same as [`Self::upload`] with every failure collapsed to `None`.
    pub async fn upload_or_none(&self, local_file_path: Option<&Path>) -> Option<UploadResult> {
        self.upload(local_file_path).await.ok()
    }
}
