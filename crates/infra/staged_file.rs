use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

/// Outcome of removing a staged file.
#[derive(Debug)]
pub enum Removal {
    Removed,
    AlreadyGone,
    Failed(io::Error),
}

/// Owns a locally staged temporary file and removes it exactly once.
///
/// Call [`StagedFile::remove`] once the file is no longer needed. If the
/// guard is dropped first (early return, cancelled future) the file is
/// removed synchronously in `Drop`.
#[derive(Debug)]
pub struct StagedFile {
    path: Option<PathBuf>,
}

impl StagedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Hands the path over without removing the file.
    pub fn into_path(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }

    pub async fn remove(mut self) -> Removal {
        let Some(path) = self.path.take() else {
            return Removal::AlreadyGone;
        };

        let removal = classify(tokio::fs::remove_file(&path).await);
        log_removal(&path, &removal);
        removal
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let removal = classify(std::fs::remove_file(&path));
            log_removal(&path, &removal);
        }
    }
}

fn classify(result: io::Result<()>) -> Removal {
    match result {
        Ok(()) => Removal::Removed,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Removal::AlreadyGone,
        Err(err) => Removal::Failed(err),
    }
}

fn log_removal(path: &Path, removal: &Removal) {
    match removal {
        Removal::Removed => debug!(local_path = %path.display(), "staged file removed"),
        Removal::AlreadyGone => {
            debug!(local_path = %path.display(), "staged file was already gone")
        }
        Removal::Failed(err) => warn!(
            local_path = %path.display(),
            error = ?err,
            "failed to remove staged file"
        ),
    }
}
