//! Artifact retrieval gating.
//!
//! Hand-off is allowed only once the job's terminal-success transition is
//! visible through the registry: the runner publishes `completed` strictly
//! after the engine has finished writing and renaming the artifact, so an
//! opened handle can never refer to a half-written file.

use super::VideoDownloader;
use crate::error::{Error, JobError, Result};
use crate::types::DownloadId;

/// An opened artifact ready to be streamed to a client
#[derive(Debug)]
pub struct ArtifactHandle {
    /// The opened artifact file
    pub file: tokio::fs::File,

    /// Name the client should save the artifact under
    pub filename: String,

    /// Artifact size in bytes
    pub size: u64,

    /// MIME type guessed from the filename
    pub content_type: String,
}

impl VideoDownloader {
    /// Open a completed job's artifact for streaming
    ///
    /// Fails with `NotFound` for unknown ids, `NotReady` while the job is
    /// still running, and `Failed` when the job terminated in error.
    /// Retrieval is repeatable: the artifact stays on disk until the
    /// sweeper collects the terminal record.
    pub async fn open_artifact(&self, id: &DownloadId) -> Result<ArtifactHandle> {
        let record = self.registry.get(id).await?;

        if record.status == crate::types::Status::Error {
            return Err(JobError::Failed {
                id: id.to_string(),
                message: record
                    .error_message
                    .unwrap_or_else(|| "download failed".to_string()),
            }
            .into());
        }

        if record.status != crate::types::Status::Completed {
            return Err(JobError::NotReady {
                id: id.to_string(),
                status: record.status,
            }
            .into());
        }

        // Invariant: a completed record always carries its artifact location
        let path = record.artifact_path.ok_or_else(|| {
            Error::Other(format!("completed job {id} has no artifact location"))
        })?;
        let size = record.artifact_size.unwrap_or(0);

        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            tracing::error!(download_id = %id, path = %path.display(), error = %e, "artifact missing on disk");
            Error::Io(e)
        })?;

        let content_type = mime_guess::from_path(&record.filename)
            .first_or_octet_stream()
            .to_string();

        tracing::debug!(
            download_id = %id,
            filename = %record.filename,
            size,
            "handing off artifact"
        );

        Ok(ArtifactHandle {
            file,
            filename: record.filename,
            size,
            content_type,
        })
    }
}
