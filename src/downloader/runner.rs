//! Job creation and asynchronous execution.
//!
//! `start_download` accepts a request, allocates the job record and
//! returns immediately; a spawned task then drives the engine through the
//! progress reporter to exactly one terminal transition. Engine failures
//! are converted into the job's `error` state and never escape the task.

use super::VideoDownloader;
use crate::engine::DownloadRequest;
use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use crate::registry::JobUpdate;
use crate::types::{DownloadId, JobRecord};
use crate::utils;
use std::sync::atomic::Ordering;

/// Buffer size for the engine progress channel
const PROGRESS_CHANNEL_BUFFER: usize = 64;

impl VideoDownloader {
    /// Accept a download request and start the job
    ///
    /// Validates the video reference, derives the artifact filename from
    /// the video title, creates the job record in `queued` state and
    /// spawns the runner task. Returns the freshly created record; all
    /// further observation goes through [`watch`](Self::watch) or
    /// [`get_download`](Self::get_download) using the record's id.
    pub async fn start_download(
        &self,
        video_ref: &str,
        resolution: &str,
    ) -> Result<JobRecord> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let video_id = utils::parse_video_id(video_ref)?;

        // The title is needed up front so the client learns its filename
        // in the accept response, same as the info endpoint would report.
        let details = self.engine.fetch_info(&video_id).await?;
        let filename = format!("{}.mp4", utils::sanitize_filename(&details.title));

        let record = self
            .registry
            .create(video_id.clone(), resolution, filename)
            .await;

        tracing::info!(
            download_id = %record.id,
            video_id = %video_id,
            resolution,
            "download accepted"
        );

        let downloader = self.clone();
        let id = record.id.clone();
        let request = DownloadRequest {
            video_id,
            resolution: resolution.to_string(),
            output_dir: self.config.download.download_dir.clone(),
        };
        tokio::spawn(async move {
            downloader.run_job(id, request).await;
        });

        Ok(record)
    }

    /// Drive one job from `queued` to a terminal state
    async fn run_job(&self, id: DownloadId, request: DownloadRequest) {
        // The job stays queued until a download slot frees up
        let permit = match self.concurrent_limit.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                // Semaphore closed: only happens when the process is
                // tearing down, fail the job rather than leaving it queued
                self.fail_job(&id, "downloader is shutting down").await;
                return;
            }
        };

        let reporter = ProgressReporter::new(self.registry.clone(), id.clone());

        // Mark the fetch as started before the first engine line arrives
        reporter
            .report(crate::engine::EngineProgress {
                percent: 0.0,
                phase: crate::engine::EnginePhase::Downloading,
                filename: None,
            })
            .await;

        let (tx, rx) = tokio::sync::mpsc::channel(PROGRESS_CHANNEL_BUFFER);
        let reporter_task = tokio::spawn(reporter.run(rx));

        let outcome = self.engine.download(request, tx).await;

        // The engine dropped its sender; drain the channel completely so
        // the terminal transition below cannot race a progress update
        if let Err(e) = reporter_task.await {
            tracing::error!(download_id = %id, error = %e, "progress reporter task panicked");
        }

        match outcome {
            Ok(outcome) => {
                if let Some(name) = outcome.filename {
                    // Refine the filename to what the engine actually wrote
                    if let Err(e) = self
                        .registry
                        .update(&id, JobUpdate::Filename(name))
                        .await
                    {
                        tracing::warn!(download_id = %id, error = %e, "failed to refine filename");
                    }
                }

                match self
                    .registry
                    .update(
                        &id,
                        JobUpdate::Completed {
                            artifact_path: outcome.artifact_path,
                            artifact_size: outcome.artifact_size,
                        },
                    )
                    .await
                {
                    Ok(record) => {
                        tracing::info!(
                            download_id = %id,
                            filename = %record.filename,
                            size = outcome.artifact_size,
                            "download completed"
                        );
                    }
                    Err(e) => {
                        tracing::error!(download_id = %id, error = %e, "failed to mark job completed");
                    }
                }
            }
            Err(e) => {
                tracing::error!(download_id = %id, error = %e, "engine reported failure");
                self.fail_job(&id, &e.to_string()).await;
            }
        }

        drop(permit);
    }

    /// Apply the terminal failure transition with a human-readable message
    async fn fail_job(&self, id: &DownloadId, message: &str) {
        if let Err(e) = self
            .registry
            .update(
                id,
                JobUpdate::Failed {
                    message: message.to_string(),
                },
            )
            .await
        {
            tracing::error!(download_id = %id, error = %e, "failed to mark job as failed");
        }
    }
}
