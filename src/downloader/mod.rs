//! Core downloader implementation split into focused submodules.
//!
//! The `VideoDownloader` struct and its methods are organized by domain:
//! - [`info`] - Video metadata and resolution options
//! - [`runner`] - Job creation and asynchronous execution
//! - [`handoff`] - Artifact retrieval gating
//! - [`services`] - Background sweeper

mod handoff;
mod info;
mod runner;
mod services;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use handoff::ArtifactHandle;

use crate::config::Config;
use crate::engine::{VideoEngine, YtDlpEngine};
use crate::error::{Error, Result};
use crate::registry::JobRegistry;
use crate::types::{DownloadId, JobRecord};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
///
/// Owns the job registry and the engine; every API handler and embedding
/// consumer goes through this facade.
#[derive(Clone)]
pub struct VideoDownloader {
    /// Registry owning all job records
    pub(crate) registry: Arc<JobRegistry>,
    /// External downloader engine
    pub(crate) engine: Arc<dyn VideoEngine>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Semaphore limiting concurrent downloads (respects max_concurrent_downloads)
    pub(crate) concurrent_limit: Arc<tokio::sync::Semaphore>,
    /// Flag cleared during shutdown so no new jobs are accepted
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Token cancelling background services on shutdown
    pub(crate) shutdown_token: tokio_util::sync::CancellationToken,
}

impl VideoDownloader {
    /// Create a downloader with the default yt-dlp engine
    ///
    /// Locates the engine binary, creates the download directory, and
    /// starts the background sweeper.
    pub async fn new(config: Config) -> Result<Self> {
        let engine = YtDlpEngine::from_config(&config.engine).map_err(Error::Engine)?;
        Self::with_engine(config, Arc::new(engine)).await
    }

    /// Create a downloader around a custom engine implementation
    ///
    /// Useful for embedding with an alternative backend, and for tests
    /// driving the pipeline with a scripted engine.
    pub async fn with_engine(config: Config, engine: Arc<dyn VideoEngine>) -> Result<Self> {
        tokio::fs::create_dir_all(&config.download.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download.download_dir.display(),
                        e
                    ),
                ))
            })?;

        let registry = Arc::new(JobRegistry::new(config.jobs.retention));
        let concurrent_limit = Arc::new(tokio::sync::Semaphore::new(
            config.download.max_concurrent_downloads,
        ));

        let downloader = Self {
            registry,
            engine,
            config: Arc::new(config),
            concurrent_limit,
            accepting_new: Arc::new(AtomicBool::new(true)),
            shutdown_token: tokio_util::sync::CancellationToken::new(),
        };

        downloader.spawn_sweeper();

        Ok(downloader)
    }

    /// Read the current snapshot of a job
    pub async fn get_download(&self, id: &DownloadId) -> Result<JobRecord> {
        self.registry.get(id).await
    }

    /// Snapshot all jobs currently held by the registry, newest first
    pub async fn list_downloads(&self) -> Vec<JobRecord> {
        self.registry.list().await
    }

    /// Subscribe to change notifications for one job
    ///
    /// The receiver yields the job's current snapshot immediately and one
    /// snapshot per subsequent change; fails with `NotFound` for unknown
    /// ids. Dropping the receiver never affects the job.
    pub async fn watch(
        &self,
        id: &DownloadId,
    ) -> Result<tokio::sync::watch::Receiver<JobRecord>> {
        self.registry.watch(id).await
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Initiate a graceful shutdown
    ///
    /// Stops accepting new jobs and cancels background services. Jobs
    /// already running are left to finish: their artifacts stay
    /// retrievable until the process exits.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down: no longer accepting new downloads");
        self.accepting_new.store(false, Ordering::SeqCst);
        self.shutdown_token.cancel();
        Ok(())
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server runs concurrently with download processing and listens
    /// on the configured bind address (default: 127.0.0.1:6789).
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}
