//! Progress reporting from the engine into the registry
//!
//! The [`ProgressReporter`] is the only bridge between the external
//! engine's progress messages and the job state machine: it normalizes
//! engine units onto the 0-100 scale, maps phase signals onto statuses
//! and performs exactly one registry update per message. Late messages
//! arriving after the job terminated are dropped silently.

use crate::engine::{EnginePhase, EngineProgress};
use crate::error::{Error, JobError};
use crate::registry::{JobRegistry, JobUpdate};
use crate::types::{DownloadId, Status};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Percentage recorded the moment the engine starts fetching
const START_PERCENT: f32 = 5.0;

/// The fetch phase occupies the 5-95 band; the remainder belongs to
/// post-processing and the final completed transition
const FETCH_BAND: f32 = 0.9;

/// Percentage reported while the engine finalizes the artifact
const PROCESSING_PERCENT: f32 = 95.0;

/// Adapter translating engine progress messages into registry updates
pub struct ProgressReporter {
    registry: Arc<JobRegistry>,
    id: DownloadId,
}

impl ProgressReporter {
    /// Create a reporter bound to one job
    pub fn new(registry: Arc<JobRegistry>, id: DownloadId) -> Self {
        Self { registry, id }
    }

    /// Normalize an engine message onto the job's status and 0-100 scale
    ///
    /// The engine's own fetch percentage is scaled into the 5-95 band so
    /// that "engine started" and "finalizing" remain visible as distinct
    /// stages, matching what subscribers expect to see.
    pub fn normalize(progress: &EngineProgress) -> (Status, f32) {
        match progress.phase {
            EnginePhase::Downloading => {
                let scaled = START_PERCENT + progress.percent.clamp(0.0, 100.0) * FETCH_BAND;
                (Status::Downloading, scaled.min(PROCESSING_PERCENT))
            }
            EnginePhase::PostProcessing => (Status::Processing, PROCESSING_PERCENT),
        }
    }

    /// Apply one engine message as a single registry update
    ///
    /// `InvalidTransition` means the job already terminated while this
    /// message was in flight; per the push-update contract such stragglers
    /// are dropped, not errors.
    pub async fn report(&self, progress: EngineProgress) {
        let (status, percent) = Self::normalize(&progress);
        let update = JobUpdate::Progress {
            status,
            percent,
            filename: progress.filename,
        };

        match self.registry.update(&self.id, update).await {
            Ok(_) => {}
            Err(Error::Job(JobError::InvalidTransition { .. })) => {
                tracing::debug!(download_id = %self.id, "dropping progress update for terminal job");
            }
            Err(e) => {
                tracing::warn!(download_id = %self.id, error = %e, "failed to apply progress update");
            }
        }
    }

    /// Drain a progress channel until the engine drops its sender
    ///
    /// The runner awaits this before applying the terminal transition, so
    /// no progress update can race past the end of the job.
    pub async fn run(self, mut rx: mpsc::Receiver<EngineProgress>) {
        while let Some(progress) = rx.recv().await {
            self.report(progress).await;
        }
    }
}
