//! In-memory job registry
//!
//! The registry is the single owner of all [`JobRecord`]s and the only
//! component allowed to mutate them. Each record lives inside a
//! `tokio::sync::watch` channel: mutations go through
//! [`JobRegistry::update`], which validates the state machine before
//! publishing, so every subscriber always observes a complete, consistent
//! snapshot and per-id writes are serialized.

use crate::error::{JobError, Result};
use crate::types::{DownloadId, JobRecord, Status};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// A single mutation applied to a job record
#[derive(Clone, Debug)]
pub enum JobUpdate {
    /// Progress report from the engine; `status` must be a running state
    Progress {
        /// `Downloading` or `Processing`
        status: Status,
        /// Normalized percentage (0.0 to 100.0)
        percent: f32,
        /// Output filename, when the engine reported one with this update
        filename: Option<String>,
    },

    /// The engine confirmed the real output filename
    Filename(String),

    /// Terminal success: the artifact is fully written
    Completed {
        /// Where the artifact landed
        artifact_path: PathBuf,
        /// Artifact size in bytes
        artifact_size: u64,
    },

    /// Terminal failure with a human-readable message
    Failed {
        /// What went wrong
        message: String,
    },
}

/// Process-wide table of job records
///
/// Cheap to share behind an `Arc`; all access is async-safe. Records are
/// created by the job runner, mutated through [`update`](Self::update) and
/// garbage-collected by [`sweep`](Self::sweep) once they have been
/// terminal for longer than the retention window.
pub struct JobRegistry {
    jobs: RwLock<HashMap<DownloadId, watch::Sender<JobRecord>>>,
    retention: Duration,
}

impl JobRegistry {
    /// Create an empty registry with the given terminal-record retention
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            retention,
        }
    }

    /// Allocate a new job record in `Queued` state with a fresh unique id
    pub async fn create(
        &self,
        video_id: impl Into<String>,
        resolution: impl Into<String>,
        filename: impl Into<String>,
    ) -> JobRecord {
        let mut jobs = self.jobs.write().await;

        // UUID collisions are astronomically unlikely, but an id must
        // never refer to two jobs within the retention window.
        let id = loop {
            let id = DownloadId::generate();
            if !jobs.contains_key(&id) {
                break id;
            }
        };

        let record = JobRecord {
            id: id.clone(),
            video_id: video_id.into(),
            resolution: resolution.into(),
            status: Status::Queued,
            progress: 0.0,
            filename: filename.into(),
            error_message: None,
            artifact_path: None,
            artifact_size: None,
            created_at: Utc::now(),
            finished_at: None,
        };

        let (tx, _rx) = watch::channel(record.clone());
        jobs.insert(id, tx);

        record
    }

    /// Read the current snapshot of a job record
    pub async fn get(&self, id: &DownloadId) -> Result<JobRecord> {
        let jobs = self.jobs.read().await;
        jobs.get(id)
            .map(|tx| tx.borrow().clone())
            .ok_or_else(|| JobError::NotFound { id: id.to_string() }.into())
    }

    /// Subscribe to change notifications for a job
    ///
    /// The receiver yields the current snapshot immediately and then one
    /// snapshot per applied mutation, so late subscribers resume from the
    /// job's present state. Fails with `NotFound` before any channel is
    /// handed out.
    pub async fn watch(&self, id: &DownloadId) -> Result<watch::Receiver<JobRecord>> {
        let jobs = self.jobs.read().await;
        jobs.get(id)
            .map(|tx| tx.subscribe())
            .ok_or_else(|| JobError::NotFound { id: id.to_string() }.into())
    }

    /// Apply a state transition or progress update to a job
    ///
    /// Fails with `NotFound` for unknown ids and `InvalidTransition` for
    /// any mutation the state machine forbids: touching a terminal record,
    /// or moving backward along the success path. Progress is clamped to
    /// be non-decreasing. Subscribers are only notified when the mutation
    /// was accepted.
    pub async fn update(&self, id: &DownloadId, update: JobUpdate) -> Result<JobRecord> {
        let jobs = self.jobs.read().await;
        let tx = jobs
            .get(id)
            .ok_or_else(|| JobError::NotFound { id: id.to_string() })?;

        let mut outcome: std::result::Result<(), JobError> = Ok(());
        tx.send_if_modified(|record| match Self::apply(record, &update) {
            Ok(()) => true,
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome?;

        Ok(tx.borrow().clone())
    }

    /// Apply `update` to `record`, enforcing every invariant from the
    /// data model. Called inside the watch channel's send lock, so the
    /// mutation is atomic with respect to all readers.
    fn apply(record: &mut JobRecord, update: &JobUpdate) -> std::result::Result<(), JobError> {
        let requested = match update {
            JobUpdate::Progress { status, .. } => *status,
            JobUpdate::Filename(_) => record.status,
            JobUpdate::Completed { .. } => Status::Completed,
            JobUpdate::Failed { .. } => Status::Error,
        };

        if record.status.is_terminal() || !record.status.can_transition_to(requested) {
            return Err(JobError::InvalidTransition {
                id: record.id.to_string(),
                current: record.status,
                requested,
            });
        }

        match update {
            JobUpdate::Progress {
                status,
                percent,
                filename,
            } => {
                if !matches!(status, Status::Downloading | Status::Processing) {
                    return Err(JobError::InvalidTransition {
                        id: record.id.to_string(),
                        current: record.status,
                        requested: *status,
                    });
                }
                record.status = *status;
                record.progress = record.progress.max(percent.clamp(0.0, 100.0));
                if let Some(name) = filename {
                    record.filename = name.clone();
                }
            }
            JobUpdate::Filename(name) => {
                record.filename = name.clone();
            }
            JobUpdate::Completed {
                artifact_path,
                artifact_size,
            } => {
                record.status = Status::Completed;
                record.progress = 100.0;
                record.artifact_path = Some(artifact_path.clone());
                record.artifact_size = Some(*artifact_size);
                record.finished_at = Some(Utc::now());
            }
            JobUpdate::Failed { message } => {
                record.status = Status::Error;
                record.error_message = Some(message.clone());
                record.finished_at = Some(Utc::now());
            }
        }

        Ok(())
    }

    /// Remove records that have been terminal for longer than the
    /// retention window; returns the removed records so the caller can
    /// delete their artifacts
    pub async fn sweep(&self) -> Vec<JobRecord> {
        let retention = match chrono::Duration::from_std(self.retention) {
            Ok(d) => d,
            // An unrepresentable retention means "keep forever"
            Err(_) => return Vec::new(),
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(retention) else {
            return Vec::new();
        };

        let mut jobs = self.jobs.write().await;
        let expired: Vec<DownloadId> = jobs
            .iter()
            .filter(|(_, tx)| {
                let record = tx.borrow();
                record
                    .finished_at
                    .map(|finished| finished < cutoff)
                    .unwrap_or(false)
            })
            .map(|(id, _)| id.clone())
            .collect();

        expired
            .iter()
            .filter_map(|id| jobs.remove(id))
            .map(|tx| tx.borrow().clone())
            .collect()
    }

    /// Snapshot every record currently held, newest first
    pub async fn list(&self) -> Vec<JobRecord> {
        let jobs = self.jobs.read().await;
        let mut records: Vec<JobRecord> = jobs.values().map(|tx| tx.borrow().clone()).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Number of records currently held (live and recently terminal)
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Whether the registry holds no records
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
