//! Core types for tube-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Unique identifier for a download job
///
/// Generated as a UUID v4 at job creation and used as the sole handle for
/// progress streaming and artifact retrieval.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct DownloadId(pub String);

impl DownloadId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DownloadId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DownloadId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for DownloadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Download job status
///
/// The success path is `Queued -> Downloading -> Processing -> Completed`;
/// any non-terminal state may move to `Error`. `Completed` and `Error` are
/// terminal: no transition leaves them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Accepted, waiting for a download slot
    Queued,
    /// Engine is fetching media
    Downloading,
    /// Engine finished fetching, finalizing the artifact
    Processing,
    /// Artifact is ready for hand-off
    Completed,
    /// Job failed with an error message
    Error,
}

impl Status {
    /// Whether this status is terminal (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Error)
    }

    /// Position along the success path, used to enforce forward-only moves
    fn rank(&self) -> u8 {
        match self {
            Status::Queued => 0,
            Status::Downloading => 1,
            Status::Processing => 2,
            Status::Completed => 3,
            // Error is off the success path; reachable from any non-terminal state
            Status::Error => 4,
        }
    }

    /// Whether a transition from `self` to `next` is legal
    ///
    /// Staying in the same state is not a transition and always allowed
    /// (progress updates mutate `progress` without moving the machine).
    /// Success-path moves may skip states forward but never backward.
    pub fn can_transition_to(&self, next: Status) -> bool {
        if self.is_terminal() {
            return *self == next;
        }
        match next {
            Status::Error => true,
            _ => next.rank() >= self.rank(),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Queued => "queued",
            Status::Downloading => "downloading",
            Status::Processing => "processing",
            Status::Completed => "completed",
            Status::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// In-memory state of one download job
///
/// Snapshots of this record are what progress subscribers observe; the
/// registry is the only writer. Invariants (enforced by
/// [`crate::registry::JobRegistry::update`]):
/// - `error_message` is `Some` iff `status == Error`
/// - `artifact_path`/`artifact_size` are `Some` iff `status == Completed`
/// - `progress` never decreases while the job is non-terminal
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JobRecord {
    /// Unique job identifier
    pub id: DownloadId,

    /// Video id the job was created for
    pub video_id: String,

    /// Requested rendition (e.g. "720p" or "best")
    pub resolution: String,

    /// Current status
    pub status: Status,

    /// Progress percentage (0.0 to 100.0)
    pub progress: f32,

    /// Target artifact name; derived from the video title at creation and
    /// refined once the engine confirms the real output name
    pub filename: String,

    /// Error message (set only when `status == Error`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Location of the finished artifact (set only when `status == Completed`)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub artifact_path: Option<PathBuf>,

    /// Size of the finished artifact in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_size: Option<u64>,

    /// When the job was accepted
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,

    /// When the job reached a terminal state (drives retention sweeping)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Progress event pushed to a streaming client
///
/// One event is emitted whenever the job's `status` or `progress` changes;
/// the terminal event carries either the final filename or the error
/// message, after which the stream closes.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressEvent {
    /// Progress percentage (0.0 to 100.0)
    pub progress: f32,

    /// Current job status
    pub status: Status,

    /// Artifact filename, once known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Error message (only on `status == error`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&JobRecord> for ProgressEvent {
    fn from(record: &JobRecord) -> Self {
        Self {
            progress: record.progress,
            status: record.status,
            filename: Some(record.filename.clone()),
            error: record.error_message.clone(),
        }
    }
}

/// Video metadata returned by the info endpoint
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoInfo {
    /// The normalized video id
    pub video_id: String,

    /// Video title
    pub title: String,

    /// Thumbnail URL
    pub thumbnail: String,

    /// Human-readable duration (e.g. "12:34"), when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// A selectable rendition offered to the client
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResolutionOption {
    /// Machine value passed back to start a download (e.g. "720p", "best")
    pub value: String,

    /// Display label (e.g. "720p (HD)")
    pub label: String,
}
