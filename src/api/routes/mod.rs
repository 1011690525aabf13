//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`videos`] — Video metadata lookup
//! - [`downloads`] — Job creation and snapshots
//! - [`progress`] — Server-sent progress event stream
//! - [`files`] — Artifact hand-off
//! - [`system`] — Health and OpenAPI

use crate::types::{ResolutionOption, VideoInfo};
use serde::{Deserialize, Serialize};

mod downloads;
mod files;
mod progress;
mod system;
mod videos;

// Re-export all handlers so `routes::function_name` continues to work
pub use downloads::*;
pub use files::*;
pub use progress::*;
pub use system::*;
pub use videos::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /get-video-info
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct VideoInfoRequest {
    /// Bare 11-character video id or a recognized video URL
    #[serde(rename = "videoId")]
    pub video_id: String,
}

/// Response for POST /get-video-info
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct VideoInfoResponse {
    /// Always true on the success path
    pub success: bool,

    /// Video metadata
    pub video_info: VideoInfo,

    /// Selectable renditions, best first
    pub resolutions: Vec<ResolutionOption>,
}

/// Request body for POST /start-download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadRequest {
    /// Bare 11-character video id or a recognized video URL
    #[serde(rename = "videoId")]
    pub video_id: String,

    /// Requested rendition (defaults to "best")
    #[serde(default = "default_resolution")]
    pub resolution: String,
}

fn default_resolution() -> String {
    "best".to_string()
}

/// Response for POST /start-download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadResponse {
    /// Always true on the success path
    pub success: bool,

    /// Handle for all further operations on this job
    pub download_id: String,

    /// Artifact filename derived from the video title
    pub filename: String,

    /// Where to subscribe for progress events
    pub progress_url: String,

    /// Where to retrieve the artifact once completed
    pub download_url: String,
}
