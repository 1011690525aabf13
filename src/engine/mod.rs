//! External downloader engine abstraction
//!
//! The core job machinery never talks to yt-dlp directly: it drives a
//! [`VideoEngine`] trait object, and the engine reports progress as typed
//! messages over an mpsc channel. This keeps every engine quirk (argument
//! building, output parsing, process management) out of the state machine
//! and makes the whole pipeline testable with a scripted engine.

use crate::error::EngineError;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::mpsc;

mod ytdlp;

pub use ytdlp::YtDlpEngine;

/// Phase signal accompanying an engine progress report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnginePhase {
    /// Media bytes are being fetched
    Downloading,
    /// Fetch finished; the engine is merging/remuxing the output
    PostProcessing,
}

/// One inbound progress message from the engine
#[derive(Clone, Debug)]
pub struct EngineProgress {
    /// Raw engine percentage for the current phase (0.0 to 100.0)
    pub percent: f32,

    /// Which phase the engine is in
    pub phase: EnginePhase,

    /// Output filename, once the engine knows it
    pub filename: Option<String>,
}

/// Video metadata as reported by the engine
#[derive(Clone, Debug)]
pub struct VideoDetails {
    /// The video id the metadata belongs to
    pub video_id: String,

    /// Video title
    pub title: String,

    /// Thumbnail URL, when the engine reports one
    pub thumbnail: Option<String>,

    /// Human-readable duration, when known
    pub duration: Option<String>,

    /// Distinct video heights available (pixels), unsorted
    pub heights: Vec<u32>,
}

/// Parameters for one download run
#[derive(Clone, Debug)]
pub struct DownloadRequest {
    /// The video to fetch
    pub video_id: String,

    /// Requested rendition ("720p", "best", ...)
    pub resolution: String,

    /// Directory the artifact must land in
    pub output_dir: PathBuf,
}

/// Result of a successful engine run
#[derive(Clone, Debug)]
pub struct EngineOutcome {
    /// Where the finished artifact was written
    pub artifact_path: PathBuf,

    /// Artifact size in bytes
    pub artifact_size: u64,

    /// The actual output filename, if it differs from the requested one
    pub filename: Option<String>,
}

/// An external downloader engine
///
/// Implementations run without blocking the registry or other jobs and
/// report progress through the provided channel. A dropped receiver must
/// not abort the run: the job completes regardless of who is listening.
#[async_trait]
pub trait VideoEngine: Send + Sync {
    /// Engine name for logs and diagnostics
    fn name(&self) -> &str;

    /// Fetch metadata (title, thumbnail, available heights) for a video
    async fn fetch_info(&self, video_id: &str) -> Result<VideoDetails, EngineError>;

    /// Fetch the media itself, streaming progress messages as it goes
    async fn download(
        &self,
        request: DownloadRequest,
        progress: mpsc::Sender<EngineProgress>,
    ) -> Result<EngineOutcome, EngineError>;
}
