//! # tube-dl
//!
//! Embeddable backend library for video download applications.
//!
//! ## Design Philosophy
//!
//! tube-dl is designed to be:
//! - **Library-first** - No UI, purely a Rust crate for embedding
//! - **Event-driven** - Subscribers watch per-job change notifications, no polling required
//! - **Engine-agnostic** - The media fetch itself is delegated to a pluggable
//!   [`VideoEngine`](engine::VideoEngine) (yt-dlp out of the box)
//! - **Sensible defaults** - Works out of the box with zero configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use tube_dl::{Config, VideoDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = VideoDownloader::new(Config::default()).await?;
//!
//!     // Accept a job and watch it progress
//!     let record = downloader.start_download("dQw4w9WgXcQ", "720p").await?;
//!     let mut events = downloader.watch(&record.id).await?;
//!     while events.changed().await.is_ok() {
//!         let snapshot = events.borrow().clone();
//!         println!("{}: {:.0}%", snapshot.status, snapshot.progress);
//!         if snapshot.status.is_terminal() {
//!             break;
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// External engine abstraction and the yt-dlp implementation
pub mod engine;
/// Error types
pub mod error;
/// Progress reporting from the engine into the registry
pub mod progress;
/// In-memory job registry
pub mod registry;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{ApiConfig, Config, DownloadConfig, EngineConfig, JobsConfig};
pub use downloader::{ArtifactHandle, VideoDownloader};
pub use error::{ApiError, EngineError, Error, ErrorDetail, JobError, Result, ToHttpStatus};
pub use progress::ProgressReporter;
pub use registry::{JobRegistry, JobUpdate};
pub use types::{DownloadId, JobRecord, ProgressEvent, ResolutionOption, Status, VideoInfo};

/// Helper function to run the downloader with graceful signal handling.
///
/// Waits for a termination signal and then calls the downloader's
/// `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use tube_dl::{Config, VideoDownloader, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = VideoDownloader::new(Config::default()).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: VideoDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
