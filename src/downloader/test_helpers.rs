//! Test helpers: a scripted engine and downloader construction.

use crate::config::Config;
use crate::downloader::VideoDownloader;
use crate::engine::{
    DownloadRequest, EngineOutcome, EngineProgress, VideoDetails, VideoEngine,
};
use crate::error::EngineError;
use crate::types::{DownloadId, JobRecord};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc};

/// What a scripted download run should end with
#[derive(Clone)]
pub(crate) enum MockOutcome {
    /// Write `media:{video_id}` to disk and succeed
    Success,
    /// Fail with this message
    Failure(String),
}

/// A fully scripted engine: emits the configured progress steps, then
/// optionally parks on `gate` until the test releases it, then finishes
/// with the configured outcome.
pub(crate) struct MockEngine {
    pub title: String,
    pub thumbnail: Option<String>,
    pub heights: Vec<u32>,
    pub steps: Vec<EngineProgress>,
    pub outcome: MockOutcome,
    pub gate: Option<Arc<Notify>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self {
            title: "Test Video".to_string(),
            thumbnail: Some("https://example.com/thumb.jpg".to_string()),
            heights: vec![360, 720, 1080],
            steps: Vec::new(),
            outcome: MockOutcome::Success,
            gate: None,
        }
    }
}

#[async_trait]
impl VideoEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_info(&self, video_id: &str) -> Result<VideoDetails, EngineError> {
        Ok(VideoDetails {
            video_id: video_id.to_string(),
            title: self.title.clone(),
            thumbnail: self.thumbnail.clone(),
            duration: Some("3:32".to_string()),
            heights: self.heights.clone(),
        })
    }

    async fn download(
        &self,
        request: DownloadRequest,
        progress: mpsc::Sender<EngineProgress>,
    ) -> Result<EngineOutcome, EngineError> {
        for step in &self.steps {
            progress.send(step.clone()).await.ok();
        }

        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }

        match &self.outcome {
            MockOutcome::Success => {
                let content = format!("media:{}", request.video_id);
                let filename = format!("{}.mp4", self.title.replace(' ', "_"));
                let path = request
                    .output_dir
                    .join(format!("{}_{filename}", uuid::Uuid::new_v4()));
                tokio::fs::write(&path, content.as_bytes())
                    .await
                    .map_err(|e| EngineError::DownloadFailed(e.to_string()))?;

                Ok(EngineOutcome {
                    artifact_path: path,
                    artifact_size: content.len() as u64,
                    filename: Some(filename),
                })
            }
            MockOutcome::Failure(message) => {
                Err(EngineError::DownloadFailed(message.clone()))
            }
        }
    }
}

/// Build a downloader over a scripted engine inside a temp directory
pub(crate) async fn create_test_downloader(
    engine: MockEngine,
) -> (VideoDownloader, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().to_path_buf();
    // Keep the background sweeper out of the way unless a test sweeps manually
    config.jobs.sweep_interval = std::time::Duration::from_secs(3600);

    let downloader = VideoDownloader::with_engine(config, Arc::new(engine))
        .await
        .expect("downloader construction");

    (downloader, temp_dir)
}

/// Block until the job reaches a terminal state and return that snapshot
pub(crate) async fn wait_terminal(
    downloader: &VideoDownloader,
    id: &DownloadId,
) -> JobRecord {
    let mut rx = downloader.watch(id).await.expect("watch");
    loop {
        {
            let record = rx.borrow_and_update();
            if record.status.is_terminal() {
                return record.clone();
            }
        }
        rx.changed().await.expect("watch channel closed early");
    }
}

/// Block until the job's observed progress reaches at least `percent`
pub(crate) async fn wait_progress_at_least(
    downloader: &VideoDownloader,
    id: &DownloadId,
    percent: f32,
) -> JobRecord {
    let mut rx = downloader.watch(id).await.expect("watch");
    loop {
        {
            let record = rx.borrow_and_update();
            if record.progress >= percent || record.status.is_terminal() {
                return record.clone();
            }
        }
        rx.changed().await.expect("watch channel closed early");
    }
}
