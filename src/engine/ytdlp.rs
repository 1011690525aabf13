//! Engine implementation driving the external `yt-dlp` binary
//!
//! Metadata comes from `--dump-json`; downloads run with `--newline` so
//! progress can be parsed line by line from stdout, exactly one
//! [`EngineProgress`] message per parsed line.

use super::{DownloadRequest, EngineOutcome, EnginePhase, EngineProgress, VideoDetails, VideoEngine};
use crate::config::EngineConfig;
use crate::error::EngineError;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Video heights outside this range are ignored when building options
const MIN_HEIGHT: u32 = 144;
const MAX_HEIGHT: u32 = 4320;

#[allow(clippy::unwrap_used)] // the pattern is a literal and always compiles
fn progress_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[download\]\s+(\d+(?:\.\d+)?)%").unwrap())
}

/// Downloader engine powered by the yt-dlp command line tool
pub struct YtDlpEngine {
    binary: PathBuf,
    info_timeout: Duration,
}

impl YtDlpEngine {
    /// Locate the engine binary according to the configuration
    ///
    /// An explicitly configured path wins; otherwise PATH is searched
    /// (unless disabled). Fails with [`EngineError::NotAvailable`] when no
    /// binary can be found.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let binary = if let Some(ref path) = config.ytdlp_path {
            path.clone()
        } else if config.search_path {
            which::which("yt-dlp").map_err(|e| {
                EngineError::NotAvailable(format!("yt-dlp not found on PATH: {e}"))
            })?
        } else {
            return Err(EngineError::NotAvailable(
                "no ytdlp_path configured and PATH search is disabled".to_string(),
            ));
        };

        tracing::info!(binary = %binary.display(), "yt-dlp engine initialized");

        Ok(Self {
            binary,
            info_timeout: config.info_timeout,
        })
    }

    fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={video_id}")
    }

    /// Map a requested rendition onto a yt-dlp format selector
    pub(crate) fn format_selector(resolution: &str) -> &'static str {
        match resolution {
            "4320p" => "best[height<=4320]",
            "2160p" => "best[height<=2160]",
            "1440p" => "best[height<=1440]",
            "1080p" => "best[height<=1080]",
            "720p" => "best[height<=720]",
            "480p" => "best[height<=480]",
            "360p" => "best[height<=360]",
            "240p" => "best[height<=240]",
            "144p" => "best[height<=144]",
            _ => "best",
        }
    }

    /// Parse one `--newline` output line into a progress message
    ///
    /// Returns `None` for lines that carry no progress information.
    pub(crate) fn parse_progress_line(line: &str) -> Option<EngineProgress> {
        if let Some(caps) = progress_regex().captures(line) {
            let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
            let phase = if percent >= 100.0 {
                // The fetch is done; what remains is merge/remux work
                EnginePhase::PostProcessing
            } else {
                EnginePhase::Downloading
            };
            return Some(EngineProgress {
                percent: percent.clamp(0.0, 100.0),
                phase,
                filename: None,
            });
        }

        if line.starts_with("[Merger]") || line.starts_with("[Fixup") {
            return Some(EngineProgress {
                percent: 100.0,
                phase: EnginePhase::PostProcessing,
                filename: None,
            });
        }

        None
    }

    /// Parse `--dump-json` output into [`VideoDetails`]
    pub(crate) fn parse_info_json(video_id: &str, json: &str) -> Result<VideoDetails, EngineError> {
        #[derive(Deserialize)]
        struct RawFormat {
            vcodec: Option<String>,
            height: Option<u32>,
        }

        #[derive(Deserialize)]
        struct RawInfo {
            title: Option<String>,
            thumbnail: Option<String>,
            duration_string: Option<String>,
            #[serde(default)]
            formats: Vec<RawFormat>,
        }

        let info: RawInfo = serde_json::from_str(json)
            .map_err(|e| EngineError::InfoFailed(format!("invalid metadata JSON: {e}")))?;

        let mut heights: Vec<u32> = info
            .formats
            .iter()
            .filter(|f| f.vcodec.as_deref().is_some_and(|v| v != "none"))
            .filter_map(|f| f.height)
            .filter(|h| (MIN_HEIGHT..=MAX_HEIGHT).contains(h))
            .collect();
        heights.sort_unstable();
        heights.dedup();

        Ok(VideoDetails {
            video_id: video_id.to_string(),
            title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
            thumbnail: info.thumbnail,
            duration: info.duration_string,
            heights,
        })
    }

    /// Locate the finished file by its per-run unique prefix and recover
    /// the engine-chosen filename
    async fn find_output(
        output_dir: &Path,
        temp_id: &str,
    ) -> Result<(PathBuf, u64, Option<String>), EngineError> {
        let mut entries = tokio::fs::read_dir(output_dir)
            .await
            .map_err(|e| EngineError::OutputMissing(e.to_string()))?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(stripped) = name.strip_prefix(&format!("{temp_id}_")) {
                // yt-dlp writes `.part` files while downloading; the final
                // rename drops the suffix, so a lingering part file means
                // the run did not actually finish
                if name.ends_with(".part") {
                    continue;
                }
                let path = entry.path();
                let size = tokio::fs::metadata(&path)
                    .await
                    .map_err(|e| EngineError::OutputMissing(e.to_string()))?
                    .len();
                return Ok((path, size, Some(stripped.to_string())));
            }
        }

        Err(EngineError::OutputMissing(format!(
            "no file with prefix {temp_id} in {}",
            output_dir.display()
        )))
    }
}

#[async_trait]
impl VideoEngine for YtDlpEngine {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch_info(&self, video_id: &str) -> Result<VideoDetails, EngineError> {
        let url = Self::watch_url(video_id);

        let output = tokio::time::timeout(
            self.info_timeout,
            Command::new(&self.binary)
                .args(["--dump-json", "--no-warnings", &url])
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| EngineError::Timeout(self.info_timeout.as_secs()))?
        .map_err(|e| EngineError::InfoFailed(format!("failed to run yt-dlp: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(video_id, stderr = %stderr.trim(), "yt-dlp metadata fetch failed");
            return Err(EngineError::InfoFailed(
                "video might be private or restricted".to_string(),
            ));
        }

        Self::parse_info_json(video_id, &String::from_utf8_lossy(&output.stdout))
    }

    async fn download(
        &self,
        request: DownloadRequest,
        progress: mpsc::Sender<EngineProgress>,
    ) -> Result<EngineOutcome, EngineError> {
        let url = Self::watch_url(&request.video_id);
        let selector = Self::format_selector(&request.resolution);

        // Per-run unique prefix: the finished file is located by prefix
        // afterwards, and concurrent jobs can never clobber each other.
        let temp_id = uuid::Uuid::new_v4().to_string();
        let output_template = request
            .output_dir
            .join(format!("{temp_id}_%(title)s.%(ext)s"));

        tracing::info!(
            video_id = %request.video_id,
            resolution = %request.resolution,
            selector,
            "starting yt-dlp download"
        );

        let mut child = Command::new(&self.binary)
            .arg("-f")
            .arg(selector)
            .arg("--restrict-filenames")
            .arg("--newline")
            .arg("--no-warnings")
            .arg("--output")
            .arg(&output_template)
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::DownloadFailed(format!("failed to spawn yt-dlp: {e}")))?;

        // Collect stderr in the background so a failed run can report why
        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut last_lines: Vec<String> = Vec::new();
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if last_lines.len() >= 5 {
                        last_lines.remove(0);
                    }
                    last_lines.push(line);
                }
            }
            last_lines
        });

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(update) = Self::parse_progress_line(&line) {
                    // A dropped receiver means nobody is reporting progress
                    // anymore; the download itself must still finish
                    progress.send(update).await.ok();
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| EngineError::DownloadFailed(e.to_string()))?;
        let stderr_tail = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let detail = stderr_tail
                .last()
                .cloned()
                .unwrap_or_else(|| format!("yt-dlp exited with {status}"));
            tracing::error!(video_id = %request.video_id, %status, detail = %detail, "yt-dlp download failed");
            return Err(EngineError::DownloadFailed(detail));
        }

        let (artifact_path, artifact_size, filename) =
            Self::find_output(&request.output_dir, &temp_id).await?;

        tracing::info!(
            video_id = %request.video_id,
            path = %artifact_path.display(),
            size = artifact_size,
            "yt-dlp download finished"
        );

        Ok(EngineOutcome {
            artifact_path,
            artifact_size,
            filename,
        })
    }
}
