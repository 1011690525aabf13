//! Video metadata and resolution option building.

use super::VideoDownloader;
use crate::error::Result;
use crate::types::{ResolutionOption, VideoInfo};
use crate::utils;

/// The rungs offered to clients, highest first
const STANDARD_RESOLUTIONS: &[(u32, &str)] = &[
    (4320, "8K (4320p)"),
    (2160, "4K (2160p)"),
    (1440, "1440p (QHD)"),
    (1080, "1080p (Full HD)"),
    (720, "720p (HD)"),
    (480, "480p"),
    (360, "360p"),
    (240, "240p"),
    (144, "144p (Lowest)"),
];

/// Build the selectable rendition list for the available video heights
///
/// A rung is offered when any available height covers it; `best` is
/// always offered and listed first.
pub(crate) fn resolution_options(heights: &[u32]) -> Vec<ResolutionOption> {
    let mut options: Vec<ResolutionOption> = STANDARD_RESOLUTIONS
        .iter()
        .filter(|(height, _)| heights.iter().any(|h| h >= height))
        .map(|(height, label)| ResolutionOption {
            value: format!("{height}p"),
            label: (*label).to_string(),
        })
        .collect();

    options.insert(
        0,
        ResolutionOption {
            value: "best".to_string(),
            label: "Best Available Quality".to_string(),
        },
    );

    options
}

impl VideoDownloader {
    /// Fetch metadata and quality options for a video
    ///
    /// `video_ref` may be a bare 11-character id or any recognized URL
    /// form. Engine failures surface to the caller; no job is created.
    pub async fn video_info(
        &self,
        video_ref: &str,
    ) -> Result<(VideoInfo, Vec<ResolutionOption>)> {
        let video_id = utils::parse_video_id(video_ref)?;

        let details = self.engine.fetch_info(&video_id).await?;

        let options = resolution_options(&details.heights);
        let thumbnail = details.thumbnail.unwrap_or_else(|| {
            format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg")
        });

        tracing::debug!(
            video_id = %video_id,
            title = %details.title,
            options = options.len(),
            "fetched video info"
        );

        Ok((
            VideoInfo {
                video_id,
                title: details.title,
                thumbnail,
                duration: details.duration,
            },
            options,
        ))
    }
}
