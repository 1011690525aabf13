//! Video metadata handlers.

use super::{VideoInfoRequest, VideoInfoResponse};
use crate::api::AppState;
use crate::error::Error;
use axum::{Json, extract::State};

/// POST /get-video-info - Fetch metadata and quality options
#[utoipa::path(
    post,
    path = "/get-video-info",
    tag = "videos",
    request_body = VideoInfoRequest,
    responses(
        (status = 200, description = "Video metadata and available renditions", body = VideoInfoResponse),
        (status = 400, description = "Invalid video id or URL"),
        (status = 502, description = "Engine could not fetch metadata")
    )
)]
pub async fn get_video_info(
    State(state): State<AppState>,
    Json(request): Json<VideoInfoRequest>,
) -> Result<Json<VideoInfoResponse>, Error> {
    let (video_info, resolutions) = state.downloader.video_info(&request.video_id).await?;

    Ok(Json(VideoInfoResponse {
        success: true,
        video_info,
        resolutions,
    }))
}
