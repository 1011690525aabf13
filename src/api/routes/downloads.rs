//! Download job handlers.

use super::{StartDownloadRequest, StartDownloadResponse};
use crate::api::AppState;
use crate::error::Error;
use crate::types::{DownloadId, JobRecord};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// POST /start-download - Accept a download job
#[utoipa::path(
    post,
    path = "/start-download",
    tag = "downloads",
    request_body = StartDownloadRequest,
    responses(
        (status = 201, description = "Download accepted", body = StartDownloadResponse),
        (status = 400, description = "Invalid video id or URL"),
        (status = 502, description = "Engine could not fetch metadata"),
        (status = 503, description = "Shutting down, not accepting new downloads")
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    Json(request): Json<StartDownloadRequest>,
) -> Result<(StatusCode, Json<StartDownloadResponse>), Error> {
    let record = state
        .downloader
        .start_download(&request.video_id, &request.resolution)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StartDownloadResponse {
            success: true,
            download_id: record.id.to_string(),
            filename: record.filename,
            progress_url: format!("/progress/{}", record.id),
            download_url: format!("/download-file/{}", record.id),
        }),
    ))
}

/// GET /downloads - List all jobs
#[utoipa::path(
    get,
    path = "/downloads",
    tag = "downloads",
    responses(
        (status = 200, description = "All jobs currently held by the registry", body = Vec<JobRecord>)
    )
)]
pub async fn list_downloads(State(state): State<AppState>) -> Json<Vec<JobRecord>> {
    Json(state.downloader.list_downloads().await)
}

/// GET /downloads/:id - Poll a single job snapshot
#[utoipa::path(
    get,
    path = "/downloads/{id}",
    tag = "downloads",
    params(("id" = String, Path, description = "Download ID")),
    responses(
        (status = 200, description = "Current job snapshot", body = JobRecord),
        (status = 404, description = "Download not found")
    )
)]
pub async fn get_download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobRecord>, Error> {
    let record = state.downloader.get_download(&DownloadId::from(id)).await?;
    Ok(Json(record))
}
