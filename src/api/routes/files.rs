//! Artifact hand-off handler.

use crate::api::AppState;
use crate::error::Error;
use crate::types::DownloadId;
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// GET /download-file/:id - Retrieve the finished artifact
///
/// Streams the artifact bytes with an attachment content-disposition.
/// Retrieval is repeatable until the sweeper collects the job.
#[utoipa::path(
    get,
    path = "/download-file/{id}",
    tag = "downloads",
    params(("id" = String, Path, description = "Download ID")),
    responses(
        (status = 200, description = "Artifact bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Download not found"),
        (status = 409, description = "Download not completed yet"),
        (status = 410, description = "Download failed; no artifact will exist")
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, Error> {
    let handle = state
        .downloader
        .open_artifact(&DownloadId::from(id))
        .await?;

    let headers = [
        (header::CONTENT_TYPE, handle.content_type),
        (header::CONTENT_LENGTH, handle.size.to_string()),
        (
            header::CONTENT_DISPOSITION,
            // The filename went through sanitizing, so quoting is safe
            format!("attachment; filename=\"{}\"", handle.filename),
        ),
    ];
    let body = Body::from_stream(ReaderStream::new(handle.file));

    Ok((headers, body).into_response())
}
