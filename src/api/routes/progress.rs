//! Server-sent progress event stream.

use crate::api::AppState;
use crate::error::Error;
use crate::types::{DownloadId, ProgressEvent, Status};
use axum::{
    extract::{Path, State},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use std::convert::Infallible;
use tokio::sync::watch;
use tokio_stream::Stream;

/// GET /progress/:id - Server-sent progress event stream
///
/// Emits one `progress` event per observed change of the job's status or
/// progress, starting from the current snapshot (re-subscription resumes
/// mid-job). The first terminal event is also the last: the stream closes
/// right after it. Unknown ids fail with 404 before any stream is opened.
#[utoipa::path(
    get,
    path = "/progress/{id}",
    tag = "downloads",
    params(("id" = String, Path, description = "Download ID")),
    responses(
        (status = 200, description = "Progress event stream (text/event-stream)", content_type = "text/event-stream"),
        (status = 404, description = "Download not found")
    )
)]
pub async fn progress_stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, Error> {
    let id = DownloadId::from(id);
    let rx = state.downloader.watch(&id).await?;

    Ok(Sse::new(event_stream(rx)).keep_alive(KeepAlive::default()))
}

/// Dedupe key: a snapshot is only worth emitting when status or progress
/// moved (f32 compared by bits, progress only ever changes discretely)
type EmitKey = (Status, u32);

/// Turn a watch receiver into the event sequence the SSE contract wants:
/// current snapshot first, one event per change, closed after the first
/// terminal event.
fn event_stream(
    rx: watch::Receiver<crate::types::JobRecord>,
) -> impl Stream<Item = Result<SseEvent, Infallible>> {
    futures::stream::unfold(
        (Some(rx), None::<EmitKey>),
        |(rx, mut last)| async move {
            let mut rx = rx?;
            loop {
                let (record, key) = {
                    let snapshot = rx.borrow_and_update();
                    let key = (snapshot.status, snapshot.progress.to_bits());
                    (snapshot.clone(), key)
                };

                if last != Some(key) {
                    last = Some(key);
                    let terminal = record.status.is_terminal();
                    let event = to_sse_event(&record);
                    // A terminal snapshot ends the stream on the next poll
                    let next_rx = if terminal { None } else { Some(rx) };
                    return Some((Ok(event), (next_rx, last)));
                }

                // Unchanged snapshot: park until the registry publishes again.
                // An error means the job was swept mid-stream; just close.
                if rx.changed().await.is_err() {
                    return None;
                }
            }
        },
    )
}

fn to_sse_event(record: &crate::types::JobRecord) -> SseEvent {
    let payload = ProgressEvent::from(record);
    match serde_json::to_string(&payload) {
        Ok(json_data) => SseEvent::default().event("progress").data(json_data),
        Err(e) => {
            tracing::warn!(download_id = %record.id, error = %e, "failed to serialize progress event");
            SseEvent::default()
                .event("error")
                .data(r#"{"error":"serialization failed"}"#)
        }
    }
}
