use super::*;
use crate::downloader::test_helpers::{
    MockEngine, MockOutcome, create_test_downloader, wait_progress_at_least, wait_terminal,
};
use crate::engine::{EnginePhase, EngineProgress};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio::sync::Notify;
use tower::ServiceExt; // for oneshot

/// Build a router over a scripted engine with the default test config
async fn test_app(engine: MockEngine) -> (Router, Arc<VideoDownloader>, tempfile::TempDir) {
    let (downloader, temp_dir) = create_test_downloader(engine).await;
    let downloader = Arc::new(downloader);
    let config = downloader.get_config();
    let app = create_router(downloader.clone(), config);
    (app, downloader, temp_dir)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok_and_version() {
    let (app, _downloader, _temp) = test_app(MockEngine::default()).await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn cors_headers_are_present_when_enabled() {
    let (app, _downloader, _temp) = test_app(MockEngine::default()).await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn api_key_gates_every_route_when_configured() {
    let (downloader, _temp) = create_test_downloader(MockEngine::default()).await;
    let downloader = Arc::new(downloader);

    let mut config = (*downloader.get_config()).clone();
    config.server.api.api_key = Some("test-secret-key".to_string());
    let app = create_router(downloader, Arc::new(config));

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/health")
        .header("X-Api-Key", "test-secret-key")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn get_video_info_rejects_invalid_references() {
    let (app, _downloader, _temp) = test_app(MockEngine::default()).await;

    let response = app
        .oneshot(post_json(
            "/get-video-info",
            serde_json::json!({"videoId": "definitely not a video"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "invalid_video_id");
}

#[tokio::test]
async fn get_video_info_returns_metadata_and_options() {
    let (app, _downloader, _temp) = test_app(MockEngine::default()).await;

    let response = app
        .oneshot(post_json(
            "/get-video-info",
            serde_json::json!({"videoId": "dQw4w9WgXcQ"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["video_info"]["video_id"], "dQw4w9WgXcQ");
    assert_eq!(body["video_info"]["title"], "Test Video");
    assert_eq!(
        body["resolutions"][0]["value"], "best",
        "best must always be the first offered rendition"
    );
}

#[tokio::test]
async fn start_download_returns_handle_and_urls() {
    let (app, downloader, _temp) = test_app(MockEngine::default()).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/start-download",
            serde_json::json!({"videoId": "dQw4w9WgXcQ", "resolution": "720p"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "Test_Video.mp4");

    let id = body["download_id"].as_str().unwrap().to_string();
    assert_eq!(body["progress_url"], format!("/progress/{id}"));
    assert_eq!(body["download_url"], format!("/download-file/{id}"));

    // The job is immediately observable through the snapshot endpoint
    let response = app
        .oneshot(get(&format!("/downloads/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = json_body(response).await;
    assert_eq!(snapshot["id"], id.as_str());
    assert_eq!(snapshot["video_id"], "dQw4w9WgXcQ");

    wait_terminal(&downloader, &crate::types::DownloadId::from(id)).await;
}

#[tokio::test]
async fn start_download_defaults_to_best_resolution() {
    let (app, downloader, _temp) = test_app(MockEngine::default()).await;

    let response = app
        .oneshot(post_json(
            "/start-download",
            serde_json::json!({"videoId": "dQw4w9WgXcQ"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;

    let id = crate::types::DownloadId::from(body["download_id"].as_str().unwrap());
    let record = downloader.get_download(&id).await.unwrap();
    assert_eq!(record.resolution, "best");
    wait_terminal(&downloader, &id).await;
}

#[tokio::test]
async fn unknown_download_snapshot_is_404() {
    let (app, _downloader, _temp) = test_app(MockEngine::default()).await;

    let response = app.oneshot(get("/downloads/no-such-job")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn progress_stream_on_unknown_id_fails_without_opening() {
    let (app, _downloader, _temp) = test_app(MockEngine::default()).await;

    let response = app.oneshot(get("/progress/no-such-job")).await.unwrap();

    assert_eq!(
        response.status(),
        StatusCode::NOT_FOUND,
        "an unknown id must fail before any stream is opened"
    );
    assert_ne!(
        response.headers().get("content-type").unwrap(),
        "text/event-stream",
        "the failure response must not be an event stream"
    );
}

#[tokio::test]
async fn progress_stream_emits_terminal_event_then_closes() {
    let (app, downloader, _temp) = test_app(MockEngine::default()).await;

    let record = downloader
        .start_download("dQw4w9WgXcQ", "best")
        .await
        .unwrap();
    wait_terminal(&downloader, &record.id).await;

    // Subscribing after completion resumes from the terminal snapshot:
    // exactly one event, then the stream closes (so the body ends).
    let response = app
        .oneshot(get(&format!("/progress/{}", record.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(
        body.contains("\"status\":\"completed\""),
        "stream must carry the terminal event, got: {body}"
    );
    assert!(body.contains("\"progress\":100"));
    assert_eq!(
        body.matches("event: progress").count(),
        1,
        "a post-completion subscription must see exactly one event"
    );
}

#[tokio::test]
async fn progress_stream_reports_error_jobs() {
    let engine = MockEngine {
        outcome: MockOutcome::Failure("network timeout".to_string()),
        ..Default::default()
    };
    let (app, downloader, _temp) = test_app(engine).await;

    let record = downloader
        .start_download("dQw4w9WgXcQ", "best")
        .await
        .unwrap();
    wait_terminal(&downloader, &record.id).await;

    let response = app
        .oneshot(get(&format!("/progress/{}", record.id)))
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(body.contains("\"status\":\"error\""));
    assert!(
        body.contains("network timeout"),
        "the terminal event must carry the error message, got: {body}"
    );
}

#[tokio::test]
async fn download_file_streams_completed_artifact() {
    let (app, downloader, _temp) = test_app(MockEngine::default()).await;

    let record = downloader
        .start_download("dQw4w9WgXcQ", "best")
        .await
        .unwrap();
    wait_terminal(&downloader, &record.id).await;

    let response = app
        .oneshot(get(&format!("/download-file/{}", record.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers.get("content-type").unwrap(), "video/mp4");
    assert_eq!(
        headers.get("content-disposition").unwrap(),
        "attachment; filename=\"Test_Video.mp4\""
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"media:dQw4w9WgXcQ");
    assert_eq!(
        headers.get("content-length").unwrap().to_str().unwrap(),
        bytes.len().to_string()
    );
}

#[tokio::test]
async fn download_file_before_completion_is_409() {
    let gate = Arc::new(Notify::new());
    let engine = MockEngine {
        steps: vec![EngineProgress {
            percent: 10.0,
            phase: EnginePhase::Downloading,
            filename: None,
        }],
        gate: Some(gate.clone()),
        ..Default::default()
    };
    let (app, downloader, _temp) = test_app(engine).await;

    let record = downloader
        .start_download("dQw4w9WgXcQ", "best")
        .await
        .unwrap();
    wait_progress_at_least(&downloader, &record.id, 5.0).await;

    let response = app
        .oneshot(get(&format!("/download-file/{}", record.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "not_ready");

    gate.notify_one();
    wait_terminal(&downloader, &record.id).await;
}

#[tokio::test]
async fn download_file_on_failed_job_is_410() {
    let engine = MockEngine {
        outcome: MockOutcome::Failure("network timeout".to_string()),
        ..Default::default()
    };
    let (app, downloader, _temp) = test_app(engine).await;

    let record = downloader
        .start_download("dQw4w9WgXcQ", "best")
        .await
        .unwrap();
    wait_terminal(&downloader, &record.id).await;

    let response = app
        .oneshot(get(&format!("/download-file/{}", record.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GONE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "job_failed");
}

#[tokio::test]
async fn download_file_on_unknown_id_is_404() {
    let (app, _downloader, _temp) = test_app(MockEngine::default()).await;

    let response = app.oneshot(get("/download-file/no-such-job")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_endpoint_serves_valid_spec() {
    let (app, _downloader, _temp) = test_app(MockEngine::default()).await;

    let response = app.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["openapi"].as_str().unwrap().starts_with("3."));
    assert_eq!(body["info"]["title"], "tube-dl REST API");
    assert!(body["paths"]["/progress/{id}"]["get"].is_object());
}

#[tokio::test]
async fn swagger_ui_can_be_disabled() {
    let (downloader, _temp) = create_test_downloader(MockEngine::default()).await;
    let downloader = Arc::new(downloader);

    let mut config = (*downloader.get_config()).clone();
    config.server.api.swagger_ui = false;
    let app = create_router(downloader, Arc::new(config));

    let response = app.oneshot(get("/swagger-ui/")).await.unwrap();
    assert_eq!(
        response.status(),
        StatusCode::NOT_FOUND,
        "Swagger UI should not be accessible when disabled"
    );
}

#[tokio::test]
async fn list_downloads_reflects_registry_contents() {
    let (app, downloader, _temp) = test_app(MockEngine::default()).await;

    let response = app.clone().oneshot(get("/downloads")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    let record = downloader
        .start_download("dQw4w9WgXcQ", "best")
        .await
        .unwrap();
    wait_terminal(&downloader, &record.id).await;

    let response = app.oneshot(get("/downloads")).await.unwrap();
    let body = json_body(response).await;
    let jobs = body.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["id"], record.id.as_str());
}
