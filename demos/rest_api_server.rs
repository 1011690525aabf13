//! REST API server demo
//!
//! Runs tube-dl with the REST API enabled, allowing control via HTTP.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:6789/swagger-ui
//! - Inspect a video via POST http://localhost:6789/get-video-info
//! - Start a download via POST http://localhost:6789/start-download
//! - Stream progress via GET http://localhost:6789/progress/{download_id}
//! - Fetch the artifact via GET http://localhost:6789/download-file/{download_id}

use std::net::SocketAddr;
use std::sync::Arc;
use tube_dl::api::start_api_server;
use tube_dl::{ApiConfig, Config, DownloadConfig, VideoDownloader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let api_config = ApiConfig {
        bind_address: "127.0.0.1:6789".parse::<SocketAddr>()?,
        api_key: None, // No authentication for local use
        cors_enabled: true,
        cors_origins: vec!["*".to_string()],
        swagger_ui: true,
    };

    let config = Config {
        download: DownloadConfig {
            download_dir: "downloads".into(),
            ..Default::default()
        },
        server: tube_dl::config::ServerIntegrationConfig { api: api_config },
        ..Default::default()
    };

    let downloader = Arc::new(VideoDownloader::new(config.clone()).await?);
    let config_arc = Arc::new(config);

    println!("Starting tube-dl REST API server");
    println!("Swagger UI: http://localhost:6789/swagger-ui");
    println!();
    println!("Example commands:");
    println!("  # Inspect a video");
    println!("  curl -X POST http://localhost:6789/get-video-info \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"videoId\": \"dQw4w9WgXcQ\"}}'");
    println!();
    println!("  # Start a download");
    println!("  curl -X POST http://localhost:6789/start-download \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"videoId\": \"dQw4w9WgXcQ\", \"resolution\": \"720p\"}}'");
    println!();
    println!("  # Stream progress (Server-Sent Events)");
    println!("  curl -N http://localhost:6789/progress/<download_id>");

    // Start the API server (runs indefinitely)
    start_api_server(downloader, config_arc).await?;

    Ok(())
}
