//! Embedding demo: start a download and watch its progress directly,
//! without going through the REST API.

use tube_dl::{Config, VideoDownloader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let downloader = VideoDownloader::new(Config::default()).await?;

    let video = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "dQw4w9WgXcQ".to_string());

    let (info, resolutions) = downloader.video_info(&video).await?;
    println!("Title: {}", info.title);
    println!(
        "Available: {}",
        resolutions
            .iter()
            .map(|r| r.value.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let record = downloader.start_download(&video, "best").await?;
    println!("Started download {} -> {}", record.id, record.filename);

    let mut events = downloader.watch(&record.id).await?;
    loop {
        let snapshot = events.borrow_and_update().clone();
        println!("  {}: {:.1}%", snapshot.status, snapshot.progress);

        if snapshot.status.is_terminal() {
            match snapshot.error_message {
                Some(message) => println!("Failed: {message}"),
                None => println!(
                    "Done: {}",
                    snapshot
                        .artifact_path
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                ),
            }
            break;
        }

        if events.changed().await.is_err() {
            break;
        }
    }

    Ok(())
}
