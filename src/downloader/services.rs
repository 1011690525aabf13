//! Background service starters.

use super::VideoDownloader;

impl VideoDownloader {
    /// Run one sweep: drop expired terminal records and delete their
    /// artifacts. Returns the number of records collected.
    pub async fn sweep_once(&self) -> usize {
        let removed = self.registry.sweep().await;

        for record in &removed {
            if let Some(ref path) = record.artifact_path {
                match tokio::fs::remove_file(path).await {
                    Ok(()) => {
                        tracing::info!(
                            download_id = %record.id,
                            path = %path.display(),
                            "removed expired artifact"
                        );
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => {
                        tracing::warn!(
                            download_id = %record.id,
                            path = %path.display(),
                            error = %e,
                            "failed to remove expired artifact"
                        );
                    }
                }
            }
        }

        if !removed.is_empty() {
            tracing::info!(collected = removed.len(), "registry sweep complete");
        }

        removed.len()
    }

    /// Spawn the periodic registry sweeper
    ///
    /// Runs independently of any request until the shutdown token fires.
    pub(crate) fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let downloader = self.clone();
        let cancel = self.shutdown_token.clone();
        let period = self.config.jobs.sweep_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick fires immediately; skip it so a fresh
            // instance does not sweep before anything can exist
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        downloader.sweep_once().await;
                    }
                    _ = cancel.cancelled() => {
                        tracing::debug!("sweeper stopped");
                        break;
                    }
                }
            }
        })
    }
}
