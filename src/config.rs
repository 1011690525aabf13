//! Configuration types for tube-dl

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Download behavior configuration (directories, concurrency)
///
/// Groups settings related to how artifacts are fetched and stored.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Directory where artifacts are written (default: "./downloads")
    #[serde(default = "default_download_dir")]
    #[schema(value_type = String)]
    pub download_dir: PathBuf,

    /// Maximum concurrent downloads (default: 3)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            max_concurrent_downloads: default_max_concurrent(),
        }
    }
}

/// Job registry configuration (retention and sweeping)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JobsConfig {
    /// How long a terminal job (and its artifact) stays retrievable
    /// before the sweeper collects it (default: 30 minutes)
    #[serde(default = "default_retention", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub retention: Duration,

    /// Interval between sweeper runs (default: 60 seconds)
    #[serde(default = "default_sweep_interval", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub sweep_interval: Duration,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            retention: default_retention(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

/// External engine configuration (binary discovery, timeouts)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EngineConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for the engine binary if no explicit path
    /// is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Timeout for metadata fetches (default: 60 seconds)
    #[serde(default = "default_info_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub info_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            info_timeout: default_info_timeout(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Bind address for the API server (default: 127.0.0.1:6789)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// API key for authentication (None = authentication disabled)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Whether CORS is enabled (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins ("*" = any origin)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Whether to serve Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// Main configuration for VideoDownloader
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) — directories, concurrency
/// - [`jobs`](JobsConfig) — retention window, sweep cadence
/// - [`engine`](EngineConfig) — engine binary discovery, timeouts
/// - [`server`](ServerIntegrationConfig) — REST API settings
///
/// Sub-config fields are flattened for serialization, so the JSON/TOML
/// format stays flat (no nesting) apart from the `server` section.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// Job registry settings
    #[serde(flatten)]
    pub jobs: JobsConfig,

    /// External engine settings
    #[serde(flatten)]
    pub engine: EngineConfig,

    /// API server integration
    #[serde(flatten)]
    pub server: ServerIntegrationConfig,
}

// Convenience accessors — delegate to the sub-config structs.
impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_max_concurrent() -> usize {
    3
}

fn default_retention() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_info_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_true() -> bool {
    true
}

#[allow(clippy::unwrap_used)] // the literal always parses
fn default_bind_address() -> SocketAddr {
    "127.0.0.1:6789".parse().unwrap()
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper (seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
