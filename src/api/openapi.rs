//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the tube-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the tube-dl REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tube-dl REST API",
        version = "0.2.0",
        description = "REST API for submitting video downloads, streaming live progress and retrieving finished artifacts",
        contact(
            name = "tube-dl",
            url = "https://github.com/tube-dl/tube-dl"
        ),
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6789", description = "Local development server")
    ),
    paths(
        // Videos
        crate::api::routes::get_video_info,

        // Downloads
        crate::api::routes::start_download,
        crate::api::routes::list_downloads,
        crate::api::routes::get_download,
        crate::api::routes::progress_stream,
        crate::api::routes::download_file,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::DownloadId,
        crate::types::Status,
        crate::types::JobRecord,
        crate::types::ProgressEvent,
        crate::types::VideoInfo,
        crate::types::ResolutionOption,

        // Config types from config.rs
        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::JobsConfig,
        crate::config::EngineConfig,
        crate::config::ApiConfig,

        // API request/response types from routes
        crate::api::routes::VideoInfoRequest,
        crate::api::routes::VideoInfoResponse,
        crate::api::routes::StartDownloadRequest,
        crate::api::routes::StartDownloadResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "videos", description = "Video metadata - Inspect titles, thumbnails and available renditions"),
        (name = "downloads", description = "Download jobs - Start downloads, stream progress, retrieve artifacts"),
        (name = "system", description = "System endpoints - Health checks and OpenAPI spec"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security addon to add API key authentication scheme to OpenAPI spec
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
        }
    }
}
