//! Error types for tube-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (job registry, engine)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use crate::types::Status;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for tube-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tube-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// Job registry error (unknown id, illegal transition, premature hand-off)
    #[error("job error: {0}")]
    Job(#[from] JobError),

    /// External downloader engine error
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// The submitted video id (or URL) could not be parsed
    #[error("invalid video id: {0}")]
    InvalidVideoId(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Shutdown in progress - not accepting new downloads
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Job registry errors
#[derive(Debug, Error)]
pub enum JobError {
    /// No job with this id exists (or it was garbage-collected)
    #[error("download {id} not found")]
    NotFound {
        /// The download id that was not found
        id: String,
    },

    /// The requested mutation would move a terminal job
    #[error("download {id} is already {current} and cannot move to {requested}")]
    InvalidTransition {
        /// The download id whose record is terminal
        id: String,
        /// The terminal state the record is in
        current: Status,
        /// The state the mutation asked for
        requested: Status,
    },

    /// Artifact requested before the job reached terminal success
    #[error("download {id} is not ready: current status is {status}")]
    NotReady {
        /// The download id that is still in flight
        id: String,
        /// The job's current non-terminal status
        status: Status,
    },

    /// Artifact requested for a job that terminated in error
    #[error("download {id} failed: {message}")]
    Failed {
        /// The download id that failed
        id: String,
        /// The recorded error message
        message: String,
    },
}

/// External engine errors
///
/// These never escape the job runner as faults: the runner converts them
/// into a terminal `error` state with a human-readable message. They are
/// surfaced directly only from synchronous calls such as metadata fetch.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine binary could not be located
    #[error("engine binary not available: {0}")]
    NotAvailable(String),

    /// Metadata fetch failed (private/restricted video, network problem)
    #[error("could not fetch video information: {0}")]
    InfoFailed(String),

    /// The download run itself failed
    #[error("download failed: {0}")]
    DownloadFailed(String),

    /// The engine reported success but no output file was found
    #[error("file not found after download: {0}")]
    OutputMissing(String),

    /// The engine did not respond within the configured timeout
    #[error("engine timed out after {0} seconds")]
    Timeout(u64),
}

/// API error response format
///
/// Returned by API endpoints when an error occurs: a machine-readable
/// code, a human-readable message, and optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "download 3fe2… not found",
///     "details": { "download_id": "3fe2…" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "not_ready")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::InvalidVideoId(_) => 400,

            // 404 Not Found
            Error::Job(JobError::NotFound { .. }) => 404,

            // 409 Conflict - job state forbids the operation
            Error::Job(JobError::InvalidTransition { .. }) => 409,
            Error::Job(JobError::NotReady { .. }) => 409,

            // 410 Gone - the job terminated in error; the artifact will never exist
            Error::Job(JobError::Failed { .. }) => 410,

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 503 if the engine binary is missing entirely, 502 Bad Gateway
            // for failures of the engine itself
            Error::Engine(EngineError::NotAvailable(_)) => 503,
            Error::Engine(_) => 502,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Job(e) => match e {
                JobError::NotFound { .. } => "not_found",
                JobError::InvalidTransition { .. } => "invalid_transition",
                JobError::NotReady { .. } => "not_ready",
                JobError::Failed { .. } => "job_failed",
            },
            Error::Engine(e) => match e {
                EngineError::NotAvailable(_) => "engine_unavailable",
                EngineError::InfoFailed(_) => "info_failed",
                EngineError::DownloadFailed(_) => "download_failed",
                EngineError::OutputMissing(_) => "output_missing",
                EngineError::Timeout(_) => "engine_timeout",
            },
            Error::InvalidVideoId(_) => "invalid_video_id",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ShuttingDown => "shutting_down",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        // Add contextual details for specific error types
        let details = match &error {
            Error::Job(JobError::NotFound { id }) => Some(serde_json::json!({
                "download_id": id,
            })),
            Error::Job(JobError::InvalidTransition {
                id,
                current,
                requested,
            }) => Some(serde_json::json!({
                "download_id": id,
                "current": current,
                "requested": requested,
            })),
            Error::Job(JobError::NotReady { id, status }) => Some(serde_json::json!({
                "download_id": id,
                "status": status,
            })),
            Error::Job(JobError::Failed { id, .. }) => Some(serde_json::json!({
                "download_id": id,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
