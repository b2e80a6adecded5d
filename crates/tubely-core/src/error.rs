//! Error types module
//!
//! All failures of the ingestion pipeline are unified under [`AppError`]. Each
//! variant self-describes how it is presented to clients through
//! [`ErrorMetadata`] and which broad [`ErrorCategory`] it belongs to.
//!
//! The `Database` variant wraps `sqlx::Error` when the `sqlx` feature is enabled.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for client-caused limits and auth failures
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Coarse error taxonomy used for response mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed request, bad identifier, unsupported media type.
    InvalidInput,
    /// Missing or invalid credentials.
    Unauthorized,
    /// Authenticated principal does not own the resource.
    Forbidden,
    /// Upload exceeds a configured limit.
    ResourceExhausted,
    /// External tool, object store or metadata store failed.
    DependencyFailure,
    /// Record or stream does not exist.
    NotFound,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "TRANSCODE_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried by the client)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should never be shown to clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No video stream: {0}")]
    NoVideoStream(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Media tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("Transcode failed: {0}")]
    TranscodeFailed(String),

    #[error("Stream inspection failed: {0}")]
    InspectionFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry the request after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            502,
            "STORAGE_ERROR",
            true,
            Some("Retry the upload after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check the request parameters and form fields"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidMediaType(_) => (
            400,
            "INVALID_MEDIA_TYPE",
            false,
            Some("Upload a file with a supported content type"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Provide a bearer token in the Authorization header"),
            false,
            LogLevel::Warn,
        ),
        AppError::InvalidToken(_) => (
            401,
            "INVALID_TOKEN",
            false,
            Some("Obtain a new access token"),
            false,
            LogLevel::Warn,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            None,
            false,
            LogLevel::Warn,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            None,
            false,
            LogLevel::Debug,
        ),
        AppError::NoVideoStream(_) => (
            404,
            "NO_VIDEO_STREAM",
            false,
            Some("Upload a file that contains a video stream"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce the file size and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::ToolUnavailable(_) => (
            503,
            "TOOL_UNAVAILABLE",
            true,
            Some("Retry later; media processing is temporarily unavailable"),
            true,
            LogLevel::Error,
        ),
        AppError::TranscodeFailed(_) => (
            500,
            "TRANSCODE_FAILED",
            false,
            Some("Check that the file is a valid MP4 container"),
            true,
            LogLevel::Error,
        ),
        AppError::InspectionFailed(_) => (
            500,
            "INSPECTION_FAILED",
            false,
            Some("Check that the file is a valid MP4 container"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry the request; contact support if it keeps failing"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::InvalidMediaType(_) => "InvalidMediaType",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::InvalidToken(_) => "InvalidToken",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::NoVideoStream(_) => "NoVideoStream",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::ToolUnavailable(_) => "ToolUnavailable",
            AppError::TranscodeFailed(_) => "TranscodeFailed",
            AppError::InspectionFailed(_) => "InspectionFailed",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Broad category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::InvalidInput(_) | AppError::InvalidMediaType(_) => {
                ErrorCategory::InvalidInput
            }
            AppError::Unauthorized(_) | AppError::InvalidToken(_) => ErrorCategory::Unauthorized,
            AppError::Forbidden(_) => ErrorCategory::Forbidden,
            AppError::PayloadTooLarge(_) => ErrorCategory::ResourceExhausted,
            AppError::NotFound(_) | AppError::NoVideoStream(_) => ErrorCategory::NotFound,
            AppError::Database(_)
            | AppError::Storage(_)
            | AppError::ToolUnavailable(_)
            | AppError::TranscodeFailed(_)
            | AppError::InspectionFailed(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => ErrorCategory::DependencyFailure,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to store media".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::InvalidMediaType(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::InvalidToken(_) => "Invalid or expired token".to_string(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::NoVideoStream(_) => "Uploaded file contains no video stream".to_string(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::ToolUnavailable(_) => "Media processing is unavailable".to_string(),
            AppError::TranscodeFailed(_) => "Failed to process video".to_string(),
            AppError::InspectionFailed(_) => "Failed to inspect video".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
