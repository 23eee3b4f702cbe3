//! Error types module
//!
//! This module provides the core error types used throughout photowall. All
//! errors are unified under the `AppError` enum which can represent database,
//! storage, validation and lifecycle errors.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for conflicts and other recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
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

    #[error("Not found: {0}")]
    NotFound(String),

    /// A record with the same identifier already exists. Batch creation treats
    /// this as the losing side of a concurrent create and returns the winner.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A photo referenced a batch that does not exist.
    #[error("Referential error: {0}")]
    Referential(String),

    #[error("Upload failed: {0}")]
    Upload(String),

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

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// How one error kind is presented to clients and logs.
struct ErrorKind {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const RETRY_LATER: Option<&str> = Some("Retry after a short delay");

const DATABASE: ErrorKind = ErrorKind {
    status: 500,
    code: "DATABASE_ERROR",
    recoverable: true,
    action: RETRY_LATER,
    sensitive: true,
    level: LogLevel::Error,
};

const STORAGE: ErrorKind = ErrorKind {
    code: "STORAGE_ERROR",
    ..DATABASE
};

const INVALID_INPUT: ErrorKind = ErrorKind {
    status: 400,
    code: "INVALID_INPUT",
    recoverable: false,
    action: Some("Check request parameters and try again"),
    sensitive: false,
    level: LogLevel::Debug,
};

const NOT_FOUND: ErrorKind = ErrorKind {
    status: 404,
    code: "NOT_FOUND",
    action: Some("Verify the resource ID exists"),
    ..INVALID_INPUT
};

const ALREADY_EXISTS: ErrorKind = ErrorKind {
    status: 409,
    code: "ALREADY_EXISTS",
    action: Some("Use a new identifier or fetch the existing resource"),
    level: LogLevel::Warn,
    ..INVALID_INPUT
};

const REFERENTIAL: ErrorKind = ErrorKind {
    code: "REFERENTIAL_ERROR",
    action: Some("Create the batch before uploading photos to it"),
    ..ALREADY_EXISTS
};

const UPLOAD: ErrorKind = ErrorKind {
    code: "UPLOAD_ERROR",
    action: Some("Retry the upload"),
    ..DATABASE
};

const INTERNAL: ErrorKind = ErrorKind {
    code: "INTERNAL_ERROR",
    ..DATABASE
};

impl AppError {
    fn kind(&self) -> &'static ErrorKind {
        match self {
            AppError::Database(_) => &DATABASE,
            AppError::Storage(_) => &STORAGE,
            AppError::InvalidInput(_) => &INVALID_INPUT,
            AppError::NotFound(_) => &NOT_FOUND,
            AppError::AlreadyExists(_) => &ALREADY_EXISTS,
            AppError::Referential(_) => &REFERENTIAL,
            AppError::Upload(_) => &UPLOAD,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => &INTERNAL,
        }
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::AlreadyExists(_) => "AlreadyExists",
            AppError::Referential(_) => "Referential",
            AppError::Upload(_) => "Upload",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
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
        self.kind().status
    }

    fn error_code(&self) -> &'static str {
        self.kind().code
    }

    fn is_recoverable(&self) -> bool {
        self.kind().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.kind().action
    }

    fn is_sensitive(&self) -> bool {
        self.kind().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.kind().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::AlreadyExists(ref msg) => msg.clone(),
            AppError::Referential(ref msg) => msg.clone(),
            AppError::Upload(_) => "Failed to upload file".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
