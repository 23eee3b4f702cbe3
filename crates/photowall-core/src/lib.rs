//! Photowall Core Library
//!
//! This crate provides the domain models, error types and configuration shared
//! across all photowall components.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{is_production_env, BaseConfig, Config, LogFormat, PhotoWallConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;

/// Current wall-clock instant in milliseconds since the Unix epoch.
///
/// Batch timestamps, photo upload instants and the photo `order` key all use
/// this representation.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
