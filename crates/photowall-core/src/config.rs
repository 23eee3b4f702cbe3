//! Configuration module
//!
//! This module provides configuration structures for the API and its
//! collaborators: database, storage backend, upload limits, thumbnailing and
//! the live stream.

use std::env;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const MAX_FILE_SIZE_BYTES: usize = 52_428_800;
const DEFAULT_ALLOWED_CONTENT_TYPES: &str =
    "image/jpeg,image/jpg,image/png,image/webp,image/heic,image/heif";
const THUMBNAIL_MAX_DIMENSION: u32 = 800;
const THUMBNAIL_QUALITY: u8 = 80;
const STREAM_HEARTBEAT_SECS: u64 = 30;
const STREAM_BUFFER_SIZE: usize = 64;
const STREAM_SNAPSHOT_SIZE: i64 = 10;
const PHOTOS_DEFAULT_LIMIT: i64 = 100;
const PHOTOS_MAX_LIMIT: i64 = 10_000;

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Server and database settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub log_format: LogFormat,
    /// In-flight request ceiling applied to the whole router
    pub http_concurrency_limit: usize,
}

/// Photowall application configuration
#[derive(Clone, Debug)]
pub struct PhotoWallConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (R2, MinIO)
    pub storage_public_url: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub images_account_id: Option<String>,
    pub images_api_token: Option<String>,
    pub images_account_hash: Option<String>,
    // Upload configuration
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub thumbnail_enabled: bool,
    pub thumbnail_max_dimension: u32,
    pub thumbnail_quality: u8,
    // Live stream configuration
    pub stream_heartbeat_secs: u64,
    pub stream_buffer_size: usize,
    pub stream_snapshot_size: i64,
    // Listing configuration
    pub photos_default_limit: i64,
    pub photos_max_limit: i64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<PhotoWallConfig>);

impl Config {
    fn inner(&self) -> &PhotoWallConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = PhotoWallConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.inner().base.log_format
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().base.http_concurrency_limit
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn storage_public_url(&self) -> Option<&str> {
        self.inner().storage_public_url.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn images_account_id(&self) -> Option<&str> {
        self.inner().images_account_id.as_deref()
    }

    pub fn images_api_token(&self) -> Option<&str> {
        self.inner().images_api_token.as_deref()
    }

    pub fn images_account_hash(&self) -> Option<&str> {
        self.inner().images_account_hash.as_deref()
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.inner().max_file_size_bytes
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.inner().allowed_content_types
    }

    pub fn thumbnail_enabled(&self) -> bool {
        self.inner().thumbnail_enabled
    }

    pub fn thumbnail_max_dimension(&self) -> u32 {
        self.inner().thumbnail_max_dimension
    }

    pub fn thumbnail_quality(&self) -> u8 {
        self.inner().thumbnail_quality
    }

    pub fn stream_heartbeat_secs(&self) -> u64 {
        self.inner().stream_heartbeat_secs
    }

    pub fn stream_buffer_size(&self) -> usize {
        self.inner().stream_buffer_size
    }

    pub fn stream_snapshot_size(&self) -> i64 {
        self.inner().stream_snapshot_size
    }

    pub fn photos_default_limit(&self) -> i64 {
        self.inner().photos_default_limit
    }

    pub fn photos_max_limit(&self) -> i64 {
        self.inner().photos_max_limit
    }
}

/// True for `production` or `prod`, in any case.
pub fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

/// Deployment environment from `ENVIRONMENT`, falling back to `APP_ENV`, then
/// `development`.
pub fn environment_from_env() -> String {
    env::var("ENVIRONMENT")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Whether the process environment names a production deployment.
///
/// For code that has no `Config` at hand, such as error rendering and
/// response middleware.
pub fn is_production_env() -> bool {
    is_production_name(&environment_from_env())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl PhotoWallConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = environment_from_env();

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let log_format = match env::var("LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            environment,
            log_format,
            http_concurrency_limit: env_parse("HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::S3,
        };

        let allowed_content_types = split_list(
            &env::var("ALLOWED_CONTENT_TYPES")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_CONTENT_TYPES.to_string()),
        );

        let config = PhotoWallConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            storage_public_url: env::var("STORAGE_PUBLIC_URL")
                .or_else(|_| env::var("R2_PUBLIC_URL"))
                .ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            images_account_id: env::var("IMAGES_ACCOUNT_ID").ok(),
            images_api_token: env::var("IMAGES_API_TOKEN").ok(),
            images_account_hash: env::var("IMAGES_ACCOUNT_HASH").ok(),
            max_file_size_bytes: env_parse("MAX_FILE_SIZE", MAX_FILE_SIZE_BYTES),
            allowed_content_types,
            thumbnail_enabled: env_bool("THUMBNAIL_ENABLED", false),
            thumbnail_max_dimension: env_parse(
                "THUMBNAIL_MAX_DIMENSION",
                THUMBNAIL_MAX_DIMENSION,
            ),
            thumbnail_quality: env_parse("THUMBNAIL_QUALITY", THUMBNAIL_QUALITY),
            stream_heartbeat_secs: env_parse("STREAM_HEARTBEAT_SECS", STREAM_HEARTBEAT_SECS),
            stream_buffer_size: env_parse("STREAM_BUFFER_SIZE", STREAM_BUFFER_SIZE),
            stream_snapshot_size: env_parse("STREAM_SNAPSHOT_SIZE", STREAM_SNAPSHOT_SIZE),
            photos_default_limit: env_parse("PHOTOS_DEFAULT_LIMIT", PHOTOS_DEFAULT_LIMIT),
            photos_max_limit: env_parse("PHOTOS_MAX_LIMIT", PHOTOS_MAX_LIMIT),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be at least 1"));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        if self.thumbnail_quality == 0 || self.thumbnail_quality > 100 {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_QUALITY must be between 1 and 100"
            ));
        }

        if self.photos_default_limit <= 0 || self.photos_default_limit > self.photos_max_limit {
            return Err(anyhow::anyhow!(
                "PHOTOS_DEFAULT_LIMIT must be positive and not exceed PHOTOS_MAX_LIMIT"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend (use 'auto' for R2)"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Images => {
                if self.images_account_id.is_none() || self.images_api_token.is_none() {
                    return Err(anyhow::anyhow!(
                        "IMAGES_ACCOUNT_ID and IMAGES_API_TOKEN must be set when using the images backend"
                    ));
                }
                if self.images_account_hash.is_none() {
                    return Err(anyhow::anyhow!(
                        "IMAGES_ACCOUNT_HASH must be set to build delivery URLs"
                    ));
                }
            }
        }

        Ok(())
    }
}
