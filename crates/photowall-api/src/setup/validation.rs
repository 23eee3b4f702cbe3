//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use photowall_core::{is_production_env, Config};

/// Validate critical configuration values
///
/// Runs the config's own checks, then the ones that only matter for serving
/// HTTP: CORS in production, pool sizing and stream/upload limits.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();

    // Error rendering reads the process environment, not the config
    if is_production != is_production_env() {
        tracing::warn!(
            environment = %config.environment(),
            "Configured environment differs from ENVIRONMENT/APP_ENV; error details follow the process environment"
        );
    }

    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS_ORIGINS cannot be '*' in production; list the allowed origins explicitly"
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.max_file_size_bytes() == 0 {
        return Err(anyhow::anyhow!("MAX_FILE_SIZE cannot be 0"));
    }

    if config.stream_heartbeat_secs() == 0 {
        return Err(anyhow::anyhow!("STREAM_HEARTBEAT_SECS cannot be 0"));
    }

    if config.photos_default_limit() <= 0 || config.photos_max_limit() <= 0 {
        return Err(anyhow::anyhow!(
            "PHOTOS_DEFAULT_LIMIT and PHOTOS_MAX_LIMIT must be positive"
        ));
    }

    if config.photos_default_limit() > config.photos_max_limit() {
        tracing::warn!(
            default_limit = config.photos_default_limit(),
            max_limit = config.photos_max_limit(),
            "PHOTOS_DEFAULT_LIMIT exceeds PHOTOS_MAX_LIMIT - listings are capped at the max"
        );
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
