//! Postgres pool and schema migrations

use anyhow::{Context, Result};
use photowall_core::Config;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Embedded from the workspace `migrations/` directory, including the one-off
/// backfill that turns legacy `__DELETED__` comment markers into `deleted_at`.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_BACKOFF: Duration = Duration::from_secs(2);

async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .connect(config.database_url())
        .await
}

/// Connect, retrying while the database comes up, then apply pending migrations.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let mut attempt = 1;
    let pool = loop {
        match connect(config).await {
            Ok(pool) => break pool,
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts = CONNECT_ATTEMPTS,
                    "Database not reachable yet, retrying"
                );
                tokio::time::sleep(CONNECT_BACKOFF * attempt).await;
                attempt += 1;
            }
            Err(e) => return Err(e).context("Failed to connect to database"),
        }
    };

    tracing::info!(
        max_connections = config.db_max_connections(),
        attempts = attempt,
        "Database connected"
    );

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(
        migrations = MIGRATOR.iter().count(),
        "Database schema up to date"
    );

    Ok(pool)
}
