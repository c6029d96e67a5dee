//! Database layer for hdo-rs.
//!
//! Entities and migrations for issues, their associations and vote
//! connections, plus the repositories the service layer builds on.

pub mod entities;
pub mod migrations;
pub mod repositories;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::time::Duration;

use hdo_common::config::DatabaseConfig;
use hdo_common::{AppError, AppResult, Config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::log::LevelFilter;

/// Pool options for the configured database.
#[must_use]
pub fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let timeout = Duration::from_secs(config.connect_timeout_secs);

    let mut opt = ConnectOptions::new(&config.url);
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .sqlx_logging(config.log_statements)
        .sqlx_logging_level(LevelFilter::Debug);
    opt
}

/// Open the connection pool.
pub async fn init(config: &Config) -> AppResult<DatabaseConnection> {
    Database::connect(connect_options(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Apply pending migrations, returning how many ran.
pub async fn migrate(db: &DatabaseConnection) -> AppResult<usize> {
    let pending = migrations::Migrator::get_pending_migrations(db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .len();

    if pending > 0 {
        tracing::info!(pending, "Applying migrations");
        migrations::Migrator::up(db, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
    }

    Ok(pending)
}
