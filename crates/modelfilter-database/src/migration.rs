//! Database migration runner.

use serde::Serialize;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use modelfilter_core::error::{ErrorKind, FilterError};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Whether a bundled migration has been applied.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    /// Migration version.
    pub version: i64,
    /// Migration description.
    pub description: String,
    /// Whether the migration was applied successfully.
    pub applied: bool,
}

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), FilterError> {
    info!("Running database migrations...");

    MIGRATOR.run(pool).await.map_err(|e| {
        FilterError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// List the bundled migrations and whether each one is applied.
pub async fn migration_status(pool: &PgPool) -> Result<Vec<MigrationStatus>, FilterError> {
    let tracked: bool =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await
            .map_err(|e| {
                FilterError::with_source(ErrorKind::Database, "Failed to inspect migrations", e)
            })?;

    let applied: Vec<i64> = if tracked {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                FilterError::with_source(ErrorKind::Database, "Failed to list migrations", e)
            })?
    } else {
        Vec::new()
    };

    Ok(MIGRATOR
        .iter()
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect())
}
