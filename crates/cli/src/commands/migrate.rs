//! Database migration runner.
//!
//! Applies the SQL migrations embedded from `crates/server/migrations`
//! against the database named by `CARTLOAD_DATABASE_URL` (falling back
//! to `DATABASE_URL`). Migrations are tracked in the `_sqlx_migrations`
//! table, so re-running is a no-op for already-applied versions.

use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CARTLOAD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("CARTLOAD_DATABASE_URL"))?;

    tracing::info!("Connecting to database");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
