//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string for the catalog
//! - `IDENTITY_DATABASE_URL` - `PostgreSQL` connection string for identity

use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run catalog database migrations.
///
/// # Errors
///
/// Returns a [`MigrationError`] if the env var is missing, the connection
/// fails, or a migration fails to apply.
pub async fn catalog() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CATALOG_DATABASE_URL")
        .map_err(|_| MigrationError::MissingEnvVar("CATALOG_DATABASE_URL"))?;

    tracing::info!("Connecting to catalog database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running catalog migrations...");
    sqlx::migrate!("../catalog/migrations").run(&pool).await?;

    tracing::info!("Catalog migrations complete");
    Ok(())
}

/// Run identity database migrations.
///
/// # Errors
///
/// Returns a [`MigrationError`] if the env var is missing, the connection
/// fails, or a migration fails to apply.
pub async fn identity() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("IDENTITY_DATABASE_URL")
        .map_err(|_| MigrationError::MissingEnvVar("IDENTITY_DATABASE_URL"))?;

    tracing::info!("Connecting to identity database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running identity migrations...");
    sqlx::migrate!("../identity/migrations").run(&pool).await?;

    tracing::info!("Identity migrations complete");
    Ok(())
}
