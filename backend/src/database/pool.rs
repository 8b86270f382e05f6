use crate::config::DatabaseConfig;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::{debug, info};

/// Schema for spots, sensors, occupancy events, reservations and pricing
/// history, embedded at compile time.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors raised while setting up or checking the database
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to create database pool: {0}")]
    PoolCreation(sqlx::Error),

    #[error("Database query error: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Shared handle on the connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Round-trip a trivial query; used by the health endpoint
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Connect to PostgreSQL and verify the pool can serve a query before
/// handing it out.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    debug!(
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout_secs,
        "Opening database pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .test_before_acquire(config.test_before_acquire)
        .connect(&config.url)
        .await
        .map_err(DatabaseError::PoolCreation)?;

    Database::new(pool.clone())
        .ping()
        .await
        .map_err(|e| match e {
            DatabaseError::QueryError(inner) => DatabaseError::PoolCreation(inner),
            other => other,
        })?;

    Ok(pool)
}

/// Apply any pending schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    MIGRATOR.run(pool).await?;
    info!("{} migrations up to date", MIGRATOR.iter().count());
    Ok(())
}
