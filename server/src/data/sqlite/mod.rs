//! SQLite database service
//!
//! Centralized database management for the embedded store: WAL journal for
//! concurrent reads during writes, busy timeout instead of immediate lock
//! errors, and versioned schema migrations on startup.

mod migrations;
pub mod repositories;
pub mod schema;

pub use sqlx::SqlitePool;

use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::core::config::DatabaseConfig;
use crate::core::constants::{SQLITE_BUSY_TIMEOUT_SECS, SQLITE_MAX_CONNECTIONS};
use crate::data::error::DataError;

/// Owns the connection pool. Created once at startup and shared.
pub struct SqliteService {
    pool: SqlitePool,
}

impl SqliteService {
    /// Open (creating if missing) the database file, configure pragmas, and
    /// run pending migrations.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DataError> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .max_connections(SQLITE_MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        migrations::run_migrations(&pool).await?;

        tracing::debug!(path = %config.path.display(), "SqliteService initialized");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }

    /// In-memory database with migrations applied (for tests).
    ///
    /// A single never-recycled connection: an in-memory database lives and
    /// dies with its connection.
    #[cfg(test)]
    pub(crate) async fn connect_in_memory() -> Result<Self, DataError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::new().in_memory(true))
            .await?;
        migrations::run_migrations(&pool).await?;
        Ok(Self { pool })
    }
}
