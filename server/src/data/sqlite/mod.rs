//! SQLite database service
//!
//! Transactional store for project metadata and custom model costs:
//! - WAL mode for concurrent reads during writes
//! - Versioned schema with tracked migrations
//!
//! All schema definitions and migrations are managed here.

pub mod error;
mod migrations;
pub mod repositories;
mod repository_impl;
pub mod schema;

pub use error::SqliteError;
pub use sqlx::SqlitePool;

use std::path::Path;
use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tracing::log::LevelFilter;

use crate::core::constants::{SQLITE_BUSY_TIMEOUT_SECS, SQLITE_MAX_CONNECTIONS};

/// SQLite database service
///
/// Handles database initialization and connection pooling.
/// Should be created once at startup and shared across all modules.
pub struct SqliteService {
    pool: SqlitePool,
}

impl SqliteService {
    /// Initialize the database service
    ///
    /// Creates the database file (and parent directory) if it doesn't exist,
    /// configures connection options and runs any pending migrations.
    pub async fn init(db_path: &Path) -> Result<Self, SqliteError> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .log_statements(LevelFilter::Trace);

        let pool = SqlitePoolOptions::new()
            .max_connections(SQLITE_MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        migrations::run_migrations(&pool).await?;

        tracing::debug!(path = %db_path.display(), "SqliteService initialized");
        Ok(Self { pool })
    }

    /// Create a SqliteService from an existing pool, running migrations on it
    #[cfg(test)]
    pub(crate) async fn from_pool(pool: SqlitePool) -> Result<Self, SqliteError> {
        migrations::run_migrations(&pool).await?;
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("langwatch.db");

        let service = SqliteService::init(&path).await.unwrap();
        assert!(path.exists());

        let project = repositories::create_project(service.pool(), "org_1", "Demo")
            .await
            .unwrap();
        let listed = repositories::list_projects_for_org(service.pool(), "org_1")
            .await
            .unwrap();
        assert_eq!(listed, vec![project]);

        service.close().await;
    }

    #[tokio::test]
    async fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("langwatch.db");

        let service = SqliteService::init(&path).await.unwrap();
        repositories::create_project(service.pool(), "org_1", "Persisted")
            .await
            .unwrap();
        service.close().await;

        let reopened = SqliteService::init(&path).await.unwrap();
        let listed = repositories::list_projects_for_org(reopened.pool(), "org_1")
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        reopened.close().await;
    }
}
