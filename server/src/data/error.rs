//! Unified error type for data layer
//!
//! Wraps errors from every backend (SQLite, ClickHouse, search cluster)
//! while preserving which backend produced them.

use thiserror::Error;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error (transactional backend)
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

    /// ClickHouse database error (columnar backend)
    #[error("ClickHouse error: {0}")]
    Clickhouse(#[from] clickhouse::error::Error),

    /// Search cluster error (document backend)
    #[error("Search error: {0}")]
    Search(String),

    /// Migration failed
    #[error("Migration {version} ({name}) failed on {backend}: {error}")]
    MigrationFailed {
        backend: &'static str,
        version: i32,
        name: String,
        error: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend not available
    #[error("Backend {backend} is not available: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },
}

impl DataError {
    /// Create a backend unavailable error
    pub fn backend_unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Clickhouse(_) => "clickhouse",
            Self::Search(_) => "search",
            Self::MigrationFailed { backend, .. } => backend,
            Self::BackendUnavailable { backend, .. } => backend,
            Self::Io(_) => "unknown",
        }
    }
}

/// Convert from the SqliteError type
impl From<crate::data::sqlite::SqliteError> for DataError {
    fn from(e: crate::data::sqlite::SqliteError) -> Self {
        match e {
            crate::data::sqlite::SqliteError::Database(e) => Self::Sqlite(e),
            crate::data::sqlite::SqliteError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                backend: "sqlite",
                version,
                name,
                error,
            },
            crate::data::sqlite::SqliteError::Io(e) => Self::Io(e),
        }
    }
}

/// Convert from the ClickhouseError type
impl From<crate::data::clickhouse::ClickhouseError> for DataError {
    fn from(e: crate::data::clickhouse::ClickhouseError) -> Self {
        match e {
            crate::data::clickhouse::ClickhouseError::Database(e) => Self::Clickhouse(e),
            crate::data::clickhouse::ClickhouseError::Connection(msg) => {
                Self::backend_unavailable("clickhouse", msg)
            }
        }
    }
}

/// Convert from the SearchError type
impl From<crate::data::search::SearchError> for DataError {
    fn from(e: crate::data::search::SearchError) -> Self {
        Self::Search(e.to_string())
    }
}
