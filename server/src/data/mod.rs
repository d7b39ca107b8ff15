//! Data storage layer
//!
//! Provides data access services for the domain layer:
//! - `sqlite` - Transactional store for projects and custom model costs
//! - `clickhouse` - Columnar analytics store (usage counts)
//! - `search` - Document/search cluster (usage counts)
//! - `cache` - Short-lived in-memory count cache
//! - `types` - Shared data types across all backends
//! - `traits` - Repository traits injected into the domain layer
//! - `error` - Unified error type for all backends
//!
//! ## Backend Support
//!
//! - `CostRuleRepository`, `ProjectDirectory` - Implemented by SQLite
//! - `CountBackend` - Implemented by ClickHouse and the search cluster

pub mod cache;
pub mod clickhouse;
pub mod error;
pub mod search;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export backend-specific services
pub use clickhouse::ClickhouseService;
pub use search::SearchService;
pub use sqlite::SqliteService;

// Re-export unified error type
pub use error::DataError;

// Re-export repository traits
pub use traits::{CostRuleRepository, CountBackend, ProjectDirectory};

// Re-export shared types for convenient access
pub use types::{CostRuleRow, CountBackendKind, CountScope, ProjectRow, UsageMetric};
