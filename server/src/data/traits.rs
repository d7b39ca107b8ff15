//! Repository traits for data backends
//!
//! The domain layer receives these as `Arc<dyn ...>` so tests can substitute
//! in-process fakes for the SQLite store, ClickHouse and the search cluster.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{CostRuleRow, CountScope, ProjectRow};

/// Source of project-specific custom model costs
#[async_trait]
pub trait CostRuleRepository: Send + Sync {
    /// Custom cost rows for a project, in priority order.
    ///
    /// Returns only the project's own overrides, never global defaults.
    async fn get_custom_model_costs(&self, project_id: &str)
    -> Result<Vec<CostRuleRow>, DataError>;
}

/// Organization to project lookup
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Projects belonging to an organization with their routing flags
    async fn list_projects(&self, organization_id: &str) -> Result<Vec<ProjectRow>, DataError>;

    /// Projects with the given IDs. Unknown IDs are skipped.
    async fn get_projects(&self, ids: &[String]) -> Result<Vec<ProjectRow>, DataError>;
}

/// Backend able to count usage records for one project and metric
#[async_trait]
pub trait CountBackend: Send + Sync {
    /// Backend name for logs and errors
    fn backend_name(&self) -> &'static str;

    /// Count records matching the scope
    async fn count(&self, scope: CountScope<'_>) -> Result<u64, DataError>;

    /// Liveness check. Backends that cannot go away report `true`.
    async fn is_available(&self) -> bool {
        true
    }
}
