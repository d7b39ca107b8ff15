//! Repository trait implementations for SQLite
//!
//! Implements the project directory and custom cost store for `SqliteService`.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::{CostRuleRepository, ProjectDirectory};
use crate::data::types::{CostRuleRow, ProjectRow};

use super::SqliteService;
use super::repositories::{cost_rule, project};

#[async_trait]
impl CostRuleRepository for SqliteService {
    async fn get_custom_model_costs(
        &self,
        project_id: &str,
    ) -> Result<Vec<CostRuleRow>, DataError> {
        cost_rule::list_for_project(self.pool(), project_id)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl ProjectDirectory for SqliteService {
    async fn list_projects(&self, organization_id: &str) -> Result<Vec<ProjectRow>, DataError> {
        project::list_for_org(self.pool(), organization_id)
            .await
            .map_err(Into::into)
    }

    async fn get_projects(&self, ids: &[String]) -> Result<Vec<ProjectRow>, DataError> {
        project::get_by_ids(self.pool(), ids)
            .await
            .map_err(Into::into)
    }
}
