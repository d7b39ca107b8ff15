//! SQLite repositories
//!
//! Types (ProjectRow, CostRuleRow) should be imported from `crate::data::types`.

pub mod cost_rule;
pub mod project;

pub use cost_rule::{create_cost_rule, list_for_project as list_cost_rules_for_project};
pub use project::{
    create_project, get_by_ids as get_projects_by_ids, list_for_org as list_projects_for_org,
    set_project_features,
};
