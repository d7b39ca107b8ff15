//! Usage accounting
//!
//! - `instance` - `<instance>__<organizationId>` identifiers
//! - `backends` - Per-project routing between columnar and search counts
//! - `collector` - Trace and scenario-event totals for an organization
//! - `messages` - Cached message (trace) counts for an org or project set

mod backends;
mod collector;
mod instance;
mod messages;

use serde::Serialize;
use thiserror::Error;

use crate::data::{DataError, UsageMetric};

pub use backends::UsageBackends;
pub use collector::UsageStatsCollector;
pub use instance::InstanceId;
pub use messages::{MessageCountScope, MessageCountService};

#[derive(Error, Debug)]
pub enum UsageError {
    #[error("Invalid instance id '{instance_id}': {reason}")]
    InvalidInstanceId { instance_id: String, reason: String },
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Usage totals summed over every project in scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatsResult {
    pub total_traces: u64,
    pub total_scenario_events: u64,
}

impl UsageStatsResult {
    pub fn add(&mut self, metric: UsageMetric, count: u64) {
        match metric {
            UsageMetric::Traces => self.total_traces += count,
            UsageMetric::ScenarioEvents => self.total_scenario_events += count,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process fakes for the usage data traits

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::data::{
        CountBackend, CountScope, DataError, ProjectDirectory, ProjectRow, UsageMetric,
    };

    pub fn project(id: &str, columnar_traces: bool, columnar_scenarios: bool) -> ProjectRow {
        ProjectRow {
            id: id.to_string(),
            organization_id: "org_1".to_string(),
            name: id.to_string(),
            uses_columnar_traces: columnar_traces,
            uses_columnar_scenarios: columnar_scenarios,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[derive(Default)]
    pub struct FakeDirectory {
        pub projects: Vec<ProjectRow>,
        pub calls: AtomicUsize,
    }

    impl FakeDirectory {
        pub fn with(projects: Vec<ProjectRow>) -> Self {
            Self {
                projects,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProjectDirectory for FakeDirectory {
        async fn list_projects(&self, organization_id: &str) -> Result<Vec<ProjectRow>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .projects
                .iter()
                .filter(|p| p.organization_id == organization_id)
                .cloned()
                .collect())
        }

        async fn get_projects(&self, ids: &[String]) -> Result<Vec<ProjectRow>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .projects
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }
    }

    /// Count backend answering from a fixed (project, metric) table
    pub struct FakeCounter {
        name: &'static str,
        available: bool,
        fail: bool,
        counts: HashMap<(String, UsageMetric), u64>,
        pub seen_targets: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl FakeCounter {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                available: true,
                fail: false,
                counts: HashMap::new(),
                seen_targets: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_count(mut self, project_id: &str, metric: UsageMetric, count: u64) -> Self {
            self.counts.insert((project_id.to_string(), metric), count);
            self
        }

        pub fn unavailable(mut self) -> Self {
            self.available = false;
            self
        }

        pub fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CountBackend for FakeCounter {
        fn backend_name(&self) -> &'static str {
            self.name
        }

        async fn count(&self, scope: CountScope<'_>) -> Result<u64, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_targets
                .lock()
                .unwrap()
                .push(scope.target.to_string());
            if self.fail {
                return Err(DataError::Search("cluster red".to_string()));
            }
            Ok(self
                .counts
                .get(&(scope.project_id.to_string(), scope.metric))
                .copied()
                .unwrap_or(0))
        }

        async fn is_available(&self) -> bool {
            self.available
        }
    }
}
