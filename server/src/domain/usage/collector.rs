//! Usage stats collection for an instance's organization

use std::sync::Arc;

use super::{InstanceId, UsageBackends, UsageError, UsageStatsResult};
use crate::data::{ProjectDirectory, UsageMetric};

/// Sums trace and scenario-event counts across an organization's projects
pub struct UsageStatsCollector {
    projects: Arc<dyn ProjectDirectory>,
    backends: UsageBackends,
}

impl UsageStatsCollector {
    pub fn new(projects: Arc<dyn ProjectDirectory>, backends: UsageBackends) -> Self {
        Self { projects, backends }
    }

    /// Collect usage totals for `<instance>__<organizationId>`.
    ///
    /// The id is validated before any data access. An organization with no
    /// projects yields zero totals without touching either backend.
    pub async fn collect_usage_stats(
        &self,
        instance_id: &str,
    ) -> Result<UsageStatsResult, UsageError> {
        let instance: InstanceId = instance_id.parse()?;

        let projects = self.projects.list_projects(&instance.organization_id).await?;
        if projects.is_empty() {
            tracing::debug!(organization_id = %instance.organization_id, "No projects, usage is zero");
            return Ok(UsageStatsResult::default());
        }

        let totals = self
            .backends
            .count_projects(&projects, &UsageMetric::ALL)
            .await?;

        tracing::debug!(
            organization_id = %instance.organization_id,
            projects = projects.len(),
            total_traces = totals.total_traces,
            total_scenario_events = totals.total_scenario_events,
            "Collected usage stats"
        );
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::usage::testing::{FakeCounter, FakeDirectory, project};

    fn collector(
        directory: Arc<FakeDirectory>,
        columnar: Option<Arc<FakeCounter>>,
        search: Arc<FakeCounter>,
    ) -> UsageStatsCollector {
        let columnar = columnar.map(|c| c as Arc<dyn crate::data::CountBackend>);
        UsageStatsCollector::new(directory, UsageBackends::new(columnar, search))
    }

    #[tokio::test]
    async fn test_invalid_instance_id_fails_before_data_access() {
        let directory = Arc::new(FakeDirectory::with(vec![project("p1", true, true)]));
        let search = Arc::new(FakeCounter::new("search"));
        let collector = collector(directory.clone(), None, search.clone());

        let err = collector.collect_usage_stats("no-separator").await.unwrap_err();
        assert!(matches!(err, UsageError::InvalidInstanceId { .. }));
        assert_eq!(directory.calls(), 0);
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn test_zero_projects_makes_no_backend_calls() {
        let directory = Arc::new(FakeDirectory::default());
        let columnar = Arc::new(FakeCounter::new("clickhouse"));
        let search = Arc::new(FakeCounter::new("search"));
        let collector = collector(directory, Some(columnar.clone()), search.clone());

        let stats = collector.collect_usage_stats("inst__org_1").await.unwrap();
        assert_eq!(stats, UsageStatsResult::default());
        assert_eq!(columnar.calls(), 0);
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn test_columnar_project_never_hits_search() {
        let directory = Arc::new(FakeDirectory::with(vec![project("p1", true, true)]));
        let columnar = Arc::new(
            FakeCounter::new("clickhouse")
                .with_count("p1", UsageMetric::Traces, 200)
                .with_count("p1", UsageMetric::ScenarioEvents, 75),
        );
        let search = Arc::new(FakeCounter::new("search"));
        let collector = collector(directory, Some(columnar.clone()), search.clone());

        let stats = collector.collect_usage_stats("inst__org_1").await.unwrap();
        assert_eq!(
            stats,
            UsageStatsResult {
                total_traces: 200,
                total_scenario_events: 75,
            }
        );
        assert_eq!(columnar.calls(), 2);
        assert_eq!(search.calls(), 0);

        let mut targets = columnar.seen_targets.lock().unwrap().clone();
        targets.sort();
        assert_eq!(targets, vec!["simulation_events", "trace_summaries"]);
    }

    #[tokio::test]
    async fn test_mixed_flags_sum_across_backends() {
        let directory = Arc::new(FakeDirectory::with(vec![
            project("p1", true, false),
            project("p2", false, true),
        ]));
        let columnar = Arc::new(
            FakeCounter::new("clickhouse")
                .with_count("p1", UsageMetric::Traces, 100)
                .with_count("p2", UsageMetric::ScenarioEvents, 30),
        );
        let search = Arc::new(
            FakeCounter::new("search")
                .with_count("p2", UsageMetric::Traces, 50)
                .with_count("p1", UsageMetric::ScenarioEvents, 20),
        );
        let collector = collector(directory, Some(columnar.clone()), search.clone());

        let stats = collector.collect_usage_stats("inst__org_1").await.unwrap();
        assert_eq!(stats.total_traces, 150);
        assert_eq!(stats.total_scenario_events, 50);
        assert_eq!(columnar.calls(), 2);
        assert_eq!(search.calls(), 2);

        let mut targets = search.seen_targets.lock().unwrap().clone();
        targets.sort();
        assert_eq!(targets, vec!["scenario-events-alias", "search-traces-alias"]);
    }

    #[tokio::test]
    async fn test_unavailable_columnar_falls_back_to_search() {
        let directory = Arc::new(FakeDirectory::with(vec![project("p1", true, true)]));
        let columnar = Arc::new(
            FakeCounter::new("clickhouse")
                .with_count("p1", UsageMetric::Traces, 999)
                .unavailable(),
        );
        let search = Arc::new(
            FakeCounter::new("search")
                .with_count("p1", UsageMetric::Traces, 7)
                .with_count("p1", UsageMetric::ScenarioEvents, 3),
        );
        let collector = collector(directory, Some(columnar.clone()), search.clone());

        let stats = collector.collect_usage_stats("inst__org_1").await.unwrap();
        assert_eq!(stats.total_traces, 7);
        assert_eq!(stats.total_scenario_events, 3);
        assert_eq!(columnar.calls(), 0);
        assert_eq!(search.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_columnar_falls_back_to_search() {
        let directory = Arc::new(FakeDirectory::with(vec![project("p1", true, false)]));
        let search = Arc::new(FakeCounter::new("search").with_count("p1", UsageMetric::Traces, 4));
        let collector = collector(directory, None, search.clone());

        let stats = collector.collect_usage_stats("inst__org_1").await.unwrap();
        assert_eq!(stats.total_traces, 4);
        assert_eq!(search.calls(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let directory = Arc::new(FakeDirectory::with(vec![project("p1", false, false)]));
        let search = Arc::new(FakeCounter::new("search").failing());
        let collector = collector(directory, None, search);

        let err = collector.collect_usage_stats("inst__org_1").await.unwrap_err();
        assert!(matches!(err, UsageError::Data(_)));
    }
}
