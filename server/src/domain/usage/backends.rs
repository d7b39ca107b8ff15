//! Per-project routing between the two counting backends

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};

use super::UsageStatsResult;
use crate::core::constants::COUNT_QUERY_CONCURRENCY;
use crate::data::{CountBackend, CountBackendKind, CountScope, DataError, ProjectRow, UsageMetric};

/// Columnar and search count backends.
///
/// The columnar backend is optional. When it is missing or fails its
/// liveness check every query goes to the search backend, whatever the
/// project flags say.
#[derive(Clone)]
pub struct UsageBackends {
    columnar: Option<Arc<dyn CountBackend>>,
    search: Arc<dyn CountBackend>,
}

impl UsageBackends {
    pub fn new(columnar: Option<Arc<dyn CountBackend>>, search: Arc<dyn CountBackend>) -> Self {
        Self { columnar, search }
    }

    /// Columnar backend if configured and answering
    async fn live_columnar(&self) -> Option<&Arc<dyn CountBackend>> {
        let columnar = self.columnar.as_ref()?;
        if columnar.is_available().await {
            Some(columnar)
        } else {
            tracing::warn!(
                backend = columnar.backend_name(),
                "Columnar backend unavailable, counting from search backend"
            );
            None
        }
    }

    /// Count `metrics` for every project and sum per metric.
    ///
    /// At most `COUNT_QUERY_CONCURRENCY` queries are in flight at once. The
    /// first failing query fails the whole count.
    pub async fn count_projects(
        &self,
        projects: &[ProjectRow],
        metrics: &[UsageMetric],
    ) -> Result<UsageStatsResult, DataError> {
        if projects.is_empty() || metrics.is_empty() {
            return Ok(UsageStatsResult::default());
        }

        let columnar = self.live_columnar().await;

        let queries = projects.iter().flat_map(|project| {
            metrics.iter().map(move |&metric| {
                let (kind, backend) = match columnar {
                    Some(backend) if uses_columnar(project, metric) => {
                        (CountBackendKind::Columnar, backend.clone())
                    }
                    _ => (CountBackendKind::Search, self.search.clone()),
                };
                async move {
                    let scope = CountScope::new(kind, &project.id, metric);
                    let count = backend.count(scope).await?;
                    tracing::trace!(
                        project_id = %project.id,
                        %metric,
                        backend = %kind,
                        count,
                        "Counted project usage"
                    );
                    Ok::<_, DataError>((metric, count))
                }
            })
        });

        stream::iter(queries)
            .buffer_unordered(COUNT_QUERY_CONCURRENCY)
            .try_fold(UsageStatsResult::default(), |mut totals, (metric, count)| async move {
                totals.add(metric, count);
                Ok(totals)
            })
            .await
    }
}

fn uses_columnar(project: &ProjectRow, metric: UsageMetric) -> bool {
    match metric {
        UsageMetric::Traces => project.uses_columnar_traces,
        UsageMetric::ScenarioEvents => project.uses_columnar_scenarios,
    }
}
