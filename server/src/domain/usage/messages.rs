//! Cached message counts
//!
//! A message is a trace. Counts are cached for a short freshness window,
//! keyed by organization or by the project set. A cache miss always falls
//! through to the backends.

use std::sync::Arc;

use super::{UsageBackends, UsageError};
use crate::data::cache::{CacheKey, CountCache};
use crate::data::{ProjectDirectory, UsageMetric};

/// What a message count covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageCountScope {
    Organization(String),
    Projects(Vec<String>),
}

impl MessageCountScope {
    fn cache_key(&self) -> String {
        match self {
            MessageCountScope::Organization(id) => CacheKey::message_count_org(id),
            MessageCountScope::Projects(ids) => CacheKey::message_count_projects(ids),
        }
    }
}

pub struct MessageCountService {
    projects: Arc<dyn ProjectDirectory>,
    backends: UsageBackends,
    cache: CountCache,
}

impl MessageCountService {
    pub fn new(
        projects: Arc<dyn ProjectDirectory>,
        backends: UsageBackends,
        cache: CountCache,
    ) -> Self {
        Self {
            projects,
            backends,
            cache,
        }
    }

    pub async fn count(&self, scope: &MessageCountScope) -> Result<u64, UsageError> {
        let key = scope.cache_key();
        if let Some(count) = self.cache.get(&key).await {
            tracing::trace!(%key, count, "Message count cache hit");
            return Ok(count);
        }

        let projects = match scope {
            MessageCountScope::Organization(id) => self.projects.list_projects(id).await?,
            MessageCountScope::Projects(ids) if ids.is_empty() => Vec::new(),
            MessageCountScope::Projects(ids) => self.projects.get_projects(ids).await?,
        };

        let count = self
            .backends
            .count_projects(&projects, &[UsageMetric::Traces])
            .await?
            .total_traces;

        self.cache.set(&key, count).await;
        tracing::debug!(%key, projects = projects.len(), count, "Message count computed");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::data::CountBackend;
    use crate::domain::usage::testing::{FakeCounter, FakeDirectory, project};

    fn service(
        directory: Arc<FakeDirectory>,
        columnar: Arc<FakeCounter>,
        search: Arc<FakeCounter>,
        ttl: Duration,
    ) -> MessageCountService {
        MessageCountService::new(
            directory,
            UsageBackends::new(Some(columnar as Arc<dyn CountBackend>), search),
            CountCache::new(ttl),
        )
    }

    #[tokio::test]
    async fn test_org_count_is_cached() {
        let directory = Arc::new(FakeDirectory::with(vec![
            project("p1", true, false),
            project("p2", false, false),
        ]));
        let columnar =
            Arc::new(FakeCounter::new("clickhouse").with_count("p1", UsageMetric::Traces, 10));
        let search = Arc::new(FakeCounter::new("search").with_count("p2", UsageMetric::Traces, 5));
        let service = service(
            directory.clone(),
            columnar.clone(),
            search.clone(),
            Duration::from_secs(300),
        );

        let scope = MessageCountScope::Organization("org_1".to_string());
        assert_eq!(service.count(&scope).await.unwrap(), 15);
        assert_eq!(service.count(&scope).await.unwrap(), 15);

        assert_eq!(directory.calls(), 1);
        assert_eq!(columnar.calls(), 1);
        assert_eq!(search.calls(), 1);
    }

    #[tokio::test]
    async fn test_project_scope_shares_cache_entry_regardless_of_order() {
        let directory = Arc::new(FakeDirectory::with(vec![
            project("p1", false, false),
            project("p2", false, false),
        ]));
        let columnar = Arc::new(FakeCounter::new("clickhouse"));
        let search = Arc::new(
            FakeCounter::new("search")
                .with_count("p1", UsageMetric::Traces, 2)
                .with_count("p2", UsageMetric::Traces, 3),
        );
        let service = service(
            directory.clone(),
            columnar,
            search.clone(),
            Duration::from_secs(300),
        );

        let first = MessageCountScope::Projects(vec!["p2".to_string(), "p1".to_string()]);
        let second = MessageCountScope::Projects(vec!["p1".to_string(), "p2".to_string()]);
        assert_eq!(service.count(&first).await.unwrap(), 5);
        assert_eq!(service.count(&second).await.unwrap(), 5);
        assert_eq!(directory.calls(), 1);
        assert_eq!(search.calls(), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_is_recomputed() {
        let directory = Arc::new(FakeDirectory::with(vec![project("p1", false, false)]));
        let columnar = Arc::new(FakeCounter::new("clickhouse"));
        let search = Arc::new(FakeCounter::new("search").with_count("p1", UsageMetric::Traces, 1));
        let service = service(
            directory.clone(),
            columnar,
            search,
            Duration::from_millis(50),
        );

        let scope = MessageCountScope::Organization("org_1".to_string());
        service.count(&scope).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        service.count(&scope).await.unwrap();
        assert_eq!(directory.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_project_set_is_zero() {
        let directory = Arc::new(FakeDirectory::default());
        let columnar = Arc::new(FakeCounter::new("clickhouse"));
        let search = Arc::new(FakeCounter::new("search"));
        let service = service(
            directory.clone(),
            columnar,
            search.clone(),
            Duration::from_secs(300),
        );

        let count = service
            .count(&MessageCountScope::Projects(Vec::new()))
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(directory.calls(), 0);
        assert_eq!(search.calls(), 0);
    }
}
