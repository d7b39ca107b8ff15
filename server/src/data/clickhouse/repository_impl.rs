//! CountBackend trait implementation for ClickHouse
//!
//! ClickHouse operations are natively async so no spawn_blocking needed.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::CountBackend;
use crate::data::types::CountScope;

use super::ClickhouseService;
use super::repositories::count;

#[async_trait]
impl CountBackend for ClickhouseService {
    fn backend_name(&self) -> &'static str {
        "clickhouse"
    }

    async fn count(&self, scope: CountScope<'_>) -> Result<u64, DataError> {
        count::count(self.client(), &scope)
            .await
            .map_err(Into::into)
    }

    async fn is_available(&self) -> bool {
        match self.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "ClickHouse health check failed");
                false
            }
        }
    }
}
