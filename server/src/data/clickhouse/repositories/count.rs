//! Usage count queries (ClickHouse backend)

use clickhouse::{Client, Row};
use serde::Deserialize;

use crate::data::clickhouse::ClickhouseError;
use crate::data::types::{CountScope, UsageMetric};

/// ClickHouse row for count query
#[derive(Row, Deserialize)]
struct ChCountRow {
    count: u64,
}

/// Build the count SQL for a scope. The project id is bound as a parameter.
///
/// Traces are counted by distinct `TraceId` since summary rows may be
/// rewritten before merges collapse them.
pub(crate) fn count_sql(scope: &CountScope<'_>) -> String {
    let aggregate = match scope.metric {
        UsageMetric::Traces => "count(DISTINCT TraceId)",
        UsageMetric::ScenarioEvents => "count()",
    };
    format!(
        "SELECT {} AS count FROM {} WHERE TenantId = ?",
        aggregate, scope.target
    )
}

/// Count records for one project and metric
pub async fn count(client: &Client, scope: &CountScope<'_>) -> Result<u64, ClickhouseError> {
    let sql = count_sql(scope);
    let row: ChCountRow = client
        .query(&sql)
        .bind(scope.project_id)
        .fetch_one()
        .await?;

    tracing::trace!(
        project_id = %scope.project_id,
        metric = %scope.metric,
        count = row.count,
        "ClickHouse count"
    );
    Ok(row.count)
}
