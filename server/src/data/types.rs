//! Shared data types across all backends

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::constants::{
    CLICKHOUSE_SCENARIO_EVENTS_TABLE, CLICKHOUSE_TRACES_TABLE, SEARCH_SCENARIO_EVENTS_INDEX,
    SEARCH_TRACES_INDEX,
};

// ============================================================================
// Transactional rows
// ============================================================================

/// Project row with its per-project backend routing flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    /// Count traces from the columnar backend
    pub uses_columnar_traces: bool,
    /// Count scenario events from the columnar backend
    pub uses_columnar_scenarios: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Custom model cost row as stored (unvalidated)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRuleRow {
    pub id: String,
    pub project_id: String,
    pub model: String,
    pub regex: String,
    pub input_cost_per_token: Option<f64>,
    pub output_cost_per_token: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

// ============================================================================
// Usage counting
// ============================================================================

/// Metric counted for usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageMetric {
    Traces,
    ScenarioEvents,
}

impl UsageMetric {
    pub const ALL: [UsageMetric; 2] = [UsageMetric::Traces, UsageMetric::ScenarioEvents];

    pub fn as_str(&self) -> &'static str {
        match self {
            UsageMetric::Traces => "traces",
            UsageMetric::ScenarioEvents => "scenario_events",
        }
    }
}

impl fmt::Display for UsageMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which counting backend a query is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountBackendKind {
    /// Columnar/analytical store (ClickHouse)
    Columnar,
    /// Document/search store (Elasticsearch-compatible)
    Search,
}

impl CountBackendKind {
    /// Table or index holding the given metric in this backend
    pub fn target(&self, metric: UsageMetric) -> &'static str {
        match (self, metric) {
            (CountBackendKind::Columnar, UsageMetric::Traces) => CLICKHOUSE_TRACES_TABLE,
            (CountBackendKind::Columnar, UsageMetric::ScenarioEvents) => {
                CLICKHOUSE_SCENARIO_EVENTS_TABLE
            }
            (CountBackendKind::Search, UsageMetric::Traces) => SEARCH_TRACES_INDEX,
            (CountBackendKind::Search, UsageMetric::ScenarioEvents) => {
                SEARCH_SCENARIO_EVENTS_INDEX
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CountBackendKind::Columnar => "columnar",
            CountBackendKind::Search => "search",
        }
    }
}

impl fmt::Display for CountBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope of a single count query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountScope<'a> {
    /// Table (columnar) or index (search) to count in
    pub target: &'a str,
    pub project_id: &'a str,
    pub metric: UsageMetric,
}

impl<'a> CountScope<'a> {
    pub fn new(backend: CountBackendKind, project_id: &'a str, metric: UsageMetric) -> Self {
        Self {
            target: backend.target(metric),
            project_id,
            metric,
        }
    }
}
