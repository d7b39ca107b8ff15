// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "LangWatch";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "langwatch";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "langwatch.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "LANGWATCH_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "LANGWATCH_LOG";

// =============================================================================
// Environment Variables - Backends
// =============================================================================

/// Environment variable for the SQLite database path
pub const ENV_SQLITE_PATH: &str = "LANGWATCH_SQLITE_PATH";

/// Environment variable for the ClickHouse URL
pub const ENV_CLICKHOUSE_URL: &str = "LANGWATCH_CLICKHOUSE_URL";

/// Environment variable for the search cluster URL
pub const ENV_SEARCH_URL: &str = "LANGWATCH_SEARCH_URL";

/// Environment variable for the search cluster API key
pub const ENV_SEARCH_API_KEY: &str = "LANGWATCH_SEARCH_API_KEY";

/// Environment variable holding the license key
pub const ENV_LICENSE_KEY: &str = "LANGWATCH_LICENSE_KEY";

// =============================================================================
// SQLite Database
// =============================================================================

/// Default SQLite database path
pub const DEFAULT_SQLITE_PATH: &str = "langwatch.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// ClickHouse
// =============================================================================

/// Default ClickHouse database name
pub const DEFAULT_CLICKHOUSE_DATABASE: &str = "langwatch";

/// Table holding one summary row per trace
pub const CLICKHOUSE_TRACES_TABLE: &str = "trace_summaries";

/// Table holding scenario (simulation) events
pub const CLICKHOUSE_SCENARIO_EVENTS_TABLE: &str = "simulation_events";

// =============================================================================
// Search Cluster
// =============================================================================

/// Default search cluster URL
pub const DEFAULT_SEARCH_URL: &str = "http://localhost:9200";

/// Index alias for traces
pub const SEARCH_TRACES_INDEX: &str = "search-traces-alias";

/// Index alias for scenario events
pub const SEARCH_SCENARIO_EVENTS_INDEX: &str = "scenario-events-alias";

/// Request timeout for count queries in seconds
pub const SEARCH_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Usage Counting
// =============================================================================

/// Maximum per-project count queries in flight during one aggregation
pub const COUNT_QUERY_CONCURRENCY: usize = 16;

// =============================================================================
// Cache
// =============================================================================

/// Cache key version prefix
pub const CACHE_KEY_VERSION: &str = "v1";

/// Freshness window for cached message counts (5 minutes)
pub const CACHE_TTL_MESSAGE_COUNT: u64 = 300;

/// Maximum number of cached message counts
pub const CACHE_MAX_MESSAGE_COUNTS: u64 = 10_000;

// =============================================================================
// Span Attributes
// =============================================================================

/// Span attribute keys read and written by the trace pipeline
pub mod attrs {
    pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";
    pub const GEN_AI_RESPONSE_MODEL: &str = "gen_ai.response.model";
    pub const LLM_MODEL_NAME: &str = "llm.model_name";

    pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";
    pub const GEN_AI_USAGE_PROMPT_TOKENS: &str = "gen_ai.usage.prompt_tokens";
    pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";
    pub const GEN_AI_USAGE_COMPLETION_TOKENS: &str = "gen_ai.usage.completion_tokens";

    pub const LANGWATCH_METADATA_PREFIX: &str = "langwatch.metadata.";

    pub const LANGWATCH_INPUT_COST_PER_TOKEN: &str = "langwatch.model.inputCostPerToken";
    pub const LANGWATCH_OUTPUT_COST_PER_TOKEN: &str = "langwatch.model.outputCostPerToken";
}
