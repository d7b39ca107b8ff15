//! Core application

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use serde::Serialize;

use crate::core::cli::{self, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::data::cache::CountCache;
use crate::data::{ClickhouseService, CountBackend, SearchService, SqliteService};
use crate::domain::entitlements::{Capability, EntitlementGate};
use crate::domain::pricing::CostRule;
use crate::domain::traces::{SpanCostEnricher, canonicalize_span};
use crate::domain::usage::{
    MessageCountScope, MessageCountService, UsageBackends, UsageStatsCollector,
};
use crate::utils::otlp::{OtlpFormat, decode_request, encode_json};

pub struct CoreApp {
    pub config: AppConfig,
    pub database: Arc<SqliteService>,
    pub backends: UsageBackends,
    /// Owns the message count cache for the life of the process
    pub messages: MessageCountService,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let config = AppConfig::load(&cli_config)?;

        // Commands that need no storage
        match &command {
            Commands::Plan { capability } => {
                return Self::handle_plan(&config, capability.as_deref());
            }
            Commands::Inspect { input } => return Self::handle_inspect(input),
            _ => {}
        }

        let app = Self::init(config).await?;
        let result = app.dispatch(command).await;
        app.database.close().await;
        result
    }

    async fn init(config: AppConfig) -> Result<Self> {
        let database = SqliteService::init(&config.database.sqlite_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to open SQLite database: {}",
                    config.database.sqlite_path.display()
                )
            })?;

        let search = SearchService::new(&config.search)
            .map_err(|e| anyhow::anyhow!("Failed to initialize search backend: {}", e))?;
        let columnar = ClickhouseService::connect(config.database.clickhouse.as_ref())
            .map(|ch| Arc::new(ch) as Arc<dyn CountBackend>);
        if columnar.is_none() {
            tracing::debug!("ClickHouse not configured, usage counts come from search backend");
        }

        let database = Arc::new(database);
        let backends = UsageBackends::new(columnar, Arc::new(search));
        let messages = MessageCountService::new(
            database.clone(),
            backends.clone(),
            CountCache::new(Duration::from_secs(config.cache.message_count_ttl_secs)),
        );

        Ok(Self {
            config,
            database,
            backends,
            messages,
        })
    }

    async fn dispatch(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Usage { instance_id } => {
                let collector = UsageStatsCollector::new(self.database.clone(), self.backends.clone());
                let stats = collector.collect_usage_stats(&instance_id).await?;
                print_json(&stats)
            }
            Commands::Messages {
                organization,
                project,
            } => {
                let scope = match organization {
                    Some(id) => MessageCountScope::Organization(id),
                    None => MessageCountScope::Projects(project),
                };
                let count = self.messages.count(&scope).await?;
                print_json(&serde_json::json!({ "messageCount": count }))
            }
            Commands::Enrich { project, input } => self.handle_enrich(&project, &input).await,
            Commands::Plan { .. } | Commands::Inspect { .. } => Ok(()),
        }
    }

    async fn handle_enrich(&self, project_id: &str, input: &Path) -> Result<()> {
        let default_rules = self
            .config
            .pricing
            .default_rules
            .iter()
            .cloned()
            .map(CostRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let enricher =
            SpanCostEnricher::new(self.database.clone()).with_default_rules(default_rules);

        let mut request = read_trace_request(input)?;
        let enriched = enricher.enrich_request(&mut request, project_id).await?;
        tracing::info!(%project_id, enriched, "Spans enriched");

        println!("{}", encode_json(&request)?);
        Ok(())
    }

    fn handle_plan(config: &AppConfig, capability: Option<&str>) -> Result<()> {
        let gate = EntitlementGate::new(config.license_key.clone());
        let tier = gate.current_plan();

        let Some(name) = capability else {
            return print_json(&serde_json::json!({
                "plan": tier,
                "capabilities": tier.capabilities(),
            }));
        };

        let capability: Capability = name.parse()?;
        gate.require_entitlement_for_current_plan(capability)?;
        print_json(&serde_json::json!({
            "plan": tier,
            "capability": capability,
            "allowed": true,
        }))
    }

    fn handle_inspect(input: &Path) -> Result<()> {
        let request = read_trace_request(input)?;
        let spans: Vec<_> = request
            .resource_spans
            .iter()
            .flat_map(|rs| &rs.scope_spans)
            .flat_map(|ss| &ss.spans)
            .map(canonicalize_span)
            .collect();
        print_json(&spans)
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}

fn read_trace_request(path: &Path) -> Result<ExportTraceServiceRequest> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let format = OtlpFormat::from_path(path);
    tracing::debug!(path = %path.display(), %format, bytes = bytes.len(), "Decoding trace export");
    decode_request(&bytes, format).with_context(|| format!("Invalid trace export: {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
