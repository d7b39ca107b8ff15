use clap::{Parser, Subcommand};

use std::fmt;
use std::path::PathBuf;

use super::config::redacted;
use super::constants::{
    ENV_CLICKHOUSE_URL, ENV_CONFIG, ENV_LICENSE_KEY, ENV_SEARCH_API_KEY, ENV_SEARCH_URL,
    ENV_SQLITE_PATH,
};

#[derive(Parser)]
#[command(name = "langwatch")]
#[command(version, about = "LLM observability backend tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// SQLite database path (projects and custom model costs)
    #[arg(long, global = true, env = ENV_SQLITE_PATH)]
    pub sqlite_path: Option<PathBuf>,

    /// ClickHouse connection URL (columnar usage backend)
    #[arg(long, global = true, env = ENV_CLICKHOUSE_URL)]
    pub clickhouse_url: Option<String>,

    /// Search cluster URL (document usage backend)
    #[arg(long, global = true, env = ENV_SEARCH_URL)]
    pub search_url: Option<String>,

    /// Search cluster API key
    #[arg(long, global = true, env = ENV_SEARCH_API_KEY, hide_env_values = true)]
    pub search_api_key: Option<String>,

    /// License key used to classify the current plan
    #[arg(long, global = true, env = ENV_LICENSE_KEY, hide_env_values = true)]
    pub license_key: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Print trace and scenario event totals for an instance
    Usage {
        /// Instance identifier (`<instance>__<organization id>`)
        instance_id: String,
    },
    /// Print the message count for an organization or a set of projects
    ///
    /// Counts are cached in memory for the life of the process, so a single
    /// invocation always queries the backends.
    Messages {
        /// Organization to count
        #[arg(long, conflicts_with = "project", required_unless_present = "project")]
        organization: Option<String>,
        /// Project to count (repeatable)
        #[arg(long)]
        project: Vec<String>,
    },
    /// Show the current plan, or check a capability against it
    Plan {
        /// Capability to check (e.g. custom-rbac)
        #[arg(long)]
        capability: Option<String>,
    },
    /// Enrich an OTLP trace export with custom model cost rates
    Enrich {
        /// Project whose custom model costs apply
        #[arg(long)]
        project: String,
        /// ExportTraceServiceRequest file (JSON, or protobuf with a `.pb` extension)
        input: PathBuf,
    },
    /// Print canonical attributes for every span in an OTLP trace export
    Inspect {
        /// ExportTraceServiceRequest file (JSON, or protobuf with a `.pb` extension)
        input: PathBuf,
    },
}

/// Configuration derived from CLI arguments
#[derive(Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub sqlite_path: Option<PathBuf>,
    pub clickhouse_url: Option<String>,
    pub search_url: Option<String>,
    pub search_api_key: Option<String>,
    pub license_key: Option<String>,
}

impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("config", &self.config)
            .field("sqlite_path", &self.sqlite_path)
            .field("clickhouse_url", &self.clickhouse_url)
            .field("search_url", &self.search_url)
            .field("search_api_key", &redacted(&self.search_api_key))
            .field("license_key", &redacted(&self.license_key))
            .finish()
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        sqlite_path: cli.sqlite_path,
        clickhouse_url: cli.clickhouse_url,
        search_url: cli.search_url,
        search_api_key: cli.search_api_key,
        license_key: cli.license_key,
    };
    (config, cli.command)
}
