use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cli::CliConfig;
use super::constants::{
    CACHE_TTL_MESSAGE_COUNT, CONFIG_FILE_NAME, DEFAULT_CLICKHOUSE_DATABASE, DEFAULT_SEARCH_URL,
    DEFAULT_SQLITE_PATH,
};

/// Debug stand-in for an optional secret
pub(crate) fn redacted(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "[REDACTED]")
}

// =============================================================================
// File Config Structures (all fields optional, merged over defaults)
// =============================================================================

#[derive(Default, Clone, Deserialize)]
pub struct ClickhouseFileConfig {
    pub enabled: Option<bool>,
    pub url: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ClickhouseFileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickhouseFileConfig")
            .field("enabled", &self.enabled)
            .field("url", &self.url)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub sqlite_path: Option<PathBuf>,
    pub clickhouse: Option<ClickhouseFileConfig>,
}

#[derive(Default, Clone, Deserialize)]
pub struct SearchFileConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

impl fmt::Debug for SearchFileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchFileConfig")
            .field("url", &self.url)
            .field("api_key", &redacted(&self.api_key))
            .finish()
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PricingFileConfig {
    pub default_rules: Option<Vec<DefaultCostRuleConfig>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CacheFileConfig {
    pub message_count_ttl_secs: Option<u64>,
}

/// Global default cost rule, matched after a project's own overrides
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DefaultCostRuleConfig {
    pub model: String,
    pub regex: String,
    pub input_cost_per_token: Option<f64>,
    pub output_cost_per_token: Option<f64>,
}

#[derive(Default, Deserialize)]
pub struct FileConfig {
    pub database: Option<DatabaseFileConfig>,
    pub search: Option<SearchFileConfig>,
    pub pricing: Option<PricingFileConfig>,
    pub cache: Option<CacheFileConfig>,
    pub license_key: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl fmt::Debug for FileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileConfig")
            .field("database", &self.database)
            .field("search", &self.search)
            .field("pricing", &self.pricing)
            .field("cache", &self.cache)
            .field("license_key", &redacted(&self.license_key))
            .field("extra", &self.extra)
            .finish()
    }
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Resolved Config Structures
// =============================================================================

#[derive(Clone, PartialEq)]
pub struct ClickhouseConfig {
    pub enabled: bool,
    pub url: String,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ClickhouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickhouseConfig")
            .field("enabled", &self.enabled)
            .field("url", &self.url)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub sqlite_path: PathBuf,
    /// `None` when no ClickHouse URL is configured anywhere
    pub clickhouse: Option<ClickhouseConfig>,
}

#[derive(Clone, PartialEq)]
pub struct SearchConfig {
    pub url: String,
    pub api_key: Option<String>,
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("url", &self.url)
            .field("api_key", &redacted(&self.api_key))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingConfig {
    pub default_rules: Vec<DefaultCostRuleConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub message_count_ttl_secs: u64,
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub pricing: PricingConfig,
    pub cache: CacheConfig,
    pub license_key: Option<String>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database", &self.database)
            .field("search", &self.search)
            .field("pricing", &self.pricing)
            .field("cache", &self.cache)
            .field("license_key", &redacted(&self.license_key))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Local directory config OR CLI-specified config path
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let config_path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        let file_config = match config_path {
            Some(path) => {
                let file_config = FileConfig::load_from_file(&path)?;
                file_config.warn_unknown_fields();
                file_config
            }
            None => FileConfig::default(),
        };

        let config = Self::resolve(cli, file_config);
        config.validate()?;

        tracing::debug!(
            sqlite_path = %config.database.sqlite_path.display(),
            clickhouse = config.database.clickhouse.is_some(),
            search_url = %config.search.url,
            default_rules = config.pricing.default_rules.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Layer CLI/env overrides over file values and defaults
    fn resolve(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_database = file_config.database.unwrap_or_default();
        let file_clickhouse = file_database.clickhouse.unwrap_or_default();
        let file_search = file_config.search.unwrap_or_default();
        let file_pricing = file_config.pricing.unwrap_or_default();
        let file_cache = file_config.cache.unwrap_or_default();

        let sqlite_path = cli
            .sqlite_path
            .clone()
            .or(file_database.sqlite_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_PATH));

        let clickhouse = cli
            .clickhouse_url
            .clone()
            .or(file_clickhouse.url)
            .map(|url| ClickhouseConfig {
                enabled: file_clickhouse.enabled.unwrap_or(true),
                url,
                database: file_clickhouse
                    .database
                    .unwrap_or_else(|| DEFAULT_CLICKHOUSE_DATABASE.to_string()),
                user: file_clickhouse.user,
                password: file_clickhouse.password,
            });

        let search = SearchConfig {
            url: cli
                .search_url
                .clone()
                .or(file_search.url)
                .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            api_key: cli.search_api_key.clone().or(file_search.api_key),
        };

        Self {
            database: DatabaseConfig {
                sqlite_path,
                clickhouse,
            },
            search,
            pricing: PricingConfig {
                default_rules: file_pricing.default_rules.unwrap_or_default(),
            },
            cache: CacheConfig {
                message_count_ttl_secs: file_cache
                    .message_count_ttl_secs
                    .unwrap_or(CACHE_TTL_MESSAGE_COUNT),
            },
            license_key: cli.license_key.clone().or(file_config.license_key),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.search.url.trim().is_empty() {
            anyhow::bail!("search.url must not be empty");
        }
        if self.cache.message_count_ttl_secs == 0 {
            anyhow::bail!("cache.message_count_ttl_secs must be greater than 0");
        }
        for rule in &self.pricing.default_rules {
            regex::Regex::new(&rule.regex).with_context(|| {
                format!(
                    "Invalid regex for default cost rule '{}': {}",
                    rule.model, rule.regex
                )
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::resolve(&CliConfig::default(), FileConfig::default());
        assert_eq!(config.database.sqlite_path, PathBuf::from(DEFAULT_SQLITE_PATH));
        assert!(config.database.clickhouse.is_none());
        assert_eq!(config.search.url, DEFAULT_SEARCH_URL);
        assert_eq!(config.cache.message_count_ttl_secs, CACHE_TTL_MESSAGE_COUNT);
        assert!(config.license_key.is_none());
        assert!(config.pricing.default_rules.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"{
                "database": {
                    "sqlite_path": "/tmp/lw.db",
                    "clickhouse": { "url": "http://ch:8123", "database": "analytics" }
                },
                "search": { "url": "http://es:9200", "api_key": "secret" },
                "pricing": {
                    "default_rules": [
                        { "model": "gpt-4o", "regex": "^gpt-4o$", "input_cost_per_token": 0.0000025, "output_cost_per_token": 0.00001 }
                    ]
                },
                "cache": { "message_count_ttl_secs": 60 },
                "license_key": "PRO-123"
            }"#,
        );
        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.database.sqlite_path, PathBuf::from("/tmp/lw.db"));
        let clickhouse = config.database.clickhouse.unwrap();
        assert_eq!(clickhouse.url, "http://ch:8123");
        assert_eq!(clickhouse.database, "analytics");
        assert!(clickhouse.enabled);
        assert_eq!(config.search.api_key.as_deref(), Some("secret"));
        assert_eq!(config.pricing.default_rules.len(), 1);
        assert_eq!(config.cache.message_count_ttl_secs, 60);
        assert_eq!(config.license_key.as_deref(), Some("PRO-123"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = write_config(
            r#"{ "search": { "url": "http://es:9200" }, "license_key": "PRO-123" }"#,
        );
        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            search_url: Some("http://override:9200".to_string()),
            license_key: Some("ENT-999".to_string()),
            clickhouse_url: Some("http://ch:8123".to_string()),
            ..Default::default()
        };

        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.search.url, "http://override:9200");
        assert_eq!(config.license_key.as_deref(), Some("ENT-999"));
        assert_eq!(
            config.database.clickhouse.map(|c| c.database),
            Some(DEFAULT_CLICKHOUSE_DATABASE.to_string())
        );
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/langwatch.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_invalid_default_rule_regex_rejected() {
        let file = write_config(
            r#"{ "pricing": { "default_rules": [ { "model": "broken", "regex": "(" } ] } }"#,
        );
        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(format!("{:#}", err).contains("broken"));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let file = write_config(r#"{ "cache": { "message_count_ttl_secs": 0 } }"#);
        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let file_config: FileConfig = serde_json::from_str(
            r#"{
                "database": { "clickhouse": { "url": "http://ch:8123", "password": "ch-pass" } },
                "search": { "api_key": "es-key" },
                "license_key": "ENT-topsecret"
            }"#,
        )
        .unwrap();
        let rendered = format!("{:?}", file_config);
        for secret in ["ch-pass", "es-key", "ENT-topsecret"] {
            assert!(!rendered.contains(secret), "{secret} leaked: {rendered}");
        }
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("http://ch:8123"));

        let config = AppConfig::resolve(&CliConfig::default(), file_config);
        let rendered = format!("{:?}", config);
        for secret in ["ch-pass", "es-key", "ENT-topsecret"] {
            assert!(!rendered.contains(secret), "{secret} leaked: {rendered}");
        }

        let cli = CliConfig {
            search_api_key: Some("cli-key".to_string()),
            license_key: Some("PRO-cli".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", cli);
        assert!(!rendered.contains("cli-key"));
        assert!(!rendered.contains("PRO-cli"));
    }

    #[test]
    fn test_unknown_fields_are_captured() {
        let config: FileConfig = serde_json::from_str(r#"{ "licence_key": "typo" }"#).unwrap();
        assert!(config.license_key.is_none());
        assert!(config.extra.get("licence_key").is_some());
    }
}
