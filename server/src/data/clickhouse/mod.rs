//! ClickHouse columnar service
//!
//! Async HTTP client for the columnar analytics store used for usage counts.
//! The clickhouse crate's Client pools connections via HTTP keep-alive.

pub mod error;
pub mod repositories;
mod repository_impl;

pub use error::ClickhouseError;

use clickhouse::Client;

use crate::core::config::ClickhouseConfig;

/// ClickHouse columnar service
pub struct ClickhouseService {
    client: Client,
}

impl ClickhouseService {
    /// Build a ClickHouse client from configuration.
    ///
    /// Returns `None` when ClickHouse is not configured, disabled, or has no
    /// usable URL. Callers treat `None` as "columnar backend unavailable".
    pub fn connect(config: Option<&ClickhouseConfig>) -> Option<Self> {
        let config = config?;
        if !config.enabled {
            tracing::debug!("ClickHouse disabled by config");
            return None;
        }
        let url = config.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            tracing::warn!(url = %config.url, "ClickHouse URL is not an http(s) URL, ignoring");
            return None;
        }

        let mut client = Client::default()
            .with_url(url)
            .with_database(&config.database)
            .with_compression(clickhouse::Compression::Lz4);

        if let Some(ref user) = config.user {
            client = client.with_user(user);
        }
        if let Some(ref password) = config.password {
            client = client.with_password(password);
        }

        tracing::debug!(
            url = %url,
            database = %config.database,
            "ClickhouseService initialized"
        );

        Some(Self { client })
    }

    /// Get the ClickHouse client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Health check - verify connection to ClickHouse
    pub async fn health_check(&self) -> Result<(), ClickhouseError> {
        self.client
            .query("SELECT 1")
            .execute()
            .await
            .map_err(|e| ClickhouseError::Connection(e.to_string()))
    }
}
