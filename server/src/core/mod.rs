//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, Commands};
pub use config::AppConfig;

// Re-export backend-specific services for direct access when needed
pub use crate::data::{ClickhouseService, SearchService, SqliteService};
