//! ClickHouse repository modules
//!
//! - **count**: Per-project usage counts

pub mod count;
