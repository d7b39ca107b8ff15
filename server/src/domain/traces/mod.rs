//! Trace span processing
//!
//! - `attributes` - Consume-once attribute bag over a span
//! - `canonical` - Canonical LLM fields lifted from span attributes
//! - `enrich` - Custom model cost enrichment

pub mod attributes;
mod canonical;
mod enrich;

pub use attributes::{AttrValue, Attribute, AttributeBag};
pub use canonical::{CanonicalAttributes, canonicalize_span};
pub use enrich::{EnrichError, SpanCostEnricher};
