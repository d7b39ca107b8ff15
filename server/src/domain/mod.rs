//! Domain logic for LLM usage and cost accounting
//!
//! - `entitlements` - Plan tier classification and capability gating
//! - `pricing` - Custom model cost rules and matching
//! - `traces` - Span attribute canonicalisation and cost enrichment
//! - `usage` - Usage stats and message counts across count backends

pub mod entitlements;
pub mod pricing;
pub mod traces;
pub mod usage;

pub use entitlements::{Capability, EntitlementError, EntitlementGate, PlanTier};
pub use pricing::{CostMatcher, CostRule, PricingError, match_model_cost};
pub use traces::{AttributeBag, CanonicalAttributes, SpanCostEnricher, canonicalize_span};
pub use usage::{
    MessageCountScope, MessageCountService, UsageBackends, UsageError, UsageStatsCollector,
    UsageStatsResult,
};
