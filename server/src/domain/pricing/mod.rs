//! Custom model cost rules
//!
//! A cost rule maps a model-name pattern to per-token rates. Rules come from
//! two places: project overrides stored in SQLite and global defaults from
//! config. Matching is first-match over a caller-ordered list.

use regex::Regex;
use thiserror::Error;

use crate::core::config::DefaultCostRuleConfig;
use crate::data::types::CostRuleRow;

// ============================================================================
// ERROR TYPE
// ============================================================================

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Invalid cost rule for model '{model}': {reason}")]
    InvalidRule { model: String, reason: String },
}

// ============================================================================
// COST RULE
// ============================================================================

/// Validated cost rule.
///
/// An absent rate means "no override". Zero is a real rate and is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct CostRule {
    /// Owning project, `None` for global defaults
    pub project_id: Option<String>,
    /// Human-readable model label
    pub model: String,
    /// Pattern matched against the runtime model identifier
    pub regex: String,
    pub input_cost_per_token: Option<f64>,
    pub output_cost_per_token: Option<f64>,
}

impl CostRule {
    fn validate(self) -> Result<Self, PricingError> {
        let invalid = |reason: &str| PricingError::InvalidRule {
            model: self.model.clone(),
            reason: reason.to_string(),
        };

        if self.model.trim().is_empty() {
            return Err(invalid("model is empty"));
        }
        if self.regex.is_empty() {
            return Err(invalid("regex is empty"));
        }
        for (name, rate) in [
            ("input_cost_per_token", self.input_cost_per_token),
            ("output_cost_per_token", self.output_cost_per_token),
        ] {
            if let Some(rate) = rate
                && (!rate.is_finite() || rate < 0.0)
            {
                return Err(invalid(&format!("{} must be a non-negative number", name)));
            }
        }
        Ok(self)
    }
}

impl TryFrom<CostRuleRow> for CostRule {
    type Error = PricingError;

    fn try_from(row: CostRuleRow) -> Result<Self, Self::Error> {
        CostRule {
            project_id: Some(row.project_id),
            model: row.model,
            regex: row.regex,
            input_cost_per_token: row.input_cost_per_token,
            output_cost_per_token: row.output_cost_per_token,
        }
        .validate()
    }
}

impl TryFrom<DefaultCostRuleConfig> for CostRule {
    type Error = PricingError;

    fn try_from(config: DefaultCostRuleConfig) -> Result<Self, Self::Error> {
        CostRule {
            project_id: None,
            model: config.model,
            regex: config.regex,
            input_cost_per_token: config.input_cost_per_token,
            output_cost_per_token: config.output_cost_per_token,
        }
        .validate()
    }
}

// ============================================================================
// MATCHING
// ============================================================================

/// First rule whose regex matches `model`, in list order.
///
/// A rule with a pattern that doesn't compile is skipped.
pub fn match_model_cost<'a>(model: &str, rules: &'a [CostRule]) -> Option<&'a CostRule> {
    rules
        .iter()
        .find(|rule| compile(rule).is_some_and(|re| re.is_match(model)))
}

/// Rule list with every pattern compiled up front.
///
/// Built once per batch of spans so each regex is compiled once. Matching
/// order and invalid-pattern handling are the same as `match_model_cost`.
pub struct CostMatcher<'a> {
    compiled: Vec<(Regex, &'a CostRule)>,
}

impl<'a> CostMatcher<'a> {
    pub fn new(rules: &'a [CostRule]) -> Self {
        let compiled = rules
            .iter()
            .filter_map(|rule| compile(rule).map(|re| (re, rule)))
            .collect();
        Self { compiled }
    }

    /// Number of usable rules
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn find(&self, model: &str) -> Option<&'a CostRule> {
        self.compiled
            .iter()
            .find(|(re, _)| re.is_match(model))
            .map(|&(_, rule)| rule)
    }
}

fn compile(rule: &CostRule) -> Option<Regex> {
    match Regex::new(&rule.regex) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(
                model = %rule.model,
                regex = %rule.regex,
                error = %e,
                "Skipping cost rule with invalid regex"
            );
            None
        }
    }
}
