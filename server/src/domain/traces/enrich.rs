//! Span cost enrichment
//!
//! Looks up the model a span was called with, matches it against the
//! project's custom cost rules (then the global defaults) and appends the
//! matched per-token rates to the span as double attributes:
//! - `langwatch.model.inputCostPerToken`
//! - `langwatch.model.outputCostPerToken`
//!
//! Enrichment appends, so running it twice over the same span writes the
//! rates twice. Callers enrich each span once per pipeline pass.

use std::sync::Arc;

use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::KeyValue;
use opentelemetry_proto::tonic::trace::v1::Span;
use thiserror::Error;

use super::attributes::AttributeBag;
use crate::core::constants::attrs;
use crate::data::{CostRuleRepository, DataError};
use crate::domain::pricing::{CostMatcher, CostRule, PricingError, match_model_cost};
use crate::utils::otlp::make_double_attr;

/// Model keys in preference order
const MODEL_KEYS: [&str; 2] = [attrs::GEN_AI_REQUEST_MODEL, attrs::GEN_AI_RESPONSE_MODEL];

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Appends custom cost rates to spans
pub struct SpanCostEnricher {
    costs: Arc<dyn CostRuleRepository>,
    default_rules: Vec<CostRule>,
}

impl SpanCostEnricher {
    pub fn new(costs: Arc<dyn CostRuleRepository>) -> Self {
        Self {
            costs,
            default_rules: Vec::new(),
        }
    }

    /// Global rules tried after the project's own overrides
    pub fn with_default_rules(mut self, rules: Vec<CostRule>) -> Self {
        self.default_rules = rules;
        self
    }

    /// Enrich a single span. Returns whether cost attributes were appended.
    ///
    /// A span without a model attribute returns early without reading the
    /// cost store.
    pub async fn enrich_span(&self, span: &mut Span, project_id: &str) -> Result<bool, EnrichError> {
        let Some(model) = model_identifier(&span.attributes) else {
            tracing::trace!(span_name = %span.name, "No model attribute, skipping cost lookup");
            return Ok(false);
        };

        let rules = self.rules_for(project_id).await?;
        Ok(apply_cost(span, &model, match_model_cost(&model, &rules)))
    }

    /// Enrich every span of an export request, reading the cost store and
    /// compiling the rule patterns at most once.
    ///
    /// Returns the number of spans that received cost attributes.
    pub async fn enrich_request(
        &self,
        request: &mut ExportTraceServiceRequest,
        project_id: &str,
    ) -> Result<usize, EnrichError> {
        let has_model = request
            .resource_spans
            .iter()
            .flat_map(|rs| &rs.scope_spans)
            .flat_map(|ss| &ss.spans)
            .any(|span| model_identifier(&span.attributes).is_some());
        if !has_model {
            tracing::debug!(%project_id, "No spans with a model attribute");
            return Ok(0);
        }

        let rules = self.rules_for(project_id).await?;
        let matcher = CostMatcher::new(&rules);

        let mut enriched = 0;
        for span in request
            .resource_spans
            .iter_mut()
            .flat_map(|rs| rs.scope_spans.iter_mut())
            .flat_map(|ss| ss.spans.iter_mut())
        {
            if let Some(model) = model_identifier(&span.attributes)
                && apply_cost(span, &model, matcher.find(&model))
            {
                enriched += 1;
            }
        }

        tracing::debug!(
            %project_id,
            enriched,
            rules = matcher.len(),
            "Enriched export request"
        );
        Ok(enriched)
    }

    /// Project overrides followed by global defaults
    async fn rules_for(&self, project_id: &str) -> Result<Vec<CostRule>, EnrichError> {
        let rows = self.costs.get_custom_model_costs(project_id).await?;
        let mut rules = rows
            .into_iter()
            .map(CostRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        rules.extend(self.default_rules.iter().cloned());
        Ok(rules)
    }
}

/// First non-empty model string, request model before response model
fn model_identifier(attributes: &[KeyValue]) -> Option<String> {
    let mut bag = AttributeBag::from_key_values(attributes);
    while let Some(attr) = bag.take_any(&MODEL_KEYS) {
        if let Some(model) = attr.value.as_str().filter(|m| !m.is_empty()) {
            return Some(model.to_string());
        }
    }
    None
}

fn apply_cost(span: &mut Span, model: &str, rule: Option<&CostRule>) -> bool {
    let Some(rule) = rule else {
        tracing::trace!(%model, "No cost rule matched");
        return false;
    };

    if let Some(rate) = rule.input_cost_per_token {
        span.attributes
            .push(make_double_attr(attrs::LANGWATCH_INPUT_COST_PER_TOKEN, rate));
    }
    if let Some(rate) = rule.output_cost_per_token {
        span.attributes
            .push(make_double_attr(attrs::LANGWATCH_OUTPUT_COST_PER_TOKEN, rate));
    }

    tracing::trace!(%model, rule = %rule.model, "Applied custom model cost");
    true
}
