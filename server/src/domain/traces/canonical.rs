//! Canonical attribute view of a span
//!
//! Lifts the well-known LLM fields off a span through an `AttributeBag`,
//! accepting legacy key spellings, and reports what is left.

use opentelemetry_proto::tonic::trace::v1::Span;
use serde::Serialize;

use super::attributes::{Attribute, AttrValue, AttributeBag};
use crate::core::constants::attrs;

/// Canonical fields extracted from one span
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanonicalAttributes {
    pub span_id: String,
    pub span_name: String,
    pub request_model: Option<String>,
    pub response_model: Option<String>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    /// `langwatch.metadata.*` entries with the prefix stripped
    pub metadata: Vec<Attribute>,
    /// Attributes not claimed by any canonical field
    pub remaining: Vec<Attribute>,
}

pub fn canonicalize_span(span: &Span) -> CanonicalAttributes {
    let mut bag = AttributeBag::from_key_values(&span.attributes);

    let request_model = take_string(&mut bag, &[attrs::GEN_AI_REQUEST_MODEL, attrs::LLM_MODEL_NAME]);
    let response_model = take_string(&mut bag, &[attrs::GEN_AI_RESPONSE_MODEL]);
    let input_tokens = take_int(
        &mut bag,
        &[
            attrs::GEN_AI_USAGE_INPUT_TOKENS,
            attrs::GEN_AI_USAGE_PROMPT_TOKENS,
        ],
    );
    let output_tokens = take_int(
        &mut bag,
        &[
            attrs::GEN_AI_USAGE_OUTPUT_TOKENS,
            attrs::GEN_AI_USAGE_COMPLETION_TOKENS,
        ],
    );

    let metadata = bag
        .take_by_prefix(attrs::LANGWATCH_METADATA_PREFIX)
        .into_iter()
        .map(|attr| Attribute {
            key: attr.key[attrs::LANGWATCH_METADATA_PREFIX.len()..].to_string(),
            value: attr.value,
        })
        .collect();

    CanonicalAttributes {
        span_id: hex::encode(&span.span_id),
        span_name: span.name.clone(),
        request_model,
        response_model,
        input_tokens,
        output_tokens,
        metadata,
        remaining: bag.remaining(),
    }
}

/// Take the first of `keys`. A value of the wrong type is consumed and dropped.
fn take_string(bag: &mut AttributeBag, keys: &[&str]) -> Option<String> {
    bag.take_any(keys)
        .and_then(|attr| match attr.value {
            AttrValue::String(s) if !s.is_empty() => Some(s),
            _ => None,
        })
}

fn take_int(bag: &mut AttributeBag, keys: &[&str]) -> Option<i64> {
    bag.take_any(keys).and_then(|attr| attr.value.as_i64())
}
