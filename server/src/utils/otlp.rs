//! OTLP utility functions
//!
//! Provides reusable functions for working with OTLP protobuf types:
//! - Attribute value conversion
//! - Attribute construction
//! - Request decoding/encoding (protobuf or JSON)

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue, any_value};
use prost::Message;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ATTRIBUTE CONVERSION
// ============================================================================

/// Convert AnyValue to string representation
pub fn any_value_to_string(value: &AnyValue) -> String {
    match &value.value {
        Some(any_value::Value::StringValue(s)) => s.clone(),
        Some(any_value::Value::BoolValue(b)) => b.to_string(),
        Some(any_value::Value::IntValue(i)) => i.to_string(),
        Some(any_value::Value::DoubleValue(d)) => d.to_string(),
        Some(any_value::Value::ArrayValue(arr)) => {
            let values: Vec<String> = arr.values.iter().map(any_value_to_string).collect();
            serde_json::to_string(&values).unwrap_or_default()
        }
        Some(any_value::Value::KvlistValue(kvlist)) => {
            let map: HashMap<String, String> = kvlist
                .values
                .iter()
                .filter_map(|kv| {
                    kv.value
                        .as_ref()
                        .map(|v| (kv.key.clone(), any_value_to_string(v)))
                })
                .collect();
            serde_json::to_string(&map).unwrap_or_default()
        }
        Some(any_value::Value::BytesValue(b)) => hex::encode(b),
        None => String::new(),
    }
}

/// Create a double-valued KeyValue attribute
pub fn make_double_attr(key: &str, value: f64) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue {
            value: Some(any_value::Value::DoubleValue(value)),
        }),
    }
}

// ============================================================================
// REQUEST ENCODING
// ============================================================================

/// Wire format of an OTLP payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtlpFormat {
    Protobuf,
    Json,
}

impl OtlpFormat {
    /// Protobuf for `.pb`/`.bin` files, JSON otherwise
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("pb") | Some("bin") => OtlpFormat::Protobuf,
            _ => OtlpFormat::Json,
        }
    }
}

impl fmt::Display for OtlpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtlpFormat::Protobuf => write!(f, "protobuf"),
            OtlpFormat::Json => write!(f, "json"),
        }
    }
}

/// Request decode error
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to decode protobuf request: {0}")]
    Protobuf(String),
    #[error("Failed to decode JSON request: {0}")]
    Json(String),
}

/// Decode an OTLP request from bytes
pub fn decode_request<T>(body: &[u8], format: OtlpFormat) -> Result<T, DecodeError>
where
    T: Message + Default + for<'de> Deserialize<'de>,
{
    match format {
        OtlpFormat::Protobuf => T::decode(body).map_err(|e| DecodeError::Protobuf(e.to_string())),
        OtlpFormat::Json => {
            serde_json::from_slice(body).map_err(|e| DecodeError::Json(e.to_string()))
        }
    }
}

/// Encode an OTLP request as pretty JSON
pub fn encode_json<T: Serialize>(request: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(request)
}
