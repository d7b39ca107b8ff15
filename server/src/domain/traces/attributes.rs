//! Consume-once attribute view over a span
//!
//! An `AttributeBag` is built fresh from one span's attributes for one pass.
//! Taking a key removes it from the bag, so a canonical field is extracted
//! exactly once and whatever is left over can be reported as "remaining".
//! The span's own attribute list is never touched by the bag.

use std::collections::HashMap;

use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue, any_value};
use serde::Serialize;

use crate::utils::otlp::any_value_to_string;

// ============================================================================
// ATTRIBUTE VALUES
// ============================================================================

/// Scalar attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    String(String),
    Double(f64),
    Int(i64),
    Bool(bool),
}

impl AttrValue {
    /// Convert an OTLP value. Arrays, maps and bytes are flattened to strings.
    pub fn from_any_value(value: &AnyValue) -> Option<Self> {
        match value.value.as_ref()? {
            any_value::Value::StringValue(s) => Some(AttrValue::String(s.clone())),
            any_value::Value::DoubleValue(d) => Some(AttrValue::Double(*d)),
            any_value::Value::IntValue(i) => Some(AttrValue::Int(*i)),
            any_value::Value::BoolValue(b) => Some(AttrValue::Bool(*b)),
            _ => Some(AttrValue::String(any_value_to_string(value))),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view. Some SDKs send token counts as doubles or strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            AttrValue::Double(d) if d.fract() == 0.0 && d.is_finite() => Some(*d as i64),
            AttrValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Key/value pair lifted out of a bag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub key: String,
    pub value: AttrValue,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: AttrValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

// ============================================================================
// ATTRIBUTE BAG
// ============================================================================

/// Key-unique, consume-once attribute mapping.
///
/// Keys keep the position of their first occurrence while the value comes
/// from the last one. Taken entries leave an empty slot so the remaining
/// ones keep their order. Not meant to be shared between passes.
#[derive(Debug, Clone, Default)]
pub struct AttributeBag {
    entries: Vec<Option<Attribute>>,
    index: HashMap<String, usize>,
}

impl AttributeBag {
    pub fn new(attributes: impl IntoIterator<Item = Attribute>) -> Self {
        let mut bag = Self::default();
        for attr in attributes {
            match bag.index.get(&attr.key) {
                Some(&i) => {
                    if let Some(existing) = bag.entries[i].as_mut() {
                        existing.value = attr.value;
                    }
                }
                None => {
                    bag.index.insert(attr.key.clone(), bag.entries.len());
                    bag.entries.push(Some(attr));
                }
            }
        }
        bag
    }

    /// Build from OTLP key-values, skipping entries without a value
    pub fn from_key_values(attributes: &[KeyValue]) -> Self {
        Self::new(attributes.iter().filter_map(|kv| {
            let value = AttrValue::from_any_value(kv.value.as_ref()?)?;
            Some(Attribute::new(kv.key.clone(), value))
        }))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn has(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        let &i = self.index.get(key)?;
        self.entries[i].as_ref().map(|attr| &attr.value)
    }

    pub fn take(&mut self, key: &str) -> Option<AttrValue> {
        self.take_entry(key).map(|attr| attr.value)
    }

    /// Take the first present key from `keys`, scanning in the given order.
    ///
    /// Used for renamed attributes: pass the current spelling first and the
    /// legacy one after it. At most one entry is removed per call.
    pub fn take_any(&mut self, keys: &[&str]) -> Option<Attribute> {
        keys.iter().find_map(|key| self.take_entry(key))
    }

    /// Remove and return every entry whose key starts with `prefix`, in bag order
    pub fn take_by_prefix(&mut self, prefix: &str) -> Vec<Attribute> {
        let mut taken = Vec::new();
        for slot in self.entries.iter_mut() {
            if slot.as_ref().is_some_and(|attr| attr.key.starts_with(prefix))
                && let Some(attr) = slot.take()
            {
                self.index.remove(&attr.key);
                taken.push(attr);
            }
        }
        taken
    }

    /// Snapshot of everything not yet taken
    pub fn remaining(&self) -> Vec<Attribute> {
        self.entries.iter().flatten().cloned().collect()
    }

    fn take_entry(&mut self, key: &str) -> Option<Attribute> {
        let i = self.index.remove(key)?;
        self.entries[i].take()
    }
}
