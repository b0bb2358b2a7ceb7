//! Response envelope unwrapping.
//!
//! The backend wraps records in whatever envelope the handler happened to use:
//! `{item}`, `{items}`, `{data}`, `{result}`, `{results}`, or nothing at all.
//! Each envelope is one extractor; extractors are tried in a fixed order and the
//! first match wins. Extracted records are run through [`crate::decode::normalize`].

use serde_json::Value;

use crate::decode::normalize;
use crate::error::{ApiError, Result};

type ListExtractor = fn(&Value) -> Option<&Vec<Value>>;
type SingleExtractor = fn(&Value) -> Option<&Value>;

/// List envelopes, in precedence order.
const LIST_EXTRACTORS: [(&str, ListExtractor); 4] = [
    ("array", bare_array),
    ("items", items_array),
    ("data", data_array),
    ("results", results_array),
];

/// Single-record envelopes, in precedence order.
const SINGLE_EXTRACTORS: [(&str, SingleExtractor); 4] = [
    ("item", item_field),
    ("data", data_field),
    ("result", result_field),
    ("object", bare_object),
];

fn bare_array(payload: &Value) -> Option<&Vec<Value>> {
    payload.as_array()
}

fn items_array(payload: &Value) -> Option<&Vec<Value>> {
    array_field(payload, "items")
}

fn data_array(payload: &Value) -> Option<&Vec<Value>> {
    array_field(payload, "data")
}

fn results_array(payload: &Value) -> Option<&Vec<Value>> {
    array_field(payload, "results")
}

fn item_field(payload: &Value) -> Option<&Value> {
    present_field(payload, "item")
}

fn data_field(payload: &Value) -> Option<&Value> {
    present_field(payload, "data")
}

fn result_field(payload: &Value) -> Option<&Value> {
    present_field(payload, "result")
}

fn bare_object(payload: &Value) -> Option<&Value> {
    payload.is_object().then_some(payload)
}

fn array_field<'a>(payload: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    payload.as_object()?.get(key)?.as_array()
}

/// `false`, `0`, `""` and `null` are falsy; arrays and objects never are.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A field counts as present only when it holds a truthy value.
fn present_field<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    payload.as_object()?.get(key).filter(|inner| is_truthy(inner))
}

/// Extract and decode the records of a list response.
pub fn unwrap_list(payload: &Value) -> Result<Vec<Value>> {
    for (name, extract) in LIST_EXTRACTORS {
        if let Some(items) = extract(payload) {
            tracing::trace!(envelope = name, count = items.len(), "unwrapped list payload");
            return Ok(items.iter().map(normalize).collect());
        }
    }
    tracing::debug!(payload = %payload, "list payload matched no envelope");
    Err(ApiError::UnexpectedFormat)
}

/// Extract and decode the record of a single-item response.
pub fn unwrap_single(payload: &Value) -> Result<Value> {
    for (name, extract) in SINGLE_EXTRACTORS {
        if let Some(record) = extract(payload) {
            tracing::trace!(envelope = name, "unwrapped single payload");
            return Ok(normalize(record));
        }
    }
    tracing::debug!(payload = %payload, "single payload matched no envelope");
    Err(ApiError::UnexpectedFormat)
}
