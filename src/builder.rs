//! Request bodies for the CRUD backend.
//!
//! Create: `{"item": {...}}` with a generated id and fresh timestamps.
//! Update: `{"key": {"id"}, "updates"}` or `{"id", "updates"}` depending on the table.
//! Delete: `{"key": {"id"}}` or `{"id"}` depending on the table.
//!
//! Field coercions are applied to both creates and updates so the stored shape
//! does not depend on which call wrote it.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::decode::{number_value, parse_float};
use crate::entity::{EntityKind, KeyStyle};
use crate::error::{ApiError, Result};

/// Fields serialized as JSON strings unless they already are strings.
const JSON_ENCODED_FIELDS: [&str; 4] = ["tasks", "tags", "members", "achievements"];

/// ISO-8601 timestamp with millisecond precision and a `Z` suffix.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Id of the form `<entity>-<unix millis>`.
pub fn generate_id(kind: EntityKind, now: DateTime<Utc>) -> String {
    format!("{}-{}", kind.id_prefix(), now.timestamp_millis())
}

/// Serialize a record or patch into a field map.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ApiError::Config(format!(
            "expected an object of fields, got {other}"
        ))),
    }
}

/// String form of a scalar. Integral floats print without a fraction (`1500.0` -> `"1500"`).
fn stringify(value: Value) -> Value {
    match value {
        Value::String(_) => value,
        Value::Null => Value::String("null".to_string()),
        Value::Number(n) if n.is_f64() => {
            let rendered = n.as_f64().map(number_value).unwrap_or(Value::Number(n));
            Value::String(rendered.to_string())
        }
        other => Value::String(other.to_string()),
    }
}

fn clamp_progress(value: &Value) -> Value {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_float(s),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    let n = if n.is_nan() { 0.0 } else { n.clamp(0.0, 100.0) };
    number_value(n)
}

/// Apply the per-field wire coercions.
pub fn coerce_field(key: &str, value: Value) -> Value {
    match key {
        "status" | "priority" | "budget" => stringify(value),
        "progress" => clamp_progress(&value),
        k if JSON_ENCODED_FIELDS.contains(&k) => match value {
            Value::String(_) => value,
            other => Value::String(other.to_string()),
        },
        _ => value,
    }
}

/// Build `{"item": ...}` for a new record.
pub fn build_create_body(kind: EntityKind, fields: Map<String, Value>) -> Value {
    build_create_body_at(kind, fields, Utc::now())
}

pub fn build_create_body_at(
    kind: EntityKind,
    fields: Map<String, Value>,
    now: DateTime<Utc>,
) -> Value {
    let mut item: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, _)| !matches!(key.as_str(), "id" | "createdAt" | "updatedAt"))
        .map(|(key, value)| {
            let value = coerce_field(&key, value);
            (key, value)
        })
        .collect();

    let stamp = timestamp(now);
    item.insert("id".into(), Value::String(generate_id(kind, now)));
    item.insert("createdAt".into(), Value::String(stamp.clone()));
    item.insert("updatedAt".into(), Value::String(stamp));
    json!({ "item": item })
}

/// Filter and coerce the fields of an update. `updatedAt` is always stamped with `now`.
pub fn build_updates(
    kind: EntityKind,
    fields: &Map<String, Value>,
    now: DateTime<Utc>,
) -> Map<String, Value> {
    let alias = kind.id_alias();
    let mut updates: Map<String, Value> = fields
        .iter()
        .filter(|(key, _)| {
            let key = key.as_str();
            key != "id" && key != alias && key != "createdAt" && key != "updatedAt"
        })
        .filter(|(_, value)| !matches!(value, Value::String(s) if s.trim().is_empty()))
        .map(|(key, value)| (key.clone(), coerce_field(key, value.clone())))
        .collect();
    updates.insert("updatedAt".into(), Value::String(timestamp(now)));
    updates
}

/// Build the update envelope for `id`.
pub fn build_update_body(kind: EntityKind, id: &str, fields: &Map<String, Value>) -> Value {
    build_update_body_at(kind, id, fields, Utc::now())
}

pub fn build_update_body_at(
    kind: EntityKind,
    id: &str,
    fields: &Map<String, Value>,
    now: DateTime<Utc>,
) -> Value {
    let updates = build_updates(kind, fields, now);
    match kind.update_key_style() {
        KeyStyle::Keyed => json!({ "key": { "id": id }, "updates": updates }),
        KeyStyle::Bare => json!({ "id": id, "updates": updates }),
    }
}

/// Build the delete envelope for `id`.
pub fn build_delete_body(kind: EntityKind, id: &str) -> Value {
    match kind.delete_key_style() {
        KeyStyle::Keyed => json!({ "key": { "id": id } }),
        KeyStyle::Bare => json!({ "id": id }),
    }
}
