//! Serde helpers for the backend's loosely typed fields.
//!
//! Records come from a schema-less store, so a field may arrive as a number one
//! day and a numeric string the next, and list fields may be real arrays,
//! JSON-encoded arrays, or comma-joined strings. The deserializers here accept
//! all of those and degrade a malformed field to its empty value rather than
//! failing the whole record.

use serde::de::{DeserializeOwned, Deserializer};
use serde::ser::{Error as _, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode::parse_float;

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Any scalar as a string; `""` for anything else.
pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(scalar_to_string(&value).unwrap_or_default())
}

/// Any scalar as a string; `None` for null, arrays and objects.
pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(scalar_to_string(&value))
}

/// A number or numeric string; `None` when nothing numeric is there.
pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(d)?;
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(parse_float(&s)),
        _ => None,
    };
    Ok(n.filter(|n| n.is_finite()))
}

/// Anything deserializable as `T`; `None` when it is not.
pub fn opt<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    Ok(serde_json::from_value(value).ok())
}

/// Parse a list-valued field into its JSON array form.
fn array_of(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') {
                if let Ok(Value::Array(items)) = serde_json::from_str(trimmed) {
                    return items;
                }
            }
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| Value::String(part.to_string()))
                .collect()
        }
        _ => Vec::new(),
    }
}

/// A real array, a JSON-encoded array string, or a comma-joined string.
pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(array_of(value)
        .iter()
        .filter_map(scalar_to_string)
        .collect())
}

/// Like [`string_list`], for structured elements; elements that do not fit are skipped.
pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    Ok(array_of(value)
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Serialize a list as a comma-joined string.
pub fn comma_joined<S: Serializer>(items: &[String], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&items.join(","))
}

/// Serialize a value as a JSON-encoded string.
pub fn json_string<T: Serialize, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    let encoded = serde_json::to_string(value).map_err(S::Error::custom)?;
    s.serialize_str(&encoded)
}

/// [`comma_joined`] for patch fields.
pub fn opt_comma_joined<S: Serializer>(items: &Option<Vec<String>>, s: S) -> Result<S::Ok, S::Error> {
    match items {
        Some(items) => comma_joined(items, s),
        None => s.serialize_none(),
    }
}

/// [`json_string`] for patch fields.
pub fn opt_json_string<T: Serialize, S: Serializer>(value: &Option<T>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => json_string(value, s),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, Serialize, Default)]
    struct Sample {
        #[serde(default, deserialize_with = "string")]
        name: String,
        #[serde(default, deserialize_with = "opt_f64")]
        hours: Option<f64>,
        #[serde(default, deserialize_with = "opt_string")]
        comments: Option<String>,
        #[serde(default, deserialize_with = "string_list", serialize_with = "comma_joined")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "string_list", serialize_with = "json_string")]
        ids: Vec<String>,
    }

    #[test]
    fn accepts_loose_scalars() {
        let s: Sample = serde_json::from_value(json!({
            "name": 12,
            "hours": "3.5",
            "comments": 4
        }))
        .unwrap();
        assert_eq!(s.name, "12");
        assert_eq!(s.hours, Some(3.5));
        assert_eq!(s.comments.as_deref(), Some("4"));
    }

    #[test]
    fn malformed_fields_degrade_instead_of_failing() {
        let s: Sample = serde_json::from_value(json!({
            "name": {"nested": true},
            "hours": "soon",
            "comments": null,
            "tags": 7
        }))
        .unwrap();
        assert_eq!(s.name, "");
        assert_eq!(s.hours, None);
        assert_eq!(s.comments, None);
        assert!(s.tags.is_empty());
    }

    #[test]
    fn list_fields_accept_three_shapes() {
        let s: Sample = serde_json::from_value(json!({
            "tags": "backend, urgent,,",
            "ids": "[\"t1\",\"t2\"]"
        }))
        .unwrap();
        assert_eq!(s.tags, vec!["backend", "urgent"]);
        assert_eq!(s.ids, vec!["t1", "t2"]);

        let s: Sample = serde_json::from_value(json!({"ids": ["t3", 4]})).unwrap();
        assert_eq!(s.ids, vec!["t3", "4"]);
    }

    #[test]
    fn list_fields_serialize_in_wire_form() {
        let s = Sample {
            tags: vec!["a".into(), "b".into()],
            ids: vec!["t1".into()],
            ..Default::default()
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["tags"], json!("a,b"));
        assert_eq!(v["ids"], json!("[\"t1\"]"));
    }

    #[derive(Serialize, Default)]
    struct Patch {
        #[serde(skip_serializing_if = "Option::is_none", serialize_with = "opt_comma_joined")]
        tags: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none", serialize_with = "opt_json_string")]
        ids: Option<Vec<String>>,
    }

    #[test]
    fn patch_lists_use_the_same_wire_form_as_records() {
        let v = serde_json::to_value(Patch {
            tags: Some(vec!["a".into(), "b".into()]),
            ids: Some(vec!["t1".into(), "t2".into()]),
        })
        .unwrap();
        assert_eq!(v, json!({"tags": "a,b", "ids": "[\"t1\",\"t2\"]"}));

        let v = serde_json::to_value(Patch::default()).unwrap();
        assert_eq!(v, json!({}));
    }
}
