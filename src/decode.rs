//! Attribute-value decoding for records read from a schema-less store.
//!
//! The backend sometimes hands back raw DynamoDB-style items where every value is
//! wrapped in a single-key type tag (`{"S": "text"}`, `{"N": "42"}`, ...), and
//! sometimes already-plain JSON. This module turns both into plain JSON.
//!
//! Decoding is total: malformed tag payloads degrade (a non-numeric `N` becomes
//! `null`) rather than failing the record.

use serde_json::{Map, Number, Value};

/// A JSON value classified by its attribute tag.
///
/// Anything that is not an object with exactly one recognised tag key is
/// [`AttributeValue::Plain`] and decodes to itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue<'a> {
    S(&'a Value),
    N(&'a Value),
    Bool(&'a Value),
    Null,
    L(&'a Value),
    M(&'a Value),
    Plain(&'a Value),
}

impl<'a> AttributeValue<'a> {
    /// Classify a raw JSON value.
    pub fn classify(value: &'a Value) -> Self {
        let Value::Object(map) = value else {
            return AttributeValue::Plain(value);
        };
        if map.len() != 1 {
            return AttributeValue::Plain(value);
        }
        match map.iter().next() {
            Some((tag, inner)) => match tag.as_str() {
                "S" => AttributeValue::S(inner),
                "N" => AttributeValue::N(inner),
                "BOOL" => AttributeValue::Bool(inner),
                "NULL" => AttributeValue::Null,
                "L" => AttributeValue::L(inner),
                "M" => AttributeValue::M(inner),
                _ => AttributeValue::Plain(value),
            },
            None => AttributeValue::Plain(value),
        }
    }

    /// True for every variant except [`AttributeValue::Plain`].
    pub fn is_tagged(&self) -> bool {
        !matches!(self, AttributeValue::Plain(_))
    }

    /// Numeric reading of an `N` tag. NaN for non-numeric input or any other variant.
    pub fn as_f64(&self) -> f64 {
        match self {
            AttributeValue::N(inner) => number_of(inner),
            _ => f64::NAN,
        }
    }

    /// Decode into plain JSON.
    pub fn into_value(self) -> Value {
        match self {
            AttributeValue::S(inner) | AttributeValue::Bool(inner) => inner.clone(),
            AttributeValue::N(inner) => number_value(number_of(inner)),
            AttributeValue::Null => Value::Null,
            AttributeValue::L(inner) => match inner {
                Value::Array(items) => Value::Array(items.iter().map(decode).collect()),
                other => other.clone(),
            },
            AttributeValue::M(inner) => match inner {
                Value::Object(map) => Value::Object(decode_record(map)),
                other => other.clone(),
            },
            AttributeValue::Plain(value) => value.clone(),
        }
    }
}

/// Decode a single value. Untagged values, including plain objects, pass through unchanged.
pub fn decode(value: &Value) -> Value {
    AttributeValue::classify(value).into_value()
}

/// Decode every field of a record independently.
///
/// A field holding a plain (untagged) object is kept as-is; only `M`/`L` tags
/// recurse.
pub fn decode_record(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .map(|(key, value)| (key.clone(), decode(value)))
        .collect()
}

/// Normalise a payload extracted from an envelope: tagged values are decoded,
/// plain objects are treated as records, everything else passes through.
pub fn normalize(value: &Value) -> Value {
    match AttributeValue::classify(value) {
        AttributeValue::Plain(Value::Object(map)) => Value::Object(decode_record(map)),
        tagged => tagged.into_value(),
    }
}

/// Parse a float the way `parseFloat` does: the longest numeric prefix after
/// leading whitespace, NaN when there is none.
pub fn parse_float(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

fn number_of(inner: &Value) -> f64 {
    match inner {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float(s),
        _ => f64::NAN,
    }
}

/// JSON has no NaN or infinity; those become `null`. Integral values stay integers.
pub(crate) fn number_value(f: f64) -> Value {
    if !f.is_finite() {
        return Value::Null;
    }
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        return Value::from(f as i64);
    }
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}
