//! Casting stored field text back to its declared type
//!
//! Field stores persist every value as text. Reads go through [`coerce`],
//! which follows loose numeric/boolean cast rules: the longest numeric
//! prefix is used, anything else degrades to `0`/`0.0`, and only the empty
//! string and `"0"` are false. [`try_coerce`] is the strict counterpart used
//! with [`CoercionMode::Strict`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::types::{CoercionMode, FieldType};

static NUMERIC_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("Invalid numeric prefix regex")
});

/// Cast stored text to `field_type`, never failing
pub fn coerce(raw: &str, field_type: FieldType) -> JsonValue {
    match field_type {
        FieldType::String => JsonValue::String(raw.to_string()),
        FieldType::Integer => integer_value(raw),
        FieldType::Number => number_value(leading_number(raw)),
        FieldType::Boolean => JsonValue::Bool(!(raw.is_empty() || raw == "0")),
    }
}

/// Cast stored text to `field_type`, failing on text that is not a clean value
pub fn try_coerce(raw: &str, field_type: FieldType) -> Result<JsonValue> {
    let trimmed = raw.trim();

    match field_type {
        FieldType::String => Ok(JsonValue::String(raw.to_string())),
        FieldType::Integer => trimmed
            .parse::<i64>()
            .map(JsonValue::from)
            .map_err(|_| Error::coercion_owned(format!("`{}` is not an integer", raw))),
        FieldType::Number => match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(number_value(n)),
            _ => Err(Error::coercion_owned(format!("`{}` is not a number", raw))),
        },
        FieldType::Boolean => match trimmed {
            "" | "0" | "false" => Ok(JsonValue::Bool(false)),
            "1" | "true" => Ok(JsonValue::Bool(true)),
            _ => Err(Error::coercion_owned(format!("`{}` is not a boolean", raw))),
        },
    }
}

/// Cast stored text according to the configured mode
pub fn coerce_with(raw: &str, field_type: FieldType, mode: CoercionMode) -> Result<JsonValue> {
    match mode {
        CoercionMode::Permissive => Ok(coerce(raw, field_type)),
        CoercionMode::Strict => try_coerce(raw, field_type),
    }
}

fn numeric_prefix(raw: &str) -> Option<&str> {
    NUMERIC_PREFIX_REGEX.find(raw).map(|m| m.as_str().trim_start())
}

fn leading_number(raw: &str) -> f64 {
    numeric_prefix(raw)
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn integer_value(raw: &str) -> JsonValue {
    // Plain digit runs stay exact past 2^53
    if let Some(n) = numeric_prefix(raw).and_then(|prefix| prefix.parse::<i64>().ok()) {
        return JsonValue::from(n);
    }
    // `as` saturates at the i64 bounds
    JsonValue::from(leading_number(raw).trunc() as i64)
}

fn number_value(n: f64) -> JsonValue {
    serde_json::Number::from_f64(n)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::from(0.0))
}
