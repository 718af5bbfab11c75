//! Field values exchanged between the extractor, the hydrator and the store
//!
//! [`FieldValues`] is an ordered map of field name to JSON value. Values are
//! typed (string, integer, number, boolean) while they travel through the
//! engine and become text only when written to a field store, see
//! [`to_field_text`].
//!
//! # The FieldRecord Trait
//!
//! Any Rust type can supply field values for hydration by implementing
//! [`FieldRecord`], by hand or with `#[derive(FieldRecord)]` (feature
//! `derive`):
//!
//! ```rust,ignore
//! use content_model::FieldRecord;
//!
//! #[derive(FieldRecord)]
//! struct Book {
//!     title: String,
//!     #[field(rename = "page_count")]
//!     pages: u32,
//!     #[field(skip)]
//!     internal_note: String,
//! }
//!
//! let values = book.to_field_values();
//! let tree = model.hydrate(&values, false);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::types::POST_CONTENT_FIELD;

/// Ordered map of field name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(IndexMap<String, JsonValue>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<JsonValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Carry the record body (serialized blocks) for the body region
    pub fn with_post_content(self, body: &str) -> Self {
        self.with(POST_CONTENT_FIELD, body)
    }

    /// Insert a value, replacing (and returning) any previous one
    pub fn insert(&mut self, field: &str, value: impl Into<JsonValue>) -> Option<JsonValue> {
        self.0.insert(field.to_string(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<JsonValue> {
        self.0.shift_remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// The body carried under the reserved field, if it is text
    pub fn post_content(&self) -> Option<&str> {
        self.get(POST_CONTENT_FIELD).and_then(JsonValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Keep only the fields for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|name, _| keep(name));
    }
}

impl FromIterator<(String, JsonValue)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (String, JsonValue)>>(iter: I) -> Self {
        FieldValues(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldValues {
    type Item = (String, JsonValue);
    type IntoIter = indexmap::map::IntoIter<String, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Types that can supply field values for hydration
pub trait FieldRecord {
    fn to_field_values(&self) -> FieldValues;
}

impl FieldRecord for FieldValues {
    fn to_field_values(&self) -> FieldValues {
        self.clone()
    }
}

impl FieldRecord for JsonValue {
    /// Top-level members of a JSON object; anything else yields no fields
    fn to_field_values(&self) -> FieldValues {
        match self {
            JsonValue::Object(map) => map
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            _ => FieldValues::new(),
        }
    }
}

/// The text written to a field store for a value
///
/// Strings are stored as is, numbers in decimal, `true` as `"1"` and
/// `false`/null as the empty string; arrays and objects as JSON.
pub fn to_field_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(true) => "1".to_string(),
        JsonValue::Bool(false) | JsonValue::Null => String::new(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    }
}

/// The text substituted into markup for a value
///
/// Unlike [`to_field_text`], booleans read as `true`/`false`.
pub fn to_markup_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Bool(b) => b.to_string(),
        other => to_field_text(other),
    }
}
