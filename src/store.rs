//! Field store interface and the typed read path
//!
//! The engine never performs I/O itself. Hosts provide a [`FieldStore`]:
//! a text value per (record, field name) plus per-content-type field
//! schemas. [`TypedFieldReader`] is the read-interception point that casts
//! stored text back to the registered type, so every reader sees typed
//! values. [`MemoryFieldStore`] is the in-process implementation.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::coerce::coerce_with;
use crate::error::Result;
use crate::types::{CoercionMode, FieldSchemaEntry};
use crate::value::FieldValues;

/// Identifier of a persisted record
pub type RecordId = u64;

/// Persistence for field values, keyed by record and field name
///
/// Schemas are scoped by content type slug; values by record id.
pub trait FieldStore {
    /// The raw stored text, `None` when nothing was stored
    fn get(&self, record: RecordId, field: &str) -> Option<String>;

    fn set(&mut self, record: RecordId, field: &str, text: String);

    /// Register (or replace) a field's schema for a content type
    fn register_schema(&mut self, scope: &str, entry: FieldSchemaEntry);

    fn schema(&self, scope: &str, field: &str) -> Option<&FieldSchemaEntry>;

    /// Registered fields of a content type, in registration order
    fn registered_fields(&self, scope: &str) -> Vec<&FieldSchemaEntry>;
}

/// A field store held in memory
#[derive(Debug, Default)]
pub struct MemoryFieldStore {
    values: HashMap<(RecordId, String), String>,
    schemas: HashMap<String, IndexMap<String, FieldSchemaEntry>>,
}

impl MemoryFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values across all records
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FieldStore for MemoryFieldStore {
    fn get(&self, record: RecordId, field: &str) -> Option<String> {
        self.values.get(&(record, field.to_string())).cloned()
    }

    fn set(&mut self, record: RecordId, field: &str, text: String) {
        self.values.insert((record, field.to_string()), text);
    }

    fn register_schema(&mut self, scope: &str, entry: FieldSchemaEntry) {
        self.schemas
            .entry(scope.to_string())
            .or_default()
            .insert(entry.name.clone(), entry);
    }

    fn schema(&self, scope: &str, field: &str) -> Option<&FieldSchemaEntry> {
        self.schemas.get(scope)?.get(field)
    }

    fn registered_fields(&self, scope: &str) -> Vec<&FieldSchemaEntry> {
        self.schemas
            .get(scope)
            .map(|fields| fields.values().collect())
            .unwrap_or_default()
    }
}

/// Typed view over a field store for one content type
pub struct TypedFieldReader<'a, S: FieldStore + ?Sized> {
    store: &'a S,
    scope: &'a str,
    mode: CoercionMode,
}

impl<'a, S: FieldStore + ?Sized> TypedFieldReader<'a, S> {
    pub fn new(store: &'a S, scope: &'a str, mode: CoercionMode) -> Self {
        Self { store, scope, mode }
    }

    /// Read a field cast to its registered type
    ///
    /// Without a stored value the registered default is returned. Fields with
    /// no registered schema are returned as raw text.
    pub fn get_typed(&self, record: RecordId, field: &str) -> Result<Option<JsonValue>> {
        let schema = self.store.schema(self.scope, field);

        match (self.store.get(record, field), schema) {
            (Some(raw), Some(entry)) => coerce_with(&raw, entry.field_type, self.mode).map(Some),
            (Some(raw), None) => Ok(Some(JsonValue::String(raw))),
            (None, Some(entry)) => Ok(Some(entry.default.clone())),
            (None, None) => Ok(None),
        }
    }

    /// Read every registered field of the content type for a record
    pub fn read_all(&self, record: RecordId) -> Result<FieldValues> {
        let mut values = FieldValues::new();
        for entry in self.store.registered_fields(self.scope) {
            if let Some(value) = self.get_typed(record, &entry.name)? {
                values.insert(&entry.name, value);
            }
        }
        Ok(values)
    }

    /// Read only the registered fields that hold a stored value
    pub fn read_stored(&self, record: RecordId) -> Result<FieldValues> {
        let mut values = FieldValues::new();
        for entry in self.store.registered_fields(self.scope) {
            if let Some(raw) = self.store.get(record, &entry.name) {
                let value = coerce_with(&raw, entry.field_type, self.mode)?;
                values.insert(&entry.name, value);
            }
        }
        Ok(values)
    }
}
