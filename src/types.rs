//! Core content-model types and configuration
//!
//! This module contains the block tree, binding and field-schema types shared
//! by every other module, plus the engine configuration.
//!
//! # Key Types
//!
//! - [`Block`] - a node in a template tree or a concrete tree
//! - [`Binding`] - an attribute sourced from a named field
//! - [`FieldType`] / [`FieldDeclaration`] / [`FieldSchemaEntry`] - field schema
//! - [`EngineConfig`] - configuration options for extraction and hydration
//!
//! ```rust,ignore
//! use content_model::{EngineConfig, BodyBindingPolicy, CoercionMode};
//!
//! let config = EngineConfig::default()
//!     .with_body_binding(BodyBindingPolicy::Reject)
//!     .with_coercion(CoercionMode::Strict);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::kind::BlockKind;

/// Reserved field name for the record's primary freeform body
pub const POST_CONTENT_FIELD: &str = "post_content";

/// Namespace assumed for block names written without one
pub const CORE_NAMESPACE: &str = "core";

/// Block name used for HTML that sits outside any block delimiter
pub const FREEFORM_BLOCK_NAME: &str = "core/freeform";

/// A node in a template tree or a concrete tree
///
/// `inner_content` interleaves literal HTML with placeholders for
/// `inner_blocks`; the number of [`Chunk::InnerBlock`] entries always equals
/// `inner_blocks.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub name: String,
    #[serde(default)]
    pub attrs: Map<String, JsonValue>,
    #[serde(default)]
    pub inner_blocks: Vec<Block>,
    #[serde(default)]
    pub inner_content: Vec<Chunk>,
}

/// One piece of a block's inner content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Chunk {
    Html(String),
    InnerBlock,
}

impl From<Option<String>> for Chunk {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(html) => Chunk::Html(html),
            None => Chunk::InnerBlock,
        }
    }
}

impl From<Chunk> for Option<String> {
    fn from(chunk: Chunk) -> Self {
        match chunk {
            Chunk::Html(html) => Some(html),
            Chunk::InnerBlock => None,
        }
    }
}

impl Block {
    /// Create an empty block; names without a namespace land in `core/`
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_block_name(name),
            attrs: Map::new(),
            inner_blocks: Vec::new(),
            inner_content: Vec::new(),
        }
    }

    /// Create a freeform block holding raw HTML
    pub fn freeform(html: &str) -> Self {
        Self {
            name: FREEFORM_BLOCK_NAME.to_string(),
            attrs: Map::new(),
            inner_blocks: Vec::new(),
            inner_content: vec![Chunk::Html(html.to_string())],
        }
    }

    pub fn with_attrs(mut self, attrs: Map<String, JsonValue>) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_attr(mut self, name: &str, value: JsonValue) -> Self {
        self.attrs.insert(name.to_string(), value);
        self
    }

    /// Append literal HTML to the inner content
    pub fn with_html(mut self, html: &str) -> Self {
        self.inner_content.push(Chunk::Html(html.to_string()));
        self
    }

    /// Append a child block and its placeholder
    pub fn with_inner_block(mut self, block: Block) -> Self {
        self.inner_blocks.push(block);
        self.inner_content.push(Chunk::InnerBlock);
        self
    }

    /// Declare a binding of `attribute` to `field` in the block metadata
    pub fn with_binding(mut self, attribute: &str, field: &str) -> Self {
        let metadata = self
            .attrs
            .entry("metadata")
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if !metadata.is_object() {
            *metadata = JsonValue::Object(Map::new());
        }
        if let JsonValue::Object(metadata) = metadata {
            let bindings = metadata
                .entry("bindings")
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if !bindings.is_object() {
                *bindings = JsonValue::Object(Map::new());
            }
            if let JsonValue::Object(bindings) = bindings {
                bindings.insert(
                    attribute.to_string(),
                    serde_json::json!({ "source": "field", "args": { "key": field } }),
                );
            }
        }
        self
    }

    pub fn kind(&self) -> BlockKind {
        BlockKind::from_name(&self.name)
    }

    pub fn is_freeform(&self) -> bool {
        self.name == FREEFORM_BLOCK_NAME
    }

    /// The literal HTML of this block with inner blocks left out
    pub fn inner_html(&self) -> String {
        self.inner_content
            .iter()
            .filter_map(|chunk| match chunk {
                Chunk::Html(html) => Some(html.as_str()),
                Chunk::InnerBlock => None,
            })
            .collect()
    }

    /// The raw `metadata.bindings` declaration, if any
    pub fn binding_declarations(&self) -> Option<&Map<String, JsonValue>> {
        self.attrs
            .get("metadata")?
            .as_object()?
            .get("bindings")?
            .as_object()
    }

    /// Replace the children while keeping the HTML that wraps them
    ///
    /// HTML before the first placeholder and after the last one is kept. When
    /// the block has no placeholders yet, its markup is split at the last
    /// closing tag so the children land inside the wrapper element.
    pub fn set_inner_blocks(&mut self, blocks: Vec<Block>) {
        let first = self
            .inner_content
            .iter()
            .position(|chunk| *chunk == Chunk::InnerBlock);
        let last = self
            .inner_content
            .iter()
            .rposition(|chunk| *chunk == Chunk::InnerBlock);

        let (prefix, suffix): (Vec<Chunk>, Vec<Chunk>) = match (first, last) {
            (Some(first), Some(last)) => (
                self.inner_content[..first].to_vec(),
                self.inner_content[last + 1..].to_vec(),
            ),
            _ => split_wrapper(&self.inner_html()),
        };

        let mut inner_content = prefix;
        inner_content.extend(blocks.iter().map(|_| Chunk::InnerBlock));
        inner_content.extend(suffix);

        self.inner_content = inner_content;
        self.inner_blocks = blocks;
    }
}

fn split_wrapper(html: &str) -> (Vec<Chunk>, Vec<Chunk>) {
    let to_chunks = |s: &str| {
        if s.is_empty() {
            Vec::new()
        } else {
            vec![Chunk::Html(s.to_string())]
        }
    };

    match html.rfind("</") {
        Some(at) => (to_chunks(&html[..at]), to_chunks(&html[at..])),
        None => (to_chunks(html), Vec::new()),
    }
}

/// Qualify a block name with the `core/` namespace when it has none
pub fn normalize_block_name(name: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{}", CORE_NAMESPACE, name)
    }
}

/// Where a bound value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// A named field in the field store
    Field,
}

impl BindingSource {
    /// Recognize a declared source name; `None` for anything not understood
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "field" | "core/post-meta" => Some(BindingSource::Field),
            _ => None,
        }
    }
}

/// A declaration that an attribute is sourced from a named field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub source: BindingSource,
    pub field: String,
}

impl Binding {
    /// Whether this binding targets the reserved body field
    pub fn is_post_content(&self) -> bool {
        self.field == POST_CONTENT_FIELD
    }
}

/// Semantic type of a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        }
    }

    /// The value a non-string field falls back to
    pub fn zero_value(&self) -> JsonValue {
        match self {
            FieldType::String => JsonValue::String(String::new()),
            FieldType::Integer => JsonValue::from(0),
            FieldType::Number => JsonValue::from(0.0),
            FieldType::Boolean => JsonValue::Bool(false),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An explicitly declared field, as stored alongside a content model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
}

impl FieldDeclaration {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            description: String::new(),
            field_type: None,
            default: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_default(mut self, default: JsonValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// One registered field of a content model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchemaEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub description: String,
    pub default: JsonValue,
}

/// What to do when a template binds more than one region to the body field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyBindingPolicy {
    /// The last region encountered during extraction wins
    #[default]
    LastWins,
    /// Building the content model fails
    Reject,
}

/// How stored field text that does not parse is cast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoercionMode {
    /// Degrade to the zero/false value of the type
    #[default]
    Permissive,
    /// Fail with [`Error::CoercionError`](crate::Error::CoercionError)
    Strict,
}

/// Configuration for extraction, hydration and the lifecycle hooks
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub(crate) body_binding: BodyBindingPolicy,
    pub(crate) coercion: CoercionMode,
    pub(crate) extract_on_publish_only: bool,
    pub(crate) editing_placeholders: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for templates with several body regions
    pub fn with_body_binding(mut self, policy: BodyBindingPolicy) -> Self {
        self.body_binding = policy;
        self
    }

    /// Set how unparsable field text is cast
    pub fn with_coercion(mut self, mode: CoercionMode) -> Self {
        self.coercion = mode;
        self
    }

    /// Only extract fields when a record is saved as published
    pub fn with_extract_on_publish_only(mut self, enabled: bool) -> Self {
        self.extract_on_publish_only = enabled;
        self
    }

    /// Keep template children as placeholders for empty regions while editing
    pub fn with_editing_placeholders(mut self, enabled: bool) -> Self {
        self.editing_placeholders = enabled;
        self
    }

    /// Configuration that fails instead of degrading
    pub fn strict() -> Self {
        Self {
            body_binding: BodyBindingPolicy::Reject,
            coercion: CoercionMode::Strict,
            extract_on_publish_only: true,
            editing_placeholders: true,
        }
    }

    // Accessors
    pub fn body_binding(&self) -> BodyBindingPolicy {
        self.body_binding
    }
    pub fn coercion(&self) -> CoercionMode {
        self.coercion
    }
    pub fn extract_on_publish_only(&self) -> bool {
        self.extract_on_publish_only
    }
    pub fn editing_placeholders(&self) -> bool {
        self.editing_placeholders
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            body_binding: BodyBindingPolicy::LastWins,
            coercion: CoercionMode::Permissive,
            extract_on_publish_only: true,
            editing_placeholders: true,
        }
    }
}
