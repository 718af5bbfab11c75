//! Recognized block kinds and their attribute metadata
//!
//! Binding behavior is decided per kind. Each recognized kind knows, for the
//! attributes that can be bound, the attribute's semantic type, its default
//! and where its value lives inside the block. Kinds the engine does not
//! recognize map to [`BlockKind::Unknown`] and are never bound.

use serde_json::Value as JsonValue;

use crate::types::{FieldType, FREEFORM_BLOCK_NAME};

/// A block kind, dispatched from the block's namespaced name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading,
    Image,
    Button,
    Buttons,
    Group,
    Columns,
    Column,
    Freeform,
    Unknown(String),
}

/// Where a bound attribute's value is read from and written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSource {
    /// Inner HTML of the first element matching the selector
    Html { selector: &'static str },
    /// An HTML attribute of the first element matching the selector
    Attribute {
        selector: &'static str,
        attribute: &'static str,
    },
    /// The JSON attributes in the block's comment delimiter
    Comment,
    /// The block's children, as serialized blocks
    InnerBlocks,
}

/// Metadata for one attribute of a block kind
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    pub field_type: FieldType,
    pub default: Option<JsonValue>,
    pub source: AttributeSource,
}

impl AttributeSpec {
    const fn new(field_type: FieldType, source: AttributeSource) -> Self {
        Self {
            field_type,
            default: None,
            source,
        }
    }

    fn with_default(mut self, default: JsonValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Spec for an attribute the kind does not declare
    pub fn undeclared() -> Self {
        Self::new(FieldType::String, AttributeSource::Comment)
    }

    /// Whether this attribute is a content region holding child blocks
    pub fn is_region(&self) -> bool {
        self.source == AttributeSource::InnerBlocks
    }
}

const HEADING_SELECTOR: &str = "h1,h2,h3,h4,h5,h6";

impl BlockKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "core/paragraph" => BlockKind::Paragraph,
            "core/heading" => BlockKind::Heading,
            "core/image" => BlockKind::Image,
            "core/button" => BlockKind::Button,
            "core/buttons" => BlockKind::Buttons,
            "core/group" => BlockKind::Group,
            "core/columns" => BlockKind::Columns,
            "core/column" => BlockKind::Column,
            FREEFORM_BLOCK_NAME => BlockKind::Freeform,
            other => BlockKind::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BlockKind::Paragraph => "core/paragraph",
            BlockKind::Heading => "core/heading",
            BlockKind::Image => "core/image",
            BlockKind::Button => "core/button",
            BlockKind::Buttons => "core/buttons",
            BlockKind::Group => "core/group",
            BlockKind::Columns => "core/columns",
            BlockKind::Column => "core/column",
            BlockKind::Freeform => FREEFORM_BLOCK_NAME,
            BlockKind::Unknown(name) => name,
        }
    }

    /// Whether blocks of this kind may carry bindings at all
    pub fn is_bindable(&self) -> bool {
        !matches!(self, BlockKind::Unknown(_) | BlockKind::Freeform)
    }

    /// Declared metadata for an attribute, `None` when the kind does not declare it
    pub fn attribute(&self, name: &str) -> Option<AttributeSpec> {
        use AttributeSource::*;

        let spec = match (self, name) {
            (BlockKind::Paragraph, "content") => {
                AttributeSpec::new(FieldType::String, Html { selector: "p" })
            }
            (BlockKind::Heading, "content") => AttributeSpec::new(
                FieldType::String,
                Html {
                    selector: HEADING_SELECTOR,
                },
            ),
            (BlockKind::Image, "url") => AttributeSpec::new(
                FieldType::String,
                Attribute {
                    selector: "img",
                    attribute: "src",
                },
            ),
            (BlockKind::Image, "alt") => AttributeSpec::new(
                FieldType::String,
                Attribute {
                    selector: "img",
                    attribute: "alt",
                },
            )
            .with_default(JsonValue::String(String::new())),
            (BlockKind::Image, "title") => AttributeSpec::new(
                FieldType::String,
                Attribute {
                    selector: "img",
                    attribute: "title",
                },
            ),
            (BlockKind::Image, "id") => AttributeSpec::new(FieldType::Integer, Comment),
            (BlockKind::Button, "text") => {
                AttributeSpec::new(FieldType::String, Html { selector: "a" })
            }
            (BlockKind::Button, "url") => AttributeSpec::new(
                FieldType::String,
                Attribute {
                    selector: "a",
                    attribute: "href",
                },
            ),
            (BlockKind::Button, "linkTarget") => AttributeSpec::new(
                FieldType::String,
                Attribute {
                    selector: "a",
                    attribute: "target",
                },
            ),
            (BlockKind::Button, "rel") => AttributeSpec::new(
                FieldType::String,
                Attribute {
                    selector: "a",
                    attribute: "rel",
                },
            ),
            (BlockKind::Group, "content") => AttributeSpec::new(FieldType::String, InnerBlocks),
            _ => return None,
        };

        Some(spec)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
