//! Bound blocks: template blocks that declare field bindings
//!
//! A [`BoundBlock`] wraps one template block whose metadata declares at least
//! one well-formed binding. It exposes the bindings plus, per bound
//! attribute, the semantic type and default value the field schema and the
//! hydrator rely on.

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::kind::{AttributeSpec, BlockKind};
use crate::types::{Binding, BindingSource, Block, FieldType};
use crate::walker::VariantId;

#[derive(Debug, Clone)]
pub struct BoundBlock {
    variant_id: VariantId,
    kind: BlockKind,
    block: Block,
    bindings: IndexMap<String, Binding>,
}

impl BoundBlock {
    /// Wrap `block` if it carries bindings the engine understands
    ///
    /// Returns `None` for blocks without bindings, for kinds that are never
    /// bound, and for blocks with any malformed or unrecognized binding.
    pub fn from_block(block: &Block, variant_id: &VariantId) -> Option<Self> {
        let declarations = block.binding_declarations()?;
        if declarations.is_empty() {
            return None;
        }

        let kind = block.kind();
        if !kind.is_bindable() {
            debug!(block = %block.name, id = %variant_id, "ignoring bindings on unbindable block kind");
            return None;
        }

        let Some(bindings) = parse_bindings(declarations) else {
            debug!(block = %block.name, id = %variant_id, "treating block with unrecognized bindings as unbound");
            return None;
        };

        Some(Self {
            variant_id: variant_id.clone(),
            kind,
            block: block.clone(),
            bindings,
        })
    }

    pub fn variant_id(&self) -> &VariantId {
        &self.variant_id
    }

    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    /// The template block this wraps
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Attribute name to binding, in declaration order
    pub fn bindings(&self) -> &IndexMap<String, Binding> {
        &self.bindings
    }

    pub fn binding(&self, attribute: &str) -> Option<&Binding> {
        self.bindings.get(attribute)
    }

    /// Metadata for an attribute; undeclared attributes are comment-stored strings
    pub fn attribute_spec(&self, attribute: &str) -> AttributeSpec {
        self.kind
            .attribute(attribute)
            .unwrap_or_else(AttributeSpec::undeclared)
    }

    pub fn attribute_type(&self, attribute: &str) -> FieldType {
        self.attribute_spec(attribute).field_type
    }

    /// Default for a bound attribute
    ///
    /// The declared default when there is one, otherwise the bound field name
    /// for string attributes and the zero value for other types.
    pub fn default_value(&self, attribute: &str) -> JsonValue {
        let spec = self.attribute_spec(attribute);
        if let Some(default) = spec.default {
            return default;
        }

        match spec.field_type {
            FieldType::String => {
                let field = self
                    .bindings
                    .get(attribute)
                    .map(|binding| binding.field.as_str())
                    .unwrap_or(attribute);
                JsonValue::String(field.to_string())
            }
            other => other.zero_value(),
        }
    }

    /// Bindings that target the reserved body field
    pub fn body_bindings(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings
            .iter()
            .filter(|(_, binding)| binding.is_post_content())
            .map(|(attribute, binding)| (attribute.as_str(), binding))
    }

    /// Whether any binding targets the body field through a child-block region
    pub fn has_body_region(&self) -> bool {
        self.body_bindings()
            .any(|(attribute, _)| self.attribute_spec(attribute).is_region())
    }
}

/// Parse a `metadata.bindings` declaration; `None` if any entry is not understood
fn parse_bindings(declarations: &Map<String, JsonValue>) -> Option<IndexMap<String, Binding>> {
    declarations
        .iter()
        .map(|(attribute, declaration)| {
            let source = declaration.get("source")?.as_str()?;
            let source = BindingSource::from_name(source)?;
            let field = declaration.get("args")?.get("key")?.as_str()?;
            if field.is_empty() {
                return None;
            }

            Some((
                attribute.clone(),
                Binding {
                    source,
                    field: field.to_string(),
                },
            ))
        })
        .collect()
}
