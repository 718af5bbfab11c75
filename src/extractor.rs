//! Data extraction: concrete tree to field values plus residual body
//!
//! The extractor walks an edited tree with the same variant ids the template
//! model was built with. Wherever an id has a bound block, each binding is
//! read from the concrete block:
//!
//! - body bindings record the residual body (the last one wins)
//! - all other bindings record a value under their field name
//!
//! Blocks without a bound counterpart are left alone. Extraction never
//! mutates its input and never persists anything; writing the result to a
//! field store is up to the caller.

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::bound::BoundBlock;
use crate::coerce::coerce;
use crate::html_source::read_html_source;
use crate::kind::{AttributeSource, AttributeSpec};
use crate::model::ContentModel;
use crate::parser::parse_blocks;
use crate::serializer::serialize_blocks;
use crate::types::Block;
use crate::value::FieldValues;
use crate::walker::{visit, Flow};

/// Result of extracting a concrete tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Discrete field values by field name
    pub fields: FieldValues,
    /// Content of the body region, `None` when the tree has none
    pub post_content: Option<Vec<Block>>,
}

impl Extraction {
    /// The residual body as block markup
    pub fn post_content_markup(&self) -> Option<String> {
        self.post_content.as_deref().map(serialize_blocks)
    }
}

pub struct DataExtractor<'a> {
    model: &'a ContentModel,
}

impl<'a> DataExtractor<'a> {
    pub fn new(model: &'a ContentModel) -> Self {
        Self { model }
    }

    pub fn extract(&self, concrete: &[Block]) -> Extraction {
        let mut extraction = Extraction::default();

        visit(concrete, &mut |block, id| {
            let Some(bound) = self.model.bound_block(id) else {
                return Flow::Descend;
            };

            // Ids embed the block kind, so a match is always the same kind.
            debug_assert_eq!(bound.kind(), &block.kind());

            let mut flow = Flow::Descend;

            for (attribute, binding) in bound.bindings() {
                let spec = bound.attribute_spec(attribute);

                if binding.is_post_content() {
                    let body = read_body(block, attribute, &spec);
                    if body.is_some() && extraction.post_content.is_some() {
                        warn!(id = %id, "several body regions in one tree; the last one wins");
                    }
                    if body.is_some() {
                        extraction.post_content = body;
                    }
                    if spec.is_region() {
                        flow = Flow::Skip;
                    }
                    continue;
                }

                match read_value(block, bound, attribute, &spec) {
                    Some(value) => {
                        extraction.fields.insert(&binding.field, value);
                    }
                    None => {
                        debug!(id = %id, attribute = %attribute, field = %binding.field, "bound attribute has no value in concrete block");
                    }
                }
            }

            flow
        });

        extraction
    }
}

fn read_value(
    block: &Block,
    bound: &BoundBlock,
    attribute: &str,
    spec: &AttributeSpec,
) -> Option<JsonValue> {
    match spec.source {
        AttributeSource::Html { .. } | AttributeSource::Attribute { .. } => {
            let text = read_html_source(block, spec.source)?;
            Some(coerce(&text, bound.attribute_type(attribute)))
        }
        AttributeSource::Comment => block.attrs.get(attribute).cloned(),
        AttributeSource::InnerBlocks => Some(JsonValue::String(serialize_blocks(&block.inner_blocks))),
    }
}

fn read_body(block: &Block, attribute: &str, spec: &AttributeSpec) -> Option<Vec<Block>> {
    let text = match spec.source {
        AttributeSource::InnerBlocks => return Some(block.inner_blocks.clone()),
        AttributeSource::Html { .. } | AttributeSource::Attribute { .. } => {
            read_html_source(block, spec.source)?
        }
        AttributeSource::Comment => match block.attrs.get(attribute)? {
            JsonValue::String(text) => text.clone(),
            _ => return None,
        },
    };

    match parse_blocks(&text) {
        Ok(blocks) => Some(blocks),
        Err(err) => {
            debug!(error = %err, "body text is not block markup; keeping it as freeform");
            Some(vec![Block::freeform(&text)])
        }
    }
}
