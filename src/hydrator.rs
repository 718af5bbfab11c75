//! Data hydration: template plus field values to a concrete tree
//!
//! The inverse of the extractor. The template is walked parent-first and
//! every bound block gets its bound attributes substituted from the supplied
//! values, falling back to the attribute default when a field is missing.
//! Body regions receive the body carried under the reserved field.
//!
//! `is_editing` is cosmetic only: it decides whether empty regions keep the
//! template's own children as placeholders. It never changes which fields
//! are read, so hydrating twice with the same inputs gives the same tree.

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::html_source::write_html_source;
use crate::kind::{AttributeSource, AttributeSpec};
use crate::model::ContentModel;
use crate::parser::parse_blocks;
use crate::types::{Block, POST_CONTENT_FIELD};
use crate::value::{to_markup_text, FieldValues};
use crate::walker::{walk, Step};

pub struct DataHydrator<'a> {
    model: &'a ContentModel,
    is_editing: bool,
}

impl<'a> DataHydrator<'a> {
    pub fn new(model: &'a ContentModel, is_editing: bool) -> Self {
        Self { model, is_editing }
    }

    /// Build the concrete tree; region values that fail to parse keep the
    /// template's children
    pub fn hydrate(&self, values: &FieldValues) -> Vec<Block> {
        self.substitute(values).0
    }

    /// Like [`hydrate`](Self::hydrate), but fails on the first region value
    /// that is not valid block markup
    pub fn try_hydrate(&self, values: &FieldValues) -> Result<Vec<Block>> {
        let (tree, mut failures) = self.substitute(values);
        if failures.is_empty() {
            Ok(tree)
        } else {
            Err(failures.swap_remove(0))
        }
    }

    fn substitute(&self, values: &FieldValues) -> (Vec<Block>, Vec<Error>) {
        let mut failures = Vec::new();

        let tree = walk(self.model.template().to_vec(), &mut |mut block, id| {
            let Some(bound) = self.model.bound_block(id) else {
                return Step::Descend(block);
            };

            let mut descend = true;

            for (attribute, binding) in bound.bindings() {
                let spec = bound.attribute_spec(attribute);

                let applied = if binding.is_post_content() {
                    if spec.is_region() {
                        descend = false;
                    }
                    self.apply_body(&mut block, attribute, &spec, values.get(POST_CONTENT_FIELD))
                } else {
                    match values.get(&binding.field) {
                        Some(value) => self.apply(&mut block, attribute, &spec, value),
                        None if spec.is_region() && self.keeps_placeholders() => Ok(()),
                        None => {
                            let default = bound.default_value(attribute);
                            self.apply(&mut block, attribute, &spec, &default)
                        }
                    }
                };

                if let Err(err) = applied {
                    failures.push(err);
                }
            }

            if descend {
                Step::Descend(block)
            } else {
                Step::Stop(block)
            }
        });

        (tree, failures)
    }

    fn keeps_placeholders(&self) -> bool {
        self.is_editing && self.model.config().editing_placeholders()
    }

    fn apply_body(
        &self,
        block: &mut Block,
        attribute: &str,
        spec: &AttributeSpec,
        body: Option<&JsonValue>,
    ) -> Result<()> {
        match body {
            Some(body) => self.apply(block, attribute, spec, body),
            None if self.keeps_placeholders() => Ok(()),
            None => self.apply(block, attribute, spec, &JsonValue::String(String::new())),
        }
    }

    fn apply(
        &self,
        block: &mut Block,
        attribute: &str,
        spec: &AttributeSpec,
        value: &JsonValue,
    ) -> Result<()> {
        match spec.source {
            AttributeSource::Html { .. } | AttributeSource::Attribute { .. } => {
                if !write_html_source(block, spec.source, &to_markup_text(value)) {
                    debug!(block = %block.name, attribute = %attribute, "no markup to substitute bound value into");
                }
            }
            AttributeSource::Comment => {
                block.attrs.insert(attribute.to_string(), value.clone());
            }
            AttributeSource::InnerBlocks => match parse_blocks(&to_markup_text(value)) {
                Ok(children) => block.set_inner_blocks(children),
                Err(err) => {
                    warn!(block = %block.name, attribute = %attribute, error = %err, "stored region is not valid block markup; keeping template content");
                    return Err(Error::hydrate_owned(format!(
                        "Region `{}` of `{}`: {}",
                        attribute, block.name, err
                    )));
                }
            },
        }
        Ok(())
    }
}
