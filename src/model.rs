//! Content models: a template tree plus the bindings derived from it
//!
//! A [`ContentModel`] is built once per content type from its template and
//! explicit field declarations. It is immutable afterwards; a changed
//! template means building a new model.
//!
//! ```rust,ignore
//! use content_model::{ContentModel, EngineConfig, FieldValues, parse_blocks};
//!
//! let template = parse_blocks(template_markup)?;
//! let model = ContentModel::new("book", "Book", template, vec![], EngineConfig::default())?;
//!
//! let extraction = model.extract(&parse_blocks(edited_markup)?);
//! let tree = model.hydrate(&extraction.fields, false);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::bound::BoundBlock;
use crate::error::{Error, Result};
use crate::extractor::{DataExtractor, Extraction};
use crate::hydrator::DataHydrator;
use crate::parser::parse_blocks;
use crate::types::{
    Block, BodyBindingPolicy, EngineConfig, FieldDeclaration, FieldSchemaEntry, FieldType,
    POST_CONTENT_FIELD,
};
use crate::value::FieldValues;
use crate::walker::{visit, Flow, VariantId};

/// A stored content model: slug, title, template markup and declared fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentModelDefinition {
    pub slug: String,
    pub title: String,
    pub template: String,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
}

/// The editor category grouping a content model's field blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockCategory {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct ContentModel {
    slug: String,
    title: String,
    template: Vec<Block>,
    blocks: IndexMap<VariantId, BoundBlock>,
    fields: Vec<FieldDeclaration>,
    config: EngineConfig,
}

impl ContentModel {
    /// Build a model from a parsed template and explicit field declarations
    pub fn new(
        slug: &str,
        title: &str,
        template: Vec<Block>,
        fields: Vec<FieldDeclaration>,
        config: EngineConfig,
    ) -> Result<Self> {
        let blocks = inflate_template_blocks(&template);

        let body_regions = blocks.values().filter(|b| b.has_body_region()).count();
        if body_regions > 1 && config.body_binding() == BodyBindingPolicy::Reject {
            return Err(Error::binding_owned(format!(
                "Content model `{}` binds {} regions to `{}`",
                slug, body_regions, POST_CONTENT_FIELD
            )));
        }

        Ok(Self {
            slug: slug.to_string(),
            title: title.to_string(),
            template,
            blocks,
            fields,
            config,
        })
    }

    /// Build a model from a stored definition, parsing its template markup
    pub fn from_definition(definition: &ContentModelDefinition, config: EngineConfig) -> Result<Self> {
        let template = parse_blocks(&definition.template)?;
        Self::new(
            &definition.slug,
            &definition.title,
            template,
            definition.fields.clone(),
            config,
        )
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn template(&self) -> &[Block] {
        &self.template
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Explicitly declared fields
    pub fn fields(&self) -> &[FieldDeclaration] {
        &self.fields
    }

    pub fn bound_block(&self, id: &VariantId) -> Option<&BoundBlock> {
        self.blocks.get(id)
    }

    /// Bound blocks in template order
    pub fn bound_blocks(&self) -> impl Iterator<Item = &BoundBlock> {
        self.blocks.values()
    }

    pub fn has_body_region(&self) -> bool {
        self.blocks.values().any(BoundBlock::has_body_region)
    }

    /// Field schema implied by the declarations and the bindings
    ///
    /// Declared fields come first; a binding to an already declared field
    /// overrides its type and default but keeps the description. The body
    /// field is never part of the schema.
    pub fn field_schema(&self) -> Vec<FieldSchemaEntry> {
        let mut schema: IndexMap<String, FieldSchemaEntry> = IndexMap::new();

        for field in &self.fields {
            if field.slug == POST_CONTENT_FIELD {
                continue;
            }

            let field_type = field.field_type.unwrap_or_default();
            let default = field.default.clone().unwrap_or_else(|| match field_type {
                FieldType::String => JsonValue::String(field.slug.clone()),
                other => other.zero_value(),
            });

            schema.insert(
                field.slug.clone(),
                FieldSchemaEntry {
                    name: field.slug.clone(),
                    field_type,
                    description: field.description.clone(),
                    default,
                },
            );
        }

        for block in self.blocks.values() {
            for (attribute, binding) in block.bindings() {
                if binding.is_post_content() {
                    continue;
                }

                let description = schema
                    .get(&binding.field)
                    .map(|entry| entry.description.clone())
                    .unwrap_or_default();

                schema.insert(
                    binding.field.clone(),
                    FieldSchemaEntry {
                        name: binding.field.clone(),
                        field_type: block.attribute_type(attribute),
                        description,
                        default: block.default_value(attribute),
                    },
                );
            }
        }

        schema.into_values().collect()
    }

    /// Names of every discrete field in the schema
    pub fn field_names(&self) -> Vec<String> {
        self.field_schema().into_iter().map(|entry| entry.name).collect()
    }

    /// Editor category for this model's field blocks
    pub fn block_category(&self) -> BlockCategory {
        BlockCategory {
            slug: format!("{}-fields", self.slug),
            title: format!("{} fields", title_case(&self.title)),
        }
    }

    /// Pull field values and the residual body out of an edited tree
    pub fn extract(&self, concrete: &[Block]) -> Extraction {
        DataExtractor::new(self).extract(concrete)
    }

    /// Build a concrete tree from the template and field values
    pub fn hydrate(&self, values: &FieldValues, is_editing: bool) -> Vec<Block> {
        DataHydrator::new(self, is_editing).hydrate(values)
    }

    /// Like [`hydrate`](Self::hydrate), failing on unparsable region values
    pub fn try_hydrate(&self, values: &FieldValues, is_editing: bool) -> Result<Vec<Block>> {
        DataHydrator::new(self, is_editing).try_hydrate(values)
    }
}

/// Collect one bound block per template block with understood bindings
///
/// The children of a body region are freeform content and are not inspected.
fn inflate_template_blocks(template: &[Block]) -> IndexMap<VariantId, BoundBlock> {
    let mut acc = IndexMap::new();

    visit(template, &mut |block, id| {
        let Some(bound) = BoundBlock::from_block(block, id) else {
            return Flow::Descend;
        };

        debug!(id = %id, bindings = bound.bindings().len(), "bound template block");
        let flow = if bound.has_body_region() {
            Flow::Skip
        } else {
            Flow::Descend
        };
        acc.insert(id.clone(), bound);
        flow
    });

    acc
}

fn title_case(title: &str) -> String {
    title
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
