//! Builder pattern API for constructing ContentModel instances
//! 
//! This module provides a fluent API for creating content models from a
//! stored JSON definition, a definition file, or individual parts.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{ContentModel, ContentModelDefinition};
use crate::parser::parse_blocks;
use crate::types::{Block, EngineConfig, FieldDeclaration};

/// Builder for constructing ContentModel instances
/// 
/// Parts set with `with_*` override the corresponding parts of a loaded
/// definition.
/// 
/// # Examples
/// 
/// ```rust,ignore
/// use content_model::{ContentModelBuilder, EngineConfig};
/// 
/// let model = ContentModelBuilder::new()
///     .from_file("models/book.json")
///     .with_config(EngineConfig::strict())
///     .build()?;
/// ```
pub struct ContentModelBuilder {
    source: Option<DefinitionSource>,
    slug: Option<String>,
    title: Option<String>,
    template: Option<TemplateSource>,
    fields: Vec<FieldDeclaration>,
    config: EngineConfig,
}

/// Definition source for the builder
#[derive(Debug, Clone)]
enum DefinitionSource {
    Json(String),
    Definition(ContentModelDefinition),
    File(std::path::PathBuf),
}

#[derive(Debug, Clone)]
enum TemplateSource {
    Markup(String),
    Blocks(Vec<Block>),
}

impl ContentModelBuilder {
    /// Create a new content model builder
    pub fn new() -> Self {
        Self {
            source: None,
            slug: None,
            title: None,
            template: None,
            fields: Vec::new(),
            config: EngineConfig::default(),
        }
    }
    
    /// Load the definition from a JSON string
    pub fn from_str<S: Into<String>>(mut self, json: S) -> Self {
        self.source = Some(DefinitionSource::Json(json.into()));
        self
    }
    
    /// Load the definition from a JSON file
    pub fn from_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = Some(DefinitionSource::File(path.as_ref().to_path_buf()));
        self
    }
    
    /// Start from an already loaded definition
    pub fn from_definition(mut self, definition: ContentModelDefinition) -> Self {
        self.source = Some(DefinitionSource::Definition(definition));
        self
    }
    
    pub fn with_slug<S: Into<String>>(mut self, slug: S) -> Self {
        self.slug = Some(slug.into());
        self
    }
    
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }
    
    /// Set the template as block markup
    pub fn with_template<S: Into<String>>(mut self, markup: S) -> Self {
        self.template = Some(TemplateSource::Markup(markup.into()));
        self
    }
    
    /// Set the template as an already parsed tree
    pub fn with_template_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.template = Some(TemplateSource::Blocks(blocks));
        self
    }
    
    /// Declare a field; replaces a loaded declaration with the same slug
    pub fn with_field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }
    
    pub fn with_fields<I: IntoIterator<Item = FieldDeclaration>>(mut self, fields: I) -> Self {
        self.fields.extend(fields);
        self
    }
    
    /// Use a custom engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
    
    /// Build the ContentModel instance
    pub fn build(self) -> Result<ContentModel> {
        let definition = match self.source {
            Some(DefinitionSource::Json(json)) => Some(serde_json::from_str::<ContentModelDefinition>(&json)?),
            Some(DefinitionSource::Definition(definition)) => Some(definition),
            Some(DefinitionSource::File(path)) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|e| Error::io(format!("Failed to read content model file '{}': {}", path.display(), e)))?;
                Some(serde_json::from_str::<ContentModelDefinition>(&json)?)
            }
            None => None,
        };
        
        let (mut slug, mut title, mut markup, mut fields) = match definition {
            Some(d) => (Some(d.slug), Some(d.title), Some(d.template), d.fields),
            None => (None, None, None, Vec::new()),
        };
        
        slug = self.slug.or(slug);
        title = self.title.or(title);
        
        let template = match self.template {
            Some(TemplateSource::Blocks(blocks)) => blocks,
            Some(TemplateSource::Markup(text)) => parse_blocks(&text)?,
            None => match markup.take() {
                Some(text) => parse_blocks(&text)?,
                None => {
                    return Err(Error::registry_static(
                        "No template provided. Use from_str(), from_file() or with_template()",
                    ))
                }
            },
        };
        
        let slug = slug.ok_or_else(|| Error::registry_static("Content model has no slug"))?;
        let title = title.unwrap_or_else(|| slug.clone());
        
        for field in self.fields {
            match fields.iter_mut().find(|existing| existing.slug == field.slug) {
                Some(existing) => *existing = field,
                None => fields.push(field),
            }
        }
        
        ContentModel::new(&slug, &title, template, fields, self.config)
    }
}

impl Default for ContentModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
