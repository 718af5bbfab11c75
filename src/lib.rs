//! Content models for block templates
//! 
//! A content model pairs a block template with a set of named fields. Blocks
//! in the template declare, through `metadata.bindings`, which of their
//! attributes are sourced from which field. The engine then converts in both
//! directions:
//! 
//! - **extraction** reads an edited block tree and produces flat field values
//!   plus the residual body (the content of the region bound to
//!   `post_content`)
//! - **hydration** substitutes stored field values back into the template to
//!   produce a concrete tree for editing or display
//! 
//! Field values are persisted as text by a host-provided [`FieldStore`] and
//! cast back to their declared types on read.
//! 
//! # Examples
//! 
//! ```rust,ignore
//! use content_model::{ContentModelBuilder, FieldValues, parse_blocks, render_blocks};
//! 
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let template = r#"<!-- wp:heading {"metadata":{"bindings":{"content":{"source":"field","args":{"key":"headline"}}}}} --><h2>Headline</h2><!-- /wp:heading -->"#;
//! 
//! let model = ContentModelBuilder::new()
//!     .with_slug("article")
//!     .with_template(template)
//!     .build()?;
//! 
//! let tree = model.hydrate(&FieldValues::new().with("headline", "Hello"), false);
//! assert_eq!(render_blocks(&tree), "<h2>Hello</h2>");
//! 
//! let extraction = model.extract(&tree);
//! assert_eq!(extraction.fields.get("headline"), Some(&"Hello".into()));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod types;
pub mod kind;
pub mod parser;
pub mod serializer;
pub mod walker;
pub mod html_source;
pub mod value;
pub mod coerce;
pub mod bound;
pub mod model;
pub mod extractor;
pub mod hydrator;
pub mod store;
pub mod registry;
pub mod mirror;
pub mod builder;
pub mod test_utils;

// Re-export commonly used types
pub use builder::ContentModelBuilder;
pub use bound::BoundBlock;
pub use coerce::{coerce, coerce_with, try_coerce};
pub use error::{Error, Result};
pub use extractor::{DataExtractor, Extraction};
pub use hydrator::DataHydrator;
pub use kind::{AttributeSource, AttributeSpec, BlockKind};
pub use mirror::{find_bound_groups, FieldBuffer};
pub use model::{BlockCategory, ContentModel, ContentModelDefinition};
pub use parser::parse_blocks;
pub use registry::{ContentType, ContentTypeRegistry, Record, RecordStatus};
pub use serializer::{render_blocks, serialize_block, serialize_blocks};
pub use store::{FieldStore, MemoryFieldStore, RecordId, TypedFieldReader};
pub use types::{
    Binding, BindingSource, Block, BodyBindingPolicy, Chunk, CoercionMode, EngineConfig,
    FieldDeclaration, FieldSchemaEntry, FieldType, POST_CONTENT_FIELD,
};
pub use value::{to_field_text, FieldRecord, FieldValues};
pub use walker::{visit, walk, Flow, Step, VariantId};

// Re-export derive macro
#[cfg(feature = "derive")]
pub use content_model_macros::FieldRecord;

#[doc(hidden)]
pub use serde_json as __serde_json;
