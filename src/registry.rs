//! Content type registry and record lifecycle hooks
//!
//! The registry is an explicit object owned by the host. Registering a
//! definition parses its template once, builds the [`ContentModel`] and
//! registers the model's field schema in the host's field store. The
//! returned [`ContentType`] carries the three lifecycle hooks:
//!
//! - [`ContentType::on_before_persist`] extracts fields from a published
//!   record and leaves only the residual body in its content
//! - [`ContentType::on_load_for_edit`] hydrates the template for the editor
//! - [`ContentType::on_render`] hydrates the template for display
//!
//! Records of other content types pass through every hook untouched.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{ContentModel, ContentModelDefinition};
use crate::serializer::{render_blocks, serialize_blocks};
use crate::parser::parse_blocks;
use crate::store::{FieldStore, RecordId, TypedFieldReader};
use crate::types::{Block, CoercionMode, EngineConfig, POST_CONTENT_FIELD};
use crate::value::{to_field_text, FieldValues};

/// Publication status of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    Draft,
    Publish,
    Other(String),
}

impl RecordStatus {
    pub fn from_name(name: &str) -> Self {
        match name {
            "draft" => RecordStatus::Draft,
            "publish" => RecordStatus::Publish,
            other => RecordStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordStatus::Draft => "draft",
            RecordStatus::Publish => "publish",
            RecordStatus::Other(name) => name,
        }
    }
}

/// A stored record of some content type
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub post_type: String,
    pub status: RecordStatus,
    /// Block markup
    pub content: String,
}

impl Record {
    pub fn new(id: RecordId, post_type: &str, status: RecordStatus, content: &str) -> Self {
        Self {
            id,
            post_type: post_type.to_string(),
            status,
            content: content.to_string(),
        }
    }
}

/// A registered content type
#[derive(Debug, Clone)]
pub struct ContentType {
    model: ContentModel,
}

impl ContentType {
    pub fn new(model: ContentModel) -> Self {
        Self { model }
    }

    pub fn slug(&self) -> &str {
        self.model.slug()
    }

    pub fn model(&self) -> &ContentModel {
        &self.model
    }

    /// Whether a record belongs to this content type
    pub fn owns(&self, record: &Record) -> bool {
        record.post_type == self.model.slug()
    }

    /// Extract field values from a record about to be saved
    ///
    /// Every extracted field is written to the store as text and the record
    /// content is replaced with the residual body, or emptied when the tree
    /// has no body region.
    pub fn on_before_persist<S>(&self, mut record: Record, store: &mut S) -> Result<Record>
    where
        S: FieldStore + ?Sized,
    {
        if !self.owns(&record) {
            return Ok(record);
        }
        if !self.extracts(&record) {
            debug!(record = record.id, status = record.status.as_str(), "skipping extraction");
            return Ok(record);
        }

        let blocks = parse_blocks(&record.content)?;
        let extraction = self.model.extract(&blocks);

        for (field, value) in extraction.fields.iter() {
            store.set(record.id, field, to_field_text(value));
        }

        record.content = extraction.post_content_markup().unwrap_or_default();
        debug!(
            record = record.id,
            fields = extraction.fields.len(),
            "extracted fields before persist"
        );

        Ok(record)
    }

    /// Block markup for editing a record
    pub fn on_load_for_edit<S>(&self, record: &Record, store: &S) -> Result<String>
    where
        S: FieldStore + ?Sized,
    {
        if !self.owns(record) {
            return Ok(record.content.clone());
        }

        let values = self.stored_values(record, store)?;
        Ok(serialize_blocks(&self.hydrate(&values, true)?))
    }

    /// Rendered HTML for displaying a record
    pub fn on_render<S>(&self, record: &Record, store: &S) -> Result<String>
    where
        S: FieldStore + ?Sized,
    {
        if !self.owns(record) {
            return Ok(record.content.clone());
        }

        let values = self.stored_values(record, store)?;
        Ok(render_blocks(&self.hydrate(&values, false)?))
    }

    /// Whether saving this record moves its fields out of the content
    fn extracts(&self, record: &Record) -> bool {
        !self.model.config().extract_on_publish_only() || record.status == RecordStatus::Publish
    }

    /// Strict configurations surface unparsable regions as errors
    fn hydrate(&self, values: &FieldValues, is_editing: bool) -> Result<Vec<Block>> {
        match self.model.config().coercion() {
            CoercionMode::Strict => self.model.try_hydrate(values, is_editing),
            CoercionMode::Permissive => Ok(self.model.hydrate(values, is_editing)),
        }
    }

    /// Typed stored fields plus the record body
    ///
    /// A record saved without extraction still holds the whole tree. Its
    /// fields are read out of that tree, over any stored values, and only
    /// its residual body is used. Content the template does not match is
    /// taken to be a residual body already.
    fn stored_values<S>(&self, record: &Record, store: &S) -> Result<FieldValues>
    where
        S: FieldStore + ?Sized,
    {
        let reader = TypedFieldReader::new(store, self.model.slug(), self.model.config().coercion());
        let mut values = reader.read_stored(record.id)?;

        if !self.extracts(record) {
            let extraction = self.model.extract(&parse_blocks(&record.content)?);
            if !extraction.fields.is_empty() || extraction.post_content.is_some() {
                let body = extraction.post_content_markup();
                for (field, value) in extraction.fields {
                    values.insert(&field, value);
                }
                if let Some(body) = body.filter(|body| !body.is_empty()) {
                    values.insert(POST_CONTENT_FIELD, body);
                }
                return Ok(values);
            }
        }

        if !record.content.is_empty() {
            values.insert(POST_CONTENT_FIELD, record.content.as_str());
        }

        Ok(values)
    }
}

/// Registered content types by slug
#[derive(Debug, Default)]
pub struct ContentTypeRegistry {
    types: IndexMap<String, ContentType>,
    config: EngineConfig,
}

impl ContentTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose models are built with the given configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            types: IndexMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build and register a content type from a stored definition
    pub fn register<S>(
        &mut self,
        definition: &ContentModelDefinition,
        store: &mut S,
    ) -> Result<&ContentType>
    where
        S: FieldStore + ?Sized,
    {
        let model = ContentModel::from_definition(definition, self.config.clone())?;
        self.register_model(model, store)
    }

    /// Register an already built model
    pub fn register_model<S>(&mut self, model: ContentModel, store: &mut S) -> Result<&ContentType>
    where
        S: FieldStore + ?Sized,
    {
        let slug = model.slug().to_string();
        if self.types.contains_key(&slug) {
            return Err(Error::registry_owned(format!(
                "Content type `{}` is already registered",
                slug
            )));
        }

        let schema = model.field_schema();
        let field_count = schema.len();
        for entry in schema {
            store.register_schema(&slug, entry);
        }

        info!(
            slug = %slug,
            fields = field_count,
            bound_blocks = model.bound_blocks().count(),
            "registered content type"
        );

        let content_type: &ContentType = self
            .types
            .entry(slug)
            .or_insert_with(|| ContentType::new(model));
        Ok(content_type)
    }

    pub fn get(&self, slug: &str) -> Option<&ContentType> {
        self.types.get(slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The content type owning a record, if any
    pub fn content_type_for(&self, record: &Record) -> Option<&ContentType> {
        self.types.get(&record.post_type)
    }

    /// Dispatch [`ContentType::on_before_persist`] by record type
    pub fn on_before_persist<S>(&self, record: Record, store: &mut S) -> Result<Record>
    where
        S: FieldStore + ?Sized,
    {
        match self.content_type_for(&record) {
            Some(content_type) => content_type.on_before_persist(record, store),
            None => Ok(record),
        }
    }

    /// Dispatch [`ContentType::on_load_for_edit`] by record type
    pub fn on_load_for_edit<S>(&self, record: &Record, store: &S) -> Result<String>
    where
        S: FieldStore + ?Sized,
    {
        match self.content_type_for(record) {
            Some(content_type) => content_type.on_load_for_edit(record, store),
            None => Ok(record.content.clone()),
        }
    }

    /// Dispatch [`ContentType::on_render`] by record type
    pub fn on_render<S>(&self, record: &Record, store: &S) -> Result<String>
    where
        S: FieldStore + ?Sized,
    {
        match self.content_type_for(record) {
            Some(content_type) => content_type.on_render(record, store),
            None => Ok(record.content.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryFieldStore;
    use crate::types::{FieldDeclaration, FieldType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const TEMPLATE: &str = concat!(
        r#"<!-- wp:heading {"metadata":{"bindings":{"content":{"source":"field","args":{"key":"headline"}}}}} -->"#,
        "<h2>Headline</h2>",
        "<!-- /wp:heading -->",
        r#"<!-- wp:group {"metadata":{"bindings":{"content":{"source":"field","args":{"key":"post_content"}}}}} -->"#,
        r#"<div class="wp-block-group"><!-- wp:paragraph --><p>Write here</p><!-- /wp:paragraph --></div>"#,
        "<!-- /wp:group -->",
    );

    fn definition() -> ContentModelDefinition {
        ContentModelDefinition {
            slug: "book".to_string(),
            title: "Book".to_string(),
            template: TEMPLATE.to_string(),
            fields: vec![FieldDeclaration::new("isbn")
                .with_type(FieldType::String)
                .with_description("ISBN")],
        }
    }

    fn edited(headline: &str, body: &str) -> String {
        format!(
            concat!(
                r#"<!-- wp:heading {{"metadata":{{"bindings":{{"content":{{"source":"field","args":{{"key":"headline"}}}}}}}}}} -->"#,
                "<h2>{}</h2>",
                "<!-- /wp:heading -->",
                r#"<!-- wp:group {{"metadata":{{"bindings":{{"content":{{"source":"field","args":{{"key":"post_content"}}}}}}}}}} -->"#,
                r#"<div class="wp-block-group"><!-- wp:paragraph --><p>{}</p><!-- /wp:paragraph --></div>"#,
                "<!-- /wp:group -->",
            ),
            headline, body
        )
    }

    #[test]
    fn test_register_writes_schema() {
        let mut store = MemoryFieldStore::new();
        let mut registry = ContentTypeRegistry::new();
        registry.register(&definition(), &mut store).unwrap();

        let names: Vec<_> = store
            .registered_fields("book")
            .into_iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["isbn", "headline"]);
        assert!(store.schema("book", POST_CONTENT_FIELD).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_twice_fails() {
        let mut store = MemoryFieldStore::new();
        let mut registry = ContentTypeRegistry::new();
        registry.register(&definition(), &mut store).unwrap();

        let err = registry.register(&definition(), &mut store).unwrap_err();
        assert!(matches!(err, Error::RegistryError(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_before_persist_extracts_published_records() {
        let mut store = MemoryFieldStore::new();
        let mut registry = ContentTypeRegistry::new();
        registry.register(&definition(), &mut store).unwrap();

        let record = Record::new(1, "book", RecordStatus::Publish, &edited("Dune", "Spice"));
        let saved = registry.on_before_persist(record, &mut store).unwrap();

        assert_eq!(store.get(1, "headline").as_deref(), Some("Dune"));
        assert_eq!(
            saved.content,
            "<!-- wp:paragraph --><p>Spice</p><!-- /wp:paragraph -->"
        );
    }

    #[test]
    fn test_before_persist_skips_drafts_and_other_types() {
        let mut store = MemoryFieldStore::new();
        let mut registry = ContentTypeRegistry::new();
        registry.register(&definition(), &mut store).unwrap();

        let draft = Record::new(1, "book", RecordStatus::Draft, &edited("Dune", "Spice"));
        let kept = registry.on_before_persist(draft.clone(), &mut store).unwrap();
        assert_eq!(kept, draft);

        let page = Record::new(2, "page", RecordStatus::Publish, "<p>Hi</p>");
        let kept = registry.on_before_persist(page.clone(), &mut store).unwrap();
        assert_eq!(kept, page);
        assert!(store.is_empty());
    }

    #[test]
    fn test_draft_edit_cycles_keep_one_copy_of_the_tree() {
        let mut store = MemoryFieldStore::new();
        let mut registry = ContentTypeRegistry::new();
        registry.register(&definition(), &mut store).unwrap();

        let original = edited("Dune", "Spice");
        let mut content = original.clone();
        for _ in 0..2 {
            let draft = Record::new(1, "book", RecordStatus::Draft, &content);
            let saved = registry.on_before_persist(draft, &mut store).unwrap();
            content = registry.on_load_for_edit(&saved, &store).unwrap();

            assert_eq!(content.matches("<!-- wp:heading").count(), 1);
            assert_eq!(content, original);
        }
        assert!(store.is_empty());

        let draft = Record::new(1, "book", RecordStatus::Draft, &content);
        let html = registry.on_render(&draft, &store).unwrap();
        assert_eq!(
            html,
            r#"<h2>Dune</h2><div class="wp-block-group"><p>Spice</p></div>"#
        );
    }

    #[test]
    fn test_draft_tree_overrides_stored_fields() {
        let mut store = MemoryFieldStore::new();
        let mut registry = ContentTypeRegistry::new();
        registry.register(&definition(), &mut store).unwrap();

        let published = Record::new(1, "book", RecordStatus::Publish, &edited("Dune", "Spice"));
        registry.on_before_persist(published, &mut store).unwrap();

        let draft = Record::new(1, "book", RecordStatus::Draft, &edited("Dune Messiah", "Sand"));
        let saved = registry.on_before_persist(draft, &mut store).unwrap();
        assert_eq!(store.get(1, "headline").as_deref(), Some("Dune"));

        let markup = registry.on_load_for_edit(&saved, &store).unwrap();
        assert_eq!(markup, edited("Dune Messiah", "Sand"));
    }

    #[test]
    fn test_unpublished_residual_body_is_kept() {
        let mut store = MemoryFieldStore::new();
        let mut registry = ContentTypeRegistry::new();
        registry.register(&definition(), &mut store).unwrap();

        let published = Record::new(1, "book", RecordStatus::Publish, &edited("Dune", "Spice"));
        let mut saved = registry.on_before_persist(published, &mut store).unwrap();
        saved.status = RecordStatus::Draft;

        let markup = registry.on_load_for_edit(&saved, &store).unwrap();
        assert_eq!(markup, edited("Dune", "Spice"));
    }

    #[test]
    fn test_drafts_extract_when_configured() {
        let mut store = MemoryFieldStore::new();
        let mut registry =
            ContentTypeRegistry::with_config(EngineConfig::new().with_extract_on_publish_only(false));
        registry.register(&definition(), &mut store).unwrap();

        let draft = Record::new(1, "book", RecordStatus::Draft, &edited("Dune", "Spice"));
        registry.on_before_persist(draft, &mut store).unwrap();
        assert_eq!(store.get(1, "headline").as_deref(), Some("Dune"));
    }

    #[test]
    fn test_load_for_edit_rebuilds_the_tree() {
        let mut store = MemoryFieldStore::new();
        let mut registry = ContentTypeRegistry::new();
        registry.register(&definition(), &mut store).unwrap();

        let record = Record::new(1, "book", RecordStatus::Publish, &edited("Dune", "Spice"));
        let saved = registry.on_before_persist(record, &mut store).unwrap();

        let markup = registry.on_load_for_edit(&saved, &store).unwrap();
        assert_eq!(markup, edited("Dune", "Spice"));
    }

    #[test]
    fn test_render_uses_defaults_for_missing_fields() {
        let mut store = MemoryFieldStore::new();
        let mut registry = ContentTypeRegistry::new();
        registry.register(&definition(), &mut store).unwrap();

        let record = Record::new(5, "book", RecordStatus::Publish, "");
        let html = registry.on_render(&record, &store).unwrap();
        assert_eq!(html, r#"<h2>headline</h2><div class="wp-block-group"></div>"#);
    }

    #[test]
    fn test_typed_reads_after_persist() {
        let mut store = MemoryFieldStore::new();
        let mut registry = ContentTypeRegistry::new();
        registry.register(&definition(), &mut store).unwrap();
        store.set(1, "isbn", "978".to_string());

        let reader = TypedFieldReader::new(&store, "book", registry.config().coercion());
        assert_eq!(reader.get_typed(1, "isbn").unwrap(), Some(json!("978")));
    }

    #[test]
    fn test_strict_render_fails_on_broken_region() {
        let template = r#"<!-- wp:group {"metadata":{"bindings":{"content":{"source":"field","args":{"key":"notes"}}}}} --><div></div><!-- /wp:group -->"#;
        let definition = ContentModelDefinition {
            slug: "memo".to_string(),
            title: "Memo".to_string(),
            template: template.to_string(),
            fields: vec![],
        };

        let mut store = MemoryFieldStore::new();
        let mut registry = ContentTypeRegistry::with_config(EngineConfig::strict());
        registry.register(&definition, &mut store).unwrap();
        store.set(1, "notes", "<!-- wp:group -->".to_string());

        let record = Record::new(1, "memo", RecordStatus::Publish, "");
        let err = registry.on_render(&record, &store).unwrap_err();
        assert!(matches!(err, Error::HydrateError(_)));
    }

    #[test]
    fn test_record_status_names() {
        assert_eq!(RecordStatus::from_name("publish"), RecordStatus::Publish);
        assert_eq!(RecordStatus::from_name("draft"), RecordStatus::Draft);
        assert_eq!(
            RecordStatus::from_name("private"),
            RecordStatus::Other("private".to_string())
        );
        assert_eq!(RecordStatus::Other("future".to_string()).as_str(), "future");
    }
}
