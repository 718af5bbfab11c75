//! Content type registration and the record lifecycle

use content_model::test_utils::{bound_block, bound_group, paragraph};
use content_model::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn book_definition() -> ContentModelDefinition {
    let template = [
        bound_block("heading", "content", "title", "<h2>Title</h2>"),
        r#"<!-- wp:paragraph {"metadata":{"bindings":{"content":{"source":"core/post-meta","args":{"key":"pages"}}}}} --><p>0</p><!-- /wp:paragraph -->"#.to_string(),
        bound_group(POST_CONTENT_FIELD, &paragraph("Synopsis")),
    ]
    .concat();

    let json = json!({
        "slug": "book",
        "title": "Book",
        "template": template,
        "fields": [
            {"slug": "pages", "type": "integer", "description": "Page count"},
            {"slug": "in_print", "type": "boolean", "description": "Still in print"}
        ]
    });

    serde_json::from_value(json).unwrap()
}

fn edited_book(title: &str, pages: &str, synopsis: &str) -> String {
    [
        bound_block("heading", "content", "title", &format!("<h2>{}</h2>", title)),
        format!(
            r#"<!-- wp:paragraph {{"metadata":{{"bindings":{{"content":{{"source":"core/post-meta","args":{{"key":"pages"}}}}}}}}}} --><p>{}</p><!-- /wp:paragraph -->"#,
            pages
        ),
        bound_group(POST_CONTENT_FIELD, &paragraph(synopsis)),
    ]
    .concat()
}

fn setup() -> (ContentTypeRegistry, MemoryFieldStore) {
    let mut store = MemoryFieldStore::new();
    let mut registry = ContentTypeRegistry::new();
    registry.register(&book_definition(), &mut store).unwrap();
    (registry, store)
}

#[test]
fn test_register_derives_schema() {
    let (registry, store) = setup();
    let book = registry.get("book").unwrap();

    assert_eq!(book.slug(), "book");
    assert_eq!(book.model().block_category().slug, "book-fields");

    let pages = store.schema("book", "pages").unwrap();
    assert_eq!(pages.field_type, FieldType::String);
    assert_eq!(pages.description, "Page count");

    let in_print = store.schema("book", "in_print").unwrap();
    assert_eq!(in_print.field_type, FieldType::Boolean);
    assert_eq!(in_print.default, json!(false));

    assert!(store.schema("book", "title").is_some());
    assert!(store.schema("book", POST_CONTENT_FIELD).is_none());
}

#[test]
fn test_publish_then_edit_then_render() {
    let (registry, mut store) = setup();

    let record = Record::new(
        10,
        "book",
        RecordStatus::Publish,
        &edited_book("Dune", "412", "Spice"),
    );
    let saved = registry.on_before_persist(record, &mut store).unwrap();

    assert_eq!(saved.content, paragraph("Spice"));
    assert_eq!(store.get(10, "title").as_deref(), Some("Dune"));
    assert_eq!(store.get(10, "pages").as_deref(), Some("412"));

    let markup = registry.on_load_for_edit(&saved, &store).unwrap();
    assert_eq!(markup, edited_book("Dune", "412", "Spice"));

    let html = registry.on_render(&saved, &store).unwrap();
    assert_html_eq!(
        &html,
        r#"<h2>Dune</h2><p>412</p><div class="wp-block-group"><p>Spice</p></div>"#
    );
}

#[test]
fn test_flags_written_as_text() {
    let (_, mut store) = setup();
    store.set(1, "in_print", to_field_text(&json!(true)));
    store.set(2, "in_print", to_field_text(&json!(false)));

    assert_eq!(store.get(1, "in_print").as_deref(), Some("1"));
    assert_eq!(store.get(2, "in_print").as_deref(), Some(""));

    let reader = TypedFieldReader::new(&store, "book", CoercionMode::Permissive);
    assert_eq!(reader.get_typed(1, "in_print").unwrap(), Some(json!(true)));
    assert_eq!(reader.get_typed(2, "in_print").unwrap(), Some(json!(false)));
    assert_eq!(reader.get_typed(3, "in_print").unwrap(), Some(json!(false)));
}

#[test]
fn test_draft_saves_are_left_alone() {
    let (registry, mut store) = setup();
    let draft = Record::new(
        3,
        "book",
        RecordStatus::Draft,
        &edited_book("Draft", "1", "Notes"),
    );

    let saved = registry.on_before_persist(draft.clone(), &mut store).unwrap();
    assert_eq!(saved, draft);
    assert!(store.is_empty());
}

#[test]
fn test_foreign_records_pass_through() {
    let (registry, mut store) = setup();
    let page = Record::new(4, "page", RecordStatus::Publish, &paragraph("About"));

    assert_eq!(registry.on_before_persist(page.clone(), &mut store).unwrap(), page);
    assert_eq!(registry.on_load_for_edit(&page, &store).unwrap(), page.content);
    assert_eq!(registry.on_render(&page, &store).unwrap(), page.content);
    assert!(registry.content_type_for(&page).is_none());
}

#[test]
fn test_template_without_body_region_empties_content() {
    let definition = ContentModelDefinition {
        slug: "quote".to_string(),
        title: "Quote".to_string(),
        template: bound_block("paragraph", "content", "text", "<p>Text</p>"),
        fields: vec![],
    };
    let mut store = MemoryFieldStore::new();
    let mut registry = ContentTypeRegistry::new();
    registry.register(&definition, &mut store).unwrap();

    let record = Record::new(
        1,
        "quote",
        RecordStatus::Publish,
        &bound_block("paragraph", "content", "text", "<p>Be brief</p>"),
    );
    let saved = registry.on_before_persist(record, &mut store).unwrap();

    assert_eq!(saved.content, "");
    assert_eq!(store.get(1, "text").as_deref(), Some("Be brief"));
    assert_eq!(registry.on_render(&saved, &store).unwrap(), "<p>Be brief</p>");
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let (mut registry, mut store) = setup();
    let err = registry.register(&book_definition(), &mut store).unwrap_err();

    assert!(err.to_string().contains("already registered"));
    assert_eq!(registry.iter().count(), 1);
}

#[test]
fn test_invalid_template_fails_registration() {
    let definition = ContentModelDefinition {
        slug: "broken".to_string(),
        title: "Broken".to_string(),
        template: "<!-- wp:group --><div>".to_string(),
        fields: vec![],
    };
    let mut store = MemoryFieldStore::new();
    let mut registry = ContentTypeRegistry::new();

    let err = registry.register(&definition, &mut store).unwrap_err();
    assert!(matches!(err, Error::ParseError(_)));
    assert!(registry.is_empty());
}
