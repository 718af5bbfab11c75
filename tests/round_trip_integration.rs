//! Round trips between field values and block trees

use content_model::test_utils::{bound_block, bound_group, paragraph};
use content_model::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn profile_template() -> String {
    [
        bound_block("heading", "content", "name", "<h2>Name</h2>"),
        bound_block("paragraph", "content", "bio", "<p>Bio</p>"),
        r#"<!-- wp:image {"metadata":{"bindings":{"url":{"source":"field","args":{"key":"photo"}},"id":{"source":"field","args":{"key":"photo_id"}}}}} --><figure class="wp-block-image"><img src="placeholder.png" alt=""/></figure><!-- /wp:image -->"#.to_string(),
        r#"<!-- wp:buttons --><div class="wp-block-buttons">"#.to_string(),
        r##"<!-- wp:button {"metadata":{"bindings":{"text":{"source":"field","args":{"key":"cta"}},"url":{"source":"field","args":{"key":"cta_url"}}}}} --><div class="wp-block-button"><a class="wp-block-button__link" href="#">Go</a></div><!-- /wp:button -->"##.to_string(),
        "</div><!-- /wp:buttons -->".to_string(),
        bound_group("links", &paragraph("Links")),
        bound_group(POST_CONTENT_FIELD, &paragraph("Body")),
    ]
    .concat()
}

fn model() -> ContentModel {
    ContentModelBuilder::new()
        .with_slug("profile")
        .with_template(profile_template())
        .build()
        .unwrap()
}

fn values() -> FieldValues {
    FieldValues::new()
        .with("name", "Ada")
        .with("bio", "Counted <em>engines</em>")
        .with("photo", "ada.jpg")
        .with("photo_id", 12)
        .with("cta", "Write")
        .with("cta_url", "/contact")
        .with("links", paragraph("Notes"))
}

#[test]
fn test_extract_inverts_hydrate() {
    let model = model();
    let tree = model.hydrate(&values(), false);
    let extraction = model.extract(&tree);

    assert_eq!(extraction.fields, values());
}

#[test]
fn test_round_trip_through_markup() {
    let model = model();
    let markup = serialize_blocks(&model.hydrate(&values(), false));
    let reparsed = parse_blocks(&markup).unwrap();

    assert_eq!(model.extract(&reparsed).fields, values());
}

#[test]
fn test_hydrate_is_deterministic() {
    let model = model();
    let with_body = values().with_post_content(&paragraph("Hello"));

    for is_editing in [false, true] {
        let first = model.hydrate(&with_body, is_editing);
        let second = model.hydrate(&with_body, is_editing);
        assert_eq!(first, second);
    }
}

#[test]
fn test_editing_flag_only_changes_empty_regions() {
    let model = model();
    let with_body = values().with_post_content(&paragraph("Hello"));

    // Every field and the body are supplied, so nothing is a placeholder.
    assert_eq!(
        model.hydrate(&with_body, true),
        model.hydrate(&with_body, false)
    );

    let editing = serialize_blocks(&model.hydrate(&values(), true));
    let viewing = serialize_blocks(&model.hydrate(&values(), false));
    assert!(editing.contains("<p>Body</p>"));
    assert!(!viewing.contains("<p>Body</p>"));
}

#[test]
fn test_body_survives_round_trip() {
    let model = model();
    let body = format!("{}{}", paragraph("One"), paragraph("Two"));
    let tree = model.hydrate(&values().with_post_content(&body), false);

    let extraction = model.extract(&tree);
    assert_eq!(extraction.post_content_markup(), Some(body));
    assert!(!extraction.fields.contains(POST_CONTENT_FIELD));
}

#[test]
fn test_typed_values_round_trip_through_store() {
    let model = model();
    let mut store = MemoryFieldStore::new();
    for entry in model.field_schema() {
        store.register_schema(model.slug(), entry);
    }

    let extraction = model.extract(&model.hydrate(&values(), false));
    for (field, value) in extraction.fields.iter() {
        store.set(1, field, to_field_text(value));
    }

    let reader = TypedFieldReader::new(&store, model.slug(), CoercionMode::Strict);
    let read = reader.read_all(1).unwrap();
    assert_eq!(read.get("photo_id"), Some(&json!(12)));
    assert_eq!(read, values());
}

#[test]
fn test_reserved_characters_round_trip() {
    let model = model();
    let values = values()
        .with("name", "Tom & Jerry")
        .with("bio", "1 < 2 && 3 > 2")
        .with("cta", "Q&A <now>")
        .with("photo_id", 9007199254740993_i64);

    let markup = serialize_blocks(&model.hydrate(&values, false));
    assert!(markup.contains("<h2>Tom &amp; Jerry</h2>"));

    let reparsed = parse_blocks(&markup).unwrap();
    assert_eq!(model.extract(&reparsed).fields, values);
}
