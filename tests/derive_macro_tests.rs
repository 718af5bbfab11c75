//! Tests for the FieldRecord derive macro

use content_model::*;

#[cfg(feature = "derive")]
mod derive_tests {
    use super::*;
    use content_model::test_utils::{bound_block, bound_group, paragraph};
    use serde_json::json;

    #[derive(FieldRecord)]
    struct Book {
        title: String,
        pages: u32,
        price: f64,
        in_print: bool,
    }

    #[derive(FieldRecord)]
    struct Review {
        headline: String,
        #[field(rename = "post_content")]
        body: String,
        #[field(skip)]
        #[allow(dead_code)]
        cached_html: String,
        rating: Option<i64>,
    }

    #[test]
    fn test_named_fields_become_values() {
        let book = Book {
            title: "Dune".to_string(),
            pages: 412,
            price: 9.5,
            in_print: true,
        };

        assert_eq!(
            book.to_field_values(),
            FieldValues::new()
                .with("title", "Dune")
                .with("pages", 412)
                .with("price", 9.5)
                .with("in_print", true)
        );
    }

    #[test]
    fn test_rename_skip_and_option() {
        let review = Review {
            headline: "Great".to_string(),
            body: paragraph("Loved it"),
            cached_html: "<p>stale</p>".to_string(),
            rating: None,
        };

        let values = review.to_field_values();
        assert_eq!(values.post_content(), Some(paragraph("Loved it").as_str()));
        assert!(!values.contains("cached_html"));
        assert!(!values.contains("rating"));

        let rated = Review { rating: Some(4), ..review };
        assert_eq!(rated.to_field_values().get("rating"), Some(&json!(4)));
    }

    #[test]
    fn test_derived_record_hydrates_a_model() {
        let template = [
            bound_block("heading", "content", "headline", "<h2>Headline</h2>"),
            bound_group(POST_CONTENT_FIELD, &paragraph("Body")),
        ]
        .concat();
        let model = ContentModelBuilder::new()
            .with_slug("review")
            .with_template(template)
            .build()
            .unwrap();

        let review = Review {
            headline: "Great".to_string(),
            body: paragraph("Loved it"),
            cached_html: String::new(),
            rating: Some(5),
        };

        let html = render_blocks(&model.hydrate(&review.to_field_values(), false));
        assert_eq!(
            html,
            r#"<h2>Great</h2><div class="wp-block-group"><p>Loved it</p></div>"#
        );
    }
}
