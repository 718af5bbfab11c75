//! Test utilities for block trees and bound markup
//! 
//! This module provides helpers for comparing rendered HTML and block markup
//! and for writing bound template markup in tests without hand-escaping the
//! binding JSON.

use dom_query::Document;

use crate::parser::parse_blocks;
use crate::serializer::serialize_blocks;

/// Normalize HTML for comparison by parsing and re-serializing
/// 
/// # Examples
/// 
/// ```
/// use content_model::test_utils::normalize_html;
/// 
/// let html1 = "<div  class=\"test\"   id=\"main\" ><p>Hello</p></div>";
/// let html2 = "<div class=\"test\" id=\"main\"><p>Hello</p></div>";
/// 
/// assert_eq!(normalize_html(html1), normalize_html(html2));
/// ```
pub fn normalize_html(html: &str) -> String {
    let doc = Document::from(html);
    doc.select("body").inner_html().trim().to_string()
}

/// Normalize block markup by parsing and re-serializing it
/// 
/// Whitespace-only text between top-level blocks is dropped, so markup
/// written across several lines compares equal to its compact form. Markup
/// that does not parse is returned trimmed.
pub fn normalize_blocks(markup: &str) -> String {
    match parse_blocks(markup) {
        Ok(mut blocks) => {
            blocks.retain(|block| !(block.is_freeform() && block.inner_html().trim().is_empty()));
            serialize_blocks(&blocks)
        }
        Err(_) => markup.trim().to_string(),
    }
}

/// Assert that two HTML strings are equivalent
/// 
/// This macro normalizes both HTML strings before comparison,
/// ignoring differences in whitespace inside tags.
/// 
/// # Examples
/// 
/// ```
/// use content_model::assert_html_eq;
/// 
/// assert_html_eq!(
///     "<div class=\"a\"><p>Text</p></div>",
///     "<div  class=\"a\" ><p>Text</p></div>"
/// );
/// ```
#[macro_export]
macro_rules! assert_html_eq {
    ($left:expr, $right:expr) => {
        {
            let left_normalized = $crate::test_utils::normalize_html($left);
            let right_normalized = $crate::test_utils::normalize_html($right);
            
            if left_normalized != right_normalized {
                panic!(
                    "HTML assertion failed\n\nLeft (normalized):\n{}\n\nRight (normalized):\n{}\n\nOriginal left:\n{}\n\nOriginal right:\n{}",
                    left_normalized,
                    right_normalized,
                    $left,
                    $right
                );
            }
        }
    };
}

/// Assert that two pieces of block markup serialize to the same tree
#[macro_export]
macro_rules! assert_blocks_eq {
    ($left:expr, $right:expr) => {
        {
            let left_normalized = $crate::test_utils::normalize_blocks($left);
            let right_normalized = $crate::test_utils::normalize_blocks($right);
            
            if left_normalized != right_normalized {
                panic!(
                    "Block assertion failed\n\nLeft (normalized):\n{}\n\nRight (normalized):\n{}",
                    left_normalized,
                    right_normalized
                );
            }
        }
    };
}

/// Compare two HTML strings and return whether they're equivalent
pub fn html_eq(html1: &str, html2: &str) -> bool {
    normalize_html(html1) == normalize_html(html2)
}

/// Extract text content from HTML, ignoring all tags
/// 
/// Useful for testing rendered records when only the visible text matters
pub fn extract_text(html: &str) -> String {
    let doc = Document::from(html);
    let text = doc.select("body").text();
    
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The `metadata` attribute JSON binding one attribute to a field
pub fn binding_attrs(attribute: &str, field: &str) -> String {
    format!(
        r#"{{"metadata":{{"bindings":{{"{}":{{"source":"field","args":{{"key":"{}"}}}}}}}}}}"#,
        attribute, field
    )
}

/// Markup of a block with its `attribute` bound to `field`
/// 
/// `name` is written as it appears in the delimiter, e.g. `heading`.
pub fn bound_block(name: &str, attribute: &str, field: &str, inner: &str) -> String {
    format!(
        "<!-- wp:{name} {attrs} -->{inner}<!-- /wp:{name} -->",
        name = name,
        attrs = binding_attrs(attribute, field),
        inner = inner
    )
}

/// Markup of a `group` whose children are bound to `field`
pub fn bound_group(field: &str, inner: &str) -> String {
    bound_block(
        "group",
        "content",
        field,
        &format!(r#"<div class="wp-block-group">{}</div>"#, inner),
    )
}

/// Markup of a plain paragraph block
pub fn paragraph(text: &str) -> String {
    format!("<!-- wp:paragraph --><p>{}</p><!-- /wp:paragraph -->", text)
}
