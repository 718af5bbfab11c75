//! Reading and writing attribute values stored in a block's HTML
//!
//! Some bound attributes live in markup rather than in the block's comment
//! attributes: a paragraph's content is the inner HTML of its `<p>`, an
//! image's url is the `src` of its `<img>`. These helpers locate the first
//! matching element across the block's HTML chunks and read or replace its
//! value, leaving every other chunk byte-for-byte intact.
//!
//! HTML-sourced values are text unless they carry markup. A target with no
//! child elements reads back as decoded text, and a value is written as
//! markup only when it parses to elements and reserializes unchanged.
//! Anything else is escaped, so `Tom & Jerry < 3` survives a round trip.

use dom_query::{Document, Selection};

use crate::kind::AttributeSource;
use crate::types::{Block, Chunk};

/// Read an HTML-sourced value; `None` when no chunk holds a matching element
pub fn read_html_source(block: &Block, source: AttributeSource) -> Option<String> {
    block.inner_content.iter().find_map(|chunk| match chunk {
        Chunk::Html(html) => read_from_fragment(html, source),
        Chunk::InnerBlock => None,
    })
}

/// Replace an HTML-sourced value in the first chunk holding a matching element
///
/// Returns `false` when no chunk matched and the block was left unchanged.
pub fn write_html_source(block: &mut Block, source: AttributeSource, value: &str) -> bool {
    for chunk in block.inner_content.iter_mut() {
        if let Chunk::Html(html) = chunk {
            if let Some(updated) = write_to_fragment(html, source, value) {
                *html = updated;
                return true;
            }
        }
    }
    false
}

fn read_from_fragment(html: &str, source: AttributeSource) -> Option<String> {
    let (_, body, _) = split_whitespace(html);
    if body.is_empty() {
        return None;
    }

    let doc = Document::from(body);
    let target = select_target(&doc, source)?;

    match source {
        AttributeSource::Html { .. } if target.children().is_empty() => {
            Some(target.text().to_string())
        }
        AttributeSource::Html { .. } => Some(target.inner_html().to_string()),
        AttributeSource::Attribute { attribute, .. } => {
            target.attr(attribute).map(|value| value.to_string())
        }
        AttributeSource::Comment | AttributeSource::InnerBlocks => None,
    }
}

fn write_to_fragment(html: &str, source: AttributeSource, value: &str) -> Option<String> {
    let (leading, body, trailing) = split_whitespace(html);
    if body.is_empty() {
        return None;
    }

    let doc = Document::from(body);
    let target = select_target(&doc, source)?;

    match source {
        AttributeSource::Html { .. } if is_markup(value) => target.set_html(value.to_string()),
        AttributeSource::Html { .. } => target.set_html(escape_text(value)),
        AttributeSource::Attribute { attribute, .. } => target.set_attr(attribute, value),
        AttributeSource::Comment | AttributeSource::InnerBlocks => return None,
    }

    let serialized = doc.select("body").inner_html();
    Some(format!("{}{}{}", leading, serialized, trailing))
}

/// Whether a value is markup that survives a parse unchanged
fn is_markup(value: &str) -> bool {
    let doc = Document::from(value);
    let body = doc.select("body");
    !body.children().is_empty() && body.inner_html().to_string() == value
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn select_target(doc: &Document, source: AttributeSource) -> Option<Selection<'_>> {
    let selector = match source {
        AttributeSource::Html { selector } | AttributeSource::Attribute { selector, .. } => {
            selector
        }
        AttributeSource::Comment | AttributeSource::InnerBlocks => return None,
    };

    let matches = doc.select("body").select(selector);
    if matches.is_empty() {
        None
    } else {
        Some(matches.first())
    }
}

/// Split a chunk into leading whitespace, content and trailing whitespace
///
/// The HTML parser drops whitespace around the fragment, so it is carried
/// over separately to keep chunk boundaries stable.
fn split_whitespace(html: &str) -> (&str, &str, &str) {
    let start = html.len() - html.trim_start().len();
    let end = html.trim_end().len().max(start);
    (&html[..start], &html[start..end], &html[end..])
}
