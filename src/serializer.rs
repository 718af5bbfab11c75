//! Block grammar serialization and static rendering

use serde_json::{Map, Value as JsonValue};

use crate::types::{Block, Chunk};

/// Serialize a block tree back into block markup
pub fn serialize_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        write_block(&mut out, block);
    }
    out
}

/// Serialize a single block
pub fn serialize_block(block: &Block) -> String {
    let mut out = String::new();
    write_block(&mut out, block);
    out
}

fn write_block(out: &mut String, block: &Block) {
    if block.is_freeform() {
        out.push_str(&block.inner_html());
        return;
    }

    let name = block.name.strip_prefix("core/").unwrap_or(&block.name);

    out.push_str("<!-- wp:");
    out.push_str(name);
    out.push(' ');
    if !block.attrs.is_empty() {
        out.push_str(&serialize_block_attributes(&block.attrs));
        out.push(' ');
    }

    if block.inner_content.is_empty() {
        out.push_str("/-->");
        return;
    }

    out.push_str("-->");

    let mut inner = block.inner_blocks.iter();
    for chunk in &block.inner_content {
        match chunk {
            Chunk::Html(html) => out.push_str(html),
            Chunk::InnerBlock => {
                if let Some(child) = inner.next() {
                    write_block(out, child);
                }
            }
        }
    }

    out.push_str("<!-- /wp:");
    out.push_str(name);
    out.push_str(" -->");
}

/// Encode block attributes so they can never terminate the comment delimiter
///
/// `--`, `<`, `>` and `&` only occur inside JSON strings, where their unicode
/// escapes decode to the same value.
pub fn serialize_block_attributes(attrs: &Map<String, JsonValue>) -> String {
    serde_json::to_string(attrs)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("--", "\\u002d\\u002d")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Render blocks to their static HTML, dropping all delimiters
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        render_block(&mut out, block);
    }
    out
}

fn render_block(out: &mut String, block: &Block) {
    let mut inner = block.inner_blocks.iter();
    for chunk in &block.inner_content {
        match chunk {
            Chunk::Html(html) => out.push_str(html),
            Chunk::InnerBlock => {
                if let Some(child) = inner.next() {
                    render_block(out, child);
                }
            }
        }
    }
}
