//! Block grammar parsing
//!
//! Turns serialized block markup into a [`Block`] tree:
//!
//! ```text
//! <!-- wp:group {"layout":{"type":"constrained"}} -->
//! <div class="wp-block-group"><!-- wp:paragraph --><p>Hi</p><!-- /wp:paragraph --></div>
//! <!-- /wp:group -->
//! ```
//!
//! HTML outside any delimiter at the top level becomes a freeform block, so
//! [`serialize_blocks`](crate::serializer::serialize_blocks) reproduces the
//! input tree exactly.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};
use crate::types::{normalize_block_name, Block, Chunk};

static DELIMITER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<!--\s+(?P<closer>/)?wp:(?P<name>[a-z][a-z0-9_-]*(?:/[a-z][a-z0-9_-]*)?)\s+(?:(?P<attrs>\{.*?\})\s+)?(?P<void>/)?-->",
    )
    .expect("Invalid block delimiter regex")
});

/// Parse serialized blocks into a tree
pub fn parse_blocks(text: &str) -> Result<Vec<Block>> {
    Parser::new(text).parse()
}

pub struct Parser<'a> {
    text: &'a str,
    output: Vec<Block>,
    stack: Vec<Block>,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            output: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<Vec<Block>> {
        let text = self.text;
        let mut cursor = 0;

        for caps in DELIMITER_REGEX.captures_iter(text) {
            let Some(delimiter) = caps.get(0) else {
                continue;
            };

            self.push_html(&text[cursor..delimiter.start()]);
            cursor = delimiter.end();

            self.handle_delimiter(&caps)?;
        }

        self.push_html(&text[cursor..]);

        if let Some(open) = self.stack.last() {
            return Err(Error::parse_owned(format!(
                "Block `{}` is never closed",
                open.name
            )));
        }

        Ok(self.output)
    }

    fn handle_delimiter(&mut self, caps: &Captures) -> Result<()> {
        let name = normalize_block_name(&caps["name"]);

        if caps.name("closer").is_some() {
            let block = self.stack.pop().ok_or_else(|| {
                Error::parse_owned(format!("Unexpected closing delimiter for `{}`", name))
            })?;

            if block.name != name {
                return Err(Error::parse_owned(format!(
                    "Closing delimiter `{}` does not match open block `{}`",
                    name, block.name
                )));
            }

            self.attach(block);
            return Ok(());
        }

        let attrs = match caps.name("attrs") {
            Some(raw) => parse_attributes(raw.as_str())?,
            None => Map::new(),
        };

        let block = Block::new(&name).with_attrs(attrs);

        if caps.name("void").is_some() {
            self.attach(block);
        } else {
            self.stack.push(block);
        }

        Ok(())
    }

    fn push_html(&mut self, html: &str) {
        if html.is_empty() {
            return;
        }

        match self.stack.last_mut() {
            Some(parent) => parent.inner_content.push(Chunk::Html(html.to_string())),
            None => self.output.push(Block::freeform(html)),
        }
    }

    fn attach(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.inner_blocks.push(block);
                parent.inner_content.push(Chunk::InnerBlock);
            }
            None => self.output.push(block),
        }
    }
}

fn parse_attributes(raw: &str) -> Result<Map<String, JsonValue>> {
    match serde_json::from_str::<JsonValue>(raw)? {
        JsonValue::Object(attrs) => Ok(attrs),
        other => Err(Error::parse_owned(format!(
            "Block attributes must be a JSON object, found `{}`",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FREEFORM_BLOCK_NAME;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_void_block() {
        let blocks = parse_blocks(r#"<!-- wp:image {"id":7} /-->"#).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "core/image");
        assert_eq!(blocks[0].attrs["id"], json!(7));
        assert!(blocks[0].inner_content.is_empty());
    }

    #[test]
    fn test_parse_nested_blocks() {
        let text = concat!(
            r#"<!-- wp:group {"tagName":"section"} -->"#,
            r#"<section class="wp-block-group">"#,
            r#"<!-- wp:paragraph --><p>One</p><!-- /wp:paragraph -->"#,
            r#"<!-- wp:paragraph --><p>Two</p><!-- /wp:paragraph -->"#,
            r#"</section>"#,
            r#"<!-- /wp:group -->"#,
        );

        let blocks = parse_blocks(text).unwrap();
        assert_eq!(blocks.len(), 1);

        let group = &blocks[0];
        assert_eq!(group.name, "core/group");
        assert_eq!(group.attrs["tagName"], json!("section"));
        assert_eq!(group.inner_blocks.len(), 2);
        assert_eq!(
            group.inner_content,
            vec![
                Chunk::Html(r#"<section class="wp-block-group">"#.to_string()),
                Chunk::InnerBlock,
                Chunk::InnerBlock,
                Chunk::Html("</section>".to_string()),
            ]
        );
        assert_eq!(group.inner_blocks[1].inner_html(), "<p>Two</p>");
    }

    #[test]
    fn test_parse_namespaced_and_freeform() {
        let text = "<p>loose</p>\n<!-- wp:acme/card {\"tone\":\"warm\"} /-->";
        let blocks = parse_blocks(text).unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name, FREEFORM_BLOCK_NAME);
        assert_eq!(blocks[0].inner_html(), "<p>loose</p>\n");
        assert_eq!(blocks[1].name, "acme/card");
    }

    #[test]
    fn test_parse_attributes_with_nested_objects() {
        let text = r#"<!-- wp:paragraph {"metadata":{"bindings":{"content":{"source":"field","args":{"key":"headline"}}}}} --><p></p><!-- /wp:paragraph -->"#;
        let blocks = parse_blocks(text).unwrap();
        assert_eq!(
            blocks[0].attrs["metadata"]["bindings"]["content"]["args"]["key"],
            json!("headline")
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_blocks("<!-- wp:group --><div>"),
            Err(Error::ParseError(_))
        ));
        assert!(matches!(
            parse_blocks("<!-- /wp:group -->"),
            Err(Error::ParseError(_))
        ));
        assert!(matches!(
            parse_blocks("<!-- wp:group --><!-- /wp:paragraph -->"),
            Err(Error::ParseError(_))
        ));
        assert!(matches!(
            parse_blocks(r#"<!-- wp:group {"a":} /-->"#),
            Err(Error::JsonError(_))
        ));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_blocks("").unwrap().is_empty());
    }
}
