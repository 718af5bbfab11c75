//! Depth-first, parent-first traversal of block trees
//!
//! Every visited block is identified by a [`VariantId`]: the path of
//! `kind#ordinal` segments from the root, where the ordinal counts earlier
//! siblings of the same kind. Two trees with the same shape produce the same
//! ids, which is how a concrete tree is matched against its template.
//!
//! The visitor always sees a block whose children have not been visited yet
//! and decides whether the walk continues into them.

use std::collections::HashMap;

use crate::types::Block;

/// Stable per-position identifier of a block inside a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantId(String);

impl VariantId {
    /// The id of the (virtual) root that top-level blocks hang from
    pub fn root() -> Self {
        Self::default()
    }

    /// The id of the `ordinal`-th child of kind `name` under this position
    pub fn child(&self, name: &str, ordinal: usize) -> Self {
        if self.0.is_empty() {
            VariantId(format!("{}#{}", name, ordinal))
        } else {
            VariantId(format!("{} > {}#{}", self.0, name, ordinal))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of segments, i.e. the depth of the block (top level is 1)
    pub fn depth(&self) -> usize {
        if self.0.is_empty() {
            0
        } else {
            self.0.matches(" > ").count() + 1
        }
    }
}

impl std::fmt::Display for VariantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Counts siblings per kind while a level is traversed
#[derive(Default)]
struct Ordinals(HashMap<String, usize>);

impl Ordinals {
    fn next(&mut self, name: &str) -> usize {
        let counter = self.0.entry(name.to_string()).or_insert(0);
        let ordinal = *counter;
        *counter += 1;
        ordinal
    }
}

/// What [`walk`] does after the visitor returned a replacement block
pub enum Step {
    /// Walk into the replacement's children
    Descend(Block),
    /// Keep the replacement as is
    Stop(Block),
}

/// Whether [`visit`] continues into a block's children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Descend,
    Skip,
}

/// Rebuild a tree by passing every block through `visitor`
///
/// Each block is handed over by value before its children are walked; the
/// children that get walked are those of the block the visitor returns.
pub fn walk<F>(blocks: Vec<Block>, visitor: &mut F) -> Vec<Block>
where
    F: FnMut(Block, &VariantId) -> Step,
{
    walk_level(blocks, &VariantId::root(), visitor)
}

fn walk_level<F>(blocks: Vec<Block>, parent: &VariantId, visitor: &mut F) -> Vec<Block>
where
    F: FnMut(Block, &VariantId) -> Step,
{
    let mut ordinals = Ordinals::default();
    let mut out = Vec::with_capacity(blocks.len());

    for block in blocks {
        let id = parent.child(&block.name, ordinals.next(&block.name));

        let block = match visitor(block, &id) {
            Step::Descend(mut block) => {
                let children = std::mem::take(&mut block.inner_blocks);
                block.inner_blocks = walk_level(children, &id, visitor);
                block
            }
            Step::Stop(block) => block,
        };

        out.push(block);
    }

    out
}

/// Read-only traversal with the same order and ids as [`walk`]
pub fn visit<'a, F>(blocks: &'a [Block], visitor: &mut F)
where
    F: FnMut(&'a Block, &VariantId) -> Flow,
{
    visit_level(blocks, &VariantId::root(), visitor)
}

fn visit_level<'a, F>(blocks: &'a [Block], parent: &VariantId, visitor: &mut F)
where
    F: FnMut(&'a Block, &VariantId) -> Flow,
{
    let mut ordinals = Ordinals::default();

    for block in blocks {
        let id = parent.child(&block.name, ordinals.next(&block.name));

        if visitor(block, &id) == Flow::Descend {
            visit_level(&block.inner_blocks, &id, visitor);
        }
    }
}
