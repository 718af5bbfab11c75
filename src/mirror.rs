//! Editor-side mirror of group field extraction
//!
//! While a record is being edited, grouped field regions are captured
//! continuously so unsaved edits are not lost when the editor reloads its
//! view. Only `core/group` blocks reachable from the root through other
//! groups take part; any other block ends the search along its branch.

use crate::bound::BoundBlock;
use crate::serializer::serialize_blocks;
use crate::types::Block;
use crate::value::FieldValues;
use crate::walker::{visit, Flow};

const GROUP_BLOCK_NAME: &str = "core/group";

/// Serialized children of every group bound to a discrete field
///
/// Groups bound to the body field are not recorded, but groups nested
/// inside them still are.
pub fn find_bound_groups(blocks: &[Block]) -> FieldValues {
    let mut found = FieldValues::new();

    visit(blocks, &mut |block, id| {
        if block.name != GROUP_BLOCK_NAME {
            return Flow::Skip;
        }

        let binding = BoundBlock::from_block(block, id)
            .and_then(|bound| bound.binding("content").cloned());

        if let Some(binding) = binding.filter(|binding| !binding.is_post_content()) {
            found.insert(&binding.field, serialize_blocks(&block.inner_blocks));
        }

        Flow::Descend
    });

    found
}

/// In-progress field values of one record being edited
#[derive(Debug, Clone, Default)]
pub struct FieldBuffer {
    values: FieldValues,
    last_seen: Option<FieldValues>,
}

impl FieldBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from values already persisted for the record
    pub fn with_values(values: FieldValues) -> Self {
        Self {
            values,
            last_seen: None,
        }
    }

    /// Recompute the mirror for the current tree
    ///
    /// Returns whether the buffer changed. Observing the same tree again is
    /// a no-op.
    pub fn observe(&mut self, blocks: &[Block]) -> bool {
        let mirrored = find_bound_groups(blocks);
        if self.last_seen.as_ref() == Some(&mirrored) {
            return false;
        }

        let mut changed = false;
        for (field, value) in mirrored.iter() {
            if self.values.get(field) != Some(value) {
                self.values.insert(field, value.clone());
                changed = true;
            }
        }

        self.last_seen = Some(mirrored);
        changed
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Record an edit made outside the block tree
    pub fn set(&mut self, field: &str, value: impl Into<serde_json::Value>) {
        self.values.insert(field, value);
    }

    pub fn into_values(self) -> FieldValues {
        self.values
    }
}
