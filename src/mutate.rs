//! Mutation engine. Every operation reads the current store and returns a
//! replacement; the input is never modified. Unknown ids, out-of-range
//! indices, and boundary moves degrade to returning an equal store.

use serde_json::{Map, Value};

use crate::blocks::{Block, BlockType, PROP_CHECKED, STYLE_KEYS};
use crate::store::{BlockStore, MAX_INDENT_DEPTH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropPosition {
    Above,
    Below,
}

impl BlockStore {
    /// Splices a fresh default paragraph immediately after `after_index` and
    /// returns the new store together with the new block's id, so the caller
    /// can move input focus there.
    pub fn insert_after(&self, after_index: usize, parent_id: Option<&str>) -> (BlockStore, String) {
        let block = Block::paragraph().with_parent(parent_id);
        let id = block.id.clone();
        let mut next = self.blocks().to_vec();
        let insert_ix = after_index.saturating_add(1).min(next.len());
        next.insert(insert_ix, block);
        (BlockStore::new(next), id)
    }

    /// Removes a block. No-op when only one block remains. Deleting a
    /// container also deletes its descendants: the flat sequence is the
    /// persisted shape, and blocks invisible to the root filter would
    /// otherwise leak into every future save.
    pub fn delete(&self, block_id: &str) -> BlockStore {
        if self.len() <= 1 {
            return self.clone();
        }
        let Some(target_ix) = self.index_of(block_id) else {
            return self.clone();
        };

        let doomed = self.descendant_ids(target_ix);
        let next: Vec<Block> = self
            .blocks()
            .iter()
            .filter(|block| !doomed.contains(&block.id))
            .cloned()
            .collect();
        BlockStore::new(next)
    }

    /// Clones the block (fresh id, same type/content/properties/parent) and
    /// inserts the clone immediately after the original.
    pub fn duplicate(&self, block_id: &str) -> BlockStore {
        let Some(source_ix) = self.index_of(block_id) else {
            return self.clone();
        };
        let mut clone = self.blocks()[source_ix].clone();
        clone.id = uuid::Uuid::new_v4().to_string();
        let mut next = self.blocks().to_vec();
        next.insert(source_ix + 1, clone);
        BlockStore::new(next)
    }

    /// Swaps the block with its immediate sequence neighbor. No-op at either
    /// boundary.
    pub fn move_block(&self, block_id: &str, direction: MoveDirection) -> BlockStore {
        let Some(ix) = self.index_of(block_id) else {
            return self.clone();
        };
        let other = match direction {
            MoveDirection::Up => {
                if ix == 0 {
                    return self.clone();
                }
                ix - 1
            }
            MoveDirection::Down => {
                if ix + 1 >= self.len() {
                    return self.clone();
                }
                ix + 1
            }
        };
        let mut next = self.blocks().to_vec();
        next.swap(ix, other);
        BlockStore::new(next)
    }

    /// Moves the dragged block so it lands immediately above or below the
    /// target. The insertion index is corrected for the dragged block's own
    /// removal: splice-removal shifts every later index left by one, so a
    /// dragged block that preceded the target lands one slot earlier.
    pub fn reorder(
        &self,
        dragged_id: &str,
        target_id: &str,
        position: DropPosition,
    ) -> BlockStore {
        if dragged_id == target_id {
            return self.clone();
        }
        let (Some(from), Some(target_ix)) = (self.index_of(dragged_id), self.index_of(target_id))
        else {
            return self.clone();
        };

        let mut to = match position {
            DropPosition::Above => target_ix,
            DropPosition::Below => target_ix + 1,
        };
        if from < target_ix {
            to -= 1;
        }

        let mut next = self.blocks().to_vec();
        let moved = next.remove(from);
        next.insert(to.min(next.len()), moved);
        BlockStore::new(next)
    }

    /// Nests the block under the block immediately preceding it in sequence
    /// order. No-op for the first block.
    pub fn indent(&self, block_id: &str) -> BlockStore {
        let Some(ix) = self.index_of(block_id) else {
            return self.clone();
        };
        if ix == 0 {
            return self.clone();
        }
        let parent_id = self.blocks()[ix - 1].id.clone();
        let mut next = self.blocks().to_vec();
        next[ix].parent_block_id = Some(parent_id);
        BlockStore::new(next)
    }

    /// Promotes the block one nesting level: its parent becomes the current
    /// parent's own parent. No-op for root-level blocks.
    pub fn outdent(&self, block_id: &str) -> BlockStore {
        let Some(ix) = self.index_of(block_id) else {
            return self.clone();
        };
        let Some(parent_id) = self.blocks()[ix].parent_block_id.as_deref() else {
            return self.clone();
        };
        let grandparent = self
            .get(parent_id)
            .and_then(|parent| parent.parent_block_id.clone());
        let mut next = self.blocks().to_vec();
        next[ix].parent_block_id = grandparent;
        BlockStore::new(next)
    }

    /// Replaces the block's type (and optionally its content) in place.
    /// Properties carry over only when the old and new types share a
    /// property shape; otherwise only style overrides survive. Defaults for
    /// the new shape are seeded (a converted to-do starts unchecked).
    pub fn convert_type(
        &self,
        block_id: &str,
        new_type: BlockType,
        content_override: Option<&str>,
    ) -> BlockStore {
        let Some(ix) = self.index_of(block_id) else {
            return self.clone();
        };
        let mut next = self.blocks().to_vec();
        let block = &mut next[ix];

        if block.block_type.prop_shape() != new_type.prop_shape() {
            block.properties = retain_style_keys(&block.properties);
        }
        block.block_type = new_type;
        if let Some(content) = content_override {
            block.content = content.to_string();
        }
        if new_type == BlockType::Divider {
            block.content.clear();
        }
        if new_type == BlockType::Todo && !block.properties.contains_key(PROP_CHECKED) {
            block.properties.insert(PROP_CHECKED.into(), Value::Bool(false));
        }
        BlockStore::new(next)
    }

    /// Replaces a block's text content. Unknown ids are a no-op.
    pub fn set_content(&self, block_id: &str, content: &str) -> BlockStore {
        let Some(ix) = self.index_of(block_id) else {
            return self.clone();
        };
        if self.blocks()[ix].content == content {
            return self.clone();
        }
        let mut next = self.blocks().to_vec();
        next[ix].content = content.to_string();
        BlockStore::new(next)
    }

    /// Ids of the block at `ix` plus, when it is a container, every block
    /// nested under it, walked to the same depth cap as indentation.
    fn descendant_ids(&self, ix: usize) -> Vec<String> {
        let mut doomed = vec![self.blocks()[ix].id.clone()];
        if !self.blocks()[ix].block_type.is_container() {
            return doomed;
        }
        let mut frontier = vec![self.blocks()[ix].id.clone()];
        for _ in 0..MAX_INDENT_DEPTH {
            let mut discovered = Vec::new();
            for parent_id in &frontier {
                for child in self.children_of(parent_id) {
                    if !doomed.contains(&child.id) {
                        doomed.push(child.id.clone());
                        discovered.push(child.id.clone());
                    }
                }
            }
            if discovered.is_empty() {
                break;
            }
            frontier = discovered;
        }
        doomed
    }
}

fn retain_style_keys(properties: &Map<String, Value>) -> Map<String, Value> {
    properties
        .iter()
        .filter(|(key, _)| STYLE_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
