use std::collections::HashMap;

use crate::blocks::Block;

/// Indentation lookups stop after this many parent hops. Malformed external
/// data can contain reference cycles; hitting the cap reads as "no parent".
pub const MAX_INDENT_DEPTH: usize = 4;

/// Ordered block sequence plus an id lookup table. All queries are pure
/// reads; mutations live in [`crate::mutate`] and build a replacement store.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockStore {
    blocks: Vec<Block>,
    index: HashMap<String, usize>,
}

impl BlockStore {
    /// A store is never empty: an empty input is seeded with one default
    /// paragraph so the editor always has a block to focus.
    pub fn new(mut blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            blocks.push(Block::paragraph());
        }
        let index = build_index(&blocks);
        Self { blocks, index }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn index_of(&self, block_id: &str) -> Option<usize> {
        self.index.get(block_id).copied()
    }

    pub fn get(&self, block_id: &str) -> Option<&Block> {
        self.index_of(block_id).map(|ix| &self.blocks[ix])
    }

    /// Blocks nested under `parent_id`, in sequence order.
    pub fn children_of(&self, parent_id: &str) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|block| block.parent_block_id.as_deref() == Some(parent_id))
            .collect()
    }

    /// Blocks rendered at the root level. A parent reference only removes a
    /// block from the root list when it points at an existing container;
    /// dangling or non-container references are tolerated as "no parent".
    pub fn root_blocks(&self) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|block| !self.has_container_parent(block))
            .collect()
    }

    /// Parent-link walk, capped at [`MAX_INDENT_DEPTH`]. Returns 0 for
    /// blocks with no (effective) parent and when the cap is reached, which
    /// treats a probable cycle as flat rather than looping.
    pub fn indent_depth_of(&self, block_id: &str) -> usize {
        let mut depth = 0usize;
        let mut current = self
            .get(block_id)
            .and_then(|block| block.parent_block_id.as_deref());
        while let Some(parent_id) = current {
            if depth >= MAX_INDENT_DEPTH {
                return 0;
            }
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            if !parent.block_type.is_container() {
                break;
            }
            depth += 1;
            current = parent.parent_block_id.as_deref();
        }
        depth
    }

    fn has_container_parent(&self, block: &Block) -> bool {
        block
            .parent_block_id
            .as_deref()
            .and_then(|parent_id| self.get(parent_id))
            .is_some_and(|parent| parent.block_type.is_container())
    }
}

fn build_index(blocks: &[Block]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(blocks.len());
    for (ix, block) in blocks.iter().enumerate() {
        // First occurrence wins if external data violates id uniqueness.
        index.entry(block.id.clone()).or_insert(ix);
    }
    index
}
