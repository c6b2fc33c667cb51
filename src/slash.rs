//! Slash-menu state machine. A trailing `/` typed at the start of a block or
//! after whitespace opens a keyboard-navigable catalog of block types; the
//! text typed after the slash fuzzy-filters it. Committing converts the
//! anchor block through the mutation engine's type conversion.

use crate::blocks::BlockType;
use crate::helpers::{cycle_index, fuzzy_score};

/// One selectable row in the menu: a block type plus its registry label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlashEntry {
    pub block_type: BlockType,
}

impl SlashEntry {
    pub fn label(&self) -> &'static str {
        self.block_type.label()
    }
}

/// The committed choice, with everything the caller needs to strip the
/// `/query` token from the anchor block's text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashSelection {
    pub block_id: String,
    pub block_type: BlockType,
    pub token_start: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashMenuState {
    pub open: bool,
    pub anchor_block_id: Option<String>,
    pub slash_index: Option<usize>,
    pub query: String,
    pub selected_index: usize,
}

/// The trailing `/token` of a block's text, if it can drive the menu.
#[derive(Clone, Debug, PartialEq, Eq)]
struct SlashToken {
    slash_index: usize,
    query: String,
}

fn find_slash_token(text: &str) -> Option<SlashToken> {
    let slash_index = text.rfind('/')?;
    if slash_index > 0 {
        let prev = text[..slash_index].chars().next_back()?;
        // A slash mid-word (say, inside a URL) must not open the menu.
        if !prev.is_whitespace() {
            return None;
        }
    }
    let query = &text[slash_index + 1..];
    if query.chars().any(char::is_whitespace) {
        return None;
    }
    Some(SlashToken {
        slash_index,
        query: query.to_string(),
    })
}

impl SlashMenuState {
    pub fn closed() -> Self {
        Self {
            open: false,
            anchor_block_id: None,
            slash_index: None,
            query: String::new(),
            selected_index: 0,
        }
    }

    /// Re-evaluates the menu after a content change in `block_id`. Opens
    /// only at the moment the `/` itself is typed (empty query); while open,
    /// follows the query text and closes as soon as the token disappears.
    pub fn update(&mut self, block_id: &str, text: &str) {
        let Some(token) = find_slash_token(text) else {
            self.close();
            return;
        };

        let same_anchor = self.open
            && self.anchor_block_id.as_deref() == Some(block_id)
            && self.slash_index == Some(token.slash_index);
        if same_anchor {
            if self.query != token.query {
                self.query = token.query;
                self.selected_index = 0;
            }
            return;
        }

        if token.query.is_empty() {
            *self = Self {
                open: true,
                anchor_block_id: Some(block_id.to_string()),
                slash_index: Some(token.slash_index),
                query: String::new(),
                selected_index: 0,
            };
        } else {
            self.close();
        }
    }

    /// Catalog entries matching the current query, best score first with
    /// catalog order as the tiebreak. An empty query yields the full
    /// catalog.
    pub fn filtered_entries(&self) -> Vec<SlashEntry> {
        let query = self.query.trim();
        if query.is_empty() {
            return BlockType::ALL
                .iter()
                .map(|block_type| SlashEntry {
                    block_type: *block_type,
                })
                .collect();
        }

        let mut scored: Vec<(i64, usize, SlashEntry)> = Vec::new();
        for (ix, block_type) in BlockType::ALL.iter().enumerate() {
            let entry = SlashEntry {
                block_type: *block_type,
            };
            if let Some(score) = fuzzy_score(query, entry.label()) {
                scored.push((score, ix, entry));
            }
        }
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.into_iter().map(|(_, _, entry)| entry).collect()
    }

    /// Down/Up navigation, wrapping at both ends.
    pub fn move_selection(&mut self, forward: bool) {
        if !self.open {
            return;
        }
        let len = self.filtered_entries().len();
        self.selected_index = cycle_index(self.selected_index.min(len.saturating_sub(1)), len, forward);
    }

    pub fn highlighted(&self) -> Option<SlashEntry> {
        if !self.open {
            return None;
        }
        let entries = self.filtered_entries();
        entries
            .get(self.selected_index.min(entries.len().saturating_sub(1)))
            .copied()
    }

    /// Enter or pointer selection: yields the highlighted entry and closes.
    /// `None` (nothing highlighted, or menu closed) leaves the block alone.
    pub fn commit(&mut self) -> Option<SlashSelection> {
        let entry = self.highlighted()?;
        let block_id = self.anchor_block_id.clone()?;
        let token_start = self.slash_index?;
        let selection = SlashSelection {
            block_id,
            block_type: entry.block_type,
            token_start,
        };
        self.close();
        Some(selection)
    }

    /// Pointer selection of a specific row.
    pub fn commit_entry(&mut self, index: usize) -> Option<SlashSelection> {
        if !self.open || index >= self.filtered_entries().len() {
            return None;
        }
        self.selected_index = index;
        self.commit()
    }

    /// Escape: the `/token` is stripped by the caller but no conversion
    /// happens. Returns the anchor and token start for the strip.
    pub fn cancel(&mut self) -> Option<(String, usize)> {
        if !self.open {
            return None;
        }
        let anchor = self.anchor_block_id.clone()?;
        let token_start = self.slash_index?;
        self.close();
        Some((anchor, token_start))
    }

    /// Any interaction outside the menu region.
    pub fn close(&mut self) {
        *self = Self::closed();
    }
}

impl Default for SlashMenuState {
    fn default() -> Self {
        Self::closed()
    }
}
