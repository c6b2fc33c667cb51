//! Core model for a block-based document editor.
//!
//! A document is an ordered sequence of typed [`Block`]s. Nesting is
//! expressed through `parent_block_id` back-references into the same
//! sequence rather than a real tree; render order is the sequence order.
//! Mutations are pure: every operation takes a [`BlockStore`] and returns a
//! replacement, which [`EditorSession`] hands to the owning application
//! through its change callback.

pub mod autoformat;
pub mod blocks;
pub mod drag;
pub(crate) mod helpers;
pub mod mutate;
pub mod quick_delete;
pub mod session;
pub mod slash;
pub mod store;

pub use blocks::{Block, BlockProps, BlockType};
pub use drag::{BlockBounds, DragState, DropTarget};
pub use mutate::{DropPosition, MoveDirection};
pub use quick_delete::{QuickDeleteDetector, DOUBLE_TAP_WINDOW_MS};
pub use session::{EditError, EditorSession, InteractionState};
pub use slash::{SlashEntry, SlashMenuState, SlashSelection};
pub use store::{BlockStore, MAX_INDENT_DEPTH};
