//! The editor's contract with its host: the session receives the block
//! sequence and a change callback, applies user gestures through the
//! mutation engine, and hands the full replacement sequence back after every
//! change. It also owns the one interaction-state value (drag, slash menu,
//! quick delete) shared by the gesture handlers.

use thiserror::Error;
use tracing::{debug, trace};

use crate::autoformat;
use crate::blocks::{Block, BlockType};
use crate::drag::{BlockBounds, DragState};
use crate::helpers::now_millis;
use crate::mutate::MoveDirection;
use crate::quick_delete::QuickDeleteDetector;
use crate::slash::{SlashMenuState, SlashSelection};
use crate::store::BlockStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("document is read-only")]
    ReadOnly,
}

pub type ChangeCallback = Box<dyn FnMut(&[Block])>;

const DEFAULT_QUICK_DELETE_KEY: &str = "Backspace";

/// All transient gesture state, grouped so there is exactly one place it
/// lives and one place it resets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionState {
    pub drag: DragState,
    pub slash_menu: SlashMenuState,
    pub quick_delete: QuickDeleteDetector,
}

impl InteractionState {
    fn new(quick_delete_key: &str) -> Self {
        Self {
            drag: DragState::new(),
            slash_menu: SlashMenuState::closed(),
            quick_delete: QuickDeleteDetector::new(quick_delete_key),
        }
    }
}

pub struct EditorSession {
    store: BlockStore,
    read_only: bool,
    interaction: InteractionState,
    on_change: ChangeCallback,
}

impl EditorSession {
    pub fn new(blocks: Vec<Block>, read_only: bool, on_change: ChangeCallback) -> Self {
        Self {
            store: BlockStore::new(blocks),
            read_only,
            interaction: InteractionState::new(DEFAULT_QUICK_DELETE_KEY),
            on_change,
        }
    }

    pub fn with_quick_delete_key(mut self, key: &str) -> Self {
        self.interaction.quick_delete = QuickDeleteDetector::new(key);
        self
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn blocks(&self) -> &[Block] {
        self.store.blocks()
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    fn guard_writable(&self) -> Result<(), EditError> {
        if self.read_only {
            Err(EditError::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Swaps in a replacement store and notifies the owner. A store equal to
    /// the current one means the gesture had no visible effect and the owner
    /// is not bothered.
    fn apply(&mut self, next: BlockStore) {
        if next == self.store {
            return;
        }
        self.store = next;
        (self.on_change)(self.store.blocks());
    }

    // --- mutation operations ------------------------------------------------

    /// Inserts a fresh paragraph after `after_index` and returns its id; the
    /// caller should move input focus to it.
    pub fn insert_after(
        &mut self,
        after_index: usize,
        parent_id: Option<&str>,
    ) -> Result<String, EditError> {
        self.guard_writable()?;
        let (next, new_id) = self.store.insert_after(after_index, parent_id);
        debug!(after_index, new_block = %new_id, "insert block");
        self.apply(next);
        Ok(new_id)
    }

    pub fn delete_block(&mut self, block_id: &str) -> Result<(), EditError> {
        self.guard_writable()?;
        debug!(block = %block_id, "delete block");
        let next = self.store.delete(block_id);
        self.apply(next);
        Ok(())
    }

    pub fn duplicate_block(&mut self, block_id: &str) -> Result<(), EditError> {
        self.guard_writable()?;
        debug!(block = %block_id, "duplicate block");
        let next = self.store.duplicate(block_id);
        self.apply(next);
        Ok(())
    }

    pub fn move_block(
        &mut self,
        block_id: &str,
        direction: MoveDirection,
    ) -> Result<(), EditError> {
        self.guard_writable()?;
        debug!(block = %block_id, ?direction, "move block");
        let next = self.store.move_block(block_id, direction);
        self.apply(next);
        Ok(())
    }

    pub fn indent_block(&mut self, block_id: &str) -> Result<(), EditError> {
        self.guard_writable()?;
        let next = self.store.indent(block_id);
        self.apply(next);
        Ok(())
    }

    pub fn outdent_block(&mut self, block_id: &str) -> Result<(), EditError> {
        self.guard_writable()?;
        let next = self.store.outdent(block_id);
        self.apply(next);
        Ok(())
    }

    pub fn convert_block(
        &mut self,
        block_id: &str,
        new_type: BlockType,
        content_override: Option<&str>,
    ) -> Result<(), EditError> {
        self.guard_writable()?;
        debug!(block = %block_id, ?new_type, "convert block type");
        let next = self.store.convert_type(block_id, new_type, content_override);
        self.apply(next);
        Ok(())
    }

    /// Applies a content edit, then runs the two text-driven detectors: a
    /// markdown token converts the block (consuming the token), otherwise
    /// the slash menu follows the new text.
    pub fn set_block_content(&mut self, block_id: &str, content: &str) -> Result<(), EditError> {
        self.guard_writable()?;

        let accepts_text = self
            .store
            .get(block_id)
            .is_some_and(|block| block.block_type.accepts_text_content());

        let next = self.store.set_content(block_id, content);
        self.apply(next);

        if accepts_text {
            if let Some(block_type) = autoformat::detect(content) {
                debug!(block = %block_id, ?block_type, "markdown autoformat");
                let next = self.store.convert_type(block_id, block_type, Some(""));
                self.apply(next);
                self.interaction.slash_menu.close();
                return Ok(());
            }
        }

        self.interaction.slash_menu.update(block_id, content);
        Ok(())
    }

    // --- drag gesture -------------------------------------------------------

    pub fn drag_start(&mut self, block_id: &str) {
        if self.read_only || self.store.index_of(block_id).is_none() {
            return;
        }
        trace!(block = %block_id, "drag start");
        self.interaction.drag.drag_start(block_id);
    }

    pub fn drag_over(&mut self, target_block_id: &str, pointer_y: f32, bounds: BlockBounds) {
        self.interaction.drag.drag_over(target_block_id, pointer_y, bounds);
    }

    /// Completes the drag. `true` when a reorder was applied. Drag state is
    /// cleared unconditionally, including for invalid drops.
    pub fn complete_drop(&mut self) -> Result<bool, EditError> {
        let Some((dragged, target)) = self.interaction.drag.complete_drop() else {
            return Ok(false);
        };
        self.guard_writable()?;
        debug!(block = %dragged, target = %target.block_id, ?target.position, "drop block");
        let next = self.store.reorder(&dragged, &target.block_id, target.position);
        let changed = next != self.store;
        self.apply(next);
        Ok(changed)
    }

    pub fn drag_leave(&mut self) {
        self.interaction.drag.drag_leave();
    }

    pub fn drag_end(&mut self) {
        self.interaction.drag.drag_end();
    }

    // --- slash menu ---------------------------------------------------------

    pub fn slash_menu(&self) -> &SlashMenuState {
        &self.interaction.slash_menu
    }

    pub fn slash_move_selection(&mut self, forward: bool) {
        self.interaction.slash_menu.move_selection(forward);
    }

    /// Enter commit: strips the `/query` token, converts the anchor block,
    /// closes the menu. Returns the converted block's id so the host can
    /// place the caret at its end.
    pub fn slash_commit(&mut self) -> Result<Option<String>, EditError> {
        self.guard_writable()?;
        let selection = self.interaction.slash_menu.commit();
        Ok(self.apply_slash_selection(selection))
    }

    /// Pointer commit of a specific menu row. An index past the filtered
    /// list (a stale click after the list shrank) leaves the block alone.
    pub fn slash_commit_entry(&mut self, index: usize) -> Result<Option<String>, EditError> {
        self.guard_writable()?;
        let selection = self.interaction.slash_menu.commit_entry(index);
        Ok(self.apply_slash_selection(selection))
    }

    fn apply_slash_selection(&mut self, selection: Option<SlashSelection>) -> Option<String> {
        let selection = selection?;
        let stripped = self.stripped_content(&selection.block_id, selection.token_start);
        debug!(block = %selection.block_id, ?selection.block_type, "slash menu commit");
        let next = self.store.convert_type(
            &selection.block_id,
            selection.block_type,
            stripped.as_deref(),
        );
        self.apply(next);
        Some(selection.block_id)
    }

    /// Escape: strips the token without converting.
    pub fn slash_cancel(&mut self) -> Result<(), EditError> {
        self.guard_writable()?;
        let Some((block_id, token_start)) = self.interaction.slash_menu.cancel() else {
            return Ok(());
        };
        if let Some(stripped) = self.stripped_content(&block_id, token_start) {
            let next = self.store.set_content(&block_id, &stripped);
            self.apply(next);
        }
        Ok(())
    }

    /// Interaction outside the menu region.
    pub fn slash_close(&mut self) {
        self.interaction.slash_menu.close();
    }

    fn stripped_content(&self, block_id: &str, token_start: usize) -> Option<String> {
        let content = &self.store.get(block_id)?.content;
        if token_start > content.len() || !content.is_char_boundary(token_start) {
            return None;
        }
        Some(content[..token_start].to_string())
    }

    // --- quick delete -------------------------------------------------------

    /// Feeds a key press to the quick-delete detector; deletes the active
    /// block when the double-tap completes. `at_boundary` is whether the
    /// block's text is empty or the caret sits at offset 0.
    pub fn key_pressed(
        &mut self,
        key: &str,
        has_modifier: bool,
        active_block_id: &str,
        at_boundary: bool,
    ) -> Result<bool, EditError> {
        self.key_pressed_at(key, has_modifier, active_block_id, at_boundary, now_millis())
    }

    pub fn key_pressed_at(
        &mut self,
        key: &str,
        has_modifier: bool,
        active_block_id: &str,
        at_boundary: bool,
        now_ms: i64,
    ) -> Result<bool, EditError> {
        if self.read_only {
            return Ok(false);
        }
        let fired = self
            .interaction
            .quick_delete
            .observe(key, has_modifier, at_boundary, now_ms);
        if fired {
            self.delete_block(active_block_id)?;
        }
        Ok(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutate::DropPosition;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session_with(blocks: Vec<Block>) -> (EditorSession, Rc<RefCell<Vec<Vec<Block>>>>) {
        let emitted: Rc<RefCell<Vec<Vec<Block>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = emitted.clone();
        let session = EditorSession::new(
            blocks,
            false,
            Box::new(move |blocks| sink.borrow_mut().push(blocks.to_vec())),
        );
        (session, emitted)
    }

    fn paragraph(id: &str) -> Block {
        Block {
            id: id.to_string(),
            block_type: BlockType::Paragraph,
            content: String::new(),
            properties: serde_json::Map::new(),
            parent_block_id: None,
        }
    }

    #[test]
    fn insert_then_convert_scenario() {
        let (mut session, emitted) = session_with(vec![paragraph("b1")]);

        let new_id = session.insert_after(0, None).expect("writable");
        assert_eq!(session.blocks().len(), 2);
        assert_eq!(session.blocks()[1].id, new_id);
        assert_eq!(session.blocks()[1].block_type, BlockType::Paragraph);
        assert_eq!(session.blocks()[1].content, "");

        session
            .convert_block(&new_id, BlockType::Heading1, None)
            .expect("writable");
        assert_eq!(session.blocks()[1].block_type, BlockType::Heading1);
        assert_eq!(emitted.borrow().len(), 2);
    }

    #[test]
    fn callback_receives_full_replacement_sequence() {
        let (mut session, emitted) = session_with(vec![paragraph("b1"), paragraph("b2")]);
        session.delete_block("b1").expect("writable");

        let emitted = emitted.borrow();
        assert_eq!(emitted.len(), 1);
        let ids: Vec<&str> = emitted[0].iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b2"]);
    }

    #[test]
    fn noop_mutations_do_not_notify() {
        let (mut session, emitted) = session_with(vec![paragraph("only")]);
        session.delete_block("only").expect("writable");
        session.move_block("only", MoveDirection::Up).expect("writable");
        session.indent_block("only").expect("writable");
        assert!(emitted.borrow().is_empty());
    }

    #[test]
    fn read_only_session_rejects_mutations() {
        let mut session = EditorSession::new(vec![paragraph("b1")], true, Box::new(|_| {}));
        assert_eq!(session.insert_after(0, None), Err(EditError::ReadOnly));
        assert_eq!(session.delete_block("b1"), Err(EditError::ReadOnly));
        assert_eq!(
            session.set_block_content("b1", "x"),
            Err(EditError::ReadOnly)
        );

        session.drag_start("b1");
        assert!(!session.interaction().drag.is_dragging());
    }

    #[test]
    fn markdown_token_converts_and_consumes() {
        let (mut session, _) = session_with(vec![paragraph("b1")]);
        session.set_block_content("b1", "# ").expect("writable");
        assert_eq!(session.blocks()[0].block_type, BlockType::Heading1);
        assert_eq!(session.blocks()[0].content, "");
    }

    #[test]
    fn unlisted_token_stays_paragraph() {
        let (mut session, _) = session_with(vec![paragraph("b1")]);
        session.set_block_content("b1", "##3 ").expect("writable");
        assert_eq!(session.blocks()[0].block_type, BlockType::Paragraph);
        assert_eq!(session.blocks()[0].content, "##3 ");
    }

    #[test]
    fn todo_token_seeds_unchecked() {
        let (mut session, _) = session_with(vec![paragraph("b1")]);
        session.set_block_content("b1", "[] ").expect("writable");
        assert_eq!(session.blocks()[0].block_type, BlockType::Todo);
        assert_eq!(
            session.blocks()[0].properties.get("checked"),
            Some(&serde_json::json!(false))
        );
    }

    #[test]
    fn code_block_content_does_not_autoformat() {
        let (mut session, _) = session_with(vec![paragraph("b1")]);
        session
            .convert_block("b1", BlockType::Code, None)
            .expect("writable");
        session.set_block_content("b1", "# ").expect("writable");
        assert_eq!(session.blocks()[0].block_type, BlockType::Code);
        assert_eq!(session.blocks()[0].content, "# ");
    }

    #[test]
    fn palette_round_trip_for_every_catalog_entry() {
        for (ix, expected) in BlockType::ALL.iter().enumerate() {
            let (mut session, _) = session_with(vec![paragraph("b1"), paragraph("b2")]);
            session.set_block_content("b1", "/").expect("writable");
            assert!(session.slash_menu().open);

            let committed = session.slash_commit_entry(ix).expect("writable");
            assert_eq!(committed.as_deref(), Some("b1"));
            assert_eq!(session.blocks()[0].block_type, *expected);
            if *expected != BlockType::Code && *expected != BlockType::Table {
                assert_eq!(session.blocks()[0].content, "");
            }
            assert!(!session.slash_menu().open);
        }
    }

    #[test]
    fn stale_pointer_commit_index_is_a_noop() {
        let (mut session, emitted) = session_with(vec![paragraph("b1")]);
        session.set_block_content("b1", "/").expect("writable");
        let before = emitted.borrow().len();

        // A click on a row that no longer exists must not convert anything.
        let committed = session.slash_commit_entry(9_999).expect("writable");
        assert_eq!(committed, None);
        assert_eq!(session.blocks()[0].block_type, BlockType::Paragraph);
        assert_eq!(session.blocks()[0].content, "/");
        assert_eq!(emitted.borrow().len(), before);
    }

    #[test]
    fn slash_commit_strips_only_the_token() {
        let (mut session, _) = session_with(vec![paragraph("b1")]);
        session.set_block_content("b1", "note ").expect("writable");
        session.set_block_content("b1", "note /").expect("writable");
        assert!(session.slash_menu().open);

        session.slash_move_selection(true);
        session.slash_commit().expect("writable");
        assert_eq!(session.blocks()[0].block_type, BlockType::Heading1);
        assert_eq!(session.blocks()[0].content, "note ");
    }

    #[test]
    fn slash_cancel_strips_without_converting() {
        let (mut session, _) = session_with(vec![paragraph("b1")]);
        session.set_block_content("b1", "/").expect("writable");
        session.slash_cancel().expect("writable");
        assert_eq!(session.blocks()[0].block_type, BlockType::Paragraph);
        assert_eq!(session.blocks()[0].content, "");
        assert!(!session.slash_menu().open);
    }

    #[test]
    fn drag_gesture_reorders_through_the_engine() {
        let (mut session, _) = session_with(vec![
            paragraph("a"),
            paragraph("b"),
            paragraph("c"),
        ]);
        let bounds = BlockBounds {
            top: 0.0,
            height: 40.0,
        };

        session.drag_start("a");
        session.drag_over("c", 38.0, bounds);
        assert_eq!(
            session.interaction().drag.drop_target().map(|t| t.position),
            Some(DropPosition::Below)
        );

        assert!(session.complete_drop().expect("writable"));
        let ids: Vec<&str> = session.blocks().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert!(!session.interaction().drag.is_dragging());
    }

    #[test]
    fn invalid_drop_clears_state_without_mutating() {
        let (mut session, emitted) = session_with(vec![paragraph("a"), paragraph("b")]);
        session.drag_start("a");
        assert!(!session.complete_drop().expect("writable"));
        assert!(!session.interaction().drag.is_dragging());
        assert!(emitted.borrow().is_empty());
    }

    #[test]
    fn quick_delete_double_tap_deletes_active_block() {
        let (mut session, _) = session_with(vec![paragraph("a"), paragraph("b")]);
        assert!(!session
            .key_pressed_at("Backspace", false, "b", true, 1_000)
            .expect("writable"));
        assert!(session
            .key_pressed_at("Backspace", false, "b", true, 1_400)
            .expect("writable"));
        let ids: Vec<&str> = session.blocks().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn quick_delete_slow_taps_do_nothing() {
        let (mut session, _) = session_with(vec![paragraph("a"), paragraph("b")]);
        session
            .key_pressed_at("Backspace", false, "b", true, 1_000)
            .expect("writable");
        assert!(!session
            .key_pressed_at("Backspace", false, "b", true, 1_600)
            .expect("writable"));
        assert_eq!(session.blocks().len(), 2);
    }
}
