//! Drag-reorder gesture state. The controller only decides *where* a drop
//! would land; applying the move is the session's job. State is consumed and
//! reset within the handler that ends the gesture, so no memory survives
//! across drags.

use crate::mutate::DropPosition;

/// Fraction of a block's height, from each edge, that forces the drop
/// position regardless of midpoint math.
pub const SNAP_ZONE_RATIO: f32 = 0.3;

/// On-screen vertical bounds of a block row, supplied by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockBounds {
    pub top: f32,
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropTarget {
    pub block_id: String,
    pub position: DropPosition,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DragState {
    dragged_block_id: Option<String>,
    drop_target: Option<DropTarget>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragged_block_id(&self) -> Option<&str> {
        self.dragged_block_id.as_deref()
    }

    pub fn drop_target(&self) -> Option<&DropTarget> {
        self.drop_target.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged_block_id.is_some()
    }

    pub fn drag_start(&mut self, block_id: &str) {
        self.dragged_block_id = Some(block_id.to_string());
        self.drop_target = None;
    }

    /// Recomputes the drop target from the pointer's vertical position over
    /// `target_block_id`. Inside a snap zone the position is forced; in the
    /// middle band it follows the midpoint. No-op when no drag is in
    /// progress or the pointer is over the dragged block itself.
    pub fn drag_over(&mut self, target_block_id: &str, pointer_y: f32, bounds: BlockBounds) {
        let Some(dragged) = self.dragged_block_id.as_deref() else {
            return;
        };
        if dragged == target_block_id {
            return;
        }

        let snap = bounds.height * SNAP_ZONE_RATIO;
        let position = if pointer_y <= bounds.top + snap {
            DropPosition::Above
        } else if pointer_y >= bounds.top + bounds.height - snap {
            DropPosition::Below
        } else if pointer_y < bounds.top + bounds.height / 2.0 {
            DropPosition::Above
        } else {
            DropPosition::Below
        };

        self.drop_target = Some(DropTarget {
            block_id: target_block_id.to_string(),
            position,
        });
    }

    /// Ends the gesture. Returns the dragged id and the drop target when the
    /// drop is valid (a target exists, on a block other than the dragged
    /// one); state is cleared unconditionally either way.
    pub fn complete_drop(&mut self) -> Option<(String, DropTarget)> {
        let dragged = self.dragged_block_id.take();
        let target = self.drop_target.take();
        match (dragged, target) {
            (Some(dragged), Some(target)) if dragged != target.block_id => Some((dragged, target)),
            _ => None,
        }
    }

    /// Pointer left the editing surface: clear the highlight but keep the
    /// drag alive so re-entering the surface resumes targeting.
    pub fn drag_leave(&mut self) {
        self.drop_target = None;
    }

    pub fn drag_end(&mut self) {
        self.dragged_block_id = None;
        self.drop_target = None;
    }
}
