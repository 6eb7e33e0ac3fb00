//! Serializable edit records.
//!
//! Every edit a caller can make on a `Document` has a `TreeOp` form. Ops are:
//! - Serializable, so queued edits and replay scripts are plain JSON
//! - Applied through `Document::apply`, which dispatches to the same
//!   validated methods the editor calls directly
//!
//! Drag-and-drop handlers resolve `(block, target, index)` and hand them over
//! verbatim as `MoveBlock` or `Reorder`.

use serde::{Deserialize, Serialize};

use crate::{Block, BlockId, ContainerRef};

/// One edit on a block tree document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TreeOp {
    /// Insert a factory-built block into a container (append if no index).
    AddBlock {
        container: ContainerRef,
        block: Block,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Move a block (with its subtree) into another container.
    MoveBlock {
        block_id: BlockId,
        target: ContainerRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Array-move a child inside one container.
    Reorder {
        container: ContainerRef,
        from: usize,
        to: usize,
    },

    /// Delete a direct child of a container, with its subtree.
    RemoveBlock {
        container: ContainerRef,
        block_id: BlockId,
    },

    /// Deep-copy a block with fresh ids, right after the original.
    DuplicateBlock { block_id: BlockId },

    /// Replace a block's opaque settings payload.
    UpdateSettings {
        block_id: BlockId,
        settings: serde_json::Value,
    },

    /// Show or hide a block.
    SetVisibility { block_id: BlockId, visible: bool },

    Undo,
    Redo,

    /// Declare the current tree saved.
    MarkClean,
}

impl TreeOp {
    /// Short human-readable name, also used as the history label.
    pub fn display_name(&self) -> &'static str {
        match self {
            TreeOp::AddBlock { .. } => "add block",
            TreeOp::MoveBlock { .. } => "move block",
            TreeOp::Reorder { .. } => "reorder blocks",
            TreeOp::RemoveBlock { .. } => "remove block",
            TreeOp::DuplicateBlock { .. } => "duplicate block",
            TreeOp::UpdateSettings { .. } => "update settings",
            TreeOp::SetVisibility { .. } => "toggle visibility",
            TreeOp::Undo => "undo",
            TreeOp::Redo => "redo",
            TreeOp::MarkClean => "mark clean",
        }
    }

    /// The block this op is about, when there is one.
    pub fn target_block(&self) -> Option<BlockId> {
        match self {
            TreeOp::AddBlock { block, .. } => Some(block.id),
            TreeOp::MoveBlock { block_id, .. }
            | TreeOp::RemoveBlock { block_id, .. }
            | TreeOp::DuplicateBlock { block_id }
            | TreeOp::UpdateSettings { block_id, .. }
            | TreeOp::SetVisibility { block_id, .. } => Some(*block_id),
            TreeOp::Reorder { .. } | TreeOp::Undo | TreeOp::Redo | TreeOp::MarkClean => None,
        }
    }

    /// Check if this op changes tree shape (which blocks exist, and where).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TreeOp::AddBlock { .. }
                | TreeOp::MoveBlock { .. }
                | TreeOp::Reorder { .. }
                | TreeOp::RemoveBlock { .. }
                | TreeOp::DuplicateBlock { .. }
        )
    }
}
