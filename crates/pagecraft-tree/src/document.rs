//! The editable block tree document.
//!
//! # Edit model
//!
//! Every committed edit follows one shape:
//!
//! ```text
//! validate everything ──► copy tree ──► apply to copy ──► renumber order
//!         │                                                     │
//!     Err(TreeError)                                            ▼
//!   (nothing changed)       commit tree + selection, record pre-edit snapshot,
//!                           mark dirty
//! ```
//!
//! Validation runs against the live tree before the copy is made, so a failing
//! call never leaves a partial mutation behind. The commit swaps the new tree
//! in and moves the old one straight into history, so the only full copy per
//! edit is the working copy.
//!
//! Undo/redo swap whole snapshots and never re-run edit logic.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::history::{History, Snapshot};
use crate::locate::{self, Location};
use crate::{
    Block, BlockId, ContainerRef, DocumentId, EditorConfig, Result, Selection, TreeError, TreeOp,
    validate,
};

/// A page-builder document: the block tree plus its editing state.
///
/// Each document owns its own history; nothing is shared between documents.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "DocumentData")]
pub struct Document {
    id: DocumentId,
    blocks: Vec<Block>,
    selection: Selection,
    is_dirty: bool,
    history: History,
    config: EditorConfig,
}

impl Document {
    /// Create an empty document with default config.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Create an empty document.
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            id: DocumentId::new(),
            blocks: Vec::new(),
            selection: Selection::default(),
            is_dirty: false,
            history: History::new(config.history_limit),
            config,
        }
    }

    /// Load a tree from persistence. The result is clean with empty history.
    ///
    /// Bookkeeping fields (`parent_id`, `order`) are repaired; duplicate ids
    /// and leaves carrying children are rejected.
    pub fn from_blocks(blocks: Vec<Block>, config: EditorConfig) -> Result<Self> {
        let blocks = validate::normalize(blocks, config.renumber_order)?;
        let mut doc = Self::with_config(config);
        doc.blocks = blocks;
        tracing::debug!(doc = %doc.id, blocks = doc.block_count(), "loaded document");
        Ok(doc)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Root-level blocks, in order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_block_id(&self) -> Option<BlockId> {
        self.selection.selected_block_id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Swap in a new config. History starts over under the new limit.
    ///
    /// With `renumber_order` on, every container is renumbered so `order`
    /// is current before the next edit. This does not mark the page dirty.
    pub fn set_config(&mut self, config: EditorConfig) {
        self.history = History::new(config.history_limit);
        self.config = config;
        if self.config.renumber_order {
            renumber_tree(&mut self.blocks);
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// True once any edit (or undo/redo) happened since the last `mark_clean`.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Declare the current tree saved.
    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    /// Locate a block anywhere in the tree.
    pub fn find(&self, id: &BlockId) -> Option<Location<'_>> {
        locate::find_block(&self.blocks, id)
    }

    /// Get a block by ID.
    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.find(id).map(|loc| loc.block)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        locate::contains(&self.blocks, id)
    }

    /// Total number of blocks, all depths.
    pub fn block_count(&self) -> usize {
        locate::block_count(&self.blocks)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Children of a container (or the root list).
    pub fn children_of(&self, container: ContainerRef) -> Result<&[Block]> {
        locate::find_container(&self.blocks, container)
    }

    /// Copy of the undoable state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.blocks.clone(), &self.selection)
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Insert a factory-built block into a container.
    ///
    /// `index` is clamped to `[0, len]`; `None` appends. The block (and every
    /// descendant it brings along) gets its `parent_id` linked, and becomes the
    /// sole selection.
    pub fn add_block_to_container(
        &mut self,
        container: ContainerRef,
        block: Block,
        index: Option<usize>,
    ) -> Result<BlockId> {
        self.insert_subtree(container, block, index, "add block")
    }

    /// Move a block, subtree intact, into another container (or elsewhere in its own).
    ///
    /// `index` addresses the target's children *after* the block is detached,
    /// clamped to `[0, len]`; `None` appends. Only the moved block's
    /// `parent_id` changes. Moving a block onto its current position is a no-op.
    pub fn move_block_to_container(
        &mut self,
        block_id: BlockId,
        target: ContainerRef,
        index: Option<usize>,
    ) -> Result<()> {
        let location = self.find(&block_id).ok_or(TreeError::BlockNotFound(block_id))?;
        let source = location.container();
        let source_index = location.index;

        let target_len = locate::find_container(&self.blocks, target)?.len();
        if let ContainerRef::Block(target_id) = target
            && (target_id == block_id || locate::is_descendant(&self.blocks, &block_id, &target_id))
        {
            return Err(TreeError::CyclicMove {
                block: block_id,
                target: target_id,
            });
        }

        // Length of the target once the block has been taken out of it
        let len_after_detach = if source == target { target_len - 1 } else { target_len };
        let dest_index = clamp_index(index, len_after_detach, "move_block_to_container");
        if source == target && dest_index == source_index {
            tracing::trace!(block = %block_id, "move onto current position, nothing to do");
            return Ok(());
        }

        let mut next = self.blocks.clone();
        let from = locate::find_container_mut(&mut next, source)?;
        let mut moved = from.remove(source_index);
        self.renumber(from);

        moved.parent_id = target.as_parent();
        let to = locate::find_container_mut(&mut next, target)?;
        to.insert(dest_index, moved);
        self.renumber(to);

        let selection = self.selection.clone();
        self.commit(next, selection, "move block");
        tracing::debug!(doc = %self.id, block = %block_id, from = %source, to = %target, index = dest_index, "moved block");
        Ok(())
    }

    /// Array-move a child within one container: remove at `from`, reinsert at `to`.
    ///
    /// Both indices must lie in `[0, len-1]`. `from == to` is a no-op that
    /// records nothing and leaves the dirty flag alone.
    pub fn move_block_within_container(
        &mut self,
        container: ContainerRef,
        from: usize,
        to: usize,
    ) -> Result<()> {
        let len = locate::find_container(&self.blocks, container)?.len();
        for index in [from, to] {
            if index >= len {
                return Err(TreeError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let mut next = self.blocks.clone();
        let children = locate::find_container_mut(&mut next, container)?;
        let block = children.remove(from);
        children.insert(to, block);
        self.renumber(children);

        let selection = self.selection.clone();
        self.commit(next, selection, "reorder blocks");
        tracing::debug!(doc = %self.id, container = %container, from, to, "reordered blocks");
        Ok(())
    }

    /// Delete a direct child of `container`, with its whole subtree.
    ///
    /// Selection and hover pointing anywhere into the removed subtree are
    /// cleared. Returns the detached subtree.
    pub fn remove_block_from_container(
        &mut self,
        container: ContainerRef,
        block_id: BlockId,
    ) -> Result<Block> {
        let index = locate::find_container(&self.blocks, container)?
            .iter()
            .position(|b| b.id == block_id)
            .ok_or(TreeError::BlockNotFound(block_id))?;

        let mut next = self.blocks.clone();
        let children = locate::find_container_mut(&mut next, container)?;
        let mut removed = children.remove(index);
        self.renumber(children);

        let removed_ids: HashSet<BlockId> = removed.subtree_ids().into_iter().collect();
        let mut selection = self.selection.clone();
        if selection.prune(&removed_ids) {
            tracing::trace!(block = %block_id, "selection cleared by removal");
        }

        self.commit(next, selection, "remove block");
        tracing::debug!(doc = %self.id, block = %block_id, container = %container, blocks = removed_ids.len(), "removed subtree");

        removed.parent_id = None;
        Ok(removed)
    }

    /// Deep-copy a block with fresh ids, inserted right after the original.
    ///
    /// The copy becomes the sole selection. Returns the copy's id.
    pub fn duplicate_block(&mut self, block_id: BlockId) -> Result<BlockId> {
        let location = self.find(&block_id).ok_or(TreeError::BlockNotFound(block_id))?;
        let container = location.container();
        let index = location.index + 1;

        let mut copy = location.block.clone();
        reassign_ids(&mut copy);
        self.insert_subtree(container, copy, Some(index), "duplicate block")
    }

    // =========================================================================
    // Content edits
    // =========================================================================

    /// Replace a block's settings payload. Equal settings are a no-op.
    pub fn update_block_settings(&mut self, block_id: BlockId, settings: serde_json::Value) -> Result<()> {
        let block = self.get(&block_id).ok_or(TreeError::BlockNotFound(block_id))?;
        if block.settings == settings {
            return Ok(());
        }
        self.edit_block(block_id, "update settings", |b| b.settings = settings)
    }

    /// Show or hide a block. Setting the current value is a no-op.
    pub fn set_block_visibility(&mut self, block_id: BlockId, visible: bool) -> Result<()> {
        let block = self.get(&block_id).ok_or(TreeError::BlockNotFound(block_id))?;
        if block.visible == visible {
            return Ok(());
        }
        self.edit_block(block_id, "toggle visibility", |b| b.visible = visible)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Restore the state before the most recent edit. False if nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        let label = self.history.next_undo_label();
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                tracing::trace!(doc = %self.id, edit = ?label, "undo");
                true
            }
            None => false,
        }
    }

    /// Reapply the most recently undone edit. False if nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        let label = self.history.next_redo_label();
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                tracing::trace!(doc = %self.id, edit = ?label, "redo");
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // =========================================================================
    // Selection (UI state: no history, no dirty flag)
    // =========================================================================

    /// Make `block_id` the sole selection.
    pub fn select_block(&mut self, block_id: BlockId) -> Result<()> {
        self.require(block_id)?;
        self.selection.select_only(block_id);
        Ok(())
    }

    /// Add to or remove from the multi-selection.
    pub fn toggle_block_selection(&mut self, block_id: BlockId) -> Result<()> {
        self.require(block_id)?;
        self.selection.toggle(block_id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Set or clear pointer hover.
    pub fn set_hovered_block(&mut self, block_id: Option<BlockId>) -> Result<()> {
        if let Some(id) = block_id {
            self.require(id)?;
        }
        self.selection.hovered_block_id = block_id;
        Ok(())
    }

    // =========================================================================
    // Op dispatch
    // =========================================================================

    /// Apply a serialized edit. Returns the id of a newly created block, if any.
    ///
    /// `Undo`/`Redo` with nothing to step over succeed as no-ops.
    pub fn apply(&mut self, op: TreeOp) -> Result<Option<BlockId>> {
        tracing::trace!(op = op.display_name(), target = ?op.target_block(), "apply");
        match op {
            TreeOp::AddBlock { container, block, index } => {
                self.add_block_to_container(container, block, index).map(Some)
            }
            TreeOp::MoveBlock { block_id, target, index } => {
                self.move_block_to_container(block_id, target, index).map(|_| None)
            }
            TreeOp::Reorder { container, from, to } => {
                self.move_block_within_container(container, from, to).map(|_| None)
            }
            TreeOp::RemoveBlock { container, block_id } => {
                self.remove_block_from_container(container, block_id).map(|_| None)
            }
            TreeOp::DuplicateBlock { block_id } => self.duplicate_block(block_id).map(Some),
            TreeOp::UpdateSettings { block_id, settings } => {
                self.update_block_settings(block_id, settings).map(|_| None)
            }
            TreeOp::SetVisibility { block_id, visible } => {
                self.set_block_visibility(block_id, visible).map(|_| None)
            }
            TreeOp::Undo => {
                self.undo();
                Ok(None)
            }
            TreeOp::Redo => {
                self.redo();
                Ok(None)
            }
            TreeOp::MarkClean => {
                self.mark_clean();
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require(&self, block_id: BlockId) -> Result<()> {
        if self.contains(&block_id) {
            Ok(())
        } else {
            Err(TreeError::BlockNotFound(block_id))
        }
    }

    /// Validate and insert a subtree, selecting its root.
    fn insert_subtree(
        &mut self,
        container: ContainerRef,
        mut block: Block,
        index: Option<usize>,
        label: &'static str,
    ) -> Result<BlockId> {
        if !block.has_valid_shape() {
            return Err(TreeError::InvalidBlock {
                id: block.id,
                reason: format!("children do not match kind {} (or a descendant's kind)", block.kind),
            });
        }
        if let Some(dup) = block.first_duplicate_id() {
            return Err(TreeError::DuplicateId(dup));
        }
        let existing: HashSet<BlockId> = locate::collect_ids(&self.blocks).into_iter().collect();
        if let Some(dup) = block.subtree_ids().into_iter().find(|id| existing.contains(id)) {
            return Err(TreeError::DuplicateId(dup));
        }
        let len = locate::find_container(&self.blocks, container)?.len();
        let index = clamp_index(index, len, label);

        let id = block.id;
        block.parent_id = container.as_parent();
        self.relink(&mut block);

        let mut next = self.blocks.clone();
        let children = locate::find_container_mut(&mut next, container)?;
        children.insert(index, block);
        self.renumber(children);

        let mut selection = self.selection.clone();
        selection.select_only(id);
        self.commit(next, selection, label);
        tracing::debug!(doc = %self.id, block = %id, container = %container, index, "{label}");
        Ok(id)
    }

    /// Apply an in-place change to one block as a committed edit.
    fn edit_block(
        &mut self,
        block_id: BlockId,
        label: &'static str,
        change: impl FnOnce(&mut Block),
    ) -> Result<()> {
        let mut next = self.blocks.clone();
        let block = locate::find_block_mut(&mut next, &block_id).ok_or(TreeError::BlockNotFound(block_id))?;
        change(block);

        let selection = self.selection.clone();
        self.commit(next, selection, label);
        tracing::debug!(doc = %self.id, block = %block_id, "{label}");
        Ok(())
    }

    /// Swap in the new tree and selection together; the old tree goes to history.
    fn commit(&mut self, next: Vec<Block>, selection: Selection, label: &'static str) {
        let previous = std::mem::replace(&mut self.blocks, next);
        let before = Snapshot::new(previous, &self.selection);
        self.selection = selection;
        self.history.record(before, label);
        self.is_dirty = true;
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.blocks = snapshot.blocks;
        self.selection.selected_block_id = snapshot.selected_block_id;
        self.selection.selected_block_ids = snapshot.selected_block_ids;
        // Hover is not part of history; keep it only if it still resolves
        self.selection.retain_existing(&self.blocks);
        self.is_dirty = true;
    }

    fn renumber(&self, children: &mut [Block]) {
        if self.config.renumber_order {
            for (i, child) in children.iter_mut().enumerate() {
                child.order = i as u32;
            }
        }
    }

    /// Point every descendant's `parent_id` at its actual container.
    fn relink(&self, block: &mut Block) {
        let parent = block.id;
        if let Some(children) = block.children.as_mut() {
            self.renumber(children);
            for child in children.iter_mut() {
                child.parent_id = Some(parent);
                self.relink(child);
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp an optional insertion index to `[0, len]`, defaulting to append.
fn clamp_index(index: Option<usize>, len: usize, op: &str) -> usize {
    match index {
        Some(i) if i > len => {
            tracing::warn!("{op}: index {i} past end of container (len {len}), appending");
            len
        }
        Some(i) => i,
        None => len,
    }
}

/// Set `order` to the list index in `blocks` and every container below.
fn renumber_tree(blocks: &mut [Block]) {
    for (i, block) in blocks.iter_mut().enumerate() {
        block.order = i as u32;
        if let Some(children) = block.children.as_mut() {
            renumber_tree(children);
        }
    }
}

/// Give a subtree fresh ids, keeping `parent_id` links consistent.
fn reassign_ids(block: &mut Block) {
    block.id = BlockId::new();
    let parent = block.id;
    if let Some(children) = block.children.as_mut() {
        for child in children.iter_mut() {
            child.parent_id = Some(parent);
            reassign_ids(child);
        }
    }
}

// =========================================================================
// Serialization
// =========================================================================

/// Persisted form of a document. History and config are session state and
/// are not saved.
#[derive(Serialize, Deserialize)]
struct DocumentData {
    id: DocumentId,
    blocks: Vec<Block>,
    #[serde(default)]
    selection: Selection,
    #[serde(default)]
    is_dirty: bool,
}

/// Borrowed twin of `DocumentData` so serializing doesn't clone the tree.
#[derive(Serialize)]
struct DocumentRef<'a> {
    id: DocumentId,
    blocks: &'a [Block],
    selection: &'a Selection,
    is_dirty: bool,
}

impl Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        DocumentRef {
            id: self.id,
            blocks: &self.blocks,
            selection: &self.selection,
            is_dirty: self.is_dirty,
        }
        .serialize(serializer)
    }
}

impl TryFrom<DocumentData> for Document {
    type Error = TreeError;

    fn try_from(data: DocumentData) -> Result<Self> {
        let mut doc = Document::from_blocks(data.blocks, EditorConfig::default())?;
        doc.id = data.id;
        doc.selection = data.selection;
        doc.selection.retain_existing(&doc.blocks);
        doc.is_dirty = data.is_dirty;
        Ok(doc)
    }
}
