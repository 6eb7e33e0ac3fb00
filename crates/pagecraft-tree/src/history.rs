//! Linear undo/redo history over whole-tree snapshots.
//!
//! Each committed edit records the state *before* it. Undo and redo only ever
//! swap full snapshots; they never re-run mutation logic. A new edit after an
//! undo discards the redo chain (linear history, not a branching one).
//!
//! `past` is a bounded ring: once it holds `limit` entries the oldest is
//! dropped. A limit of 0 disables history entirely.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{Block, BlockId, Selection};

/// Default number of undo steps kept per document.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Full copy of the undoable document state.
///
/// Hover is deliberately absent: it is pointer state, not document state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub selected_block_id: Option<BlockId>,
    #[serde(default)]
    pub selected_block_ids: Vec<BlockId>,
}

impl Snapshot {
    /// Capture the tree and the selection part of `selection`.
    pub fn new(blocks: Vec<Block>, selection: &Selection) -> Self {
        Self {
            blocks,
            selected_block_id: selection.selected_block_id,
            selected_block_ids: selection.selected_block_ids.clone(),
        }
    }
}

/// A snapshot plus the name of the edit that moved away from it.
#[derive(Clone, Debug)]
struct HistoryEntry {
    snapshot: Snapshot,
    label: &'static str,
}

/// Past/future snapshot stacks.
#[derive(Clone, Debug)]
pub struct History {
    past: VecDeque<HistoryEntry>,
    future: Vec<HistoryEntry>,
    limit: usize,
}

impl History {
    /// Create a history keeping at most `limit` undo steps.
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            future: Vec::new(),
            limit,
        }
    }

    /// Maximum number of undo steps.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record the pre-edit state of a committed edit and drop the redo chain.
    pub fn record(&mut self, before: Snapshot, label: &'static str) {
        self.future.clear();
        if self.limit == 0 {
            return;
        }

        self.past.push_back(HistoryEntry {
            snapshot: before,
            label,
        });

        while self.past.len() > self.limit {
            self.past.pop_front();
            tracing::trace!(limit = self.limit, "history full, dropped oldest undo step");
        }
    }

    /// Step back. `current` goes onto the redo stack; returns the state to restore.
    ///
    /// None (and `current` discarded) when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let entry = self.past.pop_back()?;
        self.future.push(HistoryEntry {
            snapshot: current,
            label: entry.label,
        });
        Some(entry.snapshot)
    }

    /// Step forward. `current` goes back onto the undo stack; returns the state to restore.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let entry = self.future.pop()?;
        self.past.push_back(HistoryEntry {
            snapshot: current,
            label: entry.label,
        });
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        Some(entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Name of the edit the next undo reverts (for UI).
    pub fn next_undo_label(&self) -> Option<&'static str> {
        self.past.back().map(|e| e.label)
    }

    /// Name of the edit the next redo reapplies (for UI).
    pub fn next_redo_label(&self) -> Option<&'static str> {
        self.future.last().map(|e| e.label)
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Forget everything (e.g. after loading a different document).
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
