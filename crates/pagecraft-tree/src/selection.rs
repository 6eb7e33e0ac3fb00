//! Selection and hover state.
//!
//! Selection always references blocks that exist in the tree. The document
//! keeps it consistent as a side effect of each committed edit: new blocks
//! become selected, removed subtrees drop out of the selection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Block, BlockId, locate};

/// Which blocks are selected or hovered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Primary selection (the block whose settings panel is open).
    #[serde(default)]
    pub selected_block_id: Option<BlockId>,
    /// Full multi-selection, in selection order. Includes the primary.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_block_ids: Vec<BlockId>,
    /// Transient pointer hover. Not recorded in history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovered_block_id: Option<BlockId>,
}

impl Selection {
    /// Select exactly one block.
    pub fn select_only(&mut self, id: BlockId) {
        self.selected_block_id = Some(id);
        self.selected_block_ids = vec![id];
    }

    /// Add or remove a block from the multi-selection.
    ///
    /// Adding makes it primary; removing the primary promotes the most
    /// recently selected remaining block.
    pub fn toggle(&mut self, id: BlockId) {
        if let Some(pos) = self.selected_block_ids.iter().position(|s| *s == id) {
            self.selected_block_ids.remove(pos);
            if self.selected_block_id == Some(id) {
                self.selected_block_id = self.selected_block_ids.last().copied();
            }
        } else {
            self.selected_block_ids.push(id);
            self.selected_block_id = Some(id);
        }
    }

    /// Clear primary and multi-selection. Hover is left alone.
    pub fn clear(&mut self) {
        self.selected_block_id = None;
        self.selected_block_ids.clear();
    }

    /// Check if a block is part of the selection.
    pub fn is_selected(&self, id: &BlockId) -> bool {
        self.selected_block_id.as_ref() == Some(id) || self.selected_block_ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected_block_id.is_none() && self.selected_block_ids.is_empty()
    }

    /// Drop every reference to a removed id. Returns true if anything changed.
    pub fn prune(&mut self, removed: &HashSet<BlockId>) -> bool {
        let before = self.clone();

        if self.selected_block_id.is_some_and(|id| removed.contains(&id)) {
            self.selected_block_id = None;
        }
        self.selected_block_ids.retain(|id| !removed.contains(id));
        if self.hovered_block_id.is_some_and(|id| removed.contains(&id)) {
            self.hovered_block_id = None;
        }

        *self != before
    }

    /// Drop every reference that no longer resolves in `blocks`.
    pub fn retain_existing(&mut self, blocks: &[Block]) -> bool {
        let live: HashSet<BlockId> = locate::collect_ids(blocks).into_iter().collect();
        let dangling: HashSet<BlockId> = self
            .referenced_ids()
            .filter(|id| !live.contains(id))
            .collect();
        self.prune(&dangling)
    }

    /// Every id referenced by selection or hover.
    pub fn referenced_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.selected_block_id
            .iter()
            .chain(self.selected_block_ids.iter())
            .chain(self.hovered_block_id.iter())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn test_select_only_replaces_selection() {
        let mut sel = Selection::default();
        let a = BlockId::new();
        let b = BlockId::new();
        sel.toggle(a);
        sel.select_only(b);
        assert_eq!(sel.selected_block_id, Some(b));
        assert_eq!(sel.selected_block_ids, vec![b]);
    }

    #[test]
    fn test_toggle_adds_and_promotes() {
        let mut sel = Selection::default();
        let a = BlockId::new();
        let b = BlockId::new();

        sel.toggle(a);
        sel.toggle(b);
        assert_eq!(sel.selected_block_id, Some(b));
        assert_eq!(sel.selected_block_ids, vec![a, b]);

        sel.toggle(b);
        assert_eq!(sel.selected_block_id, Some(a));
        assert_eq!(sel.selected_block_ids, vec![a]);

        sel.toggle(a);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_clear_keeps_hover() {
        let mut sel = Selection::default();
        let a = BlockId::new();
        sel.select_only(a);
        sel.hovered_block_id = Some(a);
        sel.clear();
        assert!(sel.is_empty());
        assert_eq!(sel.hovered_block_id, Some(a));
    }

    #[test]
    fn test_prune_removes_only_listed_ids() {
        let mut sel = Selection::default();
        let keep = BlockId::new();
        let gone = BlockId::new();
        sel.toggle(keep);
        sel.toggle(gone);
        sel.hovered_block_id = Some(gone);

        let removed = HashSet::from([gone]);
        assert!(sel.prune(&removed));
        assert_eq!(sel.selected_block_id, None);
        assert_eq!(sel.selected_block_ids, vec![keep]);
        assert_eq!(sel.hovered_block_id, None);

        assert!(!sel.prune(&removed));
    }

    #[test]
    fn test_retain_existing() {
        let fx = Fixture::new();
        let mut sel = Selection::default();
        let stale = BlockId::new();
        sel.toggle(fx.img);
        sel.toggle(stale);

        assert!(sel.retain_existing(&fx.blocks));
        assert_eq!(sel.selected_block_ids, vec![fx.img]);
        assert_eq!(sel.selected_block_id, None);
        assert!(!sel.retain_existing(&fx.blocks));
    }

    #[test]
    fn test_is_selected() {
        let mut sel = Selection::default();
        let a = BlockId::new();
        assert!(!sel.is_selected(&a));
        sel.select_only(a);
        assert!(sel.is_selected(&a));
    }
}
