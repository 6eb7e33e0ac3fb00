//! Structural invariant checks.
//!
//! Acyclicity holds by construction (an owned nested tree cannot contain
//! itself), so the checks here cover the rest: unique ids, `parent_id`
//! agreeing with the actual container, children shape matching the kind,
//! `order` agreeing with position, and selection resolving.
//!
//! `check` reports; `normalize` is the load-time gate that repairs the
//! bookkeeping fields and rejects what cannot be repaired.

use std::collections::HashSet;

use thiserror::Error;

use crate::{Block, BlockId, Result, Selection, TreeError};

/// One broken invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("id {0:?} appears more than once")]
    DuplicateId(BlockId),

    #[error("block {id:?} has parent_id {found:?} but sits in {expected:?}")]
    ParentMismatch {
        id: BlockId,
        expected: Option<BlockId>,
        found: Option<BlockId>,
    },

    #[error("leaf block {0:?} carries a children list")]
    LeafWithChildren(BlockId),

    #[error("container block {0:?} has no children list")]
    ContainerWithoutChildren(BlockId),

    #[error("block {id:?} has order {found} at index {expected}")]
    OrderMismatch { id: BlockId, expected: u32, found: u32 },

    #[error("selection references missing block {0:?}")]
    DanglingSelection(BlockId),
}

/// What `check` looks at beyond the always-on structural invariants.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions<'a> {
    /// Require `order == index` everywhere.
    pub check_order: bool,
    /// Require every selected/hovered id to resolve.
    pub selection: Option<&'a Selection>,
}

/// Collect every invariant violation in the tree.
pub fn check(blocks: &[Block], options: CheckOptions<'_>) -> Vec<Violation> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    walk(blocks, None, options.check_order, &mut seen, &mut out);

    if let Some(selection) = options.selection {
        let mut reported = HashSet::new();
        for id in selection.referenced_ids() {
            if !seen.contains(&id) && reported.insert(id) {
                out.push(Violation::DanglingSelection(id));
            }
        }
    }
    out
}

fn walk(
    blocks: &[Block],
    parent: Option<BlockId>,
    check_order: bool,
    seen: &mut HashSet<BlockId>,
    out: &mut Vec<Violation>,
) {
    for (index, block) in blocks.iter().enumerate() {
        if !seen.insert(block.id) {
            out.push(Violation::DuplicateId(block.id));
        }
        if block.parent_id != parent {
            out.push(Violation::ParentMismatch {
                id: block.id,
                expected: parent,
                found: block.parent_id,
            });
        }
        if check_order && block.order as usize != index {
            out.push(Violation::OrderMismatch {
                id: block.id,
                expected: index as u32,
                found: block.order,
            });
        }
        match (block.is_container(), &block.children) {
            (false, Some(_)) => out.push(Violation::LeafWithChildren(block.id)),
            (true, None) => out.push(Violation::ContainerWithoutChildren(block.id)),
            _ => {}
        }
        walk(block.children(), Some(block.id), check_order, seen, out);
    }
}

/// Admit an externally loaded tree.
///
/// Rejects duplicate ids and leaf blocks that carry children. Repairs the
/// bookkeeping: missing children lists on containers become empty,
/// `parent_id` is relinked, and `order` is renumbered when `renumber_order`.
pub fn normalize(mut blocks: Vec<Block>, renumber_order: bool) -> Result<Vec<Block>> {
    let mut seen = HashSet::new();
    for id in crate::locate::collect_ids(&blocks) {
        if !seen.insert(id) {
            return Err(TreeError::Malformed(format!("duplicate block id {id}")));
        }
    }
    repair(&mut blocks, None, renumber_order)?;
    Ok(blocks)
}

fn repair(blocks: &mut [Block], parent: Option<BlockId>, renumber_order: bool) -> Result<()> {
    for (index, block) in blocks.iter_mut().enumerate() {
        if block.parent_id != parent {
            tracing::warn!(
                "relinking block {} parent {:?} -> {:?}",
                block.id,
                block.parent_id,
                parent
            );
            block.parent_id = parent;
        }
        if renumber_order {
            block.order = index as u32;
        }
        match (block.is_container(), block.children.is_some()) {
            (false, true) => {
                return Err(TreeError::Malformed(format!(
                    "leaf block {} ({}) carries children",
                    block.id, block.kind
                )));
            }
            (true, false) => block.children = Some(Vec::new()),
            _ => {}
        }
        let id = block.id;
        if let Some(children) = block.children.as_mut() {
            repair(children, Some(id), renumber_order)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockKind;
    use crate::testing::{Fixture, leaf};

    fn strict() -> CheckOptions<'static> {
        CheckOptions {
            check_order: true,
            selection: None,
        }
    }

    #[test]
    fn test_fixture_is_valid() {
        let fx = Fixture::new();
        assert!(check(&fx.blocks, strict()).is_empty());
    }

    #[test]
    fn test_detects_parent_mismatch() {
        let mut fx = Fixture::new();
        crate::locate::find_block_mut(&mut fx.blocks, &fx.img).unwrap().parent_id = Some(fx.c2);
        assert_eq!(
            check(&fx.blocks, CheckOptions::default()),
            vec![Violation::ParentMismatch {
                id: fx.img,
                expected: Some(fx.c1),
                found: Some(fx.c2),
            }]
        );
    }

    #[test]
    fn test_detects_duplicates_and_shape() {
        let image = leaf(BlockKind::Image);
        let mut bad_leaf = leaf(BlockKind::Button);
        bad_leaf.children = Some(Vec::new());
        let mut bare = Block::builder(BlockKind::Group).build();
        bare.children = None;
        let mut blocks = vec![image.clone(), image.clone(), bad_leaf.clone(), bare.clone()];
        for (i, b) in blocks.iter_mut().enumerate() {
            b.order = i as u32;
        }

        let violations = check(&blocks, strict());
        assert!(violations.contains(&Violation::DuplicateId(image.id)));
        assert!(violations.contains(&Violation::LeafWithChildren(bad_leaf.id)));
        assert!(violations.contains(&Violation::ContainerWithoutChildren(bare.id)));
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_detects_stale_order_only_when_asked() {
        let mut fx = Fixture::new();
        fx.blocks[1].order = 9;
        assert!(check(&fx.blocks, CheckOptions::default()).is_empty());
        assert_eq!(
            check(&fx.blocks, strict()),
            vec![Violation::OrderMismatch {
                id: fx.s2,
                expected: 1,
                found: 9
            }]
        );
    }

    #[test]
    fn test_detects_dangling_selection() {
        let fx = Fixture::new();
        let ghost = BlockId::new();
        let mut selection = Selection::default();
        selection.select_only(ghost);
        selection.hovered_block_id = Some(fx.t1);

        let violations = check(
            &fx.blocks,
            CheckOptions {
                check_order: true,
                selection: Some(&selection),
            },
        );
        assert_eq!(violations, vec![Violation::DanglingSelection(ghost)]);
    }

    #[test]
    fn test_normalize_repairs_bookkeeping() {
        let mut fx = Fixture::new();
        crate::locate::find_block_mut(&mut fx.blocks, &fx.c2).unwrap().parent_id = None;
        fx.blocks[0].order = 4;
        crate::locate::find_block_mut(&mut fx.blocks, &fx.c2).unwrap().children = None;

        let repaired = normalize(fx.blocks, true).unwrap();
        assert!(check(&repaired, strict()).is_empty());
        let c2 = crate::locate::find_block(&repaired, &fx.c2).unwrap().block;
        assert_eq!(c2.parent_id, Some(fx.cols));
        assert_eq!(c2.children, Some(Vec::new()));
    }

    #[test]
    fn test_normalize_rejects_duplicates() {
        let image = leaf(BlockKind::Image);
        let section = Block::builder(BlockKind::Section).child(image.clone()).build();
        let err = normalize(vec![section, image], true).unwrap_err();
        assert!(matches!(err, TreeError::Malformed(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_normalize_rejects_leaf_with_children() {
        let mut heading = leaf(BlockKind::Heading);
        heading.children = Some(vec![leaf(BlockKind::Image)]);
        let err = normalize(vec![heading], true).unwrap_err();
        assert!(matches!(err, TreeError::Malformed(_)));
    }
}
