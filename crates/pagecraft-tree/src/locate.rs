//! Read-only traversal over the block tree.
//!
//! Every lookup walks the owned nested `Vec<Block>` structure. An owned tree
//! cannot contain a cycle, so traversal always terminates and is bounded by
//! the real tree depth.
//!
//! Misses come back as `None` (or a `TreeError` for container lookups); the
//! mutation engine turns them into precondition failures.

use crate::{Block, BlockId, ContainerRef, Result, TreeError};

/// Where a block sits: the block, its container, and its index there.
#[derive(Debug, Clone, Copy)]
pub struct Location<'a> {
    pub block: &'a Block,
    /// Containing block (None = root list).
    pub parent: Option<&'a Block>,
    /// Index within the parent's children (or the root list).
    pub index: usize,
}

impl Location<'_> {
    /// The container holding the located block.
    pub fn container(&self) -> ContainerRef {
        ContainerRef::from_parent(self.parent.map(|p| p.id))
    }
}

/// Find a block anywhere in the tree.
///
/// Searches the root list first, then recurses into every container's children.
pub fn find_block<'a>(blocks: &'a [Block], id: &BlockId) -> Option<Location<'a>> {
    if let Some(index) = blocks.iter().position(|b| b.id == *id) {
        return Some(Location {
            block: &blocks[index],
            parent: None,
            index,
        });
    }
    blocks.iter().find_map(|b| find_in_container(b, id))
}

fn find_in_container<'a>(parent: &'a Block, id: &BlockId) -> Option<Location<'a>> {
    let children = parent.children();
    if let Some(index) = children.iter().position(|c| c.id == *id) {
        return Some(Location {
            block: &children[index],
            parent: Some(parent),
            index,
        });
    }
    children.iter().find_map(|c| find_in_container(c, id))
}

/// Find a block anywhere in the tree, mutably.
pub fn find_block_mut<'a>(blocks: &'a mut [Block], id: &BlockId) -> Option<&'a mut Block> {
    for block in blocks.iter_mut() {
        if block.id == *id {
            return Some(block);
        }
        if let Some(children) = block.children.as_mut()
            && let Some(found) = find_block_mut(children, id)
        {
            return Some(found);
        }
    }
    None
}

/// Resolve a container's children list.
///
/// `Root` resolves to the root list itself.
pub fn find_container<'a>(blocks: &'a [Block], target: ContainerRef) -> Result<&'a [Block]> {
    match target {
        ContainerRef::Root => Ok(blocks),
        ContainerRef::Block(id) => {
            let location = find_block(blocks, &id).ok_or(TreeError::ContainerNotFound(id))?;
            location
                .block
                .children
                .as_deref()
                .ok_or(TreeError::NotAContainer(id))
        }
    }
}

/// Resolve a container's children list for in-place replacement.
pub fn find_container_mut(blocks: &mut Vec<Block>, target: ContainerRef) -> Result<&mut Vec<Block>> {
    match target {
        ContainerRef::Root => Ok(blocks),
        ContainerRef::Block(id) => {
            let block = find_block_mut(blocks, &id).ok_or(TreeError::ContainerNotFound(id))?;
            block.children.as_mut().ok_or(TreeError::NotAContainer(id))
        }
    }
}

/// Check if `candidate` is a strict descendant of `ancestor`.
///
/// False when `ancestor` is missing or when both ids are equal.
pub fn is_descendant(blocks: &[Block], ancestor: &BlockId, candidate: &BlockId) -> bool {
    find_block(blocks, ancestor)
        .map(|loc| loc.block.children().iter().any(|c| c.contains_id(candidate)))
        .unwrap_or(false)
}

/// Check if a block exists anywhere in the tree.
pub fn contains(blocks: &[Block], id: &BlockId) -> bool {
    blocks.iter().any(|b| b.contains_id(id))
}

/// Ids of a block's ancestors, immediate parent first.
///
/// Empty for root blocks and for ids not in the tree.
pub fn ancestors(blocks: &[Block], id: &BlockId) -> Vec<BlockId> {
    fn walk(blocks: &[Block], id: &BlockId, chain: &mut Vec<BlockId>) -> bool {
        for block in blocks {
            if block.id == *id {
                return true;
            }
            chain.push(block.id);
            if walk(block.children(), id, chain) {
                return true;
            }
            chain.pop();
        }
        false
    }

    let mut chain = Vec::new();
    if walk(blocks, id, &mut chain) {
        chain.reverse();
        chain
    } else {
        Vec::new()
    }
}

/// Depth of a block (0 for roots), or None if absent.
pub fn depth(blocks: &[Block], id: &BlockId) -> Option<usize> {
    contains(blocks, id).then(|| ancestors(blocks, id).len())
}

/// Every id in the tree, pre-order.
pub fn collect_ids(blocks: &[Block]) -> Vec<BlockId> {
    blocks.iter().flat_map(Block::subtree_ids).collect()
}

/// Total number of blocks in the tree.
pub fn block_count(blocks: &[Block]) -> usize {
    blocks.iter().map(Block::subtree_len).sum()
}

/// Iterate blocks in depth-first pre-order.
///
/// Returns (depth, block) pairs where depth is 0 for roots.
pub fn iter_dfs(blocks: &[Block]) -> impl Iterator<Item = (usize, &Block)> {
    DfsIterator::new(blocks)
}

/// Depth-first iterator over the tree.
struct DfsIterator<'a> {
    stack: Vec<(usize, &'a Block)>,
}

impl<'a> DfsIterator<'a> {
    fn new(blocks: &'a [Block]) -> Self {
        // Push roots in reverse order to process first root first
        let stack = blocks.iter().rev().map(|b| (0, b)).collect();
        Self { stack }
    }
}

impl<'a> Iterator for DfsIterator<'a> {
    type Item = (usize, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, block) = self.stack.pop()?;
        for child in block.children().iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn test_find_root_block() {
        let fx = Fixture::new();
        let loc = find_block(&fx.blocks, &fx.s2).unwrap();
        assert_eq!(loc.block.id, fx.s2);
        assert!(loc.parent.is_none());
        assert_eq!(loc.index, 1);
        assert_eq!(loc.container(), ContainerRef::Root);
    }

    #[test]
    fn test_find_nested_block() {
        let fx = Fixture::new();
        let loc = find_block(&fx.blocks, &fx.img).unwrap();
        assert_eq!(loc.block.id, fx.img);
        assert_eq!(loc.parent.map(|p| p.id), Some(fx.c1));
        assert_eq!(loc.index, 0);
        assert_eq!(loc.container(), ContainerRef::Block(fx.c1));

        let loc = find_block(&fx.blocks, &fx.c2).unwrap();
        assert_eq!(loc.parent.map(|p| p.id), Some(fx.cols));
        assert_eq!(loc.index, 1);
    }

    #[test]
    fn test_find_missing_block() {
        let fx = Fixture::new();
        assert!(find_block(&fx.blocks, &BlockId::new()).is_none());
        assert!(find_block(&[], &fx.s1).is_none());
    }

    #[test]
    fn test_find_block_mut_edits_in_place() {
        let mut fx = Fixture::new();
        find_block_mut(&mut fx.blocks, &fx.img).unwrap().visible = false;
        assert!(!find_block(&fx.blocks, &fx.img).unwrap().block.visible);
        assert!(find_block_mut(&mut fx.blocks, &BlockId::new()).is_none());
    }

    #[test]
    fn test_find_container_root_and_block() {
        let fx = Fixture::new();
        assert_eq!(find_container(&fx.blocks, ContainerRef::Root).unwrap().len(), 2);

        let kids = find_container(&fx.blocks, ContainerRef::Block(fx.cols)).unwrap();
        let ids: Vec<_> = kids.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![fx.c1, fx.c2]);
    }

    #[test]
    fn test_find_container_errors() {
        let fx = Fixture::new();
        let missing = BlockId::new();
        assert_eq!(
            find_container(&fx.blocks, ContainerRef::Block(missing)).unwrap_err(),
            TreeError::ContainerNotFound(missing)
        );
        assert_eq!(
            find_container(&fx.blocks, ContainerRef::Block(fx.t1)).unwrap_err(),
            TreeError::NotAContainer(fx.t1)
        );
    }

    #[test]
    fn test_find_container_mut_replaces_children() {
        let mut fx = Fixture::new();
        let kids = find_container_mut(&mut fx.blocks, ContainerRef::Block(fx.cols)).unwrap();
        kids.reverse();
        let ids: Vec<_> = find_container(&fx.blocks, ContainerRef::Block(fx.cols))
            .unwrap()
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![fx.c2, fx.c1]);

        assert_eq!(
            find_container_mut(&mut fx.blocks, ContainerRef::Block(fx.img)).unwrap_err(),
            TreeError::NotAContainer(fx.img)
        );
    }

    #[test]
    fn test_is_descendant() {
        let fx = Fixture::new();
        assert!(is_descendant(&fx.blocks, &fx.s1, &fx.img));
        assert!(is_descendant(&fx.blocks, &fx.cols, &fx.c2));
        assert!(!is_descendant(&fx.blocks, &fx.s1, &fx.s1));
        assert!(!is_descendant(&fx.blocks, &fx.img, &fx.s1));
        assert!(!is_descendant(&fx.blocks, &fx.s2, &fx.img));
        assert!(!is_descendant(&fx.blocks, &BlockId::new(), &fx.img));
    }

    #[test]
    fn test_ancestors_and_depth() {
        let fx = Fixture::new();
        assert_eq!(ancestors(&fx.blocks, &fx.img), vec![fx.c1, fx.cols, fx.s1]);
        assert!(ancestors(&fx.blocks, &fx.s1).is_empty());
        assert!(ancestors(&fx.blocks, &BlockId::new()).is_empty());

        assert_eq!(depth(&fx.blocks, &fx.s1), Some(0));
        assert_eq!(depth(&fx.blocks, &fx.img), Some(3));
        assert_eq!(depth(&fx.blocks, &BlockId::new()), None);
    }

    #[test]
    fn test_collect_ids_and_count() {
        let fx = Fixture::new();
        let ids = collect_ids(&fx.blocks);
        assert_eq!(ids, vec![fx.s1, fx.t1, fx.cols, fx.c1, fx.img, fx.c2, fx.s2]);
        assert_eq!(block_count(&fx.blocks), 7);
        assert!(contains(&fx.blocks, &fx.c2));
        assert!(!contains(&fx.blocks, &BlockId::new()));
    }

    #[test]
    fn test_dfs_iteration() {
        let fx = Fixture::new();
        let dfs: Vec<_> = iter_dfs(&fx.blocks).map(|(d, b)| (d, b.id)).collect();
        assert_eq!(
            dfs,
            vec![
                (0, fx.s1),
                (1, fx.t1),
                (1, fx.cols),
                (2, fx.c1),
                (3, fx.img),
                (2, fx.c2),
                (0, fx.s2),
            ]
        );
    }
}
