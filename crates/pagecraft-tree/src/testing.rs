//! Shared fixtures for unit tests.

use crate::{Block, BlockId, BlockKind};

/// A small page:
///
/// ```text
/// s1 Section
/// ├─ t1 RichText
/// └─ cols Columns
///    ├─ c1 Column
///    │  └─ img Image
///    └─ c2 Column
/// s2 Section
/// ```
pub(crate) struct Fixture {
    pub s1: BlockId,
    pub t1: BlockId,
    pub cols: BlockId,
    pub c1: BlockId,
    pub img: BlockId,
    pub c2: BlockId,
    pub s2: BlockId,
    pub blocks: Vec<Block>,
}

impl Fixture {
    pub fn new() -> Self {
        let t1 = Block::builder(BlockKind::RichText).build();
        let img = Block::builder(BlockKind::Image).build();
        let c1 = Block::builder(BlockKind::Column).child(img.clone()).build();
        let c2 = Block::builder(BlockKind::Column).build();
        let cols = Block::builder(BlockKind::Columns)
            .children([c1.clone(), c2.clone()])
            .build();
        let s1 = Block::builder(BlockKind::Section)
            .children([t1.clone(), cols.clone()])
            .build();
        let mut s2 = Block::builder(BlockKind::Section).build();
        s2.order = 1;

        Self {
            s1: s1.id,
            t1: t1.id,
            cols: cols.id,
            c1: c1.id,
            img: img.id,
            c2: c2.id,
            s2: s2.id,
            blocks: vec![s1, s2],
        }
    }
}

/// A fresh leaf block.
pub(crate) fn leaf(kind: BlockKind) -> Block {
    Block::builder(kind).build()
}

/// Ids of a container's direct children, in order.
pub(crate) fn child_ids(blocks: &[Block], container: crate::ContainerRef) -> Vec<BlockId> {
    crate::locate::find_container(blocks, container)
        .map(|kids| kids.iter().map(|b| b.id).collect())
        .unwrap_or_default()
}
