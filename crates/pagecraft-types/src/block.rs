//! Block kinds and the recursive `Block` node.
//!
//! ## Design: containers vs leaves
//!
//! `BlockKind` is a closed set. Each kind is either a *container* (owns an
//! ordered `children` list, possibly empty) or a *leaf* (never has one). The
//! shape is fixed by the kind, so `Block::new` and `BlockBuilder` always produce
//! a type-correct block. Anything that arrives through serde is checked by the
//! tree crate before it is admitted into a document.
//!
//! Visual props live in `settings`, an opaque JSON payload owned by the
//! component registry. Tree operations never look inside it.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::BlockId;

/// Variant used when the factory does not pick one.
pub const DEFAULT_VARIANT: &str = "default";

/// What a block *is*.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum BlockKind {
    /// Full-width page band. Container.
    Section,
    /// Horizontal row holding `Column`s. Container.
    Columns,
    /// One column of a `Columns` row. Container.
    Column,
    /// Generic wrapper for grouping. Container.
    Group,
    /// Formatted text; `variant` selects simple or rich editing.
    #[strum(serialize = "rich_text", serialize = "richtext", serialize = "text")]
    RichText,
    Heading,
    Image,
    Button,
    Divider,
    Spacer,
    Video,
    #[strum(serialize = "product_grid", serialize = "productgrid")]
    ProductGrid,
    Form,
}

impl BlockKind {
    /// Every kind, containers first.
    pub const ALL: [BlockKind; 13] = [
        BlockKind::Section,
        BlockKind::Columns,
        BlockKind::Column,
        BlockKind::Group,
        BlockKind::RichText,
        BlockKind::Heading,
        BlockKind::Image,
        BlockKind::Button,
        BlockKind::Divider,
        BlockKind::Spacer,
        BlockKind::Video,
        BlockKind::ProductGrid,
        BlockKind::Form,
    ];

    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Section => "section",
            BlockKind::Columns => "columns",
            BlockKind::Column => "column",
            BlockKind::Group => "group",
            BlockKind::RichText => "rich_text",
            BlockKind::Heading => "heading",
            BlockKind::Image => "image",
            BlockKind::Button => "button",
            BlockKind::Divider => "divider",
            BlockKind::Spacer => "spacer",
            BlockKind::Video => "video",
            BlockKind::ProductGrid => "product_grid",
            BlockKind::Form => "form",
        }
    }

    /// Check if blocks of this kind may own children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockKind::Section | BlockKind::Columns | BlockKind::Column | BlockKind::Group
        )
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in the document tree.
///
/// `parent_id` and `order` are bookkeeping owned by the tree: the document
/// rewrites both whenever the block changes place. Authoritative order is the
/// position inside the parent's `children` (or the root list).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default = "default_variant")]
    pub variant: String,
    /// Container holding this block (None = root level).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<BlockId>,
    /// Position hint, kept equal to the index in the parent.
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Opaque, kind-specific configuration (content, styling, media).
    #[serde(default = "empty_settings")]
    pub settings: serde_json::Value,
    /// Present iff `kind.is_container()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Block>>,
}

fn default_variant() -> String {
    DEFAULT_VARIANT.to_string()
}

fn default_visible() -> bool {
    true
}

fn empty_settings() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Block {
    /// Create a detached, type-correct block with default props.
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            variant: default_variant(),
            parent_id: None,
            order: 0,
            visible: true,
            settings: empty_settings(),
            children: kind.is_container().then(Vec::new),
        }
    }

    /// Start a builder with a fresh id.
    pub fn builder(kind: BlockKind) -> BlockBuilder {
        BlockBuilder::new(BlockId::new(), kind)
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Direct children; empty for leaves.
    pub fn children(&self) -> &[Block] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Number of blocks in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(Block::subtree_len).sum::<usize>()
    }

    /// Ids of this block and all its descendants, pre-order.
    pub fn subtree_ids(&self) -> Vec<BlockId> {
        let mut ids = Vec::with_capacity(self.subtree_len());
        let mut stack = vec![self];
        while let Some(block) = stack.pop() {
            ids.push(block.id);
            // Push children in reverse to maintain order
            for child in block.children().iter().rev() {
                stack.push(child);
            }
        }
        ids
    }

    /// Check if `id` names this block or any descendant.
    pub fn contains_id(&self, id: &BlockId) -> bool {
        self.id == *id || self.children().iter().any(|c| c.contains_id(id))
    }

    /// First id that appears twice in this subtree, if any.
    pub fn first_duplicate_id(&self) -> Option<BlockId> {
        let mut seen = HashSet::new();
        self.subtree_ids().into_iter().find(|id| !seen.insert(*id))
    }

    /// Check that this block and every descendant has the children shape
    /// its kind requires.
    pub fn has_valid_shape(&self) -> bool {
        self.is_container() == self.children.is_some()
            && self.children().iter().all(Block::has_valid_shape)
    }
}

/// Builder for [`Block`]. Block factories hand values through this.
#[derive(Debug)]
pub struct BlockBuilder {
    block: Block,
}

impl BlockBuilder {
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            block: Block::new(id, kind),
        }
    }

    pub fn variant(mut self, variant: impl Into<String>) -> Self {
        self.block.variant = variant.into();
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.block.visible = visible;
        self
    }

    pub fn settings(mut self, settings: serde_json::Value) -> Self {
        self.block.settings = settings;
        self
    }

    /// Append a child. Ignored with a warning on leaf kinds.
    pub fn child(mut self, child: Block) -> Self {
        match self.block.children.as_mut() {
            Some(children) => children.push(child),
            None => tracing::warn!(
                "dropping child {} of leaf block {} ({})",
                child.id,
                self.block.id,
                self.block.kind
            ),
        }
        self
    }

    pub fn children(self, children: impl IntoIterator<Item = Block>) -> Self {
        children.into_iter().fold(self, |b, c| b.child(c))
    }

    /// Finish the block. Children get their `parent_id` and `order` linked.
    pub fn build(mut self) -> Block {
        let parent = self.block.id;
        if let Some(children) = self.block.children.as_mut() {
            for (i, child) in children.iter_mut().enumerate() {
                child.parent_id = Some(parent);
                child.order = i as u32;
            }
        }
        self.block
    }
}

// ============================================================================
// Tests
// ============================================================================
