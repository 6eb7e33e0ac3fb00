//! Error types for tree operations.

use thiserror::Error;

use crate::BlockId;

/// Errors that can occur during tree operations.
///
/// Every variant is a precondition violation detected before anything is
/// committed: a failed call leaves the document exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Block not found in the tree (or not a direct child where one is required).
    #[error("block not found: {0:?}")]
    BlockNotFound(BlockId),

    /// Target container id does not resolve to any block.
    #[error("container not found: {0:?}")]
    ContainerNotFound(BlockId),

    /// Target resolves to a leaf block, which cannot own children.
    #[error("block {0:?} is not a container")]
    NotAContainer(BlockId),

    /// Block id already present in the tree.
    ///
    /// Indicates a block factory defect: freshly built blocks always carry new ids.
    #[error("block already exists: {0:?}")]
    DuplicateId(BlockId),

    /// Move would place a block inside itself or one of its descendants.
    #[error("cannot move block {block:?} into {target:?}: target is inside the moved subtree")]
    CyclicMove { block: BlockId, target: BlockId },

    /// Index outside `[0, len-1]` of the container's children.
    #[error("index {index} out of range for container with {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    /// Incoming block has a children shape its kind does not allow.
    #[error("invalid block {id:?}: {reason}")]
    InvalidBlock { id: BlockId, reason: String },

    /// Loaded tree violates a structural invariant.
    #[error("malformed tree: {0}")]
    Malformed(String),
}
