//! Block tree editor for the Pagecraft page builder.
//!
//! A [`Document`] owns a tree of [`Block`]s and applies structural edits to it
//! with strict precondition checks. All structural mutation goes through four
//! operations:
//!
//! - [`Document::add_block_to_container`]
//! - [`Document::move_block_to_container`]
//! - [`Document::move_block_within_container`]
//! - [`Document::remove_block_from_container`]
//!
//! plus a few content edits (duplicate, settings, visibility). Each committed
//! edit is one undo step.
//!
//! # Invariants
//!
//! After every successful call:
//!
//! - Block ids are unique across the tree
//! - Every block's `parent_id` names the container it actually sits in
//! - Leaves never carry a children list, containers always do
//! - Selection only references blocks that exist
//!
//! A failed call returns a [`TreeError`] and leaves the document untouched.
//! Cycles cannot be represented: blocks own their children.
//!
//! # Example
//!
//! ```
//! use pagecraft_tree::{Block, BlockKind, ContainerRef, Document};
//!
//! let mut doc = Document::new();
//! let section = doc
//!     .add_block_to_container(ContainerRef::Root, Block::builder(BlockKind::Section).build(), None)
//!     .unwrap();
//! doc.add_block_to_container(section.into(), Block::builder(BlockKind::Heading).build(), None)
//!     .unwrap();
//!
//! assert_eq!(doc.block_count(), 2);
//! assert!(doc.undo());
//! assert_eq!(doc.block_count(), 1);
//! ```

mod config;
mod document;
mod error;
pub mod history;
pub mod locate;
mod ops;
pub mod outline;
mod selection;
pub mod validate;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, EditorConfig};
pub use document::Document;
pub use error::TreeError;
pub use history::{DEFAULT_HISTORY_LIMIT, History, Snapshot};
pub use ops::TreeOp;
pub use outline::format_outline;
pub use selection::Selection;
pub use validate::{CheckOptions, Violation};

pub use pagecraft_types::{Block, BlockBuilder, BlockId, BlockKind, ContainerRef, DEFAULT_VARIANT, DocumentId};

/// Result type for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
