//! Shared identity and block types for Pagecraft.
//!
//! This crate is the data foundation of the page builder: typed IDs, the
//! closed set of block kinds, and the recursive `Block` node. It has **no
//! internal pagecraft dependencies**: a pure leaf crate that the tree editor
//! and any block factory build on.
//!
//! # Document shape
//!
//! ```text
//! ROOT (virtual container, ContainerRef::Root)
//!     └── Section (container)
//!         └── Columns (container)
//!             ├── Column (container)
//!             │   └── RichText (leaf)
//!             └── Column (container)
//!                 └── Image (leaf)
//! ```
//!
//! # Key Types
//!
//! |------------------|----------------------------------------------|
//! | Type             | Purpose                                      |
//! |------------------|----------------------------------------------|
//! | [`BlockId`]      | Unique block address within a document       |
//! | [`DocumentId`]   | Which editor session / document              |
//! | [`ContainerRef`] | ROOT sentinel or a container block id        |
//! | [`BlockKind`]    | What a block is, and whether it has children |
//! | [`Block`]        | Serializable tree node                       |
//! | [`BlockBuilder`] | Type-correct block construction              |
//! |------------------|----------------------------------------------|

pub mod block;
pub mod ids;

// Re-export primary types at crate root for convenience.
pub use block::{Block, BlockBuilder, BlockKind, DEFAULT_VARIANT};
pub use ids::{BlockId, ContainerRef, DocumentId};
