//! Typed identifiers for blocks and documents.
//!
//! Both ID types wrap UUIDv7 (time-ordered, globally unique). They display as
//! standard UUID text for logging. The `short()` form (first 8 hex chars) is
//! for human-facing output only, never as a lookup key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A block identifier (UUIDv7).
///
/// Unique across the whole tree of one document: roots and all descendants.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(uuid::Uuid);

/// A document identifier (UUIDv7).
///
/// One per editor session; carried in log fields so interleaved sessions
/// can be told apart.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(uuid::Uuid);

// ── Shared behavior ─────────────────────────────────────────────────────────

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Create a new time-ordered ID (UUIDv7).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// First 8 hex characters, for human display only.
            pub fn short(&self) -> String {
                self.0.as_simple().to_string()[..8].to_string()
            }

            /// Parse from a hex string (32 chars, no hyphens) or standard UUID format.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }

        impl Default for $T {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::str::FromStr for $T {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Full UUID with hyphens for log readability
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $name, self.short())
            }
        }
    };
}

impl_typed_id!(BlockId, "BlockId");
impl_typed_id!(DocumentId, "DocumentId");

// ── Container addressing ────────────────────────────────────────────────────

/// Where a block lives: the virtual root list or a container block's children.
///
/// `Root` stands in for the top-level `blocks` array, which has no id of its
/// own. Serialized as the string `"root"` or the container's block id.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug, Default)]
pub enum ContainerRef {
    #[default]
    Root,
    Block(BlockId),
}

impl ContainerRef {
    /// The container for a block whose `parent_id` is `parent`.
    pub fn from_parent(parent: Option<BlockId>) -> Self {
        match parent {
            Some(id) => ContainerRef::Block(id),
            None => ContainerRef::Root,
        }
    }

    /// The `parent_id` a direct child of this container carries.
    pub fn as_parent(&self) -> Option<BlockId> {
        match self {
            ContainerRef::Root => None,
            ContainerRef::Block(id) => Some(*id),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, ContainerRef::Root)
    }
}

impl From<BlockId> for ContainerRef {
    fn from(id: BlockId) -> Self {
        ContainerRef::Block(id)
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRef::Root => write!(f, "root"),
            ContainerRef::Block(id) => write!(f, "{id}"),
        }
    }
}

impl std::str::FromStr for ContainerRef {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("root") {
            Ok(ContainerRef::Root)
        } else {
            BlockId::parse(s).map(ContainerRef::Block)
        }
    }
}

impl Serialize for ContainerRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContainerRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================
