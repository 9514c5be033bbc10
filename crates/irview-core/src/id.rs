//! Stable ID newtypes for graph entities.
//!
//! All IDs are distinct newtype wrappers, providing type safety so that a
//! `NodeId` cannot be accidentally used where an `EdgeId` is expected.
//! Node ids are graph-scoped and come from the dump file (synthetic nodes
//! continue the sequence upward); edge ids index the owning graph's edge
//! arena; graph indices are dense, zero-based positions within a file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Graph-scoped node identifier. File-defined nodes carry the id from their
/// NODE_DEFINE record; synthetic nodes are allocated above the maximum seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub i64);

/// Index into the owning graph's edge arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

/// Dense, zero-based position of a graph within a dump file. Distinct from
/// the non-unique graph id embedded in the format itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphIndex(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GraphIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for NodeId {
    fn from(raw: i32) -> Self {
        NodeId(raw as i64)
    }
}
