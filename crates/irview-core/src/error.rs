//! Core error types for the graph data model.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! mutation paths of the graph model. Decode- and pass-level failures have
//! their own taxonomies in `irview-bgv` and `irview-passes`.

use thiserror::Error;

use crate::id::{EdgeId, NodeId};

/// Errors produced by the core graph model.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An edge endpoint or lookup referenced a node not in the graph.
    #[error("node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// A node id was defined twice; ids are never reused within a graph.
    #[error("duplicate node id: {id}")]
    DuplicateNodeId { id: NodeId },

    /// An edge lookup referenced an edge not in the graph.
    #[error("edge not found: {id}")]
    EdgeNotFound { id: EdgeId },
}
