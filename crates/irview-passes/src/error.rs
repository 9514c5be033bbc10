//! Pass failure type.

use irview_core::{CoreError, NodeId};
use thiserror::Error;

/// Errors surfaced by graph passes.
#[derive(Debug, Error)]
pub enum PassError {
    /// A pass matched a node pattern whose surroundings violate the
    /// pattern's structural assumptions. The graph is left in whatever
    /// partially rewritten state the pass reached.
    #[error("pass {pass}: unexpected graph shape at node {node}: {reason}")]
    UnexpectedGraphShape {
        pass: &'static str,
        node: NodeId,
        reason: String,
    },

    /// A node or edge lookup failed; indicates a pass bug, since passes
    /// only follow ids obtained from the graph itself.
    #[error(transparent)]
    Core(#[from] CoreError),
}
