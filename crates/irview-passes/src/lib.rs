//! Graph transformation passes.
//!
//! Decoded graphs mirror the compiler's in-memory representation and are
//! far from what a human wants to read. The passes here rewrite a
//! [`Graph`] in place toward the readable form: canonicalizing call
//! arguments, eliding frame and loop plumbing, desugaring field accesses,
//! hiding literal-construction subtrees, and finally applying generic
//! label and kind defaults.
//!
//! # Modules
//!
//! - [`error`]: pass failure type
//! - [`rank`]: deferred same-depth layout registration
//! - [`truffle`]: passes keyed to guest-language graph shapes
//! - [`fallback`]: generic defaults applied to every graph
//!
//! Passes never delete. Removal is expressed with the `hidden` property so
//! later passes and spotlighting still see the full structure, and every
//! rewrite is guarded so running the pipeline twice changes nothing.

pub mod error;
pub mod fallback;
pub mod rank;
pub mod truffle;

pub use error::PassError;
pub use fallback::FallbackPass;
pub use rank::{OrderStrategy, RankRegistry};
pub use truffle::{
    ArgumentsPass, FieldAccessPass, FrameElisionPass, LiteralSubtreePass, LoopElisionPass,
};

use irview_core::{CoreError, EdgeId, Graph, NodeId};
use tracing::debug;

/// One in-place graph rewrite.
///
/// Passes run in pipeline order and register rank constraints with the
/// shared [`RankRegistry`] instead of adding them directly, since a later
/// pass may still hide or re-parent the nodes involved.
pub trait Pass {
    /// Stable pass name used in logs and shape errors.
    fn name(&self) -> &'static str;

    /// Cheap pre-check; `apply` is skipped when this returns false.
    fn applies(&self, graph: &Graph) -> bool;

    fn apply(&self, graph: &mut Graph, ranks: &mut RankRegistry) -> Result<(), PassError>;
}

/// An ordered pass list sharing one rank registry per run.
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Pipeline {
    pub fn new(passes: Vec<Box<dyn Pass>>) -> Self {
        Pipeline { passes }
    }

    /// The standard order: specific structural passes first, the generic
    /// fallback last so it never pre-empts a specific label or kind.
    pub fn standard() -> Self {
        Pipeline::new(vec![
            Box::new(ArgumentsPass),
            Box::new(FrameElisionPass),
            Box::new(LoopElisionPass),
            Box::new(FieldAccessPass),
            Box::new(LiteralSubtreePass),
            Box::new(FallbackPass),
        ])
    }

    /// Runs every applicable pass, then evaluates deferred ranks against
    /// the final graph shape.
    pub fn apply(&self, graph: &mut Graph) -> Result<(), PassError> {
        let mut ranks = RankRegistry::new();
        for pass in &self.passes {
            if pass.applies(graph) {
                debug!(pass = pass.name(), graph = %graph.name, "applying pass");
                pass.apply(graph, &mut ranks)?;
            }
        }
        let emitted = ranks.finish(graph)?;
        debug!(ranks = emitted, graph = %graph.name, "pipeline complete");
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::standard()
    }
}

/// Hides a node together with every incident edge.
pub(crate) fn hide_with_edges(graph: &mut Graph, id: NodeId) -> Result<(), CoreError> {
    let incident: Vec<EdgeId> = {
        let node = graph.node(id)?;
        node.inputs
            .iter()
            .chain(node.outputs.iter())
            .copied()
            .collect()
    };
    graph.node_mut(id)?.set_hidden(true);
    for eid in incident {
        graph.edge_mut(eid)?.set_hidden(true);
    }
    Ok(())
}
