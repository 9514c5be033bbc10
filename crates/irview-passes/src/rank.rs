//! Deferred same-depth layout constraints.
//!
//! Passes that re-parent children (argument canonicalization, frame
//! elision) want those children rendered at the same depth, in a specific
//! left-to-right order. They cannot add the rank immediately: a later pass
//! may hide or re-parent the very nodes involved. So passes register an
//! anchor node and an [`OrderStrategy`] here, and [`RankRegistry::finish`]
//! evaluates every registration against the final graph after the whole
//! pipeline has run. Hidden edges are skipped, duplicates keep their first
//! position, and groups that end up with fewer than two members are
//! dropped.

use std::collections::HashSet;

use irview_core::{names, CoreError, Graph, NodeId, Rank};
use tracing::debug;

/// How an anchor's children are ordered within their rank group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStrategy {
    /// Children in the anchor's output-edge declaration order.
    ByOutputOrder,
    /// Children of slots with these exact names, in list order.
    ByNamedSlots(Vec<String>),
    /// Children of indexed slots `prefix[i]`, ordered by index.
    ByIndexedSlots(String),
    /// Receiver first, then indexed arguments, then everything else in
    /// output order. Matches the shape left by argument canonicalization.
    ByArgumentConvention,
}

/// Rank registrations accumulated across a pipeline run.
#[derive(Debug, Default)]
pub struct RankRegistry {
    entries: Vec<(NodeId, OrderStrategy)>,
}

impl RankRegistry {
    pub fn new() -> Self {
        RankRegistry::default()
    }

    /// Registers a rank group anchored at `anchor`, to be evaluated after
    /// the pipeline completes.
    pub fn register(&mut self, anchor: NodeId, strategy: OrderStrategy) {
        self.entries.push((anchor, strategy));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluates every registration against the final graph and appends
    /// the surviving groups. Returns how many groups were emitted.
    pub fn finish(self, graph: &mut Graph) -> Result<usize, CoreError> {
        let mut emitted = 0;
        for (anchor, strategy) in &self.entries {
            let members = evaluate(graph, *anchor, strategy)?;
            if members.len() < 2 {
                debug!(anchor = %anchor, "rank group collapsed below two members, dropped");
                continue;
            }
            graph.add_rank(Rank(members));
            emitted += 1;
        }
        Ok(emitted)
    }
}

/// Collects the anchor's visible children in strategy order.
fn evaluate(
    graph: &Graph,
    anchor: NodeId,
    strategy: &OrderStrategy,
) -> Result<Vec<NodeId>, CoreError> {
    let outputs: Vec<_> = graph
        .outputs(anchor)?
        .into_iter()
        .filter(|(_, edge)| !edge.is_hidden())
        .collect();

    let ordered: Vec<NodeId> = match strategy {
        OrderStrategy::ByOutputOrder => outputs.iter().map(|(_, edge)| edge.to).collect(),
        OrderStrategy::ByNamedSlots(slot_names) => slot_names
            .iter()
            .flat_map(|slot| {
                outputs
                    .iter()
                    .filter(move |(_, edge)| edge.name() == Some(slot))
                    .map(|(_, edge)| edge.to)
            })
            .collect(),
        OrderStrategy::ByIndexedSlots(prefix) => {
            let mut slots: Vec<(usize, NodeId)> = outputs
                .iter()
                .filter_map(|(_, edge)| {
                    Some((names::indexed_slot(edge.name()?, prefix)?, edge.to))
                })
                .collect();
            slots.sort_by_key(|(index, _)| *index);
            slots.into_iter().map(|(_, to)| to).collect()
        }
        OrderStrategy::ByArgumentConvention => {
            let mut receivers = Vec::new();
            let mut indexed: Vec<(i64, NodeId)> = Vec::new();
            let mut rest = Vec::new();
            for (_, edge) in &outputs {
                if edge.label() == Some("receiver") {
                    receivers.push(edge.to);
                } else if let Some(index) = edge.argument_index() {
                    indexed.push((index, edge.to));
                } else {
                    rest.push(edge.to);
                }
            }
            indexed.sort_by_key(|(index, _)| *index);
            receivers
                .into_iter()
                .chain(indexed.into_iter().map(|(_, to)| to))
                .chain(rest)
                .collect()
        }
    };

    // First occurrence wins; hidden children never join a rank.
    let mut seen = HashSet::new();
    let mut members = Vec::with_capacity(ordered.len());
    for id in ordered {
        if graph.node(id)?.is_hidden() || !seen.insert(id) {
            continue;
        }
        members.push(id);
    }
    Ok(members)
}
