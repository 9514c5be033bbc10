//! Passes keyed to guest-language (Truffle) graph shapes.
//!
//! AST dumps from Truffle languages bury the interesting structure under
//! interpreter plumbing: frame creation wired through `slots[i]`, loop
//! bodies wrapped in repeating nodes, field accesses split across an
//! accessor and a call, and literal values expanded into construction
//! subtrees. Each pass here matches one of those shapes and rewrites it
//! into something readable, hiding the plumbing rather than deleting it.
//!
//! All rewrites are guarded so a second pipeline run is a no-op: hidden and
//! synthetic nodes are skipped, and already-canonicalized call edges are
//! left alone.

use std::collections::HashSet;

use irview_core::{names, props, Graph, NodeId, NodeKind, PropValue, Props};

use crate::error::PassError;
use crate::rank::{OrderStrategy, RankRegistry};
use crate::{hide_with_edges, Pass};

/// Class-name prefix identifying Truffle framework and guest-language nodes.
pub const TRUFFLE_NAMESPACE: &str = "com.oracle.truffle";

fn is_truffle_graph(graph: &Graph) -> bool {
    graph.nodes().any(|node| {
        node.node_class()
            .is_some_and(|class| class.starts_with(TRUFFLE_NAMESPACE))
    })
}

fn shape_error(pass: &'static str, node: NodeId, reason: String) -> PassError {
    PassError::UnexpectedGraphShape { pass, node, reason }
}

// ---------------------------------------------------------------------------
// Argument canonicalization
// ---------------------------------------------------------------------------

/// Labels call-node children by calling convention: `receiver_` becomes
/// `receiver`, `arguments[N]` becomes `argN` with a positional index, and a
/// rank is registered so the arguments render left-to-right in call order.
pub struct ArgumentsPass;

impl Pass for ArgumentsPass {
    fn name(&self) -> &'static str {
        "truffle-arguments"
    }

    fn applies(&self, graph: &Graph) -> bool {
        is_truffle_graph(graph)
    }

    fn apply(&self, graph: &mut Graph, ranks: &mut RankRegistry) -> Result<(), PassError> {
        for id in graph.node_ids() {
            let node = graph.node(id)?;
            if node.is_hidden() {
                continue;
            }
            let Some(class) = node.node_class() else {
                continue;
            };
            let stripped = names::stripped_name(class);
            let call_like =
                stripped.contains("Call") || stripped.contains("Invoke") || stripped == "Apply";
            if !call_like {
                continue;
            }

            let outputs: Vec<(irview_core::EdgeId, Option<String>, bool)> = graph
                .outputs(id)?
                .into_iter()
                .map(|(eid, edge)| {
                    let done = edge.argument_index().is_some() || edge.label() == Some("receiver");
                    (eid, edge.name().map(str::to_string), done)
                })
                .collect();
            // Already canonicalized on a previous run.
            if outputs.iter().any(|(_, _, done)| *done) {
                continue;
            }

            let mut rewrote = false;
            for (eid, name, _) in &outputs {
                let Some(name) = name else {
                    continue;
                };
                if name == "receiver_" || name == "receiver" {
                    graph.edge_mut(*eid)?.set(props::LABEL, "receiver");
                    rewrote = true;
                } else if let Some(index) = names::indexed_slot(name, "arguments") {
                    let edge = graph.edge_mut(*eid)?;
                    edge.set(props::LABEL, format!("arg{index}"));
                    edge.set(props::ARGUMENT_INDEX, index as i64);
                    rewrote = true;
                }
            }
            if rewrote {
                ranks.register(id, OrderStrategy::ByArgumentConvention);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Frame elision
// ---------------------------------------------------------------------------

/// Elides `NewFrame` wrappers: the wrapper's `slots[i]` children are
/// re-parented onto the node that fed the frame, the wrapper and its
/// descriptor feeder are hidden, and the container's slots are registered
/// as a rank group ordered by slot index.
pub struct FrameElisionPass;

impl Pass for FrameElisionPass {
    fn name(&self) -> &'static str {
        "truffle-frames"
    }

    fn applies(&self, graph: &Graph) -> bool {
        is_truffle_graph(graph)
    }

    fn apply(&self, graph: &mut Graph, ranks: &mut RankRegistry) -> Result<(), PassError> {
        for id in graph.node_ids() {
            let node = graph.node(id)?;
            if node.is_hidden() {
                continue;
            }
            let Some(class) = node.node_class() else {
                continue;
            };
            if names::stripped_name(class) != "NewFrame" {
                continue;
            }

            let inputs = graph.inputs(id)?;
            let feeders: Vec<NodeId> = inputs
                .iter()
                .filter(|(_, edge)| edge.name() == Some("frame"))
                .map(|(_, edge)| edge.from)
                .collect();
            if feeders.len() > 1 {
                return Err(shape_error(
                    self.name(),
                    id,
                    format!("expected at most one frame feeder, found {}", feeders.len()),
                ));
            }
            let Some(&container) = feeders.first() else {
                continue;
            };
            let descriptors: Vec<NodeId> = inputs
                .iter()
                .filter(|(_, edge)| edge.name() == Some("descriptor"))
                .map(|(_, edge)| edge.from)
                .collect();
            if descriptors.len() > 1 {
                return Err(shape_error(
                    self.name(),
                    id,
                    format!(
                        "expected at most one descriptor feeder, found {}",
                        descriptors.len()
                    ),
                ));
            }
            let slot_children: Vec<(NodeId, Props)> = graph
                .outputs(id)?
                .into_iter()
                .filter(|(_, edge)| {
                    edge.name()
                        .and_then(|name| names::indexed_slot(name, "slots"))
                        .is_some()
                })
                .map(|(_, edge)| (edge.to, edge.props.clone()))
                .collect();

            for (child, mut edge_props) in slot_children {
                edge_props.insert(props::SYNTHETIC.to_string(), PropValue::Bool(true));
                graph.create_edge(container, child, edge_props)?;
            }
            hide_with_edges(graph, id)?;
            for descriptor in descriptors {
                hide_with_edges(graph, descriptor)?;
            }
            ranks.register(container, OrderStrategy::ByIndexedSlots("slots".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loop elision
// ---------------------------------------------------------------------------

/// Elides repeating-node wrappers: `loop --loopBody--> repeating
/// --bodyNode--> body` becomes a direct `body` edge from the loop to the
/// body, with the wrapper hidden.
pub struct LoopElisionPass;

impl Pass for LoopElisionPass {
    fn name(&self) -> &'static str {
        "truffle-loops"
    }

    fn applies(&self, graph: &Graph) -> bool {
        is_truffle_graph(graph)
    }

    fn apply(&self, graph: &mut Graph, _ranks: &mut RankRegistry) -> Result<(), PassError> {
        for id in graph.node_ids() {
            if graph.node(id)?.is_hidden() {
                continue;
            }
            let wrappers: Vec<NodeId> = graph
                .outputs(id)?
                .into_iter()
                .filter(|(_, edge)| edge.name() == Some("loopBody"))
                .map(|(_, edge)| edge.to)
                .collect();
            for wrapper in wrappers {
                if graph.node(wrapper)?.is_hidden() {
                    continue;
                }
                let bodies: Vec<(NodeId, Props)> = graph
                    .outputs(wrapper)?
                    .into_iter()
                    .filter(|(_, edge)| edge.name() == Some("bodyNode"))
                    .map(|(_, edge)| (edge.to, edge.props.clone()))
                    .collect();
                if bodies.len() != 1 {
                    return Err(shape_error(
                        self.name(),
                        wrapper,
                        format!("expected exactly one bodyNode child, found {}", bodies.len()),
                    ));
                }
                let (body, body_props) = &bodies[0];
                let mut edge_props = body_props.clone();
                edge_props.insert(props::NAME.to_string(), PropValue::from("body"));
                edge_props.insert(props::SYNTHETIC.to_string(), PropValue::Bool(true));
                graph.create_edge(id, *body, edge_props)?;
                hide_with_edges(graph, wrapper)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Field-access desugaring
// ---------------------------------------------------------------------------

/// Collapses field accessor shapes into a single labeled node.
///
/// A `*ReadField`/`*WriteField` accessor with no `applyNode` child becomes
/// a `FieldRead name`/`FieldWrite name` node. An accessor with exactly one
/// `applyNode` child (the dispatched call) becomes a `CallFieldRead name`/
/// `CallFieldWrite name` node spliced between the accessor's inputs and
/// the call's outputs. Accessors without a string `field` property do not
/// match; two or more `applyNode` children are a shape error.
pub struct FieldAccessPass;

impl Pass for FieldAccessPass {
    fn name(&self) -> &'static str {
        "truffle-fields"
    }

    fn applies(&self, graph: &Graph) -> bool {
        is_truffle_graph(graph)
    }

    fn apply(&self, graph: &mut Graph, _ranks: &mut RankRegistry) -> Result<(), PassError> {
        for id in graph.node_ids() {
            let node = graph.node(id)?;
            if node.is_hidden() || node.is_synthetic() {
                continue;
            }
            let Some(class) = node.node_class() else {
                continue;
            };
            let stripped = names::stripped_name(class);
            let is_write = stripped.ends_with("WriteField");
            if !is_write && !stripped.ends_with("ReadField") {
                continue;
            }
            let Some(field) = node.get(props::FIELD).and_then(PropValue::as_str) else {
                continue;
            };
            let field = field.to_string();
            let class = class.to_string();

            let calls: Vec<NodeId> = graph
                .outputs(id)?
                .into_iter()
                .filter(|(_, edge)| edge.name() == Some("applyNode"))
                .map(|(_, edge)| edge.to)
                .collect();
            let (label, sink, call) = match calls[..] {
                [] => {
                    let label = if is_write {
                        format!("FieldWrite {field}")
                    } else {
                        format!("FieldRead {field}")
                    };
                    (label, id, None)
                }
                [call] => {
                    let label = if is_write {
                        format!("CallFieldWrite {field}")
                    } else {
                        format!("CallFieldRead {field}")
                    };
                    (label, call, Some(call))
                }
                _ => {
                    return Err(shape_error(
                        self.name(),
                        id,
                        format!("expected at most one applyNode child, found {}", calls.len()),
                    ));
                }
            };

            let incoming: Vec<(NodeId, Props)> = graph
                .inputs(id)?
                .into_iter()
                .filter(|(_, edge)| !edge.is_hidden())
                .map(|(_, edge)| (edge.from, edge.props.clone()))
                .collect();
            let outgoing: Vec<(NodeId, Props)> = graph
                .outputs(sink)?
                .into_iter()
                .filter(|(_, edge)| !edge.is_hidden() && edge.name() != Some("applyNode"))
                .map(|(_, edge)| (edge.to, edge.props.clone()))
                .collect();

            let kind = if call.is_some() {
                NodeKind::Call
            } else {
                NodeKind::Memory
            };
            let mut node_props = Props::new();
            node_props.insert(props::NODE_CLASS.to_string(), PropValue::from(class));
            node_props.insert(props::LABEL.to_string(), PropValue::from(label));
            node_props.insert(props::KIND.to_string(), PropValue::from(kind.as_str()));
            node_props.insert(props::FIELD.to_string(), PropValue::from(field));
            let replacement = graph.create_synthetic_node(node_props);

            for (from, mut edge_props) in incoming {
                edge_props.insert(props::SYNTHETIC.to_string(), PropValue::Bool(true));
                graph.create_edge(from, replacement, edge_props)?;
            }
            for (to, mut edge_props) in outgoing {
                edge_props.insert(props::SYNTHETIC.to_string(), PropValue::Bool(true));
                graph.create_edge(replacement, to, edge_props)?;
            }
            hide_with_edges(graph, id)?;
            if let Some(call) = call {
                hide_with_edges(graph, call)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Literal subtree hiding
// ---------------------------------------------------------------------------

/// Hides literal-construction subtrees: the literal node and everything
/// reachable through its output edges. Traversal is visited-set guarded,
/// so cyclic subtrees terminate.
pub struct LiteralSubtreePass;

impl Pass for LiteralSubtreePass {
    fn name(&self) -> &'static str {
        "truffle-literals"
    }

    fn applies(&self, graph: &Graph) -> bool {
        is_truffle_graph(graph)
    }

    fn apply(&self, graph: &mut Graph, _ranks: &mut RankRegistry) -> Result<(), PassError> {
        let roots: Vec<NodeId> = graph
            .nodes()
            .filter(|node| !node.is_hidden())
            .filter(|node| {
                node.node_class().is_some_and(|class| {
                    names::is_nested(class) && names::stripped_name(class).ends_with("Literal")
                })
            })
            .map(|node| node.id)
            .collect();

        for root in roots {
            let mut visited: HashSet<NodeId> = HashSet::new();
            let mut worklist: Vec<NodeId> = vec![root];
            while let Some(id) = worklist.pop() {
                if !visited.insert(id) {
                    continue;
                }
                graph.node_mut(id)?.set_hidden(true);
                for (_, edge) in graph.outputs(id)? {
                    worklist.push(edge.to);
                }
            }
        }
        Ok(())
    }
}
