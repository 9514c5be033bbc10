//! Graph: the mutable container all passes operate on.
//!
//! A [`Graph`] owns an insertion-ordered node map, an edge arena, an
//! optional basic-block list, and an ordered rank list (layout-depth
//! constraints). All structural mutation goes through `Graph` methods so
//! the cross-invariants hold:
//!
//! - every edge's endpoints reference nodes present in the same graph;
//! - a node's input/output lists stay consistent with the edge arena
//!   (creation appends to both endpoints in declaration order);
//! - node ids are never reused, including ids allocated for synthetic
//!   nodes created by passes;
//! - nodes and edges are never physically removed; passes express removal
//!   by setting `hidden`.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::error::CoreError;
use crate::id::{EdgeId, NodeId};
use crate::names;
use crate::node::Node;
use crate::props;
use crate::value::{PropValue, Props};

/// Optional basic-block grouping of nodes, used only by block-aware
/// renderers. Empty unless the source format provides it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: i32,
    pub nodes: Vec<NodeId>,
}

/// A layout constraint: these nodes render at the same depth, in list
/// order left-to-right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rank(pub Vec<NodeId>);

/// One decoded compiler graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph id embedded in the dump format. Not unique within a file.
    pub id: i32,
    /// Composed human-readable name, e.g. `"17:Fib.fib(int)/After parsing"`.
    pub name: String,
    /// Graph-level properties.
    pub props: Props,
    nodes: IndexMap<NodeId, Node>,
    edges: Vec<Edge>,
    blocks: Vec<Block>,
    ranks: Vec<Rank>,
    /// Next id handed to a synthetic node; kept above every id ever seen.
    next_synthetic_id: i64,
}

impl Graph {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Graph {
            id,
            name: name.into(),
            props: Props::new(),
            nodes: IndexMap::new(),
            edges: Vec::new(),
            blocks: Vec::new(),
            ranks: Vec::new(),
            next_synthetic_id: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Adds a node with a file-assigned id. Ids are never reused.
    pub fn create_node(&mut self, id: NodeId, props: Props) -> Result<NodeId, CoreError> {
        if self.nodes.contains_key(&id) {
            return Err(CoreError::DuplicateNodeId { id });
        }
        self.nodes.insert(id, Node::new(id, props));
        if id.0 >= self.next_synthetic_id {
            self.next_synthetic_id = id.0 + 1;
        }
        Ok(id)
    }

    /// Adds a pass-created node with a fresh id and `synthetic: true`.
    pub fn create_synthetic_node(&mut self, mut props: Props) -> NodeId {
        let id = NodeId(self.next_synthetic_id);
        self.next_synthetic_id += 1;
        props.insert(props::SYNTHETIC.to_string(), PropValue::Bool(true));
        self.nodes.insert(id, Node::new(id, props));
        id
    }

    /// Adds an edge, appending it to both endpoints' ordered lists.
    pub fn create_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        props: Props,
    ) -> Result<EdgeId, CoreError> {
        if !self.nodes.contains_key(&from) {
            return Err(CoreError::NodeNotFound { id: from });
        }
        if !self.nodes.contains_key(&to) {
            return Err(CoreError::NodeNotFound { id: to });
        }
        let edge_id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge::new(from, to, props));
        self.nodes[&from].outputs.push(edge_id);
        self.nodes[&to].inputs.push(edge_id);
        Ok(edge_id)
    }

    /// Appends a rank group to the layout-constraint list.
    pub fn add_rank(&mut self, rank: Rank) {
        self.ranks.push(rank);
    }

    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    // -----------------------------------------------------------------------
    // Lookup and iteration
    // -----------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Result<&Node, CoreError> {
        self.nodes.get(&id).ok_or(CoreError::NodeNotFound { id })
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, CoreError> {
        self.nodes
            .get_mut(&id)
            .ok_or(CoreError::NodeNotFound { id })
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge, CoreError> {
        self.edges
            .get(id.0 as usize)
            .ok_or(CoreError::EdgeNotFound { id })
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge, CoreError> {
        self.edges
            .get_mut(id.0 as usize)
            .ok_or(CoreError::EdgeNotFound { id })
    }

    /// Nodes in insertion (declaration) order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Node ids in insertion order. Handy for passes that mutate while
    /// iterating: collect the ids first, then look nodes up.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Edges in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeId(i as u32), e))
    }

    /// A node's input edges in declaration order.
    pub fn inputs(&self, id: NodeId) -> Result<Vec<(EdgeId, &Edge)>, CoreError> {
        let node = self.node(id)?;
        Ok(node
            .inputs
            .iter()
            .map(|&eid| (eid, &self.edges[eid.0 as usize]))
            .collect())
    }

    /// A node's output edges in declaration order.
    pub fn outputs(&self, id: NodeId) -> Result<Vec<(EdgeId, &Edge)>, CoreError> {
        let node = self.node(id)?;
        Ok(node
            .outputs
            .iter()
            .map(|&eid| (eid, &self.edges[eid.0 as usize]))
            .collect())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // -----------------------------------------------------------------------
    // Renderer visibility contract
    // -----------------------------------------------------------------------

    /// A node is emitted unless hidden; a hidden node still gets an
    /// invisible anchor placeholder when an adjacent node is shaded.
    pub fn node_visible(&self, id: NodeId) -> Result<bool, CoreError> {
        let node = self.node(id)?;
        if !node.is_hidden() {
            return Ok(true);
        }
        for &eid in node.inputs.iter().chain(node.outputs.iter()) {
            let edge = &self.edges[eid.0 as usize];
            let other = if edge.from == id { edge.to } else { edge.from };
            if self.node(other)?.is_shaded() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// An edge is emitted unless its own `hidden` is set or a hidden
    /// endpoint is paired with a non-shaded opposite endpoint.
    pub fn edge_visible(&self, id: EdgeId) -> Result<bool, CoreError> {
        let edge = self.edge(id)?;
        if edge.is_hidden() {
            return Ok(false);
        }
        let from = self.node(edge.from)?;
        let to = self.node(edge.to)?;
        if from.is_hidden() && !to.is_shaded() {
            return Ok(false);
        }
        if to.is_hidden() && !from.is_shaded() {
            return Ok(false);
        }
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Structural queries
    // -----------------------------------------------------------------------

    /// Computes the structural summary used by query tooling.
    pub fn summary(&self) -> GraphSummary {
        let mut summary = GraphSummary {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            ..GraphSummary::default()
        };
        for node in self.nodes.values() {
            let Some(class) = node.node_class() else {
                continue;
            };
            *summary
                .node_class_tally
                .entry(class.to_string())
                .or_insert(0) += 1;
            let stripped = names::stripped_name(class);
            if stripped == "If" || stripped == "Switch" {
                summary.branch_count += 1;
            }
            if stripped.contains("Call") || stripped.contains("Invoke") || stripped == "Apply" {
                summary.call_count += 1;
            }
            if stripped == "LoopBegin" {
                summary.loop_count += 1;
            }
            if stripped.contains("Deopt") || stripped.starts_with("Guard") {
                summary.deopt_count += 1;
            }
        }
        summary
    }

    /// Returns the textual source-position chain for a node, innermost
    /// frame first, when the dump carried one.
    pub fn source_chain(&self, id: NodeId) -> Result<Option<Vec<String>>, CoreError> {
        let node = self.node(id)?;
        let Some(PropValue::List(frames)) = node.get(props::SOURCE_POSITION) else {
            return Ok(None);
        };
        Ok(Some(
            frames.iter().map(|frame| frame.to_string()).collect(),
        ))
    }
}

/// Counts of structurally interesting node shapes in one graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub branch_count: usize,
    pub call_count: usize,
    pub loop_count: usize,
    pub deopt_count: usize,
    pub node_class_tally: BTreeMap<String, usize>,
}

impl GraphSummary {
    pub fn has_branches(&self) -> bool {
        self.branch_count > 0
    }

    pub fn has_calls(&self) -> bool {
        self.call_count > 0
    }

    pub fn has_loops(&self) -> bool {
        self.loop_count > 0
    }

    pub fn has_deopts(&self) -> bool {
        self.deopt_count > 0
    }
}
