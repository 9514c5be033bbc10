//! Graph edges.
//!
//! An [`Edge`] is owned by the graph's edge arena; the endpoints' ordered
//! input/output lists hold its [`crate::id::EdgeId`]. Edges run from a
//! node to the child filling one of its slots; the `name` property carries
//! that slot name and is the main hook for structural pattern matching by
//! passes.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;
use crate::props::{self, EdgeKind};
use crate::value::{PropValue, Props};

/// A directed edge between two nodes of the same graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub props: Props,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, props: Props) -> Self {
        Edge { from, to, props }
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<PropValue>) {
        self.props.insert(key.to_string(), value.into());
    }

    /// The slot name the destination fills on the source node.
    pub fn name(&self) -> Option<&str> {
        self.props.get(props::NAME).and_then(PropValue::as_str)
    }

    pub fn label(&self) -> Option<&str> {
        self.props.get(props::LABEL).and_then(PropValue::as_str)
    }

    pub fn kind(&self) -> Option<EdgeKind> {
        self.props
            .get(props::KIND)
            .and_then(PropValue::as_str)
            .and_then(|s| s.parse().ok())
    }

    pub fn is_hidden(&self) -> bool {
        self.flag(props::HIDDEN)
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.set(props::HIDDEN, hidden);
    }

    pub fn is_synthetic(&self) -> bool {
        self.flag(props::SYNTHETIC)
    }

    pub fn is_reversed(&self) -> bool {
        self.flag(props::REVERSE)
    }

    /// The positional argument index assigned by argument canonicalization.
    pub fn argument_index(&self) -> Option<i64> {
        self.props
            .get(props::ARGUMENT_INDEX)
            .and_then(PropValue::as_int)
    }

    fn flag(&self, key: &str) -> bool {
        self.props
            .get(key)
            .and_then(PropValue::as_bool)
            .unwrap_or(false)
    }
}
