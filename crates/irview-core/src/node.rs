//! Graph nodes.
//!
//! A [`Node`] is an id, a property bag, and two ordered lists of incident
//! edge ids. Edge order is semantically significant (it encodes positional
//! call arguments, among other things), so the lists are append-only in
//! declaration order and any pass reordering or hiding edges must keep both
//! endpoints consistent, which is why mutation goes through `Graph`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::{EdgeId, NodeId};
use crate::props::{self, NodeKind};
use crate::value::{PropValue, Props};

/// A node in a compiler graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Graph-scoped id, unique for the graph's lifetime.
    pub id: NodeId,
    /// Named properties (see [`crate::props`] for recognized keys).
    pub props: Props,
    /// Edges ending at this node, in declaration order.
    pub inputs: SmallVec<[EdgeId; 4]>,
    /// Edges starting at this node, in declaration order.
    pub outputs: SmallVec<[EdgeId; 4]>,
}

impl Node {
    pub fn new(id: NodeId, props: Props) -> Self {
        Node {
            id,
            props,
            inputs: SmallVec::new(),
            outputs: SmallVec::new(),
        }
    }

    /// Returns the property value for `key`.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    /// Sets a property, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<PropValue>) {
        self.props.insert(key.to_string(), value.into());
    }

    /// Returns the human-readable label, if one has been set.
    pub fn label(&self) -> Option<&str> {
        self.props.get(props::LABEL).and_then(PropValue::as_str)
    }

    /// Returns the fully qualified originating compiler node class.
    pub fn node_class(&self) -> Option<&str> {
        self.props.get(props::NODE_CLASS).and_then(PropValue::as_str)
    }

    /// Returns the node kind, if set to a recognized value.
    pub fn kind(&self) -> Option<NodeKind> {
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

    pub fn is_inlined(&self) -> bool {
        self.flag(props::INLINED)
    }

    /// True when the node is spotlighted in the shaded presentation mode.
    pub fn is_shaded(&self) -> bool {
        self.props
            .get(props::SPOTLIGHT)
            .and_then(PropValue::as_str)
            .map_or(false, |s| s == props::SHADED)
    }

    fn flag(&self, key: &str) -> bool {
        self.props
            .get(key)
            .and_then(PropValue::as_bool)
            .unwrap_or(false)
    }
}
