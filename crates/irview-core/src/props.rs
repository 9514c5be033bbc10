//! Well-known property keys and the node/edge kind vocabularies.
//!
//! Properties live in a free-form bag, but passes and renderers agree on a
//! small set of symbolic keys and on the string values used for `kind`.
//! The kind enums give typed access; the bag stores their string form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Human-readable label shown by renderers.
pub const LABEL: &str = "label";
/// Node or edge category (see [`NodeKind`] / [`EdgeKind`]).
pub const KIND: &str = "kind";
/// Removed from the rendered view (never physically deleted).
pub const HIDDEN: &str = "hidden";
/// Rendered per-use above each consumer instead of as an element.
pub const INLINED: &str = "inlined";
/// Created by a pass rather than decoded from the file.
pub const SYNTHETIC: &str = "synthetic";
/// Presentation dimming mode; the only recognized value is `"shaded"`.
pub const SPOTLIGHT: &str = "spotlight";
/// Fully qualified originating compiler node class.
pub const NODE_CLASS: &str = "node_class";
/// Slot name the edge's destination fills on its source.
pub const NAME: &str = "name";
/// Edge drawn against its natural direction.
pub const REVERSE: &str = "reverse";
/// Positional argument index assigned by argument canonicalization.
pub const ARGUMENT_INDEX: &str = "argument_index";
/// Resolved source-position frame chain (list of strings, innermost first).
pub const SOURCE_POSITION: &str = "source_position";
/// Field name consumed by field-access desugaring.
pub const FIELD: &str = "field";

/// The value of [`SPOTLIGHT`] marking a dimmed-but-anchored node.
pub const SHADED: &str = "shaded";

/// Node categories recognized by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Info,
    Input,
    Control,
    Memory,
    Call,
    Sync,
    Alloc,
    Virtual,
    Guard,
    Calc,
    Other,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Info => "info",
            NodeKind::Input => "input",
            NodeKind::Control => "control",
            NodeKind::Memory => "memory",
            NodeKind::Call => "call",
            NodeKind::Sync => "sync",
            NodeKind::Alloc => "alloc",
            NodeKind::Virtual => "virtual",
            NodeKind::Guard => "guard",
            NodeKind::Calc => "calc",
            NodeKind::Other => "other",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "info" => NodeKind::Info,
            "input" => NodeKind::Input,
            "control" => NodeKind::Control,
            "memory" => NodeKind::Memory,
            "call" => NodeKind::Call,
            "sync" => NodeKind::Sync,
            "alloc" => NodeKind::Alloc,
            "virtual" => NodeKind::Virtual,
            "guard" => NodeKind::Guard,
            "calc" => NodeKind::Calc,
            "other" => NodeKind::Other,
            _ => return Err(()),
        })
    }
}

/// Edge categories recognized by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Data,
    Control,
    Loop,
    Info,
    Other,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Data => "data",
            EdgeKind::Control => "control",
            EdgeKind::Loop => "loop",
            EdgeKind::Info => "info",
            EdgeKind::Other => "other",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "data" => EdgeKind::Data,
            "control" => EdgeKind::Control,
            "loop" => EdgeKind::Loop,
            "info" => EdgeKind::Info,
            "other" => EdgeKind::Other,
            _ => return Err(()),
        })
    }
}
