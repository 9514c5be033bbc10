//! Generic label/kind defaults applied to every graph.
//!
//! Runs last so it never pre-empts a specific pass: kinds and labels are
//! only filled in where absent. Node kinds come from simple-name
//! heuristics over the stripped class name, edge kinds from well-known
//! slot names. Frame-state bookkeeping nodes and info edges are hidden.

use irview_core::{names, props, EdgeId, EdgeKind, Graph, NodeKind};

use crate::error::PassError;
use crate::rank::RankRegistry;
use crate::Pass;

pub struct FallbackPass;

impl Pass for FallbackPass {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn applies(&self, _graph: &Graph) -> bool {
        true
    }

    fn apply(&self, graph: &mut Graph, _ranks: &mut RankRegistry) -> Result<(), PassError> {
        for id in graph.node_ids() {
            let node = graph.node(id)?;
            let Some(class) = node.node_class() else {
                continue;
            };
            let stripped = names::stripped_name(class).to_string();
            let needs_kind = node.kind().is_none();
            let needs_label = node.label().is_none();
            let hide = stripped == "FrameState";

            let node = graph.node_mut(id)?;
            if needs_kind {
                node.set(props::KIND, node_kind_for(&stripped).as_str());
            }
            if needs_label {
                node.set(props::LABEL, stripped);
            }
            if hide {
                node.set_hidden(true);
            }
        }

        for index in 0..graph.edge_count() {
            let eid = EdgeId(index as u32);
            let edge = graph.edge(eid)?;
            let name = edge.name().map(str::to_string);
            let needs_kind = edge.kind().is_none();
            let needs_label = edge.label().is_none();
            let kind = edge
                .kind()
                .unwrap_or_else(|| edge_kind_for(name.as_deref()));

            let edge = graph.edge_mut(eid)?;
            if needs_kind {
                edge.set(props::KIND, kind.as_str());
            }
            if needs_label {
                if let Some(name) = name {
                    edge.set(props::LABEL, name);
                }
            }
            if kind == EdgeKind::Info {
                edge.set_hidden(true);
            }
        }
        Ok(())
    }
}

/// Node-kind heuristic over the stripped class name. Exact control and
/// calc names are checked before the broader substring rules.
fn node_kind_for(stripped: &str) -> NodeKind {
    const CONTROL: &[&str] = &[
        "Start", "Begin", "End", "Merge", "Return", "If", "Switch", "Unwind", "Loop",
        "LoopBegin", "LoopEnd", "LoopExit",
    ];
    const CALC: &[&str] = &[
        "Add", "Sub", "Mul", "Div", "Rem", "Neg", "Not", "And", "Or", "Xor", "Shl", "Shr",
        "UShr", "Conditional", "Compare", "Equals", "LessThan",
    ];

    if CONTROL.contains(&stripped) {
        return NodeKind::Control;
    }
    if stripped.contains("Call") || stripped.contains("Invoke") || stripped == "Apply" {
        return NodeKind::Call;
    }
    if stripped.starts_with("Guard") || stripped.contains("Deopt") {
        return NodeKind::Guard;
    }
    if stripped == "FrameState" {
        return NodeKind::Info;
    }
    if stripped == "Constant" || stripped == "Parameter" || stripped.ends_with("Literal") {
        return NodeKind::Input;
    }
    if stripped.starts_with("Read")
        || stripped.starts_with("Write")
        || stripped.starts_with("Load")
        || stripped.starts_with("Store")
    {
        return NodeKind::Memory;
    }
    if stripped.starts_with("Monitor") || stripped == "Membar" {
        return NodeKind::Sync;
    }
    if stripped.starts_with("Virtual") {
        return NodeKind::Virtual;
    }
    if stripped.starts_with("New") || stripped.starts_with("Alloc") {
        return NodeKind::Alloc;
    }
    if CALC
        .iter()
        .any(|calc| stripped == *calc || stripped.ends_with(*calc))
    {
        return NodeKind::Calc;
    }
    NodeKind::Other
}

/// Edge-kind heuristic over the slot name. Unnamed edges are data.
fn edge_kind_for(name: Option<&str>) -> EdgeKind {
    const CONTROL: &[&str] = &[
        "next",
        "trueSuccessor",
        "falseSuccessor",
        "merge",
        "loopExit",
        "exceptionEdge",
    ];
    const LOOP: &[&str] = &["loopEnd", "backEdge"];
    const INFO: &[&str] = &["frameState", "stateAfter", "descriptor", "info"];

    let Some(name) = name else {
        return EdgeKind::Data;
    };
    if CONTROL.contains(&name) {
        EdgeKind::Control
    } else if LOOP.contains(&name) {
        EdgeKind::Loop
    } else if INFO.contains(&name) {
        EdgeKind::Info
    } else {
        EdgeKind::Data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_heuristics() {
        assert_eq!(node_kind_for("If"), NodeKind::Control);
        assert_eq!(node_kind_for("LoopBegin"), NodeKind::Control);
        assert_eq!(node_kind_for("MethodCallTarget"), NodeKind::Call);
        assert_eq!(node_kind_for("GuardedUnsafeLoad"), NodeKind::Guard);
        assert_eq!(node_kind_for("Constant"), NodeKind::Input);
        assert_eq!(node_kind_for("IntLiteral"), NodeKind::Input);
        assert_eq!(node_kind_for("ReadArray"), NodeKind::Memory);
        assert_eq!(node_kind_for("MonitorEnter"), NodeKind::Sync);
        assert_eq!(node_kind_for("VirtualInstance"), NodeKind::Virtual);
        assert_eq!(node_kind_for("NewArray"), NodeKind::Alloc);
        assert_eq!(node_kind_for("Add"), NodeKind::Calc);
        assert_eq!(node_kind_for("IntegerLessThan"), NodeKind::Calc);
        assert_eq!(node_kind_for("Pi"), NodeKind::Other);
    }

    #[test]
    fn edge_kind_heuristics() {
        assert_eq!(edge_kind_for(Some("next")), EdgeKind::Control);
        assert_eq!(edge_kind_for(Some("loopEnd")), EdgeKind::Loop);
        assert_eq!(edge_kind_for(Some("frameState")), EdgeKind::Info);
        assert_eq!(edge_kind_for(Some("value")), EdgeKind::Data);
        assert_eq!(edge_kind_for(None), EdgeKind::Data);
    }
}
