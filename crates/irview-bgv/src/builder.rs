//! Materializing one graph from its record slice.
//!
//! [`build_graph`] consumes records from a decoder positioned just after a
//! GRAPH_BEGIN record and produces an [`irview_core::Graph`], resolving
//! every pool-referenced property against the live pool. Edges append to
//! both endpoints' ordered lists in declaration order; an edge or property
//! record naming an undefined node id fails with `DanglingEdgeReference`.

use indexmap::IndexMap;
use irview_core::{props, Block, Graph, NodeId, PropValue, Props};

use crate::decoder::StreamDecoder;
use crate::error::DecodeError;
use crate::pool::ConstantPool;
use crate::records::{tag, GraphHeader, PropertyTarget, RawProps, RawValue, Record};

/// Resolves a raw wire value into a property value.
pub fn resolve_value(pool: &ConstantPool, value: &RawValue) -> Result<PropValue, DecodeError> {
    Ok(match value {
        RawValue::PoolRef(id) => pool.resolve(*id)?,
        RawValue::Int(i) => PropValue::Int(*i),
        RawValue::Float(x) => PropValue::Float(*x),
        RawValue::Bool(b) => PropValue::Bool(*b),
        RawValue::String(s) => PropValue::String(s.clone()),
        RawValue::List(items) => PropValue::List(
            items
                .iter()
                .map(|item| resolve_value(pool, item))
                .collect::<Result<_, _>>()?,
        ),
        RawValue::Map(entries) => {
            let mut map = IndexMap::new();
            for (key, value) in entries {
                map.insert(key.clone(), resolve_value(pool, value)?);
            }
            PropValue::Map(map)
        }
    })
}

/// Resolves a raw property block, preserving declaration order.
pub fn resolve_props(pool: &ConstantPool, raw: &RawProps) -> Result<Props, DecodeError> {
    let mut resolved = Props::new();
    for (key, value) in raw {
        resolved.insert(key.clone(), resolve_value(pool, value)?);
    }
    Ok(resolved)
}

/// Substitutes `%s` placeholders in a phase-name format string.
pub fn format_graph_name(format: &str, args: &[PropValue]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut pieces = format.split("%s");
    if let Some(first) = pieces.next() {
        out.push_str(first);
    }
    for piece in pieces {
        if let Some(arg) = args.next() {
            out.push_str(&arg.to_string());
        }
        out.push_str(piece);
    }
    out
}

/// Composes the full human-readable graph name from the enclosing group
/// stack and the graph's own formatted name.
pub fn compose_name(group_path: &[String], graph_name: &str) -> String {
    if group_path.is_empty() {
        graph_name.to_string()
    } else {
        format!("{}/{}", group_path.join("/"), graph_name)
    }
}

/// Builds the graph whose GRAPH_BEGIN record was just consumed.
pub fn build_graph(
    decoder: &mut StreamDecoder<'_>,
    pool: &mut ConstantPool,
    header: &GraphHeader,
    group_path: &[String],
) -> Result<Graph, DecodeError> {
    let args = header
        .args
        .iter()
        .map(|arg| resolve_value(pool, arg))
        .collect::<Result<Vec<_>, _>>()?;
    let own_name = format_graph_name(&header.format, &args);
    let mut graph = Graph::new(header.id, compose_name(group_path, &own_name));
    graph.props = resolve_props(pool, &header.props)?;

    loop {
        let offset = decoder.offset();
        let record = decoder
            .next_record(pool)?
            .ok_or(DecodeError::TruncatedStream { offset })?;
        match record {
            Record::NodeDefine(node) => {
                let class = pool.resolve_string(node.node_class)?;
                let resolved = resolve_props(pool, &node.props)?;
                let id = NodeId::from(node.id);
                if graph.contains_node(id) {
                    // Redefinition merges properties, mirroring pool
                    // rebinding semantics; the id itself is never reissued.
                    let existing = graph
                        .node_mut(id)
                        .map_err(|_| DecodeError::DanglingEdgeReference {
                            node: id.0,
                            offset,
                        })?;
                    existing.set(props::NODE_CLASS, class);
                    for (key, value) in resolved {
                        existing.props.insert(key, value);
                    }
                } else {
                    let mut node_props = Props::new();
                    node_props.insert(props::NODE_CLASS.to_string(), PropValue::String(class));
                    node_props.extend(resolved);
                    graph
                        .create_node(id, node_props)
                        .map_err(|_| DecodeError::DanglingEdgeReference {
                            node: id.0,
                            offset,
                        })?;
                }
            }
            Record::EdgeDefine(edge) => {
                let from = NodeId::from(edge.from);
                let to = NodeId::from(edge.to);
                for endpoint in [from, to] {
                    if !graph.contains_node(endpoint) {
                        return Err(DecodeError::DanglingEdgeReference {
                            node: endpoint.0,
                            offset,
                        });
                    }
                }
                let resolved = resolve_props(pool, &edge.props)?;
                graph
                    .create_edge(from, to, resolved)
                    .map_err(|_| DecodeError::DanglingEdgeReference {
                        node: from.0,
                        offset,
                    })?;
            }
            Record::PropertySet(set) => {
                let value = resolve_value(pool, &set.value)?;
                match set.target {
                    PropertyTarget::Graph => {
                        graph.props.insert(set.key, value);
                    }
                    PropertyTarget::Node => {
                        let id = NodeId::from(set.id);
                        let node = graph.node_mut(id).map_err(|_| {
                            DecodeError::DanglingEdgeReference {
                                node: id.0,
                                offset,
                            }
                        })?;
                        node.props.insert(set.key, value);
                    }
                }
            }
            Record::PoolDefine { .. } | Record::Unknown { .. } => {}
            Record::GraphEnd => break,
            // Group and document records are invalid inside a graph body.
            Record::GroupBegin(_) => {
                return Err(DecodeError::UnexpectedRecord {
                    tag: tag::GROUP_BEGIN,
                    offset,
                });
            }
            Record::GroupEnd => {
                return Err(DecodeError::UnexpectedRecord {
                    tag: tag::GROUP_END,
                    offset,
                });
            }
            Record::GraphBegin(_) => {
                return Err(DecodeError::UnexpectedRecord {
                    tag: tag::GRAPH_BEGIN,
                    offset,
                });
            }
            Record::DocumentEnd => {
                return Err(DecodeError::UnexpectedRecord {
                    tag: tag::DOC_END,
                    offset,
                });
            }
        }
    }

    attach_blocks(&mut graph);
    Ok(graph)
}

/// Converts the optional `blocks` graph property (a list of `{id, nodes}`
/// maps) into the block list. Formats without block data leave it empty.
fn attach_blocks(graph: &mut Graph) {
    let Some(PropValue::List(entries)) = graph.props.shift_remove("blocks") else {
        return;
    };
    for entry in entries {
        let PropValue::Map(fields) = entry else {
            continue;
        };
        let Some(id) = fields.get("id").and_then(PropValue::as_int) else {
            continue;
        };
        let Some(node_ids) = fields.get("nodes").and_then(PropValue::as_list) else {
            continue;
        };
        let nodes = node_ids
            .iter()
            .filter_map(PropValue::as_int)
            .map(NodeId)
            .collect();
        graph.add_block(Block {
            id: id as i32,
            nodes,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolValue;

    #[test]
    fn format_name_substitutes_args() {
        assert_eq!(format_graph_name("After parsing", &[]), "After parsing");
        assert_eq!(
            format_graph_name("After phase %s", &[PropValue::from("Lowering")]),
            "After phase Lowering"
        );
        assert_eq!(
            format_graph_name("%s of %s", &[PropValue::Int(2), PropValue::Int(5)]),
            "2 of 5"
        );
        // Missing args leave the placeholder empty rather than failing.
        assert_eq!(format_graph_name("phase %s", &[]), "phase ");
    }

    #[test]
    fn compose_name_joins_group_stack() {
        assert_eq!(compose_name(&[], "After parsing"), "After parsing");
        assert_eq!(
            compose_name(&["17:Fib.fib(int)".to_string()], "After parsing"),
            "17:Fib.fib(int)/After parsing"
        );
    }

    #[test]
    fn resolve_value_follows_pool_refs_in_nested_values() {
        let mut pool = ConstantPool::new();
        pool.define(1, PoolValue::Str("deep".into()));
        let raw = RawValue::List(vec![RawValue::Int(1), RawValue::PoolRef(1)]);
        let resolved = resolve_value(&pool, &raw).unwrap();
        assert_eq!(
            resolved,
            PropValue::List(vec![PropValue::Int(1), PropValue::String("deep".into())])
        );
    }
}
