//! End-to-end decoding tests over writer-built documents.

mod common;

use std::io::Write;

use common::{DocWriter, Val};
use irview_bgv::{DecodeError, DecodeOptions, GraphFile};
use irview_core::NodeId;

/// A fibonacci-like dump: one group, one "After parsing" graph with 21
/// nodes and 30 edges, two invokes, one branch, no loops.
fn fib_doc() -> DocWriter {
    let mut w = DocWriter::new(7, 0);
    w.define_string(1, "17:Fib.fib(int)");
    w.define_string(2, "fib");

    let classes: &[(u32, u32, &str)] = &[
        (10, 20, "org.graalvm.compiler.nodes.StartNode"),
        (11, 21, "org.graalvm.compiler.nodes.ParameterNode"),
        (12, 22, "org.graalvm.compiler.nodes.ConstantNode"),
        (13, 23, "org.graalvm.compiler.nodes.calc.IntegerLessThanNode"),
        (14, 24, "org.graalvm.compiler.nodes.IfNode"),
        (15, 25, "org.graalvm.compiler.nodes.BeginNode"),
        (16, 26, "org.graalvm.compiler.nodes.calc.AddNode"),
        (17, 27, "org.graalvm.compiler.nodes.InvokeNode"),
        (18, 28, "org.graalvm.compiler.nodes.ReturnNode"),
    ];
    for (class_id, nc_id, name) in classes {
        w.define_class(*class_id, name);
        w.define_node_class(*nc_id, *class_id);
    }
    // node id -> node-class pool ref, 21 nodes total
    let node_classes: [u32; 21] = [
        20, 21, 22, 23, 24, 25, 25, 22, 26, 27, 26, 27, 26, 28, 28, 22, 26, 22, 26, 25, 22,
    ];

    w.group_begin(1, 2, None);
    w.graph_begin(17, "After parsing", &[], &[]);
    for (id, nc) in node_classes.iter().enumerate() {
        w.node(id as i32, *nc, &[]);
    }
    // 20 chain edges plus 10 cross edges: 30 total
    for i in 0..20i32 {
        w.edge(i, i + 1, &[("name", Val::Str("next"))]);
    }
    for i in 0..10i32 {
        w.edge(i, i + 2, &[("name", Val::Str("value"))]);
    }
    w.graph_end();
    w.group_end();
    w.doc_end();
    w
}

#[test]
fn header_validation() {
    let err = GraphFile::from_bytes(b"XGVB\x07\x00".to_vec()).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedHeader { .. }));

    let err = GraphFile::from_bytes(DocWriter::new(5, 0).doc_end().finish()).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedHeader { .. }));

    let file = GraphFile::from_bytes(DocWriter::new(7, 0).doc_end().finish()).unwrap();
    assert_eq!(file.version(), (7, 0));
    assert_eq!(file.graph_count(), 0);
}

#[test]
fn unknown_tag_fails_strict_and_skips_lenient() {
    let mut w = DocWriter::new(7, 0);
    w.define_class(1, "x.StartNode");
    w.define_node_class(2, 1);
    w.graph_begin(0, "g", &[], &[]);
    w.node(0, 2, &[]);
    w.record(0x2a, &[0xde, 0xad]);
    w.graph_end();
    w.doc_end();
    let bytes = w.finish();

    let err = GraphFile::from_bytes(bytes.clone()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnknownRecordTag { tag: 0x2a, .. }
    ));

    let file =
        GraphFile::from_bytes_with(bytes, DecodeOptions { lenient: true }).unwrap();
    assert_eq!(file.graph_count(), 1);
    let graph = file.decode_graph(0).unwrap();
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn graph_body_records_outside_a_graph_are_rejected() {
    // A NODE_DEFINE before the first GRAPH_BEGIN fails at indexing, so no
    // document can index successfully yet fail to seek.
    let mut w = DocWriter::new(7, 0);
    w.define_class(1, "x.StartNode");
    w.define_node_class(2, 1);
    w.node(0, 2, &[]);
    w.graph_begin(0, "g", &[], &[]);
    w.graph_end();
    w.doc_end();
    let bytes = w.finish();

    let err = GraphFile::from_bytes(bytes.clone()).unwrap_err();
    assert!(matches!(err, DecodeError::UnexpectedRecord { tag: 0x05, .. }));
    // Leniency covers unknown tags, not misplaced known ones.
    let err = GraphFile::from_bytes_with(bytes, DecodeOptions { lenient: true }).unwrap_err();
    assert!(matches!(err, DecodeError::UnexpectedRecord { tag: 0x05, .. }));

    // Same for a stray GRAPH_END after a complete graph.
    let mut w = DocWriter::new(7, 0);
    w.graph_begin(0, "g", &[], &[]);
    w.graph_end();
    w.graph_end();
    w.doc_end();
    let err = GraphFile::from_bytes(w.finish()).unwrap_err();
    assert!(matches!(err, DecodeError::UnexpectedRecord { tag: 0x03, .. }));
}

#[test]
fn truncation_is_reported() {
    // The frame declares 100 body bytes but only two follow.
    let mut w = DocWriter::new(7, 0);
    w.record_with_length(0x05, 100, &[0, 0]);
    let err = GraphFile::from_bytes(w.finish()).unwrap_err();
    assert!(matches!(err, DecodeError::TruncatedStream { .. }));

    // A graph body cut off before its GRAPH_END.
    let mut w = DocWriter::new(7, 0);
    w.graph_begin(0, "g", &[], &[]);
    let err = GraphFile::from_bytes(w.finish()).unwrap_err();
    assert!(matches!(err, DecodeError::TruncatedStream { .. }));
}

#[test]
fn single_graph_decodes_with_resolved_properties() {
    let mut w = DocWriter::new(7, 0);
    w.define_string(1, "17:Fib.fib(int)");
    w.define_string(2, "fib");
    w.define_class(3, "Fib");
    w.define_method(4, 3, 2, "(int)");
    w.define_source_position(5, 4, 9, None);
    w.define_source_position(6, 4, 2, Some(5));
    w.define_class(7, "org.graalvm.compiler.nodes.StartNode");
    w.define_node_class(8, 7);
    w.define_enum(9, "HotSpotMethod", 1);

    w.group_begin(1, 2, Some(4));
    w.graph_begin(
        17,
        "After phase %s",
        &[Val::Str("Canonicalizer")],
        &[("scope", Val::Ref(9))],
    );
    w.node(
        0,
        8,
        &[
            ("stamp", Val::Str("void")),
            ("source_position", Val::Ref(6)),
        ],
    );
    w.node(1, 8, &[]);
    w.edge(0, 1, &[("name", Val::Str("next")), ("index", Val::Int(0))]);
    w.set_node_prop(1, "flagged", &Val::Bool(true));
    w.set_graph_prop("late", &Val::Float(1.5));
    w.graph_end();
    w.group_end();
    w.doc_end();

    let file = GraphFile::from_bytes(w.finish()).unwrap();
    assert_eq!(file.graph_count(), 1);
    let entry = &file.graphs()[0];
    assert_eq!(entry.id, 17);
    assert_eq!(entry.name, "17:Fib.fib(int)/After phase Canonicalizer");

    let graph = file.decode_graph(0).unwrap();
    assert_eq!(graph.name, "17:Fib.fib(int)/After phase Canonicalizer");
    assert_eq!(graph.props["scope"].as_str(), Some("HotSpotMethod"));
    assert_eq!(graph.props["late"], irview_core::PropValue::Float(1.5));

    let start = graph.node(NodeId(0)).unwrap();
    assert_eq!(
        start.node_class(),
        Some("org.graalvm.compiler.nodes.StartNode")
    );
    assert_eq!(start.get("stamp").and_then(|v| v.as_str()), Some("void"));
    // Source positions resolve to the frame chain, innermost first.
    assert_eq!(
        graph.source_chain(NodeId(0)).unwrap(),
        Some(vec![
            "Fib.fib(int) (bci 2)".to_string(),
            "Fib.fib(int) (bci 9)".to_string(),
        ])
    );

    let other = graph.node(NodeId(1)).unwrap();
    assert_eq!(other.get("flagged").and_then(|v| v.as_bool()), Some(true));

    let (_, edge) = graph.outputs(NodeId(0)).unwrap()[0];
    assert_eq!(edge.to, NodeId(1));
    assert_eq!(edge.name(), Some("next"));
}

#[test]
fn nested_groups_compose_the_graph_name() {
    let mut w = DocWriter::new(7, 0);
    w.define_string(1, "Outer");
    w.define_string(2, "o");
    w.define_string(3, "Inner");
    w.define_string(4, "i");
    w.group_begin(1, 2, None);
    w.group_begin(3, 4, None);
    w.graph_begin(0, "After parsing", &[], &[]);
    w.graph_end();
    w.group_end();
    w.group_end();
    w.doc_end();

    let file = GraphFile::from_bytes(w.finish()).unwrap();
    assert_eq!(file.graphs()[0].name, "Outer/Inner/After parsing");
}

#[test]
fn pool_rebinds_are_applied_even_in_skipped_graphs() {
    let mut w = DocWriter::new(7, 0);
    w.define_class(1, "x.StartNode");
    w.define_node_class(2, 1);
    w.define_string(3, "first");

    w.graph_begin(0, "g0", &[], &[]);
    w.node(0, 2, &[("tag", Val::Ref(3))]);
    // Rebind inside the first graph's body; the second graph sees it.
    w.define_string(3, "second");
    w.graph_end();

    w.graph_begin(1, "g1", &[], &[]);
    w.node(0, 2, &[("tag", Val::Ref(3))]);
    w.graph_end();
    w.doc_end();

    let file = GraphFile::from_bytes(w.finish()).unwrap();
    let tag = |graph: &irview_core::Graph| {
        graph
            .node(NodeId(0))
            .unwrap()
            .get("tag")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    let g0 = file.decode_graph(0).unwrap();
    assert_eq!(tag(&g0).as_deref(), Some("first"));
    // Seeking to graph 1 skips graph 0's body but observes its rebind.
    let g1 = file.decode_graph(1).unwrap();
    assert_eq!(tag(&g1).as_deref(), Some("second"));
}

#[test]
fn seek_decode_matches_sequential_decode() {
    let mut w2 = DocWriter::new(7, 0);
    w2.define_string(1, "17:Fib.fib(int)");
    w2.define_string(2, "fib");
    w2.define_class(3, "x.StartNode");
    w2.define_node_class(4, 3);
    w2.group_begin(1, 2, None);
    w2.graph_begin(0, "g0", &[], &[]);
    w2.node(0, 4, &[]);
    w2.graph_end();
    w2.graph_begin(1, "g1", &[], &[]);
    w2.node(0, 4, &[]);
    w2.node(1, 4, &[]);
    w2.edge(0, 1, &[("name", Val::Str("next"))]);
    w2.graph_end();
    w2.group_end();
    w2.doc_end();

    for bytes in [fib_doc().finish(), w2.finish()] {
        let file = GraphFile::from_bytes(bytes).unwrap();
        let all = file.decode_all().unwrap();
        assert_eq!(all.len(), file.graph_count());
        for (index, sequential) in all.iter().enumerate() {
            let sought = file.decode_graph(index).unwrap();
            assert_eq!(
                serde_json::to_value(&sought).unwrap(),
                serde_json::to_value(sequential).unwrap()
            );
        }
    }
}

#[test]
fn dangling_edge_reference_fails() {
    let mut w = DocWriter::new(7, 0);
    w.define_class(1, "x.StartNode");
    w.define_node_class(2, 1);
    w.graph_begin(0, "g", &[], &[]);
    w.node(0, 2, &[]);
    w.edge(0, 99, &[]);
    w.graph_end();
    w.doc_end();

    let file = GraphFile::from_bytes(w.finish()).unwrap();
    let err = file.decode_graph(0).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::DanglingEdgeReference { node: 99, .. }
    ));
}

#[test]
fn missing_graph_index_is_reported() {
    let file = GraphFile::from_bytes(fib_doc().finish()).unwrap();
    let err = file.decode_graph(3).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::GraphNotFound { index: 3, count: 1 }
    ));
}

#[test]
fn block_property_becomes_block_list() {
    let mut w = DocWriter::new(7, 0);
    w.define_class(1, "x.StartNode");
    w.define_node_class(2, 1);
    w.graph_begin(0, "g", &[], &[]);
    w.node(0, 2, &[]);
    w.node(1, 2, &[]);
    w.set_graph_prop(
        "blocks",
        &Val::List(vec![Val::Map(vec![
            ("id", Val::Int(0)),
            ("nodes", Val::List(vec![Val::Int(0), Val::Int(1)])),
        ])]),
    );
    w.graph_end();
    w.doc_end();

    let graph = GraphFile::from_bytes(w.finish())
        .unwrap()
        .decode_graph(0)
        .unwrap();
    assert!(graph.props.get("blocks").is_none());
    assert_eq!(graph.blocks().len(), 1);
    assert_eq!(graph.blocks()[0].id, 0);
    assert_eq!(graph.blocks()[0].nodes, vec![NodeId(0), NodeId(1)]);
}

#[test]
fn gzipped_documents_are_transparent() {
    let plain = GraphFile::from_bytes(fib_doc().finish()).unwrap();
    let zipped = GraphFile::from_bytes(fib_doc().finish_gzipped()).unwrap();
    assert_eq!(plain.graph_count(), zipped.graph_count());
    assert_eq!(plain.graphs()[0].name, zipped.graphs()[0].name);
    assert_eq!(
        serde_json::to_value(plain.decode_graph(0).unwrap()).unwrap(),
        serde_json::to_value(zipped.decode_graph(0).unwrap()).unwrap()
    );
}

#[test]
fn open_reads_a_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&fib_doc().finish_gzipped()).unwrap();
    file.flush().unwrap();

    let opened = GraphFile::open(file.path()).unwrap();
    assert_eq!(opened.graph_count(), 1);
    assert_eq!(opened.graphs()[0].name, "17:Fib.fib(int)/After parsing");
}

#[test]
fn fib_dump_end_to_end() {
    let file = GraphFile::from_bytes(fib_doc().finish()).unwrap();
    assert_eq!(file.graph_count(), 1);
    let entry = &file.graphs()[0];
    assert_eq!(entry.id, 17);
    assert_eq!(entry.name, "17:Fib.fib(int)/After parsing");

    let graph = file.decode_graph(0).unwrap();
    assert_eq!(graph.node_count(), 21);
    assert_eq!(graph.edge_count(), 30);

    let summary = graph.summary();
    assert!(summary.has_branches());
    assert!(summary.has_calls());
    assert!(!summary.has_loops());
    assert!(!summary.has_deopts());
    assert_eq!(summary.call_count, 2);
    assert_eq!(
        summary.node_class_tally["org.graalvm.compiler.nodes.IfNode"],
        1
    );
}
