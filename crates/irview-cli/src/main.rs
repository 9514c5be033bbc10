//! Compiler graph dump inspector CLI.
//!
//! Provides the `irview` binary with subcommands for querying a dump file
//! from the command line: listing the graphs it contains, summarizing one
//! graph's structure, and printing properties, edges, and source positions
//! of individual nodes.
//!
//! Uses the same `GraphFile` decoder and `Pipeline` simplification as
//! library consumers, so what the CLI prints is what a renderer would see.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use irview_bgv::{DecodeError, DecodeOptions, GraphFile};
use irview_core::{EdgeId, Graph, NodeId};
use irview_passes::Pipeline;

/// Compiler graph dump inspector.
#[derive(Parser)]
#[command(name = "irview", about = "Inspect compiler graph dump files")]
struct Cli {
    /// Report and skip unknown record tags instead of failing.
    #[arg(long, global = true)]
    lenient: bool,

    /// Enable debug logging on stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List the graphs in a dump file.
    List {
        /// Path to the dump file.
        file: PathBuf,
    },

    /// Print the structural summary of one graph as JSON.
    Summary {
        file: PathBuf,

        /// Zero-based graph index (see `list`).
        graph: usize,
    },

    /// Print resolved properties of the graph, a node, or an edge as JSON.
    Props {
        file: PathBuf,
        graph: usize,

        /// Node id to inspect.
        #[arg(long, conflicts_with = "edge")]
        node: Option<i64>,

        /// Edge index to inspect.
        #[arg(long)]
        edge: Option<u32>,
    },

    /// Print a node's input and output edges.
    Edges {
        file: PathBuf,
        graph: usize,

        /// Node id to inspect.
        #[arg(long)]
        node: i64,

        /// Skip simplification passes and show the decoded graph as-is.
        #[arg(long)]
        raw: bool,
    },

    /// Print a node's source-position chain, innermost frame first.
    Source {
        file: PathBuf,
        graph: usize,

        /// Node id to inspect.
        #[arg(long)]
        node: i64,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::stderr)
            .init();
    }

    let lenient = cli.lenient;
    let exit_code = match cli.command {
        Commands::List { file } => run_list(&file, lenient),
        Commands::Summary { file, graph } => run_summary(&file, graph, lenient),
        Commands::Props {
            file,
            graph,
            node,
            edge,
        } => run_props(&file, graph, node, edge, lenient),
        Commands::Edges {
            file,
            graph,
            node,
            raw,
        } => run_edges(&file, graph, node, raw, lenient),
        Commands::Source { file, graph, node } => run_source(&file, graph, node, lenient),
    };
    process::exit(exit_code);
}

/// Opens and indexes a dump file.
///
/// Returns exit code on failure: 2 = decode error, 3 = I/O error.
fn open_file(path: &Path, lenient: bool) -> Result<GraphFile, i32> {
    match GraphFile::open_with(path, DecodeOptions { lenient }) {
        Ok(file) => Ok(file),
        Err(DecodeError::Io(e)) => {
            eprintln!("Error: failed to read '{}': {}", path.display(), e);
            Err(3)
        }
        Err(e) => {
            eprintln!("Error: failed to decode '{}': {}", path.display(), e);
            Err(2)
        }
    }
}

/// Decodes one graph by index. A bad index is a usage error (1), anything
/// else a decode error (2).
fn decode_graph(file: &GraphFile, index: usize) -> Result<Graph, i32> {
    match file.decode_graph(index) {
        Ok(graph) => Ok(graph),
        Err(DecodeError::GraphNotFound { index, count }) => {
            eprintln!(
                "Error: graph index {} out of range (file has {} graphs)",
                index, count
            );
            Err(1)
        }
        Err(e) => {
            eprintln!("Error: failed to decode graph {}: {}", index, e);
            Err(2)
        }
    }
}

fn run_list(path: &Path, lenient: bool) -> i32 {
    let file = match open_file(path, lenient) {
        Ok(file) => file,
        Err(code) => return code,
    };
    for entry in file.graphs() {
        println!("{:>4}  {}", entry.index, entry.name);
    }
    0
}

fn run_summary(path: &Path, graph: usize, lenient: bool) -> i32 {
    let file = match open_file(path, lenient) {
        Ok(file) => file,
        Err(code) => return code,
    };
    let graph = match decode_graph(&file, graph) {
        Ok(graph) => graph,
        Err(code) => return code,
    };
    let summary = graph.summary();
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize summary: {}", e);
            1
        }
    }
}

fn run_props(
    path: &Path,
    graph: usize,
    node: Option<i64>,
    edge: Option<u32>,
    lenient: bool,
) -> i32 {
    let file = match open_file(path, lenient) {
        Ok(file) => file,
        Err(code) => return code,
    };
    let graph = match decode_graph(&file, graph) {
        Ok(graph) => graph,
        Err(code) => return code,
    };
    let props = match (node, edge) {
        (Some(id), None) => match graph.node(NodeId(id)) {
            Ok(node) => &node.props,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        (None, Some(index)) => match graph.edge(EdgeId(index)) {
            Ok(edge) => &edge.props,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        (None, None) => &graph.props,
        (Some(_), Some(_)) => unreachable!("clap rejects --node with --edge"),
    };
    match serde_json::to_string_pretty(props) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize properties: {}", e);
            1
        }
    }
}

fn run_edges(path: &Path, graph_index: usize, node: i64, raw: bool, lenient: bool) -> i32 {
    let file = match open_file(path, lenient) {
        Ok(file) => file,
        Err(code) => return code,
    };
    let mut graph = match decode_graph(&file, graph_index) {
        Ok(graph) => graph,
        Err(code) => return code,
    };
    if !raw {
        if let Err(e) = Pipeline::standard().apply(&mut graph) {
            eprintln!("Error: simplification failed: {}", e);
            return 1;
        }
    }

    let id = NodeId(node);
    if !graph.contains_node(id) {
        eprintln!("Error: node {} not found in graph {}", node, graph_index);
        return 1;
    }
    let print_side = |label: &str, edges: Vec<(EdgeId, &irview_core::Edge)>| {
        println!("{}:", label);
        for (eid, edge) in edges {
            // After simplification only the edges a renderer would draw.
            if !raw && !graph.edge_visible(eid).unwrap_or(false) {
                continue;
            }
            let slot = edge.label().or(edge.name()).unwrap_or("-");
            println!(
                "  {} --{}--> {}",
                endpoint(&graph, edge.from),
                slot,
                endpoint(&graph, edge.to)
            );
        }
    };
    match (graph.inputs(id), graph.outputs(id)) {
        (Ok(inputs), Ok(outputs)) => {
            print_side("inputs", inputs);
            print_side("outputs", outputs);
            0
        }
        _ => {
            eprintln!("Error: node {} not found in graph {}", node, graph_index);
            1
        }
    }
}

/// Formats a node endpoint as `id (label)` when a label is available.
fn endpoint(graph: &Graph, id: NodeId) -> String {
    match graph.node(id).ok().and_then(|node| node.label()) {
        Some(label) => format!("{} ({})", id, label),
        None => id.to_string(),
    }
}

fn run_source(path: &Path, graph_index: usize, node: i64, lenient: bool) -> i32 {
    let file = match open_file(path, lenient) {
        Ok(file) => file,
        Err(code) => return code,
    };
    let graph = match decode_graph(&file, graph_index) {
        Ok(graph) => graph,
        Err(code) => return code,
    };
    match graph.source_chain(NodeId(node)) {
        Ok(Some(frames)) => {
            for frame in frames {
                println!("{}", frame);
            }
            0
        }
        Ok(None) => {
            println!("no source position recorded");
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}
