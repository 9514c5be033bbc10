//! Decode error types.
//!
//! Every stream-level variant carries the byte offset (into the
//! decompressed document) where decoding failed, so a malformed input can
//! be diagnosed against a hex dump. Decode errors are fatal to the current
//! read operation but never corrupt graphs already materialized for other
//! indices.

use thiserror::Error;

/// Errors produced while decoding a graph dump document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The magic/version prefix is absent or the major version unsupported.
    #[error("malformed header: {reason}")]
    MalformedHeader { reason: String },

    /// A record's declared length (or a primitive read) exceeds the
    /// remaining bytes.
    #[error("truncated stream at byte {offset}")]
    TruncatedStream { offset: usize },

    /// An unrecognized record tag. Recoverable in lenient mode, where the
    /// record is reported and skipped by its declared length.
    #[error("unknown record tag 0x{tag:02x} at byte {offset}")]
    UnknownRecordTag { tag: u8, offset: usize },

    /// A structurally valid record appeared where the grammar forbids it
    /// (e.g. a group header inside a graph's record block).
    #[error("unexpected record tag 0x{tag:02x} at byte {offset}")]
    UnexpectedRecord { tag: u8, offset: usize },

    /// A string payload was not valid UTF-8.
    #[error("invalid string at byte {offset}")]
    InvalidString { offset: usize },

    /// A variable-length integer was overlong or ran past the stream.
    #[error("invalid varint at byte {offset}")]
    InvalidVarint { offset: usize },

    /// A pool id was referenced but never defined.
    #[error("unresolved pool reference: {id}")]
    UnresolvedPoolReference { id: u32 },

    /// A pool value transitively references itself.
    #[error("constant pool cycle through id {id}")]
    PoolCycleDetected { id: u32 },

    /// An edge or property record named a node id not defined in the graph.
    #[error("dangling edge reference to node {node} at byte {offset}")]
    DanglingEdgeReference { node: i64, offset: usize },

    /// A graph index past the end of the document was requested.
    #[error("graph index {index} out of range (document has {count} graphs)")]
    GraphNotFound { index: usize, count: usize },

    /// Reading the underlying byte source failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
