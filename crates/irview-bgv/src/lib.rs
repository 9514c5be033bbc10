//! Binary decoder for framed compiler-graph dump files.
//!
//! A dump file is a versioned, optionally gzip-wrapped stream of
//! length-framed records: group headers, constant-pool definitions, and
//! per-graph node/edge/property records. This crate turns that byte stream
//! into [`irview_core::Graph`] values, either sequentially or by seeking to
//! a single graph without materializing the ones before it.
//!
//! # Modules
//!
//! - [`error`]: `DecodeError` with byte-offset context
//! - [`reader`]: gzip detection, varints, fixed-width primitives
//! - [`records`]: record tags and raw (pool-referencing) values
//! - [`pool`]: the rebindable, recursively-resolving constant pool
//! - [`decoder`]: framed record iteration, graph skipping, seeking
//! - [`builder`]: record sequence for one graph -> `Graph`
//! - [`file`]: `GraphFile`, the indexed open-document facade

pub mod builder;
pub mod decoder;
pub mod error;
pub mod file;
pub mod pool;
pub mod reader;
pub mod records;

pub use decoder::{DecodeOptions, StreamDecoder};
pub use error::DecodeError;
pub use file::{GraphEntry, GraphFile};
pub use pool::{ConstantPool, PoolValue};
pub use records::Record;
