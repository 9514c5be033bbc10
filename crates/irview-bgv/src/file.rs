//! The open-document facade.
//!
//! [`GraphFile`] owns the (decompressed) document bytes, the header
//! version, and an index of every graph in the file: dense zero-based
//! index, the non-unique id embedded in the format, the composed name,
//! and the byte offset of the graph's GRAPH_BEGIN record. Offsets are
//! computed once at open and are stable for the lifetime of the file.
//!
//! A fresh [`ConstantPool`] is created for every open and every decode;
//! pool state never leaks across unrelated files, and a decode failure
//! for one index leaves every other index usable.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use irview_core::{Graph, GraphIndex};

use crate::builder;
use crate::decoder::{DecodeOptions, StreamDecoder};
use crate::error::DecodeError;
use crate::pool::ConstantPool;
use crate::reader::maybe_gunzip;
use crate::records::Record;

/// Index entry for one graph in an open document.
#[derive(Debug, Clone, Serialize)]
pub struct GraphEntry {
    /// Dense, zero-based position within the file.
    pub index: GraphIndex,
    /// Graph id embedded in the format (not unique).
    pub id: i32,
    /// Composed name, e.g. `"17:Fib.fib(int)/After parsing"`.
    pub name: String,
    /// Byte offset of the GRAPH_BEGIN record in the decompressed document.
    pub offset: usize,
}

/// A parsed-or-lazily-indexed binary graph document.
#[derive(Debug)]
pub struct GraphFile {
    data: Vec<u8>,
    version: (u8, u8),
    entries: Vec<GraphEntry>,
    options: DecodeOptions,
}

impl GraphFile {
    /// Opens and indexes a dump file with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        Self::open_with(path, DecodeOptions::default())
    }

    /// Opens and indexes a dump file.
    pub fn open_with(path: impl AsRef<Path>, options: DecodeOptions) -> Result<Self, DecodeError> {
        let bytes = fs::read(path)?;
        Self::from_bytes_with(bytes, options)
    }

    /// Indexes an in-memory document with default options.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        Self::from_bytes_with(bytes, DecodeOptions::default())
    }

    /// Indexes an in-memory document. The gzip envelope, if any, is
    /// unwrapped here so record offsets refer to decompressed bytes.
    pub fn from_bytes_with(bytes: Vec<u8>, options: DecodeOptions) -> Result<Self, DecodeError> {
        let data = maybe_gunzip(bytes)?;
        let mut decoder = StreamDecoder::new(&data, options)?;
        let version = decoder.version();

        // One indexing scan: group/graph headers and pool defines are
        // decoded (names need the pool), graph bodies are skipped.
        let mut pool = ConstantPool::new();
        let mut groups: Vec<String> = Vec::new();
        let mut entries = Vec::new();
        loop {
            let offset = decoder.offset();
            let record = match decoder.next_record(&mut pool)? {
                Some(record) => record,
                None => break,
            };
            match record {
                Record::GroupBegin(header) => {
                    groups.push(pool.resolve_string(header.name)?);
                }
                Record::GroupEnd => {
                    groups.pop();
                }
                Record::GraphBegin(header) => {
                    let args = header
                        .args
                        .iter()
                        .map(|arg| builder::resolve_value(&pool, arg))
                        .collect::<Result<Vec<_>, _>>()?;
                    let own_name = builder::format_graph_name(&header.format, &args);
                    entries.push(GraphEntry {
                        index: GraphIndex(entries.len()),
                        id: header.id,
                        name: builder::compose_name(&groups, &own_name),
                        offset,
                    });
                    decoder.skip_graph_body(&mut pool)?;
                }
                Record::DocumentEnd => break,
                Record::PoolDefine { .. } | Record::Unknown { .. } => {}
                // Graph-body records are invalid outside a graph; rejecting
                // them here keeps indexing in agreement with seeking.
                other => {
                    return Err(DecodeError::UnexpectedRecord {
                        tag: other.tag(),
                        offset,
                    });
                }
            }
        }
        debug!(graphs = entries.len(), ?version, "indexed document");

        Ok(GraphFile {
            data,
            version,
            entries,
            options,
        })
    }

    /// Format version from the document header.
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// The graph index: one entry per graph, in file order.
    pub fn graphs(&self) -> &[GraphEntry] {
        &self.entries
    }

    pub fn graph_count(&self) -> usize {
        self.entries.len()
    }

    /// Decodes exactly one graph, seeking past earlier graphs without
    /// materializing them (their pool defines are still applied).
    pub fn decode_graph(&self, index: usize) -> Result<Graph, DecodeError> {
        if index >= self.entries.len() {
            return Err(DecodeError::GraphNotFound {
                index,
                count: self.entries.len(),
            });
        }
        let mut decoder = StreamDecoder::new(&self.data, self.options)?;
        let mut pool = ConstantPool::new();
        let group_path = decoder.seek_to_graph(index, &mut pool)?;
        let offset = decoder.offset();
        match decoder.next_record(&mut pool)? {
            Some(Record::GraphBegin(header)) => {
                builder::build_graph(&mut decoder, &mut pool, &header, &group_path)
            }
            _ => Err(DecodeError::TruncatedStream { offset }),
        }
    }

    /// Decodes every graph sequentially in one pass over the document.
    pub fn decode_all(&self) -> Result<Vec<Graph>, DecodeError> {
        let mut decoder = StreamDecoder::new(&self.data, self.options)?;
        let mut pool = ConstantPool::new();
        let mut groups: Vec<String> = Vec::new();
        let mut graphs = Vec::new();
        loop {
            let offset = decoder.offset();
            let record = match decoder.next_record(&mut pool)? {
                Some(record) => record,
                None => break,
            };
            match record {
                Record::GroupBegin(header) => {
                    groups.push(pool.resolve_string(header.name)?);
                }
                Record::GroupEnd => {
                    groups.pop();
                }
                Record::GraphBegin(header) => {
                    graphs.push(builder::build_graph(
                        &mut decoder,
                        &mut pool,
                        &header,
                        &groups,
                    )?);
                }
                Record::DocumentEnd => break,
                Record::PoolDefine { .. } | Record::Unknown { .. } => {}
                other => {
                    return Err(DecodeError::UnexpectedRecord {
                        tag: other.tag(),
                        offset,
                    });
                }
            }
        }
        Ok(graphs)
    }
}
