//! The framed record decoder.
//!
//! [`StreamDecoder`] checks the magic/version header, then yields one
//! [`Record`] at a time without materializing the document. Pool-define
//! records are applied to the caller's [`ConstantPool`] as they are read,
//! because pool state is global across every graph in the document.
//!
//! Skipping is the decoder's second job: [`StreamDecoder::seek_to_graph`]
//! scans record headers, fully decoding only pool defines and group/graph
//! headers, and length-skips node/edge/property bodies; no Node or Edge
//! values exist for skipped graphs.

use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::pool::{ConstantPool, PoolValue};
use crate::reader::ByteReader;
use crate::records::{
    self, pool_tag, tag, EdgeRecord, GraphHeader, GroupHeader, NodeRecord, PropertySetRecord,
    PropertyTarget, Record,
};

/// Document magic.
pub const MAGIC: &[u8; 4] = b"BIGV";
/// Accepted major versions.
pub const SUPPORTED_MAJORS: std::ops::RangeInclusive<u8> = 6..=8;

/// Decode behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Report and skip unknown record tags instead of failing. Meant for
    /// debugging dumps from newer producers.
    pub lenient: bool,
}

/// A cursor-based decoder over one (decompressed) document.
#[derive(Debug)]
pub struct StreamDecoder<'a> {
    reader: ByteReader<'a>,
    version: (u8, u8),
    options: DecodeOptions,
}

impl<'a> StreamDecoder<'a> {
    /// Validates the header and positions the decoder at the first record.
    pub fn new(data: &'a [u8], options: DecodeOptions) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(data);
        let magic = reader.take(4).map_err(|_| DecodeError::MalformedHeader {
            reason: "document shorter than the magic prefix".to_string(),
        })?;
        if magic != MAGIC {
            return Err(DecodeError::MalformedHeader {
                reason: format!("bad magic {:02x?}, expected \"BIGV\"", magic),
            });
        }
        let major = reader.read_u8().map_err(|_| DecodeError::MalformedHeader {
            reason: "missing version bytes".to_string(),
        })?;
        let minor = reader.read_u8().map_err(|_| DecodeError::MalformedHeader {
            reason: "missing version bytes".to_string(),
        })?;
        if !SUPPORTED_MAJORS.contains(&major) {
            return Err(DecodeError::MalformedHeader {
                reason: format!("unsupported format version {}.{}", major, minor),
            });
        }
        Ok(StreamDecoder {
            reader,
            version: (major, minor),
            options,
        })
    }

    /// Format version from the header.
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// Current byte offset into the decompressed document.
    pub fn offset(&self) -> usize {
        self.reader.offset()
    }

    /// Rewinds to a record boundary captured earlier via [`Self::offset`].
    pub fn seek(&mut self, offset: usize) {
        self.reader.seek(offset);
    }

    /// Reads the next record, applying pool defines to `pool`. Returns
    /// `None` at the physical end of the stream.
    pub fn next_record(
        &mut self,
        pool: &mut ConstantPool,
    ) -> Result<Option<Record>, DecodeError> {
        if self.reader.is_at_end() {
            return Ok(None);
        }
        let record_offset = self.reader.offset();
        let (tag_byte, body_end) = self.read_frame(record_offset)?;

        let record = match tag_byte {
            tag::GROUP_BEGIN => Record::GroupBegin(self.read_group_header()?),
            tag::GROUP_END => Record::GroupEnd,
            tag::GRAPH_BEGIN => {
                let header = self.read_graph_header()?;
                debug!(id = header.id, offset = record_offset, "graph header");
                Record::GraphBegin(header)
            }
            tag::GRAPH_END => Record::GraphEnd,
            tag::POOL_DEFINE => {
                let id = self.reader.read_varint()? as u32;
                let value = self.read_pool_value()?;
                pool.define(id, value);
                Record::PoolDefine { id }
            }
            tag::NODE_DEFINE => Record::NodeDefine(self.read_node_record()?),
            tag::EDGE_DEFINE => Record::EdgeDefine(self.read_edge_record()?),
            tag::PROPERTY_SET => Record::PropertySet(self.read_property_set(record_offset)?),
            tag::DOC_END => Record::DocumentEnd,
            other => {
                if self.options.lenient {
                    warn!(
                        tag = other,
                        offset = record_offset,
                        "skipping unknown record"
                    );
                    self.reader.seek(body_end);
                    return Ok(Some(Record::Unknown { tag: other }));
                }
                return Err(DecodeError::UnknownRecordTag {
                    tag: other,
                    offset: record_offset,
                });
            }
        };

        if self.reader.offset() > body_end {
            // The body parser ran past the declared length.
            return Err(DecodeError::TruncatedStream {
                offset: record_offset,
            });
        }
        self.reader.seek(body_end);
        Ok(Some(record))
    }

    /// Consumes the record block of the current graph without building
    /// anything, keeping the pool consistent. The decoder must be
    /// positioned just after a GRAPH_BEGIN record.
    pub fn skip_graph_body(&mut self, pool: &mut ConstantPool) -> Result<(), DecodeError> {
        loop {
            let record_offset = self.reader.offset();
            if self.reader.is_at_end() {
                return Err(DecodeError::TruncatedStream {
                    offset: record_offset,
                });
            }
            let (tag_byte, body_end) = self.read_frame(record_offset)?;
            match tag_byte {
                tag::GRAPH_END => {
                    self.reader.seek(body_end);
                    return Ok(());
                }
                // Pool state is global; defines inside skipped graphs must
                // still be observed.
                tag::POOL_DEFINE => {
                    let id = self.reader.read_varint()? as u32;
                    let value = self.read_pool_value()?;
                    pool.define(id, value);
                    self.reader.seek(body_end);
                }
                tag::NODE_DEFINE | tag::EDGE_DEFINE | tag::PROPERTY_SET => {
                    self.reader.seek(body_end);
                }
                tag::GROUP_BEGIN | tag::GROUP_END | tag::GRAPH_BEGIN | tag::DOC_END => {
                    return Err(DecodeError::UnexpectedRecord {
                        tag: tag_byte,
                        offset: record_offset,
                    });
                }
                other => {
                    if self.options.lenient {
                        warn!(
                            tag = other,
                            offset = record_offset,
                            "skipping unknown record"
                        );
                        self.reader.seek(body_end);
                    } else {
                        return Err(DecodeError::UnknownRecordTag {
                            tag: other,
                            offset: record_offset,
                        });
                    }
                }
            }
        }
    }

    /// Positions the decoder at the GRAPH_BEGIN record of graph `index`,
    /// applying every pool define seen on the way. Returns the resolved
    /// names of the group stack enclosing that graph.
    pub fn seek_to_graph(
        &mut self,
        index: usize,
        pool: &mut ConstantPool,
    ) -> Result<Vec<String>, DecodeError> {
        let mut groups: Vec<String> = Vec::new();
        let mut count = 0usize;
        loop {
            let record_offset = self.reader.offset();
            let record = match self.next_record(pool)? {
                Some(record) => record,
                None => return Err(DecodeError::GraphNotFound { index, count }),
            };
            match record {
                Record::GroupBegin(header) => {
                    groups.push(pool.resolve_string(header.name)?);
                }
                Record::GroupEnd => {
                    groups.pop();
                }
                Record::GraphBegin(_) => {
                    if count == index {
                        self.reader.seek(record_offset);
                        return Ok(groups);
                    }
                    self.skip_graph_body(pool)?;
                    count += 1;
                }
                Record::PoolDefine { .. } | Record::Unknown { .. } => {}
                Record::DocumentEnd => {
                    return Err(DecodeError::GraphNotFound { index, count });
                }
                // Graph-body records are invalid outside a graph.
                other => {
                    return Err(DecodeError::UnexpectedRecord {
                        tag: other.tag(),
                        offset: record_offset,
                    });
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Frame and body parsing
    // -----------------------------------------------------------------------

    /// Reads `tag, len` and bounds-checks the declared body length.
    fn read_frame(&mut self, record_offset: usize) -> Result<(u8, usize), DecodeError> {
        let tag_byte = self.reader.read_u8()?;
        let len = self.reader.read_u32()? as usize;
        if len > self.reader.remaining() {
            return Err(DecodeError::TruncatedStream {
                offset: record_offset,
            });
        }
        Ok((tag_byte, self.reader.offset() + len))
    }

    fn read_group_header(&mut self) -> Result<GroupHeader, DecodeError> {
        let name = self.reader.read_varint()? as u32;
        let short_name = self.reader.read_varint()? as u32;
        let method = records::read_opt_pool_ref(&mut self.reader)?;
        let bci = self.reader.read_i32()?;
        let props = records::read_raw_props(&mut self.reader)?;
        Ok(GroupHeader {
            name,
            short_name,
            method,
            bci,
            props,
        })
    }

    fn read_graph_header(&mut self) -> Result<GraphHeader, DecodeError> {
        let id = self.reader.read_i32()?;
        let format = self.reader.read_string()?;
        let argc = self.reader.read_varint()? as usize;
        let mut args = Vec::with_capacity(argc.min(64));
        for _ in 0..argc {
            args.push(records::read_raw_value(&mut self.reader)?);
        }
        let props = records::read_raw_props(&mut self.reader)?;
        Ok(GraphHeader {
            id,
            format,
            args,
            props,
        })
    }

    fn read_node_record(&mut self) -> Result<NodeRecord, DecodeError> {
        let id = self.reader.read_i32()?;
        let node_class = self.reader.read_varint()? as u32;
        let props = records::read_raw_props(&mut self.reader)?;
        Ok(NodeRecord {
            id,
            node_class,
            props,
        })
    }

    fn read_edge_record(&mut self) -> Result<EdgeRecord, DecodeError> {
        let from = self.reader.read_i32()?;
        let to = self.reader.read_i32()?;
        let props = records::read_raw_props(&mut self.reader)?;
        Ok(EdgeRecord { from, to, props })
    }

    fn read_property_set(
        &mut self,
        record_offset: usize,
    ) -> Result<PropertySetRecord, DecodeError> {
        let target = match self.reader.read_u8()? {
            0 => PropertyTarget::Graph,
            1 => PropertyTarget::Node,
            other => {
                return Err(DecodeError::UnexpectedRecord {
                    tag: other,
                    offset: record_offset,
                })
            }
        };
        let id = self.reader.read_i32()?;
        let key = self.reader.read_string()?;
        let value = records::read_raw_value(&mut self.reader)?;
        Ok(PropertySetRecord {
            target,
            id,
            key,
            value,
        })
    }

    fn read_pool_value(&mut self) -> Result<PoolValue, DecodeError> {
        let offset = self.reader.offset();
        let tag_byte = self.reader.read_u8()?;
        Ok(match tag_byte {
            pool_tag::STRING => PoolValue::Str(self.reader.read_string()?),
            pool_tag::ENUM => PoolValue::Enum {
                name: self.reader.read_string()?,
                ordinal: self.reader.read_i32()?,
            },
            pool_tag::CLASS => PoolValue::Class {
                name: self.reader.read_string()?,
            },
            pool_tag::METHOD => PoolValue::Method {
                declaring: self.reader.read_varint()? as u32,
                name: self.reader.read_varint()? as u32,
                signature: self.reader.read_string()?,
            },
            pool_tag::NODE_CLASS => PoolValue::NodeClass {
                class: self.reader.read_varint()? as u32,
            },
            pool_tag::SOURCE_POSITION => PoolValue::SourcePosition {
                method: self.reader.read_varint()? as u32,
                bci: self.reader.read_i32()?,
                caller: records::read_opt_pool_ref(&mut self.reader)?,
            },
            other => {
                return Err(DecodeError::UnexpectedRecord {
                    tag: other,
                    offset,
                })
            }
        })
    }
}
