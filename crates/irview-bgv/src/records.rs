//! Record and value wire definitions.
//!
//! Every record is framed as `tag: u8`, `len: u32 BE`, then `len` body
//! bytes, which is what makes graph skipping and lenient unknown-record
//! recovery possible. Property values inside bodies are tagged unions that
//! may embed pool references; they stay raw here and are resolved by the
//! builder against the live pool.

use crate::error::DecodeError;
use crate::reader::ByteReader;

/// Record tags.
pub mod tag {
    pub const GROUP_BEGIN: u8 = 0x00;
    pub const GROUP_END: u8 = 0x01;
    pub const GRAPH_BEGIN: u8 = 0x02;
    pub const GRAPH_END: u8 = 0x03;
    pub const POOL_DEFINE: u8 = 0x04;
    pub const NODE_DEFINE: u8 = 0x05;
    pub const EDGE_DEFINE: u8 = 0x06;
    pub const PROPERTY_SET: u8 = 0x07;
    pub const DOC_END: u8 = 0x08;
}

/// Property value tags.
pub mod value_tag {
    pub const POOL_REF: u8 = 0x00;
    pub const INT: u8 = 0x01;
    pub const FLOAT: u8 = 0x02;
    pub const TRUE: u8 = 0x03;
    pub const FALSE: u8 = 0x04;
    pub const STRING: u8 = 0x05;
    pub const LIST: u8 = 0x06;
    pub const MAP: u8 = 0x07;
}

/// Pool value tags.
pub mod pool_tag {
    pub const STRING: u8 = 0x00;
    pub const ENUM: u8 = 0x01;
    pub const CLASS: u8 = 0x02;
    pub const METHOD: u8 = 0x03;
    pub const NODE_CLASS: u8 = 0x04;
    pub const SOURCE_POSITION: u8 = 0x05;
}

/// An undecoded property value; pool references are left as ids.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    PoolRef(u32),
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    List(Vec<RawValue>),
    Map(Vec<(String, RawValue)>),
}

/// A raw property block: ordered key/value pairs.
pub type RawProps = Vec<(String, RawValue)>;

/// GROUP_BEGIN body.
#[derive(Debug, Clone)]
pub struct GroupHeader {
    /// Pool ref to the group's display name, e.g. `"17:Fib.fib(int)"`.
    pub name: u32,
    /// Pool ref to the short name.
    pub short_name: u32,
    /// Pool ref to the compile-unit method descriptor, when present.
    pub method: Option<u32>,
    pub bci: i32,
    pub props: RawProps,
}

/// GRAPH_BEGIN body.
#[derive(Debug, Clone)]
pub struct GraphHeader {
    /// Graph id embedded in the format; not unique within a file.
    pub id: i32,
    /// Phase-name format string; `%s` placeholders consume `args`.
    pub format: String,
    pub args: Vec<RawValue>,
    pub props: RawProps,
}

/// NODE_DEFINE body.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub id: i32,
    /// Pool ref to the node class.
    pub node_class: u32,
    pub props: RawProps,
}

/// EDGE_DEFINE body.
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub from: i32,
    pub to: i32,
    pub props: RawProps,
}

/// PROPERTY_SET target discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyTarget {
    Graph,
    Node,
}

/// PROPERTY_SET body.
#[derive(Debug, Clone)]
pub struct PropertySetRecord {
    pub target: PropertyTarget,
    /// Node id for node targets; ignored for the graph target.
    pub id: i32,
    pub key: String,
    pub value: RawValue,
}

/// One decoded record.
#[derive(Debug, Clone)]
pub enum Record {
    GroupBegin(GroupHeader),
    GroupEnd,
    GraphBegin(GraphHeader),
    GraphEnd,
    /// Pool slot `id` was (re)bound; the decoder has already applied it.
    PoolDefine { id: u32 },
    NodeDefine(NodeRecord),
    EdgeDefine(EdgeRecord),
    PropertySet(PropertySetRecord),
    DocumentEnd,
    /// An unrecognized tag skipped in lenient mode.
    Unknown { tag: u8 },
}

impl Record {
    /// The wire tag this record was framed with.
    pub fn tag(&self) -> u8 {
        match self {
            Record::GroupBegin(_) => tag::GROUP_BEGIN,
            Record::GroupEnd => tag::GROUP_END,
            Record::GraphBegin(_) => tag::GRAPH_BEGIN,
            Record::GraphEnd => tag::GRAPH_END,
            Record::PoolDefine { .. } => tag::POOL_DEFINE,
            Record::NodeDefine(_) => tag::NODE_DEFINE,
            Record::EdgeDefine(_) => tag::EDGE_DEFINE,
            Record::PropertySet(_) => tag::PROPERTY_SET,
            Record::DocumentEnd => tag::DOC_END,
            Record::Unknown { tag } => *tag,
        }
    }
}

/// Reads a tagged raw value.
pub fn read_raw_value(r: &mut ByteReader<'_>) -> Result<RawValue, DecodeError> {
    let offset = r.offset();
    let tag = r.read_u8()?;
    Ok(match tag {
        value_tag::POOL_REF => RawValue::PoolRef(r.read_varint()? as u32),
        value_tag::INT => RawValue::Int(r.read_i64()?),
        value_tag::FLOAT => RawValue::Float(r.read_f64()?),
        value_tag::TRUE => RawValue::Bool(true),
        value_tag::FALSE => RawValue::Bool(false),
        value_tag::STRING => RawValue::String(r.read_string()?),
        value_tag::LIST => {
            let count = r.read_varint()? as usize;
            let mut items = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                items.push(read_raw_value(r)?);
            }
            RawValue::List(items)
        }
        value_tag::MAP => {
            let count = r.read_varint()? as usize;
            let mut entries = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                let key = r.read_string()?;
                entries.push((key, read_raw_value(r)?));
            }
            RawValue::Map(entries)
        }
        _ => return Err(DecodeError::UnexpectedRecord { tag, offset }),
    })
}

/// Reads a property block.
pub fn read_raw_props(r: &mut ByteReader<'_>) -> Result<RawProps, DecodeError> {
    let count = r.read_varint()? as usize;
    let mut props = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let key = r.read_string()?;
        props.push((key, read_raw_value(r)?));
    }
    Ok(props)
}

/// Reads an optional pool reference (flag byte then varint).
pub fn read_opt_pool_ref(r: &mut ByteReader<'_>) -> Result<Option<u32>, DecodeError> {
    if r.read_u8()? != 0 {
        Ok(Some(r.read_varint()? as u32))
    } else {
        Ok(None)
    }
}
