//! A hand-rolled document writer mirroring the wire format, used to build
//! test fixtures without shipping binary blobs.

#![allow(dead_code)]

use std::io::Write;

/// A property value to encode.
#[derive(Debug, Clone)]
pub enum Val {
    Ref(u32),
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(&'static str),
    List(Vec<Val>),
    Map(Vec<(&'static str, Val)>),
}

fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_varint(buf, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn write_value(buf: &mut Vec<u8>, value: &Val) {
    match value {
        Val::Ref(id) => {
            buf.push(0x00);
            write_varint(buf, u64::from(*id));
        }
        Val::Int(i) => {
            buf.push(0x01);
            buf.extend_from_slice(&i.to_be_bytes());
        }
        Val::Float(x) => {
            buf.push(0x02);
            buf.extend_from_slice(&x.to_be_bytes());
        }
        Val::Bool(true) => buf.push(0x03),
        Val::Bool(false) => buf.push(0x04),
        Val::Str(s) => {
            buf.push(0x05);
            write_string(buf, s);
        }
        Val::List(items) => {
            buf.push(0x06);
            write_varint(buf, items.len() as u64);
            for item in items {
                write_value(buf, item);
            }
        }
        Val::Map(entries) => {
            buf.push(0x07);
            write_varint(buf, entries.len() as u64);
            for (key, item) in entries {
                write_string(buf, key);
                write_value(buf, item);
            }
        }
    }
}

fn write_props(buf: &mut Vec<u8>, props: &[(&str, Val)]) {
    write_varint(buf, props.len() as u64);
    for (key, value) in props {
        write_string(buf, key);
        write_value(buf, value);
    }
}

fn write_opt_ref(buf: &mut Vec<u8>, id: Option<u32>) {
    match id {
        Some(id) => {
            buf.push(1);
            write_varint(buf, u64::from(id));
        }
        None => buf.push(0),
    }
}

/// Builds one framed document, record by record.
pub struct DocWriter {
    buf: Vec<u8>,
}

impl DocWriter {
    pub fn new(major: u8, minor: u8) -> Self {
        let mut buf = b"BIGV".to_vec();
        buf.push(major);
        buf.push(minor);
        DocWriter { buf }
    }

    /// Appends a framed record: tag, u32 big-endian body length, body.
    pub fn record(&mut self, tag: u8, body: &[u8]) -> &mut Self {
        self.buf.push(tag);
        self.buf
            .extend_from_slice(&(body.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(body);
        self
    }

    /// Appends a record frame with a deliberately wrong declared length.
    pub fn record_with_length(&mut self, tag: u8, len: u32, body: &[u8]) -> &mut Self {
        self.buf.push(tag);
        self.buf.extend_from_slice(&len.to_be_bytes());
        self.buf.extend_from_slice(body);
        self
    }

    // -- pool ----------------------------------------------------------------

    pub fn define_string(&mut self, id: u32, s: &str) -> &mut Self {
        let mut body = Vec::new();
        write_varint(&mut body, u64::from(id));
        body.push(0x00);
        write_string(&mut body, s);
        self.record(0x04, &body)
    }

    pub fn define_enum(&mut self, id: u32, name: &str, ordinal: i32) -> &mut Self {
        let mut body = Vec::new();
        write_varint(&mut body, u64::from(id));
        body.push(0x01);
        write_string(&mut body, name);
        body.extend_from_slice(&ordinal.to_be_bytes());
        self.record(0x04, &body)
    }

    pub fn define_class(&mut self, id: u32, name: &str) -> &mut Self {
        let mut body = Vec::new();
        write_varint(&mut body, u64::from(id));
        body.push(0x02);
        write_string(&mut body, name);
        self.record(0x04, &body)
    }

    pub fn define_method(&mut self, id: u32, declaring: u32, name: u32, sig: &str) -> &mut Self {
        let mut body = Vec::new();
        write_varint(&mut body, u64::from(id));
        body.push(0x03);
        write_varint(&mut body, u64::from(declaring));
        write_varint(&mut body, u64::from(name));
        write_string(&mut body, sig);
        self.record(0x04, &body)
    }

    pub fn define_node_class(&mut self, id: u32, class: u32) -> &mut Self {
        let mut body = Vec::new();
        write_varint(&mut body, u64::from(id));
        body.push(0x04);
        write_varint(&mut body, u64::from(class));
        self.record(0x04, &body)
    }

    pub fn define_source_position(
        &mut self,
        id: u32,
        method: u32,
        bci: i32,
        caller: Option<u32>,
    ) -> &mut Self {
        let mut body = Vec::new();
        write_varint(&mut body, u64::from(id));
        body.push(0x05);
        write_varint(&mut body, u64::from(method));
        body.extend_from_slice(&bci.to_be_bytes());
        write_opt_ref(&mut body, caller);
        self.record(0x04, &body)
    }

    // -- structure -----------------------------------------------------------

    pub fn group_begin(&mut self, name: u32, short_name: u32, method: Option<u32>) -> &mut Self {
        let mut body = Vec::new();
        write_varint(&mut body, u64::from(name));
        write_varint(&mut body, u64::from(short_name));
        write_opt_ref(&mut body, method);
        body.extend_from_slice(&(-1i32).to_be_bytes());
        write_props(&mut body, &[]);
        self.record(0x00, &body)
    }

    pub fn group_end(&mut self) -> &mut Self {
        self.record(0x01, &[])
    }

    pub fn graph_begin(
        &mut self,
        id: i32,
        format: &str,
        args: &[Val],
        props: &[(&str, Val)],
    ) -> &mut Self {
        let mut body = Vec::new();
        body.extend_from_slice(&id.to_be_bytes());
        write_string(&mut body, format);
        write_varint(&mut body, args.len() as u64);
        for arg in args {
            write_value(&mut body, arg);
        }
        write_props(&mut body, props);
        self.record(0x02, &body)
    }

    pub fn graph_end(&mut self) -> &mut Self {
        self.record(0x03, &[])
    }

    pub fn node(&mut self, id: i32, node_class: u32, props: &[(&str, Val)]) -> &mut Self {
        let mut body = Vec::new();
        body.extend_from_slice(&id.to_be_bytes());
        write_varint(&mut body, u64::from(node_class));
        write_props(&mut body, props);
        self.record(0x05, &body)
    }

    pub fn edge(&mut self, from: i32, to: i32, props: &[(&str, Val)]) -> &mut Self {
        let mut body = Vec::new();
        body.extend_from_slice(&from.to_be_bytes());
        body.extend_from_slice(&to.to_be_bytes());
        write_props(&mut body, props);
        self.record(0x06, &body)
    }

    pub fn set_graph_prop(&mut self, key: &str, value: &Val) -> &mut Self {
        let mut body = vec![0u8];
        body.extend_from_slice(&0i32.to_be_bytes());
        write_string(&mut body, key);
        write_value(&mut body, value);
        self.record(0x07, &body)
    }

    pub fn set_node_prop(&mut self, node: i32, key: &str, value: &Val) -> &mut Self {
        let mut body = vec![1u8];
        body.extend_from_slice(&node.to_be_bytes());
        write_string(&mut body, key);
        write_value(&mut body, value);
        self.record(0x07, &body)
    }

    pub fn doc_end(&mut self) -> &mut Self {
        self.record(0x08, &[])
    }

    pub fn finish(&self) -> Vec<u8> {
        self.buf.clone()
    }

    pub fn finish_gzipped(&self) -> Vec<u8> {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&self.buf).unwrap();
        encoder.finish().unwrap()
    }
}
