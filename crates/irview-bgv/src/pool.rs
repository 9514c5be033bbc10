//! The constant pool.
//!
//! Dump files avoid repeating strings, method descriptors, and node
//! classes by defining them once in a pool and embedding small integer
//! references everywhere else. The pool is a write-once-per-generation
//! slot array: defining an id again rebinds the slot, values already
//! resolved from the old binding are unaffected, and every later
//! reference sees the newest value.
//!
//! Composite values (methods, source positions) themselves reference
//! other pool ids and resolve recursively; a transitively self-referencing
//! value fails with `PoolCycleDetected`.

use std::collections::HashMap;

use irview_core::PropValue;

use crate::error::DecodeError;

/// A typed value stored in the pool. Composite variants hold unresolved
/// references to other pool ids.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolValue {
    /// A plain string.
    Str(String),
    /// An enum constant with its declared ordinal.
    Enum { name: String, ordinal: i32 },
    /// A class descriptor.
    Class { name: String },
    /// A method descriptor; `declaring` and `name` reference other slots.
    Method {
        declaring: u32,
        name: u32,
        signature: String,
    },
    /// A compiler node class; `class` references a class slot.
    NodeClass { class: u32 },
    /// A source position; `caller` chains to another source position.
    SourcePosition {
        method: u32,
        bci: i32,
        caller: Option<u32>,
    },
}

/// The shared, rebindable id -> value table for one open document.
#[derive(Debug, Default)]
pub struct ConstantPool {
    slots: HashMap<u32, PoolValue>,
}

impl ConstantPool {
    pub fn new() -> Self {
        ConstantPool::default()
    }

    /// Binds (or rebinds) a slot to a new value.
    pub fn define(&mut self, id: u32, value: PoolValue) {
        self.slots.insert(id, value);
    }

    /// Returns the current raw binding of a slot.
    pub fn get(&self, id: u32) -> Result<&PoolValue, DecodeError> {
        self.slots
            .get(&id)
            .ok_or(DecodeError::UnresolvedPoolReference { id })
    }

    /// Resolves a slot to a property value, following composite references.
    pub fn resolve(&self, id: u32) -> Result<PropValue, DecodeError> {
        let mut seen = Vec::new();
        self.resolve_inner(id, &mut seen)
    }

    /// Resolves a slot that must produce a string (names, classes, methods).
    pub fn resolve_string(&self, id: u32) -> Result<String, DecodeError> {
        match self.resolve(id)? {
            PropValue::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    fn resolve_inner(&self, id: u32, seen: &mut Vec<u32>) -> Result<PropValue, DecodeError> {
        if seen.contains(&id) {
            return Err(DecodeError::PoolCycleDetected { id });
        }
        seen.push(id);
        let result = match self.get(id)? {
            PoolValue::Str(s) => PropValue::String(s.clone()),
            PoolValue::Enum { name, .. } => PropValue::String(name.clone()),
            PoolValue::Class { name } => PropValue::String(name.clone()),
            PoolValue::Method {
                declaring,
                name,
                signature,
            } => {
                let declaring = self.resolve_inner(*declaring, seen)?;
                let name = self.resolve_inner(*name, seen)?;
                PropValue::String(format!("{}.{}{}", declaring, name, signature))
            }
            PoolValue::NodeClass { class } => self.resolve_inner(*class, seen)?,
            PoolValue::SourcePosition { .. } => {
                PropValue::List(self.resolve_frames(id, seen)?)
            }
        };
        seen.pop();
        Ok(result)
    }

    /// Walks a source-position caller chain into frame strings, innermost
    /// first. The chain shares the caller's seen-set so a circular chain
    /// is detected rather than looped.
    fn resolve_frames(
        &self,
        id: u32,
        seen: &mut Vec<u32>,
    ) -> Result<Vec<PropValue>, DecodeError> {
        let mut frames = Vec::new();
        let mut current = Some(id);
        let mut visited = Vec::new();
        while let Some(sp_id) = current {
            if visited.contains(&sp_id) {
                return Err(DecodeError::PoolCycleDetected { id: sp_id });
            }
            visited.push(sp_id);
            match self.get(sp_id)? {
                PoolValue::SourcePosition {
                    method,
                    bci,
                    caller,
                } => {
                    let method = self.resolve_inner(*method, seen)?;
                    frames.push(PropValue::String(format!("{} (bci {})", method, bci)));
                    current = *caller;
                }
                // A caller chain must consist of source positions.
                _ => return Err(DecodeError::UnresolvedPoolReference { id: sp_id }),
            }
        }
        Ok(frames)
    }
}
