//! Variable value snapshots
//!
//! A snapshot is what a remote reader receives: the value of a variable at
//! the instant the runtime invoked its accessor.

use std::fmt;

use crate::PrimitiveKind;

/// Current value of a registered variable
#[derive(Clone, Debug, PartialEq)]
pub enum VariableValue {
    Boolean(bool),
    Int(i32),
    Double(f64),
    String(String),
}

impl VariableValue {
    /// Kind this value is reported as
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            VariableValue::Boolean(_) => PrimitiveKind::Boolean,
            VariableValue::Int(_) => PrimitiveKind::Int,
            VariableValue::Double(_) => PrimitiveKind::Double,
            VariableValue::String(_) => PrimitiveKind::String,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VariableValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            VariableValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Int value reinterpreted as unsigned storage
    pub fn as_uint(&self) -> Option<u32> {
        self.as_int().map(|i| i as u32)
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            VariableValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VariableValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Little-endian byte view handed to the transport
    ///
    /// Booleans take one byte, ints four, doubles eight; strings are their
    /// UTF-8 bytes without a terminator.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            VariableValue::Boolean(b) => vec![*b as u8],
            VariableValue::Int(i) => i.to_le_bytes().to_vec(),
            VariableValue::Double(d) => d.to_le_bytes().to_vec(),
            VariableValue::String(s) => s.as_bytes().to_vec(),
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Boolean(b) => write!(f, "{}", b),
            VariableValue::Int(i) => write!(f, "{}", i),
            VariableValue::Double(d) => write!(f, "{}", d),
            VariableValue::String(s) => f.write_str(s),
        }
    }
}
