//! Primitive kind definitions
//!
//! The device runtime understands exactly four variable kinds. Every
//! registered variable resolves to one of them:
//! - Boolean: single flag
//! - Int: 32-bit word (signed or unsigned storage)
//! - Double: 64-bit float
//! - String: UTF-8 text, read from a fixed buffer or a dynamic string

use std::fmt;

/// Kind tag the runtime uses to interpret a variable's storage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PrimitiveKind {
    Boolean = 0x01,
    Int = 0x02,
    String = 0x04,
    Double = 0x09,
}

impl PrimitiveKind {
    /// Parse from wire byte
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(PrimitiveKind::Boolean),
            0x02 => Some(PrimitiveKind::Int),
            0x04 => Some(PrimitiveKind::String),
            0x09 => Some(PrimitiveKind::Double),
            _ => None,
        }
    }

    /// Convert to wire byte
    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Lowercase name as reported to remote readers
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "bool",
            PrimitiveKind::Int => "int32",
            PrimitiveKind::String => "string",
            PrimitiveKind::Double => "double",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Zero-sized kind hint accepted by `Cloud::variable_as`
///
/// Each tag names one [`PrimitiveKind`] at the type level so that an
/// explicit hint can be checked against the storage type at compile time.
pub trait KindTag: Copy + fmt::Debug + 'static {
    const KIND: PrimitiveKind;
}

/// Boolean kind tag
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BooleanTag;

/// Integer kind tag
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntTag;

/// Double kind tag
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DoubleTag;

/// String kind tag
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StringTag;

impl KindTag for BooleanTag {
    const KIND: PrimitiveKind = PrimitiveKind::Boolean;
}

impl KindTag for IntTag {
    const KIND: PrimitiveKind = PrimitiveKind::Int;
}

impl KindTag for DoubleTag {
    const KIND: PrimitiveKind = PrimitiveKind::Double;
}

impl KindTag for StringTag {
    const KIND: PrimitiveKind = PrimitiveKind::String;
}

pub const BOOLEAN: BooleanTag = BooleanTag;
pub const INT: IntTag = IntTag;
pub const DOUBLE: DoubleTag = DoubleTag;
pub const STRING: StringTag = StringTag;
