//! Fixed-size primitive types
//!
//! Every primitive has a fixed byte length, a codec that honors the byte
//! order it is bound to, and a validation step that runs before any byte of
//! the target region is written.

pub mod blob;
pub mod character;
pub mod enumeration;
pub mod float;
pub mod int;

pub use blob::BlobKind;
pub use enumeration::{EnumBuilder, EnumSpec, EnumValue};
pub use float::FloatKind;
pub use int::{IntKind, IntType};

use crate::bits::BitFieldSpec;
use crate::byte_order::ByteOrder;
use crate::error::LayoutError;
use crate::value::Value;
use crate::Result;
use alloc::borrow::Cow;
use alloc::format;
use alloc::sync::Arc;

/// A scalar (or bit-indexable) fixed-size type
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Signed or unsigned integer
    Int(IntType),
    /// IEEE-754 float
    Float(FloatKind),
    /// One Latin-1 character
    Char,
    /// Raw bytes without numeric meaning
    Blob(BlobKind),
    /// Bit-indexable bytes with named bit positions
    BitField(Arc<BitFieldSpec>),
    /// Integer with a symbol table
    Enum(Arc<EnumSpec>),
}

impl Primitive {
    /// Storage length in bytes
    pub fn byte_len(&self) -> usize {
        match self {
            Primitive::Int(t) => t.kind.byte_len(),
            Primitive::Float(k) => k.byte_len(),
            Primitive::Char => 1,
            Primitive::Blob(k) => k.byte_len(),
            Primitive::BitField(spec) => spec.byte_len(),
            Primitive::Enum(spec) => spec.repr().byte_len(),
        }
    }

    /// Type name used by introspection
    pub fn type_name(&self) -> Cow<'static, str> {
        match self {
            Primitive::Int(t) => Cow::Borrowed(t.kind.name()),
            Primitive::Float(k) => Cow::Borrowed(k.name()),
            Primitive::Char => Cow::Borrowed("Char"),
            Primitive::Blob(k) => Cow::Borrowed(k.name()),
            Primitive::BitField(spec) => Cow::Owned(format!("BitField[{}]", spec.byte_len())),
            Primitive::Enum(spec) => Cow::Owned(spec.name().into()),
        }
    }

    /// Bit field spec, if this is a bit field
    pub fn as_bit_field(&self) -> Option<&BitFieldSpec> {
        match self {
            Primitive::BitField(spec) => Some(spec),
            _ => None,
        }
    }

    /// Decode `bytes` (exactly [`Primitive::byte_len`] long)
    pub fn decode(&self, bytes: &[u8], order: ByteOrder) -> Result<Value> {
        if bytes.len() != self.byte_len() {
            return Err(LayoutError::length(self.byte_len(), bytes.len()));
        }

        match self {
            Primitive::Int(t) => t.decode(bytes, order),
            Primitive::Float(k) => k.decode(bytes, order),
            Primitive::Char => Ok(Value::Char(character::decode_char(bytes[0]))),
            Primitive::Blob(_) => Ok(Value::Bytes(bytes.to_vec())),
            Primitive::BitField(spec) => Ok(Value::Bits(spec.decode(bytes))),
            Primitive::Enum(spec) => spec.decode(bytes, order).map(Value::Enum),
        }
    }

    /// Validate `value` and write it into `bytes`
    ///
    /// On error `bytes` is left untouched.
    pub fn encode(&self, bytes: &mut [u8], order: ByteOrder, value: &Value) -> Result<()> {
        if bytes.len() != self.byte_len() {
            return Err(LayoutError::length(self.byte_len(), bytes.len()));
        }

        match self {
            Primitive::Int(t) => t.encode(bytes, order, value),
            Primitive::Float(k) => k.encode(bytes, order, value),
            Primitive::Char => {
                bytes[0] = character::encode_char(value)?;
                Ok(())
            }
            Primitive::Blob(k) => match value {
                Value::Bytes(data) => blob::write_prefix(bytes, data),
                other => Err(LayoutError::TypeMismatch(format!(
                    "{} cannot hold {}",
                    k.name(),
                    other.kind_name()
                ))),
            },
            Primitive::BitField(spec) => spec.encode(bytes, value),
            Primitive::Enum(spec) => spec.encode(bytes, order, value),
        }
    }

    /// Check that `value` is assignable without touching any buffer
    pub fn validate(&self, value: &Value) -> Result<()> {
        let mut scratch = alloc::vec![0u8; self.byte_len()];
        self.encode(&mut scratch, ByteOrder::Native, value)
    }
}

impl From<IntKind> for Primitive {
    fn from(kind: IntKind) -> Self {
        Primitive::Int(IntType::new(kind))
    }
}

impl From<IntType> for Primitive {
    fn from(t: IntType) -> Self {
        Primitive::Int(t)
    }
}

impl From<FloatKind> for Primitive {
    fn from(kind: FloatKind) -> Self {
        Primitive::Float(kind)
    }
}

impl From<BlobKind> for Primitive {
    fn from(kind: BlobKind) -> Self {
        Primitive::Blob(kind)
    }
}

impl From<Arc<BitFieldSpec>> for Primitive {
    fn from(spec: Arc<BitFieldSpec>) -> Self {
        Primitive::BitField(spec)
    }
}

impl From<Arc<EnumSpec>> for Primitive {
    fn from(spec: Arc<EnumSpec>) -> Self {
        Primitive::Enum(spec)
    }
}
