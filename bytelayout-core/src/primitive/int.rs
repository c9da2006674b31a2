//! Fixed-width two's complement integers

use crate::byte_order::ByteOrder;
use crate::constants::MAX_INT_BYTES;
use crate::error::LayoutError;
use crate::value::Value;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Width and signedness of an integer primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntKind {
    /// Signed 8-bit
    I8,
    /// Unsigned 8-bit
    U8,
    /// Signed 16-bit
    I16,
    /// Unsigned 16-bit
    U16,
    /// Signed 32-bit
    I32,
    /// Unsigned 32-bit
    U32,
    /// Signed 64-bit
    I64,
    /// Unsigned 64-bit
    U64,
}

impl IntKind {
    /// Storage length in bytes
    pub const fn byte_len(&self) -> usize {
        match self {
            IntKind::I8 | IntKind::U8 => 1,
            IntKind::I16 | IntKind::U16 => 2,
            IntKind::I32 | IntKind::U32 => 4,
            IntKind::I64 | IntKind::U64 => 8,
        }
    }

    /// Storage length in bits
    pub const fn bit_len(&self) -> u32 {
        (self.byte_len() * 8) as u32
    }

    /// Whether values are interpreted as two's complement
    pub const fn signed(&self) -> bool {
        matches!(
            self,
            IntKind::I8 | IntKind::I16 | IntKind::I32 | IntKind::I64
        )
    }

    /// Smallest representable value
    pub const fn min(&self) -> i128 {
        if self.signed() {
            -(1i128 << (self.bit_len() - 1))
        } else {
            0
        }
    }

    /// Largest representable value
    pub const fn max(&self) -> i128 {
        if self.signed() {
            (1i128 << (self.bit_len() - 1)) - 1
        } else {
            (1i128 << self.bit_len()) - 1
        }
    }

    /// Type name, e.g. `UInt16`
    pub const fn name(&self) -> &'static str {
        match self {
            IntKind::I8 => "Int8",
            IntKind::U8 => "UInt8",
            IntKind::I16 => "Int16",
            IntKind::U16 => "UInt16",
            IntKind::I32 => "Int32",
            IntKind::U32 => "UInt32",
            IntKind::I64 => "Int64",
            IntKind::U64 => "UInt64",
        }
    }

    /// Integer type of this kind that wraps on overflow instead of failing
    pub const fn wrapping(self) -> IntType {
        IntType {
            kind: self,
            wrapping: true,
        }
    }

    /// Bring `value` into range, either by wrapping modulo 2^bits or by
    /// rejecting it with `Overflow` / `Underflow`.
    pub fn bound(&self, value: i128, wrap: bool) -> Result<i128> {
        let (min, max) = (self.min(), self.max());
        if wrap {
            let modulus = 1i128 << self.bit_len();
            let rem = value.rem_euclid(modulus);
            return Ok(if rem > max { rem - modulus } else { rem });
        }
        if value > max {
            Err(LayoutError::Overflow { value, max })
        } else if value < min {
            Err(LayoutError::Underflow { value, min })
        } else {
            Ok(value)
        }
    }

    /// Decode an integer stored in `order`
    pub fn decode(&self, bytes: &[u8], order: ByteOrder) -> Result<i128> {
        let n = self.byte_len();
        if bytes.len() != n {
            return Err(LayoutError::length(n, bytes.len()));
        }

        let mut raw = [0u8; MAX_INT_BYTES];
        order.load(bytes, &mut raw[..n]);
        let unsigned = u64::from_le_bytes(raw);

        if self.signed() {
            let shift = 64 - self.bit_len();
            Ok((((unsigned << shift) as i64) >> shift) as i128)
        } else {
            Ok(unsigned as i128)
        }
    }

    /// Encode `value` in `order`. The value is bounded before any byte is written.
    pub fn encode(&self, bytes: &mut [u8], order: ByteOrder, value: i128, wrap: bool) -> Result<()> {
        let n = self.byte_len();
        if bytes.len() != n {
            return Err(LayoutError::length(n, bytes.len()));
        }

        let value = self.bound(value, wrap)?;
        let raw = (value as u64).to_le_bytes();
        order.store(&raw[..n], bytes);
        Ok(())
    }
}

/// Integer primitive: a kind plus its overflow policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntType {
    /// Width and signedness
    pub kind: IntKind,
    /// Wrap modulo 2^bits on out-of-range assignment
    pub wrapping: bool,
}

impl IntType {
    /// Create a checked integer type
    pub const fn new(kind: IntKind) -> Self {
        Self {
            kind,
            wrapping: false,
        }
    }

    /// Decode to [`Value::Int`]
    pub fn decode(&self, bytes: &[u8], order: ByteOrder) -> Result<Value> {
        self.kind.decode(bytes, order).map(Value::Int)
    }

    /// Encode any integer-like [`Value`]
    pub fn encode(&self, bytes: &mut [u8], order: ByteOrder, value: &Value) -> Result<()> {
        let raw = value.to_integer(self.kind.name())?;
        self.kind.encode(bytes, order, raw, self.wrapping)
    }
}

impl From<IntKind> for IntType {
    fn from(kind: IntKind) -> Self {
        IntType::new(kind)
    }
}
