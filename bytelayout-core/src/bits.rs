//! Bit-level addressing
//!
//! Bits are numbered LSB first: bit 0 is the least significant bit of byte 0,
//! bit 8 the least significant bit of byte 1, and so on. A [`BitPos`] names a
//! run of bits inside a bit field; runs wider than one bit are assembled into
//! an unsigned integer with the lowest-numbered bit as its LSB.

use crate::constants::{BITS_PER_BYTE, MAX_BIT_RUN_WIDTH};
use crate::error::LayoutError;
use crate::member::validate_name;
use crate::slice::normalize_index;
use crate::value::Value;
use crate::Result;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Resolve a possibly negative bit index against `bit_len` bits
pub fn normalize_bit_index(index: isize, bit_len: usize) -> Result<usize> {
    normalize_index(index, bit_len)
}

/// Read one bit
pub fn get_bit(bytes: &[u8], index: isize) -> Result<bool> {
    let idx = normalize_bit_index(index, bytes.len() * BITS_PER_BYTE)?;
    Ok(bit_at(bytes, idx))
}

/// Write one bit
pub fn set_bit(bytes: &mut [u8], index: isize, value: bool) -> Result<()> {
    let idx = normalize_bit_index(index, bytes.len() * BITS_PER_BYTE)?;
    put_bit(bytes, idx, value);
    Ok(())
}

#[inline]
pub(crate) fn bit_at(bytes: &[u8], idx: usize) -> bool {
    bytes[idx / BITS_PER_BYTE] & (1 << (idx % BITS_PER_BYTE)) != 0
}

#[inline]
pub(crate) fn put_bit(bytes: &mut [u8], idx: usize, value: bool) {
    let mask = 1u8 << (idx % BITS_PER_BYTE);
    if value {
        bytes[idx / BITS_PER_BYTE] |= mask;
    } else {
        bytes[idx / BITS_PER_BYTE] &= !mask;
    }
}

fn check_run(bytes_len: usize, start: usize, width: usize) -> Result<()> {
    if width == 0 || width > MAX_BIT_RUN_WIDTH {
        return Err(LayoutError::InvalidMember(format!(
            "bit run width must be 1..={}, got {}",
            MAX_BIT_RUN_WIDTH, width
        )));
    }
    run_end(start, width, bytes_len * BITS_PER_BYTE).map(|_| ())
}

/// One past the last bit of a non-empty run, if it fits in `bit_len` bits
fn run_end(start: usize, width: usize, bit_len: usize) -> Result<usize> {
    match start.checked_add(width) {
        Some(end) if end <= bit_len => Ok(end),
        _ => Err(LayoutError::index(last_bit(start, width), bit_len)),
    }
}

fn last_bit(start: usize, width: usize) -> isize {
    isize::try_from(start.saturating_add(width.saturating_sub(1))).unwrap_or(isize::MAX)
}

/// Assemble `width` bits starting at `start` into an unsigned integer, LSB first
pub fn read_bits(bytes: &[u8], start: usize, width: usize) -> Result<u64> {
    check_run(bytes.len(), start, width)?;
    let mut value = 0u64;
    for i in 0..width {
        if bit_at(bytes, start + i) {
            value |= 1 << i;
        }
    }
    Ok(value)
}

/// Spread the low `width` bits of `value` over the bits starting at `start`
pub fn write_bits(bytes: &mut [u8], start: usize, width: usize, value: u64) -> Result<()> {
    check_run(bytes.len(), start, width)?;
    for i in 0..width {
        put_bit(bytes, start + i, (value >> i) & 1 == 1);
    }
    Ok(())
}

/// Convert a contiguous mask into `(start, width)`
///
/// ```
/// use bytelayout_core::mask_to_bitpos;
///
/// assert_eq!(mask_to_bitpos(0x0F00).unwrap(), (8, 4));
/// assert!(mask_to_bitpos(0b1010).is_err());
/// ```
pub fn mask_to_bitpos(mask: u64) -> Result<(usize, usize)> {
    if mask == 0 {
        return Err(LayoutError::InvalidBitMask(mask));
    }
    let start = mask.trailing_zeros();
    let shifted = mask >> start;
    let width = shifted.trailing_ones();
    if shifted.checked_shr(width).unwrap_or(0) != 0 {
        return Err(LayoutError::InvalidBitMask(mask));
    }
    Ok((start as usize, width as usize))
}

/// Inverse of [`mask_to_bitpos`]
pub fn bitpos_to_mask(start: usize, width: usize) -> Result<u64> {
    if width == 0 {
        return Err(LayoutError::InvalidBitMask(0));
    }
    run_end(start, width, MAX_BIT_RUN_WIDTH)?;
    let run = if width == MAX_BIT_RUN_WIDTH {
        u64::MAX
    } else {
        (1u64 << width) - 1
    };
    Ok(run << start)
}

/// Named run of bits inside a bit field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitPos {
    name: String,
    start: usize,
    width: usize,
}

impl BitPos {
    /// Create a bit position covering `width` bits from `start`
    pub fn new(name: impl Into<String>, start: usize, width: usize) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        if width == 0 || width > MAX_BIT_RUN_WIDTH {
            return Err(LayoutError::InvalidMember(format!(
                "bit position {} has width {}, expected 1..={}",
                name, width, MAX_BIT_RUN_WIDTH
            )));
        }
        Ok(Self { name, start, width })
    }

    /// Single-bit flag at `index`
    pub fn flag(name: impl Into<String>, index: usize) -> Result<Self> {
        Self::new(name, index, 1)
    }

    /// Bit position covering the set bits of a contiguous mask
    pub fn from_mask(name: impl Into<String>, mask: u64) -> Result<Self> {
        let (start, width) = mask_to_bitpos(mask)?;
        Self::new(name, start, width)
    }

    /// Name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First bit
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of bits
    pub fn width(&self) -> usize {
        self.width
    }

    /// One past the last bit, saturating at `usize::MAX`
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.width)
    }

    /// Mask selecting this run within a 64-bit word
    pub fn mask(&self) -> Result<u64> {
        bitpos_to_mask(self.start, self.width)
    }

    /// Largest value the run can hold
    pub fn max_value(&self) -> u64 {
        if self.width == MAX_BIT_RUN_WIDTH {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Read the run: `Bool` for one bit, `Int` otherwise
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let raw = read_bits(bytes, self.start, self.width)?;
        if self.width == 1 {
            Ok(Value::Bool(raw == 1))
        } else {
            Ok(Value::Int(raw as i128))
        }
    }

    /// Write the run from a bool or an unsigned integer that fits its width
    pub fn encode(&self, bytes: &mut [u8], value: &Value) -> Result<()> {
        let raw = value.to_integer(&self.name)?;
        if raw < 0 {
            return Err(LayoutError::Underflow { value: raw, min: 0 });
        }
        let max = self.max_value() as i128;
        if raw > max {
            return Err(LayoutError::Overflow { value: raw, max });
        }
        write_bits(bytes, self.start, self.width, raw as u64)
    }
}

/// Byte length and named bit positions of a bit field primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFieldSpec {
    byte_len: usize,
    positions: Vec<BitPos>,
}

impl BitFieldSpec {
    /// Start declaring a bit field of `byte_len` bytes
    pub fn builder(byte_len: usize) -> BitFieldBuilder {
        BitFieldBuilder {
            byte_len,
            pending: Vec::new(),
        }
    }

    /// Storage length in bytes
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Number of addressable bits
    pub fn bit_len(&self) -> usize {
        self.byte_len * BITS_PER_BYTE
    }

    /// Declared bit positions
    pub fn positions(&self) -> &[BitPos] {
        &self.positions
    }

    /// Bit position by name
    pub fn position(&self, name: &str) -> Option<&BitPos> {
        self.positions.iter().find(|p| p.name == name)
    }

    /// One boolean per bit
    pub fn decode(&self, bytes: &[u8]) -> Vec<bool> {
        (0..bytes.len() * BITS_PER_BYTE)
            .map(|i| bit_at(bytes, i))
            .collect()
    }

    /// Write every bit from `Bits` (exact length) or a raw byte prefix
    pub fn encode(&self, bytes: &mut [u8], value: &Value) -> Result<()> {
        match value {
            Value::Bits(bits) => {
                if bits.len() != bytes.len() * BITS_PER_BYTE {
                    return Err(LayoutError::length(bytes.len() * BITS_PER_BYTE, bits.len()));
                }
                for (i, bit) in bits.iter().enumerate() {
                    put_bit(bytes, i, *bit);
                }
                Ok(())
            }
            Value::Bytes(data) => crate::primitive::blob::write_prefix(bytes, data),
            other => Err(LayoutError::TypeMismatch(format!(
                "BitField[{}] cannot hold {}",
                self.byte_len,
                other.kind_name()
            ))),
        }
    }
}

#[derive(Debug, Clone)]
enum PendingPos {
    Range(String, usize, usize),
    Mask(String, u64),
}

/// Builder for [`BitFieldSpec`]
///
/// Positions are validated together when [`BitFieldBuilder::build`] runs.
#[derive(Debug, Clone)]
pub struct BitFieldBuilder {
    byte_len: usize,
    pending: Vec<PendingPos>,
}

impl BitFieldBuilder {
    /// Single-bit flag
    pub fn flag(self, name: impl Into<String>, index: usize) -> Self {
        self.range(name, index, 1)
    }

    /// Run of `width` bits starting at `start`
    pub fn range(mut self, name: impl Into<String>, start: usize, width: usize) -> Self {
        self.pending
            .push(PendingPos::Range(name.into(), start, width));
        self
    }

    /// Run covering the set bits of a contiguous mask
    pub fn mask(mut self, name: impl Into<String>, mask: u64) -> Self {
        self.pending.push(PendingPos::Mask(name.into(), mask));
        self
    }

    /// Validate positions against the field length
    pub fn build(self) -> Result<Arc<BitFieldSpec>> {
        if self.byte_len == 0 {
            return Err(LayoutError::InvalidMember(
                "bit field must be at least one byte".into(),
            ));
        }

        let bit_len = self.byte_len * BITS_PER_BYTE;
        let mut positions: Vec<BitPos> = Vec::with_capacity(self.pending.len());
        for pending in self.pending {
            let pos = match pending {
                PendingPos::Range(name, start, width) => BitPos::new(name, start, width)?,
                PendingPos::Mask(name, mask) => BitPos::from_mask(name, mask)?,
            };
            run_end(pos.start, pos.width, bit_len)?;
            if positions.iter().any(|p| p.name == pos.name) {
                return Err(LayoutError::InvalidMember(format!(
                    "duplicate bit position {}",
                    pos.name
                )));
            }
            positions.push(pos);
        }

        Ok(Arc::new(BitFieldSpec {
            byte_len: self.byte_len,
            positions,
        }))
    }
}
