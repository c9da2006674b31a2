//! IEEE-754 floating point primitives

use crate::byte_order::ByteOrder;
use crate::error::LayoutError;
use crate::value::Value;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Width of a floating point primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatKind {
    /// binary16
    F16,
    /// binary32
    F32,
    /// binary64
    F64,
}

impl FloatKind {
    /// Storage length in bytes
    pub const fn byte_len(&self) -> usize {
        match self {
            FloatKind::F16 => 2,
            FloatKind::F32 => 4,
            FloatKind::F64 => 8,
        }
    }

    /// Type name, e.g. `Float32`
    pub const fn name(&self) -> &'static str {
        match self {
            FloatKind::F16 => "Float16",
            FloatKind::F32 => "Float32",
            FloatKind::F64 => "Float64",
        }
    }

    /// Decode to [`Value::Float`]
    pub fn decode(&self, bytes: &[u8], order: ByteOrder) -> Result<Value> {
        let n = self.byte_len();
        if bytes.len() != n {
            return Err(LayoutError::length(n, bytes.len()));
        }

        let mut raw = [0u8; 8];
        order.load(bytes, &mut raw[..n]);
        let value = match self {
            FloatKind::F16 => f16_bits_to_f32(u16::from_le_bytes([raw[0], raw[1]])) as f64,
            FloatKind::F32 => f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
            FloatKind::F64 => f64::from_le_bytes(raw),
        };
        Ok(Value::Float(value))
    }

    /// Encode a float or integer [`Value`]; no range check is applied
    pub fn encode(&self, bytes: &mut [u8], order: ByteOrder, value: &Value) -> Result<()> {
        let n = self.byte_len();
        if bytes.len() != n {
            return Err(LayoutError::length(n, bytes.len()));
        }

        let value = match value {
            Value::Float(f) => *f,
            Value::Int(i) => *i as f64,
            other => {
                return Err(LayoutError::TypeMismatch(alloc::format!(
                    "{} cannot hold {}",
                    self.name(),
                    other.kind_name()
                )))
            }
        };

        let mut raw = [0u8; 8];
        match self {
            FloatKind::F16 => raw[..2].copy_from_slice(&f32_to_f16_bits(value as f32).to_le_bytes()),
            FloatKind::F32 => raw[..4].copy_from_slice(&(value as f32).to_le_bytes()),
            FloatKind::F64 => raw.copy_from_slice(&value.to_le_bytes()),
        }
        order.store(&raw[..n], bytes);
        Ok(())
    }
}

/// Convert an `f32` to binary16 bits, rounding to nearest even
///
/// Same bit-level formulation as the software fallback of the `half` crate:
/// overflow saturates to infinity, NaN keeps its quiet bit, and values below
/// the normal range become subnormals.
fn f32_to_f16_bits(value: f32) -> u16 {
    let x = value.to_bits();
    let sign = x & 0x8000_0000;
    let exp = x & 0x7F80_0000;
    let man = x & 0x007F_FFFF;
    let half_sign = sign >> 16;

    // NaN and infinity
    if exp == 0x7F80_0000 {
        let nan_bit = if man == 0 { 0 } else { 0x0200 };
        return (half_sign | 0x7C00 | nan_bit | (man >> 13)) as u16;
    }

    let half_exp = ((exp >> 23) as i32) - 127 + 15;

    if half_exp >= 0x1F {
        return (half_sign | 0x7C00) as u16;
    }

    if half_exp <= 0 {
        // Too small even for a subnormal
        if 14 - half_exp > 24 {
            return half_sign as u16;
        }
        let man = man | 0x0080_0000;
        let mut half_man = man >> (14 - half_exp);
        let round_bit = 1 << (13 - half_exp);
        if (man & round_bit) != 0 && (man & (3 * round_bit - 1)) != 0 {
            half_man += 1;
        }
        return (half_sign | half_man) as u16;
    }

    let half_exp = (half_exp as u32) << 10;
    let half_man = man >> 13;
    let round_bit = 0x0000_1000;
    let bits = half_sign | half_exp | half_man;
    if (man & round_bit) != 0 && (man & (3 * round_bit - 1)) != 0 {
        (bits + 1) as u16
    } else {
        bits as u16
    }
}

/// Convert binary16 bits to an `f32` (exact)
fn f16_bits_to_f32(bits: u16) -> f32 {
    if bits & 0x7FFF == 0 {
        return f32::from_bits((bits as u32) << 16);
    }

    let sign = ((bits & 0x8000) as u32) << 16;
    let half_exp = (bits & 0x7C00) as u32;
    let half_man = (bits & 0x03FF) as u32;

    if half_exp == 0x7C00 {
        return if half_man == 0 {
            f32::from_bits(sign | 0x7F80_0000)
        } else {
            f32::from_bits(sign | 0x7FC0_0000 | (half_man << 13))
        };
    }

    if half_exp == 0 {
        // Subnormal: normalize the mantissa
        let e = (half_man as u16).leading_zeros() - 6;
        let exp = (127 - 15 - e) << 23;
        let man = (half_man << (14 + e)) & 0x007F_FFFF;
        return f32::from_bits(sign | exp | man);
    }

    let exp = (((half_exp >> 10) as i32 - 15 + 127) as u32) << 23;
    f32::from_bits(sign | exp | (half_man << 13))
}
