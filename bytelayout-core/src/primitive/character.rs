//! Single-byte characters

use crate::constants::MAX_CHAR_CODE;
use crate::error::LayoutError;
use crate::value::Value;
use crate::Result;
use alloc::format;

/// Decode a byte as its Latin-1 character
pub fn decode_char(byte: u8) -> char {
    byte as char
}

/// Convert a character-like value to its byte
///
/// Accepts a one-character string, a `char` up to U+00FF or an integer in
/// `0..=255`.
pub fn encode_char(value: &Value) -> Result<u8> {
    let code = match value {
        Value::Char(c) => *c as u32 as i128,
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c as u32 as i128,
                _ => {
                    return Err(LayoutError::TypeMismatch(format!(
                        "Char needs exactly one character, got {:?}",
                        s
                    )))
                }
            }
        }
        Value::Int(i) => *i,
        Value::Bytes(b) if b.len() == 1 => b[0] as i128,
        other => {
            return Err(LayoutError::TypeMismatch(format!(
                "Char cannot hold {}",
                other.kind_name()
            )))
        }
    };

    if code < 0 {
        return Err(LayoutError::Underflow {
            value: code,
            min: 0,
        });
    }
    if code > MAX_CHAR_CODE as i128 {
        return Err(LayoutError::Overflow {
            value: code,
            max: MAX_CHAR_CODE as i128,
        });
    }
    Ok(code as u8)
}
