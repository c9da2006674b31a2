//! Recursive decode/encode between typed regions and [`Value`]s

use crate::byte_order::ByteOrder;
use crate::constants::NULL_BYTE;
use crate::error::LayoutError;
use crate::layout::{FieldType, Layout, LayoutKind};
use crate::primitive::blob::write_prefix;
use crate::value::Value;
use crate::Result;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "logging")]
use tracing::trace;

/// Decode the region `bytes` as `ty`
///
/// `order` is the byte order `ty` is bound to; nested members use the order
/// recorded in their slot.
pub fn decode(ty: &FieldType, order: ByteOrder, bytes: &[u8]) -> Result<Value> {
    if bytes.len() != ty.byte_len() {
        return Err(LayoutError::length(ty.byte_len(), bytes.len()));
    }

    match ty {
        FieldType::Primitive(p) => p.decode(bytes, order),
        FieldType::Layout(layout) => decode_layout(layout, bytes),
    }
}

fn decode_layout(layout: &Layout, bytes: &[u8]) -> Result<Value> {
    match layout.kind() {
        LayoutKind::String { .. } => Ok(Value::Str(decode_str(bytes))),
        LayoutKind::Array { .. } => layout
            .slots()
            .iter()
            .map(|slot| decode(slot.field_type(), slot.byte_order(), &bytes[slot.range()]))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        LayoutKind::Structure { .. } | LayoutKind::Union => layout
            .slots()
            .iter()
            .map(|slot| {
                decode(slot.field_type(), slot.byte_order(), &bytes[slot.range()])
                    .map(|v| (String::from(slot.name()), v))
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Record),
    }
}

/// Text up to the last non-NUL byte; invalid UTF-8 is replaced
pub fn decode_str(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|&b| b != NULL_BYTE).map_or(0, |p| p + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Validate `value` against `ty` and write it into `bytes`
///
/// Collections are encoded into a scratch copy first, so a value rejected by
/// any member leaves `bytes` untouched.
pub fn encode(ty: &FieldType, order: ByteOrder, bytes: &mut [u8], value: &Value) -> Result<()> {
    if bytes.len() != ty.byte_len() {
        return Err(LayoutError::length(ty.byte_len(), bytes.len()));
    }

    let result = match ty {
        FieldType::Primitive(p) => p.encode(bytes, order, value),
        FieldType::Layout(layout) => encode_layout(layout, bytes, value),
    };

    #[cfg(feature = "logging")]
    if let Err(err) = &result {
        trace!("Rejected {} for {}: {:?}", value.kind_name(), ty.type_name(), err);
    }

    result
}

fn encode_layout(layout: &Layout, bytes: &mut [u8], value: &Value) -> Result<()> {
    match (layout.kind(), value) {
        (_, Value::Bytes(data)) => {
            write_prefix(bytes, data)?;
            enforce_terminator(layout, bytes);
            Ok(())
        }
        (LayoutKind::String { null_terminated }, Value::Str(text)) => {
            encode_str(bytes, text, *null_terminated);
            Ok(())
        }
        (LayoutKind::Structure { .. } | LayoutKind::Union, Value::Record(members)) => {
            let mut scratch = bytes.to_vec();
            for (name, member_value) in members {
                let slot = layout.lookup(name)?;
                encode(
                    slot.field_type(),
                    slot.byte_order(),
                    &mut scratch[slot.range()],
                    member_value,
                )?;
            }
            bytes.copy_from_slice(&scratch);
            Ok(())
        }
        (LayoutKind::String { .. }, Value::List(_)) => Err(mismatch(layout, value)),
        (_, Value::List(items)) => {
            if items.len() != layout.slots().len() {
                return Err(LayoutError::length(layout.slots().len(), items.len()));
            }
            let mut scratch = bytes.to_vec();
            for (slot, item) in layout.slots().iter().zip(items) {
                encode(
                    slot.field_type(),
                    slot.byte_order(),
                    &mut scratch[slot.range()],
                    item,
                )?;
            }
            bytes.copy_from_slice(&scratch);
            Ok(())
        }
        _ => Err(mismatch(layout, value)),
    }
}

fn mismatch(layout: &Layout, value: &Value) -> LayoutError {
    LayoutError::TypeMismatch(format!(
        "{} cannot hold {}",
        layout.name(),
        value.kind_name()
    ))
}

/// Write `text` NUL-padded, truncated at a character boundary to the writable length
pub fn encode_str(bytes: &mut [u8], text: &str, null_terminated: bool) {
    let writable = if null_terminated {
        bytes.len().saturating_sub(1)
    } else {
        bytes.len()
    };

    let mut cut = text.len().min(writable);
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    bytes[..cut].copy_from_slice(&text.as_bytes()[..cut]);
    bytes[cut..].fill(NULL_BYTE);
}

/// Force the terminator byte of a null-terminated string
pub(crate) fn enforce_terminator(layout: &Layout, bytes: &mut [u8]) {
    if layout.is_null_terminated() {
        if let Some(last) = bytes.last_mut() {
            *last = NULL_BYTE;
        }
    }
}
