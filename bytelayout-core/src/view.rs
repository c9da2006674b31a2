//! Windows into a root buffer
//!
//! A view is a type, the byte order it is bound to and the exact byte range it
//! covers. Navigating to a member narrows the range to the member's slot; no
//! bytes are copied, so every write through a child view is visible through
//! the parent and through any overlapping sibling.

use crate::bits::{self, BitFieldSpec, BitPos};
use crate::byte_order::ByteOrder;
use crate::codec;
use crate::error::LayoutError;
use crate::layout::{FieldType, Layout};
use crate::primitive::Primitive;
use crate::slice::{normalize_index, SliceSpec};
use crate::value::Value;
use crate::Result;
use alloc::format;
use alloc::vec::Vec;

fn layout_of(ty: &FieldType) -> Result<&Layout> {
    match ty {
        FieldType::Layout(layout) => Ok(layout),
        FieldType::Primitive(p) => Err(LayoutError::TypeMismatch(format!(
            "{} has no members",
            p.type_name()
        ))),
    }
}

fn bit_field_of(ty: &FieldType) -> Result<&BitFieldSpec> {
    match ty {
        FieldType::Primitive(Primitive::BitField(spec)) => Ok(spec),
        other => Err(LayoutError::TypeMismatch(format!(
            "{} is not a bit field",
            other.type_name()
        ))),
    }
}

fn bit_position<'t>(spec: &'t BitFieldSpec, name: &str) -> Result<&'t BitPos> {
    spec.position(name)
        .ok_or_else(|| LayoutError::UnknownMember(format!("BitField[{}].{}", spec.byte_len(), name)))
}

fn check_len(ty: &FieldType, len: usize) -> Result<()> {
    if ty.byte_len() != len {
        return Err(LayoutError::length(ty.byte_len(), len));
    }
    Ok(())
}

/// Read-only window
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    ty: &'a FieldType,
    order: ByteOrder,
    bytes: &'a [u8],
}

impl<'a> View<'a> {
    /// View `bytes` as `ty` bound to `order`
    pub fn new(ty: &'a FieldType, order: ByteOrder, bytes: &'a [u8]) -> Result<Self> {
        check_len(ty, bytes.len())?;
        Ok(Self { ty, order, bytes })
    }

    /// Caller guarantees `bytes.len() == ty.byte_len()`
    pub(crate) fn from_parts(ty: &'a FieldType, order: ByteOrder, bytes: &'a [u8]) -> Self {
        debug_assert_eq!(ty.byte_len(), bytes.len());
        Self { ty, order, bytes }
    }

    /// Viewed type
    pub fn field_type(&self) -> &'a FieldType {
        self.ty
    }

    /// Byte order the type is bound to
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Covered bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Number of covered bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: every type is at least one byte long
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the whole region
    pub fn value(&self) -> Result<Value> {
        codec::decode(self.ty, self.order, self.bytes)
    }

    /// Member by name (or item by decimal index)
    pub fn field(&self, key: &str) -> Result<View<'a>> {
        let layout = layout_of(self.ty)?;
        let slot = layout.lookup(key)?;
        Ok(View {
            ty: slot.field_type(),
            order: slot.byte_order(),
            bytes: &self.bytes[slot.range()],
        })
    }

    /// Array or string item; negative indices count from the end
    pub fn item(&self, index: isize) -> Result<View<'a>> {
        let slot = layout_of(self.ty)?.item(index)?;
        Ok(View {
            ty: slot.field_type(),
            order: slot.byte_order(),
            bytes: &self.bytes[slot.range()],
        })
    }

    /// Follow a dotted path such as `src.octets.2`
    pub fn at(&self, path: &str) -> Result<View<'a>> {
        path.split('.').try_fold(*self, |view, key| view.field(key))
    }

    /// Decode the member at `path`; the last segment may name a bit position
    pub fn get(&self, path: &str) -> Result<Value> {
        let (parent, key) = match path.rsplit_once('.') {
            Some((parent, key)) => (self.at(parent)?, key),
            None => (*self, path),
        };

        if let FieldType::Primitive(Primitive::BitField(spec)) = parent.ty {
            return bit_position(spec, key)?.decode(parent.bytes);
        }
        parent.field(key)?.value()
    }

    /// Decode the member at `path` into a host type
    pub fn get_as<T>(&self, path: &str) -> Result<T>
    where
        T: TryFrom<Value, Error = LayoutError>,
    {
        T::try_from(self.get(path)?)
    }

    /// Every member with its view, in slot order
    pub fn members(&self) -> Result<Vec<(&'a str, View<'a>)>> {
        let layout = layout_of(self.ty)?;
        Ok(layout
            .slots()
            .iter()
            .map(|slot| {
                (
                    slot.name(),
                    View {
                        ty: slot.field_type(),
                        order: slot.byte_order(),
                        bytes: &self.bytes[slot.range()],
                    },
                )
            })
            .collect())
    }

    /// Raw byte; negative indices count from the end
    pub fn byte(&self, index: isize) -> Result<u8> {
        Ok(self.bytes[normalize_index(index, self.bytes.len())?])
    }

    /// Raw bytes selected by a slice
    pub fn byte_slice(&self, slice: impl Into<SliceSpec>) -> Result<Vec<u8>> {
        Ok(slice
            .into()
            .indices(self.bytes.len())?
            .into_iter()
            .map(|i| self.bytes[i])
            .collect())
    }

    /// Bit of a bit field, LSB of byte 0 first
    pub fn bit(&self, index: isize) -> Result<bool> {
        bit_field_of(self.ty)?;
        bits::get_bit(self.bytes, index)
    }

    /// Bits of a bit field selected by a slice
    pub fn bits(&self, slice: impl Into<SliceSpec>) -> Result<Vec<bool>> {
        let spec = bit_field_of(self.ty)?;
        Ok(slice
            .into()
            .indices(spec.bit_len())?
            .into_iter()
            .map(|i| bits::bit_at(self.bytes, i))
            .collect())
    }

    /// Decode a bit position against this bit field
    pub fn bit_pos(&self, pos: &BitPos) -> Result<Value> {
        bit_field_of(self.ty)?;
        pos.decode(self.bytes)
    }
}

/// Mutable window
#[derive(Debug)]
pub struct ViewMut<'a> {
    ty: &'a FieldType,
    order: ByteOrder,
    bytes: &'a mut [u8],
}

impl<'a> ViewMut<'a> {
    /// View `bytes` as `ty` bound to `order`
    pub fn new(ty: &'a FieldType, order: ByteOrder, bytes: &'a mut [u8]) -> Result<Self> {
        check_len(ty, bytes.len())?;
        Ok(Self { ty, order, bytes })
    }

    /// Caller guarantees `bytes.len() == ty.byte_len()`
    pub(crate) fn from_parts(ty: &'a FieldType, order: ByteOrder, bytes: &'a mut [u8]) -> Self {
        debug_assert_eq!(ty.byte_len(), bytes.len());
        Self { ty, order, bytes }
    }

    /// Read-only view of the same region
    pub fn as_view(&self) -> View<'_> {
        View {
            ty: self.ty,
            order: self.order,
            bytes: &*self.bytes,
        }
    }

    /// Shorter-lived mutable view of the same region
    pub fn reborrow(&mut self) -> ViewMut<'_> {
        ViewMut {
            ty: self.ty,
            order: self.order,
            bytes: &mut *self.bytes,
        }
    }

    /// Viewed type
    pub fn field_type(&self) -> &'a FieldType {
        self.ty
    }

    /// Covered bytes
    pub fn as_bytes(&self) -> &[u8] {
        &*self.bytes
    }

    /// Decode the whole region
    pub fn value(&self) -> Result<Value> {
        self.as_view().value()
    }

    /// Decode the member at `path`
    pub fn get(&self, path: &str) -> Result<Value> {
        self.as_view().get(path)
    }

    /// Narrow to a member, consuming this view
    pub fn into_field(self, key: &str) -> Result<ViewMut<'a>> {
        let ViewMut { ty, bytes, .. } = self;
        let layout = layout_of(ty)?;
        let slot = layout.lookup(key)?;
        if layout.is_null_terminated() && slot.range().end == layout.byte_len() {
            return Err(LayoutError::ImmutableAttribute(format!(
                "{} terminator",
                layout.name()
            )));
        }
        Ok(ViewMut {
            ty: slot.field_type(),
            order: slot.byte_order(),
            bytes: &mut bytes[slot.range()],
        })
    }

    /// Follow a dotted path, consuming this view
    pub fn into_at(self, path: &str) -> Result<ViewMut<'a>> {
        path.split('.').try_fold(self, |view, key| view.into_field(key))
    }

    /// Member by name (or item by decimal index)
    pub fn field(&mut self, key: &str) -> Result<ViewMut<'_>> {
        self.reborrow().into_field(key)
    }

    /// Array or string item; negative indices count from the end
    pub fn item(&mut self, index: isize) -> Result<ViewMut<'_>> {
        let key = layout_of(self.ty)?.item(index)?.name();
        self.reborrow().into_field(key)
    }

    /// Follow a dotted path
    pub fn at(&mut self, path: &str) -> Result<ViewMut<'_>> {
        self.reborrow().into_at(path)
    }

    /// Replace the whole region; nothing is written if validation fails
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        codec::encode(self.ty, self.order, self.bytes, &value.into())
    }

    /// Assign the member at `path`; the last segment may name a bit position
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let (mut parent, key) = match path.rsplit_once('.') {
            Some((parent, key)) => (self.at(parent)?, key),
            None => (self.reborrow(), path),
        };

        if let FieldType::Primitive(Primitive::BitField(spec)) = parent.ty {
            return bit_position(spec, key)?.encode(parent.bytes, &value);
        }
        parent.field(key)?.set_value(value)
    }

    fn after_raw_write(&mut self) {
        if let FieldType::Layout(layout) = self.ty {
            codec::enforce_terminator(layout, self.bytes);
        }
    }

    /// Overwrite one raw byte
    pub fn set_byte(&mut self, index: isize, value: u8) -> Result<()> {
        let idx = normalize_index(index, self.bytes.len())?;
        self.bytes[idx] = value;
        self.after_raw_write();
        Ok(())
    }

    /// Overwrite the bytes selected by a slice; `data` must match the selection length
    pub fn set_byte_slice(&mut self, slice: impl Into<SliceSpec>, data: &[u8]) -> Result<()> {
        let indices = slice.into().indices(self.bytes.len())?;
        if indices.len() != data.len() {
            return Err(LayoutError::length(indices.len(), data.len()));
        }
        for (i, b) in indices.into_iter().zip(data) {
            self.bytes[i] = *b;
        }
        self.after_raw_write();
        Ok(())
    }

    /// Set every byte selected by a slice to `value`
    pub fn fill_bytes(&mut self, slice: impl Into<SliceSpec>, value: u8) -> Result<()> {
        for i in slice.into().indices(self.bytes.len())? {
            self.bytes[i] = value;
        }
        self.after_raw_write();
        Ok(())
    }

    /// Write one bit of a bit field
    pub fn set_bit(&mut self, index: isize, value: bool) -> Result<()> {
        bit_field_of(self.ty)?;
        bits::set_bit(self.bytes, index, value)
    }

    /// Clear one bit of a bit field
    pub fn clear_bit(&mut self, index: isize) -> Result<()> {
        self.set_bit(index, false)
    }

    /// Overwrite the bits selected by a slice; `values` must match the selection length
    pub fn set_bits(&mut self, slice: impl Into<SliceSpec>, values: &[bool]) -> Result<()> {
        let spec = bit_field_of(self.ty)?;
        let indices = slice.into().indices(spec.bit_len())?;
        if indices.len() != values.len() {
            return Err(LayoutError::length(indices.len(), values.len()));
        }
        for (i, v) in indices.into_iter().zip(values) {
            bits::put_bit(self.bytes, i, *v);
        }
        Ok(())
    }

    /// Set every bit selected by a slice to `value`
    pub fn fill_bits(&mut self, slice: impl Into<SliceSpec>, value: bool) -> Result<()> {
        let spec = bit_field_of(self.ty)?;
        for i in slice.into().indices(spec.bit_len())? {
            bits::put_bit(self.bytes, i, value);
        }
        Ok(())
    }

    /// Encode a bit position against this bit field
    pub fn set_bit_pos(&mut self, pos: &BitPos, value: impl Into<Value>) -> Result<()> {
        bit_field_of(self.ty)?;
        pos.encode(self.bytes, &value.into())
    }
}
