//! Typed instances over one root buffer
//!
//! An [`Instance`] pairs a type with the buffer backing it. The buffer is
//! either owned ([`BytesMut`], the default) or any caller storage implementing
//! `AsRef<[u8]>` (and `AsMut<[u8]>` for writes). Nested members never own
//! storage: they are reached through [`View`]s over the root buffer.

use crate::byte_order::ByteOrder;
use crate::error::LayoutError;
use crate::layout::FieldType;
use crate::value::Value;
use crate::view::{View, ViewMut};
use crate::Result;
use alloc::format;
use bytes::{Bytes, BytesMut};

#[cfg(feature = "logging")]
use tracing::debug;

/// A typed root buffer
#[derive(Debug, Clone)]
pub struct Instance<B = BytesMut> {
    ty: FieldType,
    order: ByteOrder,
    buf: B,
}

impl Instance<BytesMut> {
    /// Zero-filled instance in the type's declared byte order
    pub fn new(ty: impl Into<FieldType>) -> Self {
        let ty = ty.into();
        let order = ty.default_order();
        let buf = BytesMut::zeroed(ty.byte_len());
        Self { ty, order, buf }
    }

    /// Zero-filled instance bound to `byte_order`
    ///
    /// Collections are re-registered for the new byte order, so factory
    /// members follow it.
    pub fn with_byte_order(ty: impl Into<FieldType>, byte_order: ByteOrder) -> Result<Self> {
        let ty = match ty.into() {
            FieldType::Layout(layout) if layout.byte_order() != byte_order => {
                FieldType::Layout(layout.with_byte_order(byte_order)?)
            }
            other => other,
        };
        let order = ty.bound_order(byte_order);
        let buf = BytesMut::zeroed(ty.byte_len());
        Ok(Self { ty, order, buf })
    }

    /// Owned copy of `data`, which must be exactly as long as the type
    pub fn from_bytes(ty: impl Into<FieldType>, data: &[u8]) -> Result<Self> {
        let ty = ty.into();
        if data.len() != ty.byte_len() {
            return Err(LayoutError::length(ty.byte_len(), data.len()));
        }
        let order = ty.default_order();
        Ok(Self {
            ty,
            order,
            buf: BytesMut::from(data),
        })
    }

    /// Owned copy of `data` read in `byte_order`
    ///
    /// Collections are re-registered as in [`Instance::with_byte_order`].
    pub fn from_bytes_with_order(
        ty: impl Into<FieldType>,
        byte_order: ByteOrder,
        data: &[u8],
    ) -> Result<Self> {
        let mut inst = Self::with_byte_order(ty, byte_order)?;
        if data.len() != inst.byte_len() {
            return Err(LayoutError::length(inst.byte_len(), data.len()));
        }
        inst.buf.copy_from_slice(data);
        Ok(inst)
    }

    /// Zero-filled instance with `value` assigned
    pub fn with_value(ty: impl Into<FieldType>, value: impl Into<Value>) -> Result<Self> {
        let mut inst = Self::new(ty);
        inst.set_value(value)?;
        Ok(inst)
    }
}

impl<B: AsRef<[u8]>> Instance<B> {
    /// Interpret existing storage in place; no bytes are copied
    pub fn over(ty: impl Into<FieldType>, buf: B) -> Result<Self> {
        let ty = ty.into();
        if buf.as_ref().len() != ty.byte_len() {
            return Err(LayoutError::length(ty.byte_len(), buf.as_ref().len()));
        }
        let order = ty.default_order();
        Ok(Self { ty, order, buf })
    }

    /// Instance type
    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    /// Byte order the root type is bound to
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Length of the backing buffer
    pub fn byte_len(&self) -> usize {
        self.ty.byte_len()
    }

    /// Backing bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_ref()
    }

    /// Frozen copy of the backing bytes
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.buf.as_ref())
    }

    /// Read-only view of the whole instance
    pub fn view(&self) -> View<'_> {
        View::from_parts(&self.ty, self.order, self.buf.as_ref())
    }

    /// Decode the whole instance
    pub fn value(&self) -> Result<Value> {
        self.view().value()
    }

    /// Decode the member at a dotted path
    pub fn get(&self, path: &str) -> Result<Value> {
        self.view().get(path)
    }

    /// Decode the member at a dotted path into a host type
    pub fn get_as<T>(&self, path: &str) -> Result<T>
    where
        T: TryFrom<Value, Error = LayoutError>,
    {
        self.view().get_as(path)
    }

    /// Give back the backing storage
    pub fn into_inner(self) -> B {
        self.buf
    }

    /// Owned copy of this instance
    pub fn detach(&self) -> Instance<BytesMut> {
        Instance {
            ty: self.ty.clone(),
            order: self.order,
            buf: BytesMut::from(self.buf.as_ref()),
        }
    }

    /// Re-point this instance at `target`
    ///
    /// `target` must be exactly as long as the type. With `retain_value` the
    /// current contents are copied into `target` first; otherwise whatever
    /// `target` already holds becomes the decoded value. Every member of the
    /// returned instance is a window into `target`.
    ///
    /// ```
    /// use bytelayout_core::{ByteOrder, Instance, IntKind, LayoutBuilder};
    ///
    /// let layout = LayoutBuilder::structure("Pair")
    ///     .byte_order(ByteOrder::Big)
    ///     .member("a", IntKind::U16)
    ///     .member("b", IntKind::U16)
    ///     .build()
    ///     .unwrap();
    /// let mut inst = Instance::new(layout);
    /// inst.set("a", 0x0102).unwrap();
    ///
    /// let mut storage = [0u8; 8];
    /// let attached = inst.attach(&mut storage[2..6], true).unwrap();
    /// assert_eq!(attached.get_as::<u16>("a").unwrap(), 0x0102);
    /// drop(attached);
    /// assert_eq!(storage, [0, 0, 1, 2, 0, 0, 0, 0]);
    /// ```
    pub fn attach<T>(&self, mut target: T, retain_value: bool) -> Result<Instance<T>>
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        let expected = self.ty.byte_len();
        let actual = target.as_ref().len();
        if actual != expected {
            return Err(LayoutError::length(expected, actual));
        }

        if retain_value {
            target.as_mut().copy_from_slice(self.buf.as_ref());
        }

        #[cfg(feature = "logging")]
        debug!(
            "Attached {} to {} external bytes (retain_value={})",
            self.ty.type_name(),
            expected,
            retain_value
        );

        Ok(Instance {
            ty: self.ty.clone(),
            order: self.order,
            buf: target,
        })
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Instance<B> {
    /// Mutable view of the whole instance
    pub fn view_mut(&mut self) -> ViewMut<'_> {
        ViewMut::from_parts(&self.ty, self.order, self.buf.as_mut())
    }

    /// Assign the whole instance; nothing is written if validation fails
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        self.view_mut().set_value(value)
    }

    /// Assign the member at a dotted path
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        self.view_mut().set(path, value)
    }

    /// Overwrite a prefix of the raw bytes; longer data is rejected
    pub fn set_data(&mut self, data: &[u8]) -> Result<()> {
        self.set_value(Value::Bytes(data.to_vec()))
    }

    /// Change the byte order of a primitive instance
    ///
    /// Collections fix their byte order when registered; use
    /// [`Instance::with_byte_order`] to build one in another order.
    pub fn set_byte_order(&mut self, byte_order: ByteOrder) -> Result<()> {
        match &self.ty {
            FieldType::Primitive(_) => {
                self.order = byte_order;
                Ok(())
            }
            FieldType::Layout(layout) => Err(LayoutError::ImmutableAttribute(format!(
                "byte order of {}",
                layout.name()
            ))),
        }
    }
}
