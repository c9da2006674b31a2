//! Collection layout engine
//!
//! A [`Layout`] is registered once: every member type is resolved against the
//! collection's byte order and assigned an offset. The resulting slot table is
//! immutable; instances only ever swap the buffer the table is applied to.

use crate::bits::BitFieldSpec;
use crate::byte_order::ByteOrder;
use crate::error::LayoutError;
use crate::member::{merge_inherited, validate_members, Member};
use crate::primitive::{BlobKind, EnumSpec, FloatKind, IntKind, IntType, Primitive};
use crate::slice::normalize_index;
use crate::Result;
use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::ops::Range;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::debug;

/// Type of a member: a primitive or a nested collection
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Scalar or bit field
    Primitive(Primitive),
    /// Nested structure, union, array or string
    Layout(Arc<Layout>),
}

impl FieldType {
    /// Single-byte character type
    pub const fn char() -> Self {
        FieldType::Primitive(Primitive::Char)
    }

    /// Storage length in bytes
    pub fn byte_len(&self) -> usize {
        match self {
            FieldType::Primitive(p) => p.byte_len(),
            FieldType::Layout(l) => l.byte_len(),
        }
    }

    /// Type name used by introspection
    pub fn type_name(&self) -> Cow<'_, str> {
        match self {
            FieldType::Primitive(p) => p.type_name(),
            FieldType::Layout(l) => Cow::Borrowed(l.name()),
        }
    }

    /// Primitive, if this is one
    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            FieldType::Primitive(p) => Some(p),
            FieldType::Layout(_) => None,
        }
    }

    /// Nested layout, if this is one
    pub fn as_layout(&self) -> Option<&Arc<Layout>> {
        match self {
            FieldType::Primitive(_) => None,
            FieldType::Layout(l) => Some(l),
        }
    }

    /// Returns true for structures, unions, arrays and strings
    pub fn is_collection(&self) -> bool {
        matches!(self, FieldType::Layout(_))
    }

    /// Byte order this type uses inside a collection declared with `enclosing`
    ///
    /// Primitives follow the enclosing collection; nested collections keep the
    /// byte order they were declared with.
    pub fn bound_order(&self, enclosing: ByteOrder) -> ByteOrder {
        match self {
            FieldType::Primitive(_) => enclosing,
            FieldType::Layout(l) => l.byte_order(),
        }
    }

    /// Byte order used when this type is the root of an instance
    pub fn default_order(&self) -> ByteOrder {
        self.bound_order(ByteOrder::default())
    }
}

macro_rules! field_type_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldType {
                fn from(v: $t) -> Self {
                    FieldType::Primitive(Primitive::from(v))
                }
            }
        )*
    };
}

field_type_from_primitive!(IntKind, IntType, FloatKind, BlobKind, Arc<BitFieldSpec>, Arc<EnumSpec>);

impl From<Primitive> for FieldType {
    fn from(p: Primitive) -> Self {
        FieldType::Primitive(p)
    }
}

impl From<Arc<Layout>> for FieldType {
    fn from(l: Arc<Layout>) -> Self {
        FieldType::Layout(l)
    }
}

impl From<&Arc<Layout>> for FieldType {
    fn from(l: &Arc<Layout>) -> Self {
        FieldType::Layout(Arc::clone(l))
    }
}

/// Collection kind without its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutKindTag {
    /// Sequential members
    Structure,
    /// Overlapping members
    Union,
    /// Homogeneous items
    Array,
    /// Fixed-length text
    String,
}

/// Collection kind
#[derive(Debug, Clone)]
pub enum LayoutKind {
    /// Members placed one after another, aligned to their own length unless packed
    Structure {
        /// Disable alignment padding
        packed: bool,
    },
    /// Every member at offset 0
    Union,
    /// `count` items of one type
    Array {
        /// Item type
        item: FieldType,
        /// Number of items
        count: usize,
    },
    /// Characters; with a terminator the last byte is always `0x00`
    String {
        /// Reserve the last byte for a NUL terminator
        null_terminated: bool,
    },
}

impl LayoutKind {
    /// Parameterless tag
    pub fn tag(&self) -> LayoutKindTag {
        match self {
            LayoutKind::Structure { .. } => LayoutKindTag::Structure,
            LayoutKind::Union => LayoutKindTag::Union,
            LayoutKind::Array { .. } => LayoutKindTag::Array,
            LayoutKind::String { .. } => LayoutKindTag::String,
        }
    }
}

/// A member placed at its offset
#[derive(Debug, Clone)]
pub struct Slot {
    name: String,
    ty: FieldType,
    byte_order: ByteOrder,
    offset: usize,
    byte_len: usize,
    metadata: BTreeMap<String, String>,
}

impl Slot {
    /// Member name (the decimal index for array items)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved member type
    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    /// Byte order the member is encoded with
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Offset from the start of the collection
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Byte range within the collection
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.byte_len
    }

    /// Metadata carried over from the member declaration
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

/// Registered collection type with its immutable slot table
#[derive(Debug)]
pub struct Layout {
    name: String,
    kind: LayoutKind,
    byte_order: ByteOrder,
    members: Vec<Member>,
    slots: Vec<Slot>,
    index: BTreeMap<String, usize>,
    byte_len: usize,
}

impl Layout {
    /// Array of `count` items
    pub fn array(
        item: impl Into<FieldType>,
        count: usize,
        byte_order: ByteOrder,
    ) -> Result<Arc<Layout>> {
        let item = item.into();
        let name = format!("{}[{}]", item.type_name(), count);
        let kind = LayoutKind::Array {
            item: item.clone(),
            count,
        };
        Self::repeated(name, kind, item, count, byte_order)
    }

    /// String of `len` bytes
    pub fn string(len: usize, null_terminated: bool) -> Result<Arc<Layout>> {
        Self::string_with_order(len, null_terminated, ByteOrder::default())
    }

    fn string_with_order(
        len: usize,
        null_terminated: bool,
        byte_order: ByteOrder,
    ) -> Result<Arc<Layout>> {
        Self::repeated(
            format!("String[{}]", len),
            LayoutKind::String { null_terminated },
            FieldType::char(),
            len,
            byte_order,
        )
    }

    fn repeated(
        name: String,
        kind: LayoutKind,
        item: FieldType,
        count: usize,
        byte_order: ByteOrder,
    ) -> Result<Arc<Layout>> {
        if count == 0 {
            return Err(LayoutError::InvalidMember(format!(
                "{} must hold at least one item",
                name
            )));
        }
        let item_len = item.byte_len();
        let byte_len = item_len.checked_mul(count).ok_or_else(|| {
            LayoutError::InvalidMember(format!("{} is too large to address", name))
        })?;

        let item_order = item.bound_order(byte_order);
        let slots = (0..count)
            .map(|i| Slot {
                name: i.to_string(),
                ty: item.clone(),
                byte_order: item_order,
                offset: i * item_len,
                byte_len: item_len,
                metadata: BTreeMap::new(),
            })
            .collect();

        let layout = Layout {
            name,
            kind,
            byte_order,
            members: Vec::new(),
            slots,
            index: BTreeMap::new(),
            byte_len,
        };
        layout.log_registered();
        Ok(Arc::new(layout))
    }

    /// Resolve members against `byte_order` and place them
    fn from_members(
        name: String,
        kind: LayoutKind,
        byte_order: ByteOrder,
        members: Vec<Member>,
    ) -> Result<Arc<Layout>> {
        if members.is_empty() {
            return Err(LayoutError::InvalidMember(format!(
                "{} must declare at least one member",
                name
            )));
        }

        let union = matches!(kind, LayoutKind::Union);
        let packed = matches!(kind, LayoutKind::Structure { packed: true });

        let mut slots = Vec::with_capacity(members.len());
        let mut index = BTreeMap::new();
        let mut cursor = 0usize;
        let mut byte_len = 0usize;

        for member in &members {
            let ty = member.resolve(byte_order)?;
            let len = ty.byte_len();

            let offset = if union {
                0
            } else {
                if !packed && cursor % len != 0 {
                    cursor += len - cursor % len;
                }
                let offset = cursor;
                cursor += len;
                offset
            };
            byte_len = byte_len.max(offset + len);

            index.insert(member.name().into(), slots.len());
            slots.push(Slot {
                name: member.name().into(),
                byte_order: ty.bound_order(byte_order),
                ty,
                offset,
                byte_len: len,
                metadata: member.metadata().clone(),
            });
        }

        let layout = Layout {
            name,
            kind,
            byte_order,
            members,
            slots,
            index,
            byte_len,
        };
        layout.log_registered();
        Ok(Arc::new(layout))
    }

    fn log_registered(&self) {
        #[cfg(feature = "logging")]
        debug!(
            "Registered {:?} {} ({} slots, {} bytes, {})",
            self.kind.tag(),
            self.name,
            self.slots.len(),
            self.byte_len,
            self.byte_order.name()
        );
    }

    /// Same declaration bound to another byte order
    ///
    /// Factories are invoked again, so members built from the enclosing byte
    /// order follow the new one.
    pub fn with_byte_order(&self, byte_order: ByteOrder) -> Result<Arc<Layout>> {
        match &self.kind {
            LayoutKind::Structure { .. } | LayoutKind::Union => Self::from_members(
                self.name.clone(),
                self.kind.clone(),
                byte_order,
                self.members.clone(),
            ),
            LayoutKind::Array { item, count } => Self::array(item.clone(), *count, byte_order),
            LayoutKind::String { null_terminated } => {
                Self::string_with_order(self.byte_len, *null_terminated, byte_order)
            }
        }
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collection kind
    pub fn kind(&self) -> &LayoutKind {
        &self.kind
    }

    /// Collection kind tag
    pub fn kind_tag(&self) -> LayoutKindTag {
        self.kind.tag()
    }

    /// Declared byte order
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Total length in bytes
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Returns true for packed structures
    pub fn is_packed(&self) -> bool {
        matches!(self.kind, LayoutKind::Structure { packed: true })
    }

    /// Returns true for strings that reserve a terminator byte
    pub fn is_null_terminated(&self) -> bool {
        matches!(
            self.kind,
            LayoutKind::String {
                null_terminated: true
            }
        )
    }

    /// Member declarations after inheritance merging (empty for arrays and strings)
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Placed members in order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slot by member name (structures and unions)
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.index.get(name).map(|&i| &self.slots[i])
    }

    /// Item slot by index, negative counting from the end (arrays and strings)
    pub fn item(&self, index: isize) -> Result<&Slot> {
        match self.kind {
            LayoutKind::Array { .. } | LayoutKind::String { .. } => {}
            _ => {
                return Err(LayoutError::TypeMismatch(format!(
                    "{} is not indexable by item",
                    self.name
                )))
            }
        }

        let resolved = normalize_index(index, self.slots.len())?;
        Ok(&self.slots[resolved])
    }

    /// Slot by member name, or by item index for arrays and strings
    pub fn lookup(&self, key: &str) -> Result<&Slot> {
        match self.kind {
            LayoutKind::Array { .. } | LayoutKind::String { .. } => match key.parse::<isize>() {
                Ok(index) => self.item(index),
                Err(_) => Err(self.unknown(key)),
            },
            _ => self.slot(key).ok_or_else(|| self.unknown(key)),
        }
    }

    fn unknown(&self, key: &str) -> LayoutError {
        LayoutError::UnknownMember(format!("{}.{}", self.name, key))
    }
}

/// Declares a structure or union
///
/// # Example
///
/// ```
/// use bytelayout_core::{ByteOrder, IntKind, LayoutBuilder};
///
/// let addr = LayoutBuilder::union("Addr")
///     .byte_order(ByteOrder::Network)
///     .member("uint32", IntKind::U32)
///     .member("uint16", IntKind::U16)
///     .build()
///     .unwrap();
/// assert_eq!(addr.byte_len(), 4);
/// assert_eq!(addr.slot("uint16").unwrap().offset(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    name: String,
    union: bool,
    byte_order: Option<ByteOrder>,
    packed: Option<bool>,
    bases: Vec<Arc<Layout>>,
    members: Vec<Member>,
}

impl LayoutBuilder {
    fn new(name: impl Into<String>, union: bool) -> Self {
        Self {
            name: name.into(),
            union,
            byte_order: None,
            packed: None,
            bases: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Declare a structure
    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// Declare a union
    pub fn union(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// Byte order for primitive members (default: inherited, else native)
    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = Some(byte_order);
        self
    }

    /// Disable alignment padding
    ///
    /// Unions place every member at offset 0, so `build` rejects
    /// `packed(true)` on a union builder.
    pub fn packed(mut self, packed: bool) -> Self {
        self.packed = Some(packed);
        self
    }

    /// Inherit the members of `base`; later bases override earlier ones
    pub fn inherit(mut self, base: &Arc<Layout>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// Add a member with a fixed type
    pub fn member(self, name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        self.push(Member::new(name, ty))
    }

    /// Add a member whose type is built from the enclosing byte order
    pub fn member_with_factory<F>(self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(ByteOrder) -> Result<FieldType> + Send + Sync + 'static,
    {
        self.push(Member::with_factory(name, factory))
    }

    /// Add a prepared member
    pub fn push(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Add members from an iterator of declarations
    pub fn members(mut self, members: impl IntoIterator<Item = Member>) -> Self {
        self.members.extend(members);
        self
    }

    /// Validate declarations, merge inherited members and place every member
    pub fn build(self) -> Result<Arc<Layout>> {
        validate_members(&self.members)?;
        if self.union && self.packed == Some(true) {
            return Err(LayoutError::InvalidMember(format!(
                "union {} cannot be packed",
                self.name
            )));
        }

        let wanted = if self.union {
            LayoutKindTag::Union
        } else {
            LayoutKindTag::Structure
        };

        let mut inherited: Vec<Member> = Vec::new();
        for base in &self.bases {
            match base.kind_tag() {
                LayoutKindTag::Array | LayoutKindTag::String => {
                    return Err(LayoutError::ImmutableAttribute(format!(
                        "{} cannot be extended",
                        base.name
                    )))
                }
                tag if tag != wanted => {
                    return Err(LayoutError::TypeMismatch(format!(
                        "{:?} {} cannot extend {:?} {}",
                        wanted, self.name, tag, base.name
                    )))
                }
                _ => {}
            }
            inherited = merge_inherited(&inherited, base.members.clone());
        }
        let members = merge_inherited(&inherited, self.members);

        let last_base = self.bases.last();
        let byte_order = self
            .byte_order
            .or_else(|| last_base.map(|b| b.byte_order))
            .unwrap_or_default();
        let kind = if self.union {
            LayoutKind::Union
        } else {
            let packed = self
                .packed
                .or_else(|| last_base.map(|b| b.is_packed()))
                .unwrap_or(false);
            LayoutKind::Structure { packed }
        };

        Layout::from_members(self.name, kind, byte_order, members)
    }
}
