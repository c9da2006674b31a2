//! # Bytelayout Core
//!
//! Fixed-size binary layouts read and written in place over a byte buffer.
//!
//! Layouts are declared once with [`LayoutBuilder`] (structures and unions) or
//! [`Layout::array`] / [`Layout::string`]. Registration computes every member
//! offset; an [`Instance`] then owns or borrows one buffer and every nested
//! member is a window `(offset, length)` into it.
//!
//! ## Modules
//!
//! - `constants`: Limits and byte order format characters
//! - `error`: `LayoutError` and the crate `Result` alias
//! - `byte_order`: Logical endianness of multi-byte scalars
//! - `primitive`: Integers, floats, characters, blobs and enum-backed integers
//! - `bits`: Bit fields, named bit positions and mask conversion
//! - `slice`: `(start, stop, step)` selections with negative indices
//! - `member`: Member declarations, factories and inheritance merging
//! - `layout`: Structure/union/array/string layout engine
//! - `value`: Dynamic decoded values
//! - `codec`: Recursive decode/encode between bytes and values
//! - `view`: Borrowed windows into a root buffer
//! - `instance`: Buffer ownership and the attach protocol
//! - `introspect`: Ordered member listings for inspection tools
//!
//! ## Example
//!
//! ```
//! use bytelayout_core::{ByteOrder, Instance, IntKind, LayoutBuilder};
//!
//! let header = LayoutBuilder::structure("Header")
//!     .byte_order(ByteOrder::Little)
//!     .packed(true)
//!     .member("kind", IntKind::U8)
//!     .member("delta", IntKind::I16)
//!     .member("stamp", IntKind::U64)
//!     .build()
//!     .unwrap();
//! assert_eq!(header.byte_len(), 11);
//!
//! let mut inst = Instance::new(header);
//! inst.set("delta", -2i16).unwrap();
//! assert_eq!(&inst.to_bytes()[1..3], &[0xFE, 0xFF]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod bits;
pub mod byte_order;
pub mod codec;
pub mod constants;
pub mod error;
pub mod instance;
pub mod introspect;
pub mod layout;
pub mod member;
pub mod primitive;
pub mod slice;
pub mod value;
pub mod view;

// Re-export commonly used types
pub use bits::{bitpos_to_mask, mask_to_bitpos, BitFieldBuilder, BitFieldSpec, BitPos};
pub use byte_order::ByteOrder;
pub use error::LayoutError;
pub use instance::Instance;
pub use introspect::MemberInfo;
pub use layout::{FieldType, Layout, LayoutBuilder, LayoutKind, LayoutKindTag, Slot};
pub use member::{Factory, Member, MemberType};
pub use primitive::{
    BlobKind, EnumBuilder, EnumSpec, EnumValue, FloatKind, IntKind, IntType, Primitive,
};
pub use slice::SliceSpec;
pub use value::Value;
pub use view::{View, ViewMut};

/// Result type alias for layout operations
pub type Result<T> = core::result::Result<T, LayoutError>;
