//! Error types for layout operations

use alloc::string::String;

/// Errors that can occur while declaring layouts or accessing buffers
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Buffer or value length does not match the fixed length of the type
    #[cfg_attr(feature = "std", error("Length mismatch: expected {expected} bytes, got {actual}"))]
    LengthMismatch {
        /// The number of bytes required.
        expected: usize,
        /// The number of bytes supplied.
        actual: usize,
    },

    /// Numeric assignment above the maximum of the target type
    #[cfg_attr(feature = "std", error("Overflow: value {value} exceeds maximum {max}"))]
    Overflow {
        /// The rejected value.
        value: i128,
        /// The largest representable value.
        max: i128,
    },

    /// Numeric assignment below the minimum of the target type
    #[cfg_attr(feature = "std", error("Underflow: value {value} below minimum {min}"))]
    Underflow {
        /// The rejected value.
        value: i128,
        /// The smallest representable value.
        min: i128,
    },

    /// Value or host type is not acceptable for the operation
    #[cfg_attr(feature = "std", error("Type mismatch: {0}"))]
    TypeMismatch(String),

    /// Illegal member declaration or member list
    #[cfg_attr(feature = "std", error("Invalid member: {0}"))]
    InvalidMember(String),

    /// Mask whose set bits do not form one contiguous run
    #[cfg_attr(feature = "std", error("Invalid bit mask: {0:#x}"))]
    InvalidBitMask(u64),

    /// Byte, bit or item index outside the addressable range
    #[cfg_attr(feature = "std", error("Index {index} out of range for length {len}"))]
    IndexOutOfRange {
        /// The requested index (may be negative).
        index: isize,
        /// The number of addressable elements.
        len: usize,
    },

    /// Attempt to alter a property fixed at construction
    #[cfg_attr(feature = "std", error("Immutable attribute: {0}"))]
    ImmutableAttribute(String),

    /// Name that the type does not declare
    #[cfg_attr(feature = "std", error("Unknown member: {0}"))]
    UnknownMember(String),
}

impl LayoutError {
    /// Build a `LengthMismatch` error
    pub(crate) fn length(expected: usize, actual: usize) -> Self {
        LayoutError::LengthMismatch { expected, actual }
    }

    /// Build an `IndexOutOfRange` error
    pub(crate) fn index(index: isize, len: usize) -> Self {
        LayoutError::IndexOutOfRange { index, len }
    }
}
