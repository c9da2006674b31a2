//! Limits and format constants shared by the layout engine

/// Number of bits in a byte
pub const BITS_PER_BYTE: usize = 8;

/// Widest run of bits a single [`crate::bits::BitPos`] can decode as an integer
pub const MAX_BIT_RUN_WIDTH: usize = 64;

/// Widest integer primitive in bytes
pub const MAX_INT_BYTES: usize = 8;

/// Terminator byte reserved at the end of null-terminated strings
pub const NULL_BYTE: u8 = 0x00;

/// Largest code point a single-byte character can hold
pub const MAX_CHAR_CODE: u32 = 0xFF;

/// Format character for native byte order
pub const FORMAT_NATIVE: u8 = b'@';

/// Format character for native byte order with standard sizes
pub const FORMAT_NATIVE_STANDARD: u8 = b'=';

/// Format character for little-endian
pub const FORMAT_LITTLE: u8 = b'<';

/// Format character for big-endian
pub const FORMAT_BIG: u8 = b'>';

/// Format character for network byte order (big-endian)
pub const FORMAT_NETWORK: u8 = b'!';
