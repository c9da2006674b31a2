//! Byte order model for multi-byte scalars

use crate::constants::{
    FORMAT_BIG, FORMAT_LITTLE, FORMAT_NATIVE, FORMAT_NATIVE_STANDARD, FORMAT_NETWORK,
};
use crate::error::LayoutError;
use alloc::format;
use serde::{Deserialize, Serialize};

/// Logical byte order of a layout or primitive
///
/// Only the endianness matters to the codec; alignment is decided by the
/// layout engine's packed flag, not by the byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Endianness of the target platform
    #[default]
    Native,
    /// Endianness of the target platform, standard sizes
    NativeStandard,
    /// Little-endian
    Little,
    /// Big-endian
    Big,
    /// Network byte order (big-endian)
    Network,
}

impl ByteOrder {
    /// Returns true when multi-byte scalars are stored least significant byte first
    pub const fn is_little_endian(&self) -> bool {
        match self {
            ByteOrder::Native | ByteOrder::NativeStandard => cfg!(target_endian = "little"),
            ByteOrder::Little => true,
            ByteOrder::Big | ByteOrder::Network => false,
        }
    }

    /// Format character of this byte order
    pub const fn format_char(&self) -> u8 {
        match self {
            ByteOrder::Native => FORMAT_NATIVE,
            ByteOrder::NativeStandard => FORMAT_NATIVE_STANDARD,
            ByteOrder::Little => FORMAT_LITTLE,
            ByteOrder::Big => FORMAT_BIG,
            ByteOrder::Network => FORMAT_NETWORK,
        }
    }

    /// Upper-case name of this byte order
    pub const fn name(&self) -> &'static str {
        match self {
            ByteOrder::Native => "NATIVE",
            ByteOrder::NativeStandard => "NATIVE_STD",
            ByteOrder::Little => "LE",
            ByteOrder::Big => "BE",
            ByteOrder::Network => "NET",
        }
    }

    /// Copy `src` into `dst` so that `dst` holds the scalar in this byte order.
    ///
    /// `src` is always least significant byte first.
    pub(crate) fn store(&self, src: &[u8], dst: &mut [u8]) {
        if self.is_little_endian() {
            dst.copy_from_slice(src);
        } else {
            for (d, s) in dst.iter_mut().zip(src.iter().rev()) {
                *d = *s;
            }
        }
    }

    /// Inverse of [`ByteOrder::store`]: `dst` receives the scalar LSB first.
    pub(crate) fn load(&self, src: &[u8], dst: &mut [u8]) {
        // Reversal is its own inverse.
        self.store(src, dst)
    }
}

impl TryFrom<u8> for ByteOrder {
    type Error = LayoutError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            FORMAT_NATIVE => Ok(ByteOrder::Native),
            FORMAT_NATIVE_STANDARD => Ok(ByteOrder::NativeStandard),
            FORMAT_LITTLE => Ok(ByteOrder::Little),
            FORMAT_BIG => Ok(ByteOrder::Big),
            FORMAT_NETWORK => Ok(ByteOrder::Network),
            other => Err(LayoutError::TypeMismatch(format!(
                "unknown byte order format character {:?}",
                other as char
            ))),
        }
    }
}
