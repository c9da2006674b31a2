//! Untyped byte blobs

use crate::error::LayoutError;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Generic fixed-size blob with no numeric interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlobKind {
    /// 1 byte
    Byte,
    /// 2 bytes
    Word,
    /// 4 bytes
    DWord,
    /// 8 bytes
    QWord,
}

impl BlobKind {
    /// Storage length in bytes
    pub const fn byte_len(&self) -> usize {
        match self {
            BlobKind::Byte => 1,
            BlobKind::Word => 2,
            BlobKind::DWord => 4,
            BlobKind::QWord => 8,
        }
    }

    /// Type name
    pub const fn name(&self) -> &'static str {
        match self {
            BlobKind::Byte => "Byte",
            BlobKind::Word => "Word",
            BlobKind::DWord => "DWord",
            BlobKind::QWord => "QWord",
        }
    }
}

/// Overwrite the first `data.len()` bytes of `dst`.
///
/// Shorter data leaves the tail untouched; longer data is rejected before
/// anything is written.
pub(crate) fn write_prefix(dst: &mut [u8], data: &[u8]) -> Result<()> {
    if data.len() > dst.len() {
        return Err(LayoutError::length(dst.len(), data.len()));
    }
    dst[..data.len()].copy_from_slice(data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_write() {
        let mut buf = [0xFFu8; 4];
        write_prefix(&mut buf, &[1, 2]).unwrap();
        assert_eq!(buf, [1, 2, 0xFF, 0xFF]);
    }

    #[test]
    fn test_oversized_write_rejected() {
        let mut buf = [0u8; 2];
        assert_eq!(
            write_prefix(&mut buf, &[1, 2, 3]),
            Err(LayoutError::LengthMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(buf, [0, 0]);
    }
}
