//! `(start, stop, step)` selections over bytes and bits

use crate::error::LayoutError;
use crate::Result;
use alloc::vec::Vec;

/// Selection with optional, possibly negative bounds and a non-zero step
///
/// Bounds are clamped to the sequence rather than rejected; negative bounds
/// count from the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceSpec {
    /// First index (inclusive)
    pub start: Option<isize>,
    /// End index (exclusive)
    pub stop: Option<isize>,
    /// Step between selected indices; negative walks backwards
    pub step: Option<isize>,
}

impl SliceSpec {
    /// Select everything
    pub const fn full() -> Self {
        Self {
            start: None,
            stop: None,
            step: None,
        }
    }

    /// `start..stop` with step 1
    pub const fn range(start: isize, stop: isize) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    /// Replace the step
    pub const fn step_by(self, step: isize) -> Self {
        Self {
            step: Some(step),
            ..self
        }
    }

    /// Concrete indices selected in a sequence of `len` elements
    pub fn indices(&self, len: usize) -> Result<Vec<usize>> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(LayoutError::TypeMismatch("slice step cannot be zero".into()));
        }

        let len = len as isize;
        let clamp = |bound: isize, lower: isize, upper: isize| -> isize {
            let b = if bound < 0 { bound + len } else { bound };
            b.clamp(lower, upper)
        };

        let mut out = Vec::new();
        if step > 0 {
            let start = self.start.map_or(0, |s| clamp(s, 0, len));
            let stop = self.stop.map_or(len, |s| clamp(s, 0, len));
            let mut i = start;
            while i < stop {
                out.push(i as usize);
                match i.checked_add(step) {
                    Some(next) => i = next,
                    None => break,
                }
            }
        } else {
            let start = self.start.map_or(len - 1, |s| clamp(s, -1, len - 1));
            let stop = self.stop.map_or(-1, |s| clamp(s, -1, len - 1));
            let mut i = start;
            while i > stop {
                out.push(i as usize);
                match i.checked_add(step) {
                    Some(next) => i = next,
                    None => break,
                }
            }
        }
        Ok(out)
    }
}

/// Resolve a possibly negative index against a sequence of `len` elements
pub fn normalize_index(index: isize, len: usize) -> Result<usize> {
    let resolved = if index < 0 { index + len as isize } else { index };
    if resolved < 0 || resolved as usize >= len {
        return Err(LayoutError::index(index, len));
    }
    Ok(resolved as usize)
}

impl From<core::ops::Range<isize>> for SliceSpec {
    fn from(r: core::ops::Range<isize>) -> Self {
        SliceSpec::range(r.start, r.end)
    }
}

impl From<core::ops::RangeFull> for SliceSpec {
    fn from(_: core::ops::RangeFull) -> Self {
        SliceSpec::full()
    }
}
