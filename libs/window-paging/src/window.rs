use serde::{Deserialize, Serialize};

use crate::error::{PagingError, PagingResult};

/// Contiguous range of records a caller wants: `[offset, offset + count)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    offset: u64,
    count: u64,
}

impl Window {
    /// Validate and build a window. `count` must be positive and the last
    /// index must be representable.
    pub fn new(offset: u64, count: u64) -> PagingResult<Self> {
        if count == 0 {
            return Err(PagingError::ZeroCount);
        }
        if offset.checked_add(count).is_none() {
            return Err(PagingError::WindowOverflow { offset, count });
        }
        Ok(Self { offset, count })
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Index of the last record in the window (inclusive).
    #[inline]
    pub fn last_index(&self) -> u64 {
        self.offset + self.count - 1
    }

    /// Exclusive end of the window.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.count
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.offset, self.end())
    }
}
