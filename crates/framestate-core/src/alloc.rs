//! Fallible, budgeted allocation of zero-initialized arrays.
//!
//! Buffer sizes come from untrusted headers, so every owned array goes
//! through [`AllocBudget::zeroed_vec`] instead of `vec![..]`, turning both
//! oversize requests and allocator refusal into [`FrameStateError::OutOfMemory`].

use crate::error::{FrameStateError, Result};
use bytemuck::Zeroable;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default ceiling for a single allocation (16 GiB).
pub const DEFAULT_MAX_ALLOC_BYTES: u64 = 1 << 34;

/// Upper bound on the size of any single allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocBudget {
    max_bytes: u64,
}

impl AllocBudget {
    /// Create a budget that refuses allocations above `max_bytes`.
    pub const fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// A budget limited only by the system allocator.
    pub const fn unlimited() -> Self {
        Self { max_bytes: u64::MAX }
    }

    /// Largest allowed allocation in bytes.
    #[inline]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Check that `len` elements of `elem_size` bytes fit the budget.
    pub fn check(&self, len: usize, elem_size: usize, what: &str) -> Result<u64> {
        let bytes = (len as u64)
            .checked_mul(elem_size as u64)
            .ok_or_else(|| FrameStateError::OutOfMemory(format!("{what}: size overflow")))?;
        if bytes > self.max_bytes {
            warn!(what, bytes, limit = self.max_bytes, "Allocation exceeds budget");
            return Err(FrameStateError::OutOfMemory(format!(
                "{what}: {bytes} bytes exceeds limit of {}",
                self.max_bytes
            )));
        }
        Ok(bytes)
    }

    /// Allocate `len` zeroed elements, or fail without panicking.
    pub fn zeroed_vec<T: Zeroable + Clone>(&self, len: usize, what: &str) -> Result<Vec<T>> {
        self.filled_vec(len, T::zeroed(), what)
    }

    /// Allocate `len` copies of `value`, or fail without panicking.
    pub fn filled_vec<T: Clone>(&self, len: usize, value: T, what: &str) -> Result<Vec<T>> {
        self.check(len, std::mem::size_of::<T>(), what)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            warn!(what, len, error = %e, "Allocator refused request");
            FrameStateError::OutOfMemory(format!("{what}: {e}"))
        })?;
        data.resize(len, value);
        Ok(data)
    }
}

impl Default for AllocBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ALLOC_BYTES)
    }
}
