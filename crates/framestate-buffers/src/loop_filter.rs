//! Optional loop-filter bitmask storage.
//!
//! One [`LoopFilterMask`] covers a superblock. The component is enabled by a
//! configuration flag; when disabled every operation is a no-op and no
//! storage is held.

use bytemuck::Zeroable;
use framestate_core::geometry::{MAX_MIB_SIZE, MAX_MIB_SIZE_LOG2};
use framestate_core::{AllocBudget, FrameGeometry, Result};
use tracing::debug;

/// Transform sizes that get their own edge mask (4x4 through 32x32).
pub const LF_TX_SIZES: usize = 4;

/// Edge masks for one superblock, one bit per 4x4 block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroable)]
#[repr(C)]
pub struct LoopFilterMask {
    /// Vertical luma edges per transform size, four u64 words per superblock
    pub left_y: [[u64; 4]; LF_TX_SIZES],
    /// Horizontal luma edges per transform size
    pub above_y: [[u64; 4]; LF_TX_SIZES],
    /// Vertical chroma edges per transform size
    pub left_uv: [u64; LF_TX_SIZES],
    /// Horizontal chroma edges per transform size
    pub above_uv: [u64; LF_TX_SIZES],
}

impl Default for LoopFilterMask {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Superblock-indexed array of [`LoopFilterMask`].
#[derive(Debug)]
pub struct LoopFilterBitmasks {
    enabled: bool,
    masks: Vec<LoopFilterMask>,
    stride: usize,
}

impl LoopFilterBitmasks {
    /// Create the component. `enabled == false` makes it inert.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            masks: Vec::new(),
            stride: 0,
        }
    }

    /// True if the capability is on.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Superblock columns per mask row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of masks held.
    #[inline]
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// True if no masks are held.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Throw away the current masks and build a zeroed set for `geometry`.
    ///
    /// Lossless frames are never loop filtered, so they get no masks.
    pub fn rebuild(
        &mut self,
        geometry: &FrameGeometry,
        all_lossless: bool,
        budget: &AllocBudget,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        self.release();
        if all_lossless {
            return Ok(());
        }

        let stride = (geometry.mi_cols + (MAX_MIB_SIZE - 1)) >> MAX_MIB_SIZE_LOG2;
        let rows = (geometry.mi_rows + (MAX_MIB_SIZE - 1)) >> MAX_MIB_SIZE_LOG2;
        self.masks = budget.zeroed_vec(rows * stride, "loop filter bitmask")?;
        self.stride = stride;
        debug!(stride, count = self.masks.len(), "Rebuilt loop filter bitmasks");
        Ok(())
    }

    /// Drop every mask.
    pub fn release(&mut self) {
        self.masks = Vec::new();
        self.stride = 0;
    }

    /// Mask of the superblock at (`sb_row`, `sb_col`).
    pub fn get(&self, sb_row: usize, sb_col: usize) -> Option<&LoopFilterMask> {
        if sb_col >= self.stride {
            return None;
        }
        self.masks.get(sb_row * self.stride + sb_col)
    }

    /// Mutable mask of the superblock at (`sb_row`, `sb_col`).
    pub fn get_mut(&mut self, sb_row: usize, sb_col: usize) -> Option<&mut LoopFilterMask> {
        if sb_col >= self.stride {
            return None;
        }
        self.masks.get_mut(sb_row * self.stride + sb_col)
    }
}
