//! Block-grid geometry derived from picture dimensions.
//!
//! Pixel dimensions are aligned up to a multiple of 8 luma pixels regardless
//! of chroma subsampling, so that 8x8 filter units stay uniform, then
//! converted to grid ("mode info") units.

use serde::{Deserialize, Serialize};

/// log2 of the grid unit size in luma pixels.
pub const MI_SIZE_LOG2: u32 = 3;
/// Grid unit size in luma pixels.
pub const MI_SIZE: u32 = 1 << MI_SIZE_LOG2;
/// log2 of the largest superblock size in grid units.
pub const MAX_MIB_SIZE_LOG2: u32 = 4;
/// Largest superblock size in grid units.
pub const MAX_MIB_SIZE: usize = 1 << MAX_MIB_SIZE_LOG2;
/// log2 of the smallest transform width in pixels.
pub const TX_SIZE_WIDE_LOG2_MIN: u32 = 2;
/// log2 of the number of minimum-size transforms across one grid unit.
pub const TX_UNIT_WIDE_LOG2: u32 = MI_SIZE_LOG2 - TX_SIZE_WIDE_LOG2_MIN;

/// Round `value` up to a multiple of `1 << n`.
#[inline]
pub const fn align_power_of_two(value: usize, n: u32) -> usize {
    let mask = (1usize << n) - 1;
    (value + mask) & !mask
}

/// [`align_power_of_two`], or `None` if the result does not fit a `usize`.
#[inline]
pub const fn checked_align_power_of_two(value: usize, n: u32) -> Option<usize> {
    let mask = (1usize << n) - 1;
    match value.checked_add(mask) {
        Some(v) => Some(v & !mask),
        None => None,
    }
}

/// Round a grid-unit length up to a whole number of superblocks.
#[inline]
pub const fn calc_mi_size(len: usize) -> usize {
    align_power_of_two(len, MAX_MIB_SIZE_LOG2)
}

/// Grid dimensions of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FrameGeometry {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Grid columns
    pub mi_cols: usize,
    /// Grid rows
    pub mi_rows: usize,
    /// Row stride in grid units (padded to a superblock multiple)
    pub mi_stride: usize,
    /// Legacy macroblock columns
    pub mb_cols: usize,
    /// Legacy macroblock rows
    pub mb_rows: usize,
    /// Total legacy macroblocks
    pub mbs: usize,
}

impl FrameGeometry {
    /// Compute grid geometry for a frame of the given pixel size.
    ///
    /// `compute(0, 0)` yields the degenerate geometry, which forces the next
    /// buffer sizing pass to reallocate from scratch.
    pub fn compute(width: u32, height: u32) -> Self {
        let aligned_width = align_power_of_two(width as usize, 3);
        let aligned_height = align_power_of_two(height as usize, 3);

        let mi_cols = aligned_width >> MI_SIZE_LOG2;
        let mi_rows = aligned_height >> MI_SIZE_LOG2;
        let mb_cols = (mi_cols + 2) >> 2;
        let mb_rows = (mi_rows + 2) >> 2;

        Self {
            width,
            height,
            mi_cols,
            mi_rows,
            mi_stride: calc_mi_size(mi_cols),
            mb_cols,
            mb_rows,
            mbs: mb_rows * mb_cols,
        }
    }

    /// The all-zero geometry.
    #[inline]
    pub const fn degenerate() -> Self {
        Self {
            width: 0,
            height: 0,
            mi_cols: 0,
            mi_rows: 0,
            mi_stride: 0,
            mb_cols: 0,
            mb_rows: 0,
            mbs: 0,
        }
    }

    /// True if the geometry covers no grid units.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.mi_cols == 0 || self.mi_rows == 0
    }

    /// Entries needed for the row-major block-mode-info array.
    #[inline]
    pub fn mi_alloc_size(&self) -> usize {
        self.mi_stride * calc_mi_size(self.mi_rows)
    }

    /// Entries needed for a grid-sized map addressed with `mi_stride`.
    #[inline]
    pub fn strided_grid_size(&self) -> usize {
        self.mi_rows * self.mi_stride
    }

    /// Entries needed for a dense `mi_rows x mi_cols` map.
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.mi_rows * self.mi_cols
    }

    /// Grid columns rounded up to a whole superblock.
    #[inline]
    pub fn aligned_mi_cols(&self) -> usize {
        align_power_of_two(self.mi_cols, MAX_MIB_SIZE_LOG2)
    }
}

/// Number of legacy macroblocks covering a frame.
pub fn macroblock_count(width: u32, height: u32) -> usize {
    FrameGeometry::compute(width, height).mbs
}
