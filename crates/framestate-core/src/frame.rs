//! Picture buffer layout and per-reference frame state.
//!
//! Describes what a decoded-picture buffer must hold so an external
//! allocator can provide the storage.

use crate::error::{FrameStateError, Result};
use crate::geometry::checked_align_power_of_two;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Maximum number of color planes.
pub const MAX_MB_PLANE: usize = 3;
/// Default pixel border around decoded pictures.
pub const DEFAULT_BORDER: u32 = 64;
/// Number of reference frame kinds carrying a loop-filter delta (intra + 7).
pub const TOTAL_REFS_PER_FRAME: usize = 8;
/// Number of prediction-mode loop-filter deltas.
pub const MAX_MODE_LF_DELTAS: usize = 2;

/// log2 of the row stride alignment in bytes.
const STRIDE_ALIGN_LOG2: u32 = 5;

/// Requested shape of a decoded-picture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameBufferSpec {
    /// Picture width in pixels
    pub width: u32,
    /// Picture height in pixels
    pub height: u32,
    /// Chroma planes are half width
    pub subsampling_x: bool,
    /// Chroma planes are half height
    pub subsampling_y: bool,
    /// Sample bit depth (8, 10 or 12)
    pub bit_depth: u8,
    /// Only the luma plane is present
    pub monochrome: bool,
    /// Border in luma pixels on every side
    pub border: u32,
}

impl FrameBufferSpec {
    /// 4:2:0, 8-bit, default border.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            subsampling_x: true,
            subsampling_y: true,
            bit_depth: 8,
            monochrome: false,
            border: DEFAULT_BORDER,
        }
    }

    /// Set the sample bit depth.
    pub fn with_bit_depth(mut self, bit_depth: u8) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Set the chroma subsampling.
    pub fn with_subsampling(mut self, x: bool, y: bool) -> Self {
        self.subsampling_x = x;
        self.subsampling_y = y;
        self
    }

    /// Storage bytes per sample.
    #[inline]
    pub fn bytes_per_sample(&self) -> usize {
        if self.bit_depth > 8 {
            2
        } else {
            1
        }
    }

    /// Number of planes described.
    #[inline]
    pub fn plane_count(&self) -> usize {
        if self.monochrome {
            1
        } else {
            MAX_MB_PLANE
        }
    }

    /// Reject shapes no allocator should be asked for.
    ///
    /// A shape whose byte size does not fit a `usize` is `OutOfMemory`.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.bit_depth, 8 | 10 | 12) {
            return Err(FrameStateError::InvalidParameter(format!(
                "unsupported bit depth {}",
                self.bit_depth
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(FrameStateError::InvalidParameter(format!(
                "empty picture {}x{}",
                self.width, self.height
            )));
        }
        self.total_bytes().map(|_| ())
    }

    /// Per-plane layout, planes packed back to back.
    pub fn plane_layouts(&self) -> Result<SmallVec<[PlaneLayout; MAX_MB_PLANE]>> {
        let overflow = || {
            FrameStateError::OutOfMemory(format!(
                "picture buffer {}x{}: size overflow",
                self.width, self.height
            ))
        };
        let bps = self.bytes_per_sample();
        let aligned_width =
            checked_align_power_of_two(self.width as usize, 3).ok_or_else(overflow)?;
        let aligned_height =
            checked_align_power_of_two(self.height as usize, 3).ok_or_else(overflow)?;
        let border = self.border as usize;

        let mut planes = SmallVec::new();
        let mut offset: usize = 0;
        for plane in 0..self.plane_count() {
            let ss_x = usize::from(plane > 0 && self.subsampling_x);
            let ss_y = usize::from(plane > 0 && self.subsampling_y);
            let width = aligned_width >> ss_x;
            let height = aligned_height >> ss_y;
            let border_w = border >> ss_x;
            let border_h = border >> ss_y;
            let row_bytes = border_w
                .checked_mul(2)
                .and_then(|b| b.checked_add(width))
                .and_then(|w| w.checked_mul(bps))
                .ok_or_else(overflow)?;
            let stride =
                checked_align_power_of_two(row_bytes, STRIDE_ALIGN_LOG2).ok_or_else(overflow)?;
            let rows = border_h
                .checked_mul(2)
                .and_then(|b| b.checked_add(height))
                .ok_or_else(overflow)?;
            let size = stride.checked_mul(rows).ok_or_else(overflow)?;
            planes.push(PlaneLayout {
                width,
                height,
                stride,
                rows,
                offset,
                size,
            });
            offset = offset.checked_add(size).ok_or_else(overflow)?;
        }
        Ok(planes)
    }

    /// Total bytes of pixel storage, or `OutOfMemory` if it overflows.
    pub fn total_bytes(&self) -> Result<usize> {
        let planes = self.plane_layouts()?;
        Ok(planes.last().map_or(0, |p| p.offset + p.size))
    }
}

/// Placement of one plane inside a picture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    /// Visible width in samples (8-aligned for luma)
    pub width: usize,
    /// Visible height in samples
    pub height: usize,
    /// Bytes per row including borders (may include padding)
    pub stride: usize,
    /// Rows including borders
    pub rows: usize,
    /// Byte offset of the plane inside the buffer
    pub offset: usize,
    /// Plane size in bytes
    pub size: usize,
}

/// Loop-filter level adjustments carried by each reference picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoopFilterDeltas {
    /// Indexed by reference kind: intra, last, last2, last3, golden, bwdref, altref2, altref
    pub ref_deltas: [i8; TOTAL_REFS_PER_FRAME],
    /// Indexed by prediction mode class
    pub mode_deltas: [i8; MAX_MODE_LF_DELTAS],
}

impl LoopFilterDeltas {
    /// Intra frames filter harder, backward-leaning references softer.
    pub const DEFAULT_REF_DELTAS: [i8; TOTAL_REFS_PER_FRAME] = [1, 0, 0, 0, -1, 0, -1, -1];
    pub const DEFAULT_MODE_DELTAS: [i8; MAX_MODE_LF_DELTAS] = [0, 0];

    /// Restore both tables to their defaults.
    pub fn reset(&mut self) {
        self.ref_deltas = Self::DEFAULT_REF_DELTAS;
        self.mode_deltas = Self::DEFAULT_MODE_DELTAS;
    }
}

impl Default for LoopFilterDeltas {
    fn default() -> Self {
        Self {
            ref_deltas: Self::DEFAULT_REF_DELTAS,
            mode_deltas: Self::DEFAULT_MODE_DELTAS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuv420_layout() {
        let spec = FrameBufferSpec::new(1920, 1080);
        let planes = spec.plane_layouts().unwrap();
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0].width, 1920);
        assert_eq!(planes[1].width, 960);
        assert_eq!(planes[2].height, 540);
        // 1920 + 128 border = 2048, already 32-aligned
        assert_eq!(planes[0].stride, 2048);
        assert_eq!(planes[1].offset, planes[0].size);
        assert_eq!(spec.total_bytes().unwrap(), planes.iter().map(|p| p.size).sum::<usize>());
    }

    #[test]
    fn test_high_bitdepth_doubles_stride() {
        let low = FrameBufferSpec::new(64, 64);
        let high = low.with_bit_depth(10);
        assert_eq!(
            high.plane_layouts().unwrap()[0].stride,
            2 * low.plane_layouts().unwrap()[0].stride
        );
    }

    #[test]
    fn test_monochrome_single_plane() {
        let mut spec = FrameBufferSpec::new(64, 64);
        spec.monochrome = true;
        assert_eq!(spec.plane_layouts().unwrap().len(), 1);
    }

    #[test]
    fn test_validate() {
        assert!(FrameBufferSpec::new(16, 16).validate().is_ok());
        assert!(FrameBufferSpec::new(16, 16).with_bit_depth(9).validate().is_err());
        assert!(FrameBufferSpec::new(0, 16).validate().is_err());
    }

    #[test]
    fn test_oversized_picture_is_oom() {
        let spec = FrameBufferSpec::new(u32::MAX, u32::MAX).with_bit_depth(10);
        assert!(matches!(spec.total_bytes(), Err(FrameStateError::OutOfMemory(_))));
        assert!(matches!(spec.validate(), Err(FrameStateError::OutOfMemory(_))));

        let mut wide_border = FrameBufferSpec::new(16, 16);
        wide_border.border = u32::MAX;
        assert!(matches!(
            wide_border.plane_layouts(),
            Err(FrameStateError::OutOfMemory(_))
        ));
    }

    #[test]
    fn test_default_deltas() {
        let mut deltas = LoopFilterDeltas::default();
        assert_eq!(deltas.ref_deltas[0], 1);
        assert_eq!(deltas.ref_deltas[4], -1);
        deltas.ref_deltas[1] = 5;
        deltas.mode_deltas[1] = 3;
        deltas.reset();
        assert_eq!(deltas, LoopFilterDeltas::default());
    }
}
