//! Frame buffer slots and the opaque handles that name them.

use crate::allocator::RawFrameBuffer;
use bytemuck::Zeroable;
use framestate_core::{AllocBudget, FrameBufferSpec, FrameGeometry, LoopFilterDeltas, Result};

/// Opaque reference to one acquisition of a pool slot.
///
/// A handle stops resolving once its slot's reference count drops to zero,
/// so storage that went back to the allocator cannot be reached through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotHandle {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl SlotHandle {
    /// Position of the slot in the pool.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Motion vector saved for temporal prediction by later frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Zeroable)]
#[repr(C)]
pub struct MotionVectorRef {
    /// Row component in 1/8 pel
    pub row: i16,
    /// Column component in 1/8 pel
    pub col: i16,
    /// Reference frame kind, or a non-positive value for intra
    pub ref_frame: i8,
}

/// One entry of the pool.
#[derive(Debug, Default)]
pub(crate) struct FrameSlot {
    pub ref_count: u32,
    pub generation: u32,
    pub raw: Option<RawFrameBuffer>,
    pub spec: Option<FrameBufferSpec>,
    pub mvs: Option<Vec<MotionVectorRef>>,
    pub seg_map: Option<Vec<u8>>,
    pub side_mi_rows: usize,
    pub side_mi_cols: usize,
    pub lf_deltas: LoopFilterDeltas,
}

impl FrameSlot {
    /// Motion vector entries for a grid: one per 2x2 grid units.
    pub fn mvs_len(mi_rows: usize, mi_cols: usize) -> usize {
        ((mi_rows + 1) >> 1) * ((mi_cols + 1) >> 1)
    }

    /// Grow the side arrays if `geometry` exceeds what they were sized for.
    ///
    /// Returns true if anything was reallocated.
    pub fn ensure_side_buffers(
        &mut self,
        geometry: &FrameGeometry,
        budget: &AllocBudget,
    ) -> Result<bool> {
        let grow = self.mvs.is_none()
            || self.seg_map.is_none()
            || geometry.mi_rows > self.side_mi_rows
            || geometry.mi_cols > self.side_mi_cols;
        if !grow {
            return Ok(false);
        }

        self.free_side_buffers();
        let mvs = budget.zeroed_vec(
            Self::mvs_len(geometry.mi_rows, geometry.mi_cols),
            "motion vector cache",
        )?;
        let seg_map = budget.zeroed_vec(geometry.grid_size(), "segmentation map")?;

        self.mvs = Some(mvs);
        self.seg_map = Some(seg_map);
        self.side_mi_rows = geometry.mi_rows;
        self.side_mi_cols = geometry.mi_cols;
        Ok(true)
    }

    /// Drop the motion vector cache and segmentation map.
    pub fn free_side_buffers(&mut self) {
        self.mvs = None;
        self.seg_map = None;
        self.side_mi_rows = 0;
        self.side_mi_cols = 0;
    }

    /// Forget the current acquisition, returning the storage to hand back.
    pub fn retire(&mut self) -> Option<RawFrameBuffer> {
        self.ref_count = 0;
        self.generation = self.generation.wrapping_add(1);
        self.spec = None;
        self.free_side_buffers();
        self.raw.take()
    }
}
