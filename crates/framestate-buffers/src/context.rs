//! Per-frame auxiliary arrays sized from the block grid.
//!
//! Capacity only grows while a session runs. A smaller frame changes the
//! logical size reported by the accessors but keeps the storage, so frames
//! that fluctuate in size do not reallocate every time.

use crate::loop_filter::LoopFilterBitmasks;
use bytemuck::Zeroable;
use framestate_core::geometry::{MI_SIZE_LOG2, TX_SIZE_WIDE_LOG2_MIN, TX_UNIT_WIDE_LOG2};
use framestate_core::{AllocBudget, FrameGeometry, Result, MAX_MB_PLANE};
use tracing::{debug, warn};

/// Per-block decode state kept for the whole frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Zeroable)]
#[repr(C)]
pub struct ModeInfo {
    pub sb_type: u8,
    pub y_mode: u8,
    pub uv_mode: u8,
    pub tx_size: u8,
    pub skip: u8,
    pub segment_id: u8,
    pub ref_frame: [i8; 2],
    pub palette_size: [u8; 2],
    pub interp_filter: u16,
}

/// Which frame or tile edges a block touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Zeroable)]
#[repr(transparent)]
pub struct BoundaryType(pub u8);

impl BoundaryType {
    pub const LEFT: Self = Self(1 << 0);
    pub const RIGHT: Self = Self(1 << 1);
    pub const TOP: Self = Self(1 << 2);
    pub const BOTTOM: Self = Self(1 << 3);
    pub const TILE_LEFT: Self = Self(1 << 4);
    pub const TILE_RIGHT: Self = Self(1 << 5);
    pub const TILE_TOP: Self = Self(1 << 6);
    pub const TILE_BOTTOM: Self = Self(1 << 7);

    /// True if every bit of `other` is set.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for BoundaryType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for BoundaryType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Row-indexed context arrays for the frame being coded.
#[derive(Debug)]
pub struct ContextBuffers {
    num_planes: usize,
    budget: AllocBudget,
    geometry: FrameGeometry,
    all_lossless: bool,

    mode_info: Vec<ModeInfo>,
    boundary_info: Vec<BoundaryType>,

    above_context: [Vec<u8>; MAX_MB_PLANE],
    above_seg_context: Vec<u8>,
    above_txfm_context: Vec<u8>,
    top_txfm_context: [Vec<u8>; MAX_MB_PLANE],
    /// Grid columns the above/top arrays were sized for.
    above_context_alloc_cols: usize,

    loop_filter: LoopFilterBitmasks,
}

impl ContextBuffers {
    /// Create an empty set for `num_planes` color planes.
    pub fn new(num_planes: usize, budget: AllocBudget, loop_filter_bitmask: bool) -> Self {
        Self {
            num_planes: num_planes.clamp(1, MAX_MB_PLANE),
            budget,
            geometry: FrameGeometry::degenerate(),
            all_lossless: false,
            mode_info: Vec::new(),
            boundary_info: Vec::new(),
            above_context: Default::default(),
            above_seg_context: Vec::new(),
            above_txfm_context: Vec::new(),
            top_txfm_context: Default::default(),
            above_context_alloc_cols: 0,
            loop_filter: LoopFilterBitmasks::new(loop_filter_bitmask),
        }
    }

    /// Geometry of the last successful resize.
    #[inline]
    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// Number of color planes served.
    #[inline]
    pub fn num_planes(&self) -> usize {
        self.num_planes
    }

    /// Mark the coming frame lossless (no loop-filter masks needed).
    pub fn set_all_lossless(&mut self, all_lossless: bool) {
        self.all_lossless = all_lossless;
    }

    /// Make every array large enough for `geometry`.
    ///
    /// Only arrays whose requirement exceeds their capacity are reallocated,
    /// and they come back zeroed. On failure everything is released and the
    /// geometry falls back to the degenerate one, so a retry starts clean.
    pub fn ensure_capacity(&mut self, geometry: &FrameGeometry) -> Result<()> {
        match self.grow_to(geometry) {
            Ok(()) => {
                self.geometry = *geometry;
                Ok(())
            }
            Err(e) => {
                warn!(
                    mi_cols = geometry.mi_cols,
                    mi_rows = geometry.mi_rows,
                    error = %e,
                    "Context buffer allocation failed, releasing all"
                );
                self.release_all();
                Err(e)
            }
        }
    }

    fn grow_to(&mut self, geometry: &FrameGeometry) -> Result<()> {
        let mi_size = geometry.mi_alloc_size();
        if self.mode_info.len() < mi_size {
            self.mode_info = Vec::new();
            self.mode_info = self.budget.zeroed_vec(mi_size, "mode info")?;
            debug!(entries = mi_size, "Grew mode info array");
        }

        let boundary_size = geometry.strided_grid_size();
        if self.boundary_info.len() < boundary_size {
            self.boundary_info = Vec::new();
            self.boundary_info = self.budget.zeroed_vec(boundary_size, "boundary map")?;
        }

        if self.above_context_alloc_cols < geometry.mi_cols {
            let aligned_mi_cols = geometry.aligned_mi_cols();
            // The columns mark is only restored once every array fits.
            self.above_context_alloc_cols = 0;

            for plane in 0..self.num_planes {
                self.above_context[plane] = Vec::new();
                self.above_context[plane] = self.budget.zeroed_vec(
                    aligned_mi_cols << (MI_SIZE_LOG2 - TX_SIZE_WIDE_LOG2_MIN),
                    "above entropy context",
                )?;
            }

            self.above_seg_context = Vec::new();
            self.above_seg_context =
                self.budget.zeroed_vec(aligned_mi_cols, "above segmentation context")?;

            self.above_txfm_context = Vec::new();
            self.above_txfm_context = self
                .budget
                .zeroed_vec(aligned_mi_cols << TX_UNIT_WIDE_LOG2, "above transform context")?;

            for plane in 0..self.num_planes {
                self.top_txfm_context[plane] = Vec::new();
                self.top_txfm_context[plane] = self
                    .budget
                    .zeroed_vec(aligned_mi_cols << TX_UNIT_WIDE_LOG2, "top transform context")?;
            }

            self.above_context_alloc_cols = aligned_mi_cols;
            debug!(aligned_mi_cols, "Grew above context arrays");
        }

        self.loop_filter
            .rebuild(geometry, self.all_lossless, &self.budget)
    }

    /// Free every array and forget the geometry.
    pub fn release_all(&mut self) {
        self.mode_info = Vec::new();
        self.boundary_info = Vec::new();
        for plane in 0..MAX_MB_PLANE {
            self.above_context[plane] = Vec::new();
            self.top_txfm_context[plane] = Vec::new();
        }
        self.above_seg_context = Vec::new();
        self.above_txfm_context = Vec::new();
        self.above_context_alloc_cols = 0;
        self.loop_filter.release();
        self.geometry = FrameGeometry::degenerate();
    }

    /// Allocated mode info entries.
    #[inline]
    pub fn mode_info_capacity(&self) -> usize {
        self.mode_info.len()
    }

    /// Allocated boundary map entries.
    #[inline]
    pub fn boundary_capacity(&self) -> usize {
        self.boundary_info.len()
    }

    /// Grid columns the above/top arrays can serve.
    #[inline]
    pub fn above_context_alloc_cols(&self) -> usize {
        self.above_context_alloc_cols
    }

    /// Mode info for the current frame, `mi_stride` entries per row.
    pub fn mode_info(&self) -> &[ModeInfo] {
        &self.mode_info[..self.geometry.mi_alloc_size()]
    }

    pub fn mode_info_mut(&mut self) -> &mut [ModeInfo] {
        let len = self.geometry.mi_alloc_size();
        &mut self.mode_info[..len]
    }

    /// Boundary flags, `mi_stride` entries per row.
    pub fn boundary_info(&self) -> &[BoundaryType] {
        &self.boundary_info[..self.geometry.strided_grid_size()]
    }

    pub fn boundary_info_mut(&mut self) -> &mut [BoundaryType] {
        let len = self.geometry.strided_grid_size();
        &mut self.boundary_info[..len]
    }

    /// Above entropy context of `plane` (empty for missing planes).
    pub fn above_context_mut(&mut self, plane: usize) -> &mut [u8] {
        let len = self.geometry.aligned_mi_cols() << (MI_SIZE_LOG2 - TX_SIZE_WIDE_LOG2_MIN);
        match self.above_context.get_mut(plane) {
            Some(ctx) if !ctx.is_empty() => &mut ctx[..len],
            _ => &mut [][..],
        }
    }

    /// Above partition/segmentation context.
    pub fn above_seg_context_mut(&mut self) -> &mut [u8] {
        let len = self.geometry.aligned_mi_cols();
        &mut self.above_seg_context[..len]
    }

    /// Above transform-size context.
    pub fn above_txfm_context_mut(&mut self) -> &mut [u8] {
        let len = self.geometry.aligned_mi_cols() << TX_UNIT_WIDE_LOG2;
        &mut self.above_txfm_context[..len]
    }

    /// Top transform-size context of `plane` (empty for missing planes).
    pub fn top_txfm_context_mut(&mut self, plane: usize) -> &mut [u8] {
        let len = self.geometry.aligned_mi_cols() << TX_UNIT_WIDE_LOG2;
        match self.top_txfm_context.get_mut(plane) {
            Some(ctx) if !ctx.is_empty() => &mut ctx[..len],
            _ => &mut [][..],
        }
    }

    /// Zero the above contexts before coding a new tile row.
    pub fn clear_above_contexts(&mut self) {
        for ctx in self.above_context.iter_mut() {
            ctx.fill(0);
        }
        self.above_seg_context.fill(0);
        self.above_txfm_context.fill(0);
    }

    /// Zero every mode info entry.
    pub fn clear_mode_info(&mut self) {
        self.mode_info.fill(ModeInfo::default());
    }

    /// The optional loop-filter bitmask component.
    pub fn loop_filter(&self) -> &LoopFilterBitmasks {
        &self.loop_filter
    }

    pub fn loop_filter_mut(&mut self) -> &mut LoopFilterBitmasks {
        &mut self.loop_filter
    }
}
