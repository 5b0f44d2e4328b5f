//! Line buffers for striped loop restoration.
//!
//! Each tile row is cut into 64-row stripes, offset upward by
//! [`RESTORATION_UNIT_OFFSET`] rows to line up with the preceding filter
//! stage. For every stripe the planner keeps [`RESTORATION_CTX_VERT`]
//! rows of samples above and below its boundary, so stripes can be filtered
//! in any order.
//!
//! Unlike [`ContextBuffers`](crate::ContextBuffers), boundary buffers are
//! reallocated whenever their required size changes, in either direction.

use framestate_core::geometry::{checked_align_power_of_two, MI_SIZE};
use framestate_core::{AllocBudget, FrameGeometry, FrameStateError, Result, MAX_MB_PLANE};
use smallvec::SmallVec;
use tracing::{debug, warn};

/// Stripe height in luma rows.
pub const RESTORATION_STRIPE_HEIGHT: usize = 64;
/// Upward shift of the stripe grid in luma rows.
pub const RESTORATION_UNIT_OFFSET: usize = 8;
/// Saved rows per side of a stripe boundary.
pub const RESTORATION_CTX_VERT: usize = 2;
/// Extra samples kept left and right of each saved row.
pub const RESTORATION_EXTRA_HORZ: usize = 4;
/// log2 of the boundary row stride alignment.
const RESTORATION_STRIDE_ALIGN_LOG2: u32 = 5;

/// Side of the block the filters process at once.
pub const RESTORATION_PROC_UNIT_SIZE: usize = 64;
const RESTORATION_BORDER_HORZ: usize = 3;
const RESTORATION_BORDER_VERT: usize = 3;
/// Samples in one padded processing unit.
pub const RESTORATION_PROC_UNIT_PIXELS: usize = (RESTORATION_PROC_UNIT_SIZE
    + RESTORATION_BORDER_HORZ * 2
    + 16)
    * (RESTORATION_PROC_UNIT_SIZE + RESTORATION_BORDER_VERT * 2);
/// Entries of the shared filter scratch buffer.
pub const RESTORATION_TMPBUF_LEN: usize = 2 * RESTORATION_PROC_UNIT_PIXELS;

/// Allowed restoration unit sizes in luma samples.
pub const RESTORATION_UNIT_SIZES: [usize; 3] = [64, 128, 256];
/// Default restoration unit size.
pub const RESTORATION_UNITSIZE_MAX: usize = 256;

/// Filter applied to a restoration unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RestorationType {
    #[default]
    None,
    Wiener,
    SelfGuided,
    Switchable,
}

/// Tile-row split of the block grid.
///
/// Holds the starting grid row of every tile row plus the end of the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayout {
    row_starts: SmallVec<[usize; 9]>,
}

impl TileLayout {
    /// One tile row covering the whole frame.
    pub fn single(mi_rows: usize) -> Self {
        Self {
            row_starts: SmallVec::from_slice(&[0, mi_rows]),
        }
    }

    /// Split `mi_rows` into `tile_rows` rows of whole superblocks.
    ///
    /// Trailing tile rows may come out shorter; empty ones are dropped.
    pub fn uniform(mi_rows: usize, tile_rows: usize, sb_size_log2: u32) -> Result<Self> {
        if tile_rows == 0 {
            return Err(FrameStateError::InvalidParameter(
                "tile layout needs at least one tile row".into(),
            ));
        }
        if mi_rows == 0 {
            return Ok(Self::single(0));
        }
        let sb_rows = (mi_rows + (1 << sb_size_log2) - 1) >> sb_size_log2;
        let sbs_per_tile = sb_rows.div_ceil(tile_rows).max(1);

        let mut row_starts = SmallVec::new();
        let mut start = 0;
        while start < mi_rows {
            row_starts.push(start);
            start = ((row_starts.len() * sbs_per_tile) << sb_size_log2).min(mi_rows);
        }
        row_starts.push(mi_rows);
        Ok(Self { row_starts })
    }

    /// Build from explicit boundaries: `[0, b1, ..., mi_rows]`, strictly increasing.
    pub fn from_boundaries(boundaries: &[usize]) -> Result<Self> {
        if boundaries.len() < 2 || boundaries[0] != 0 {
            return Err(FrameStateError::InvalidParameter(
                "tile boundaries must start at 0 and name at least one tile row".into(),
            ));
        }
        if boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(FrameStateError::InvalidParameter(format!(
                "tile boundaries must be strictly increasing: {boundaries:?}"
            )));
        }
        Ok(Self {
            row_starts: SmallVec::from_slice(boundaries),
        })
    }

    /// Number of tile rows.
    #[inline]
    pub fn tile_rows(&self) -> usize {
        self.row_starts.len() - 1
    }

    /// Grid rows covered by all tile rows.
    #[inline]
    pub fn mi_rows(&self) -> usize {
        self.row_starts[self.row_starts.len() - 1]
    }

    /// Grid row range of tile row `i`.
    pub fn row_range(&self, i: usize) -> std::ops::Range<usize> {
        self.row_starts[i]..self.row_starts[i + 1]
    }
}

/// Inputs that shape the restoration buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestorationParams {
    /// Luma width after super-resolution upscaling
    pub upscaled_width: u32,
    /// Luma height
    pub height: u32,
    pub bit_depth: u8,
    pub subsampling_x: bool,
    pub subsampling_y: bool,
    pub num_planes: usize,
    /// Restoration unit size per plane, in samples of that plane
    pub unit_sizes: [usize; MAX_MB_PLANE],
}

impl RestorationParams {
    /// 4:2:0, 8-bit, three planes, largest units everywhere.
    pub fn new(upscaled_width: u32, height: u32) -> Self {
        Self {
            upscaled_width,
            height,
            bit_depth: 8,
            subsampling_x: true,
            subsampling_y: true,
            num_planes: MAX_MB_PLANE,
            unit_sizes: [RESTORATION_UNITSIZE_MAX; MAX_MB_PLANE],
        }
    }

    #[inline]
    fn high_bitdepth(&self) -> bool {
        self.bit_depth > 8
    }

    fn validate(&self) -> Result<()> {
        if self.num_planes == 0 || self.num_planes > MAX_MB_PLANE {
            return Err(FrameStateError::InvalidParameter(format!(
                "plane count {} out of range",
                self.num_planes
            )));
        }
        for &size in &self.unit_sizes[..self.num_planes] {
            if !size.is_power_of_two() || !(32..=RESTORATION_UNITSIZE_MAX).contains(&size) {
                return Err(FrameStateError::InvalidParameter(format!(
                    "restoration unit size {size} not supported"
                )));
            }
        }
        Ok(())
    }
}

/// Number of restoration units along one plane dimension.
///
/// A trailing partial unit is merged into its neighbor unless it is at least
/// half a unit long. There is always at least one unit.
#[inline]
pub fn count_units(unit_size: usize, extent: usize) -> usize {
    ((extent + (unit_size >> 1)) / unit_size).max(1)
}

/// Per-unit filter choice and coefficients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestorationUnitInfo {
    pub restoration_type: RestorationType,
    /// Wiener taps: vertical then horizontal
    pub wiener: [[i16; 8]; 2],
    /// Self-guided parameter set and its two weights
    pub sgr_set: u8,
    pub sgr_xqd: [i16; 2],
}

/// Saved rows above and below every stripe boundary of one plane.
#[derive(Debug, Default)]
pub struct StripeBoundaries {
    above: Option<Vec<u8>>,
    below: Option<Vec<u8>>,
    size: usize,
    stride: usize,
}

impl StripeBoundaries {
    /// Bytes per buffer.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Samples per saved row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Rows saved above each boundary.
    pub fn above(&self) -> &[u8] {
        self.above.as_deref().unwrap_or(&[])
    }

    /// Rows saved below each boundary.
    pub fn below(&self) -> &[u8] {
        self.below.as_deref().unwrap_or(&[])
    }

    pub fn above_mut(&mut self) -> &mut [u8] {
        self.above.as_deref_mut().unwrap_or(&mut [][..])
    }

    pub fn below_mut(&mut self) -> &mut [u8] {
        self.below.as_deref_mut().unwrap_or(&mut [][..])
    }

    /// True if both buffers exist.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.above.is_some() && self.below.is_some()
    }

    fn release(&mut self) {
        self.above = None;
        self.below = None;
        self.size = 0;
        self.stride = 0;
    }
}

/// Restoration state of one color plane.
#[derive(Debug, Default)]
pub struct PlaneRestoration {
    pub frame_type: RestorationType,
    unit_size: usize,
    horz_units: usize,
    vert_units: usize,
    unit_info: Vec<RestorationUnitInfo>,
    boundaries: StripeBoundaries,
}

impl PlaneRestoration {
    #[inline]
    pub fn unit_size(&self) -> usize {
        self.unit_size
    }

    /// Units per row.
    #[inline]
    pub fn horz_units(&self) -> usize {
        self.horz_units
    }

    /// Unit rows.
    #[inline]
    pub fn vert_units(&self) -> usize {
        self.vert_units
    }

    /// Units in raster order, `horz_units` per row.
    pub fn unit_info(&self) -> &[RestorationUnitInfo] {
        &self.unit_info
    }

    pub fn unit_info_mut(&mut self) -> &mut [RestorationUnitInfo] {
        &mut self.unit_info
    }

    pub fn boundaries(&self) -> &StripeBoundaries {
        &self.boundaries
    }

    pub fn boundaries_mut(&mut self) -> &mut StripeBoundaries {
        &mut self.boundaries
    }

    fn release(&mut self) {
        self.unit_info = Vec::new();
        self.horz_units = 0;
        self.vert_units = 0;
        self.unit_size = 0;
        self.boundaries.release();
    }
}

/// Sizes and owns every loop-restoration allocation of a frame.
#[derive(Debug)]
pub struct RestorationPlanner {
    budget: AllocBudget,
    planes: [PlaneRestoration; MAX_MB_PLANE],
    /// Global stripe index one past the last stripe of each tile row.
    end_stripe: SmallVec<[usize; 8]>,
    num_stripes: usize,
    tmpbuf: Option<Vec<i32>>,
}

impl RestorationPlanner {
    pub fn new(budget: AllocBudget) -> Self {
        Self {
            budget,
            planes: Default::default(),
            end_stripe: SmallVec::new(),
            num_stripes: 0,
            tmpbuf: None,
        }
    }

    /// Size the unit tables, scratch buffer and stripe boundary buffers.
    ///
    /// Calling again with the same inputs reallocates nothing. If any
    /// allocation fails, every restoration buffer is released and the stripe
    /// count drops to zero, so no state from the previous frame survives.
    pub fn plan(&mut self, tiles: &TileLayout, params: &RestorationParams) -> Result<()> {
        params.validate()?;
        match self.resize_to(tiles, params) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(
                    width = params.upscaled_width,
                    height = params.height,
                    tile_rows = tiles.tile_rows(),
                    error = %e,
                    "Restoration buffer allocation failed, releasing all"
                );
                self.release_all();
                Err(e)
            }
        }
    }

    fn resize_to(&mut self, tiles: &TileLayout, params: &RestorationParams) -> Result<()> {
        for plane in 0..params.num_planes {
            self.plan_units(plane, params)?;
        }

        if self.tmpbuf.is_none() {
            let tmpbuf = self.budget.zeroed_vec(RESTORATION_TMPBUF_LEN, "restoration scratch")?;
            self.tmpbuf = Some(tmpbuf);
        }

        self.end_stripe.clear();
        let mut num_stripes: usize = 0;
        for i in 0..tiles.tile_rows() {
            let ext_h = tiles
                .row_range(i)
                .len()
                .checked_mul(MI_SIZE as usize)
                .and_then(|h| h.checked_add(RESTORATION_UNIT_OFFSET))
                .ok_or_else(|| size_overflow("stripe count"))?;
            num_stripes = num_stripes
                .checked_add(ext_h.div_ceil(RESTORATION_STRIPE_HEIGHT))
                .ok_or_else(|| size_overflow("stripe count"))?;
            self.end_stripe.push(num_stripes);
        }
        self.num_stripes = num_stripes;

        let frame_w = params.upscaled_width as usize;
        let bytes_per_sample = if params.high_bitdepth() { 2 } else { 1 };
        for plane in 0..params.num_planes {
            let ss_x = usize::from(plane > 0 && params.subsampling_x);
            let stride = frame_w
                .checked_add(ss_x)
                .and_then(|w| (w >> ss_x).checked_add(2 * RESTORATION_EXTRA_HORZ))
                .and_then(|w| checked_align_power_of_two(w, RESTORATION_STRIDE_ALIGN_LOG2))
                .ok_or_else(|| size_overflow("stripe boundary"))?;
            let size = num_stripes
                .checked_mul(stride)
                .and_then(|n| n.checked_mul(RESTORATION_CTX_VERT * bytes_per_sample))
                .ok_or_else(|| size_overflow("stripe boundary"))?;

            let boundaries = &mut self.planes[plane].boundaries;
            if size != boundaries.size || !boundaries.is_allocated() {
                boundaries.release();
                boundaries.above = Some(self.budget.zeroed_vec(size, "stripe boundary above")?);
                boundaries.below = Some(self.budget.zeroed_vec(size, "stripe boundary below")?);
                boundaries.size = size;
                debug!(plane, size, stride, num_stripes, "Reallocated stripe boundary buffers");
            }
            boundaries.stride = stride;
        }
        Ok(())
    }

    fn plan_units(&mut self, plane: usize, params: &RestorationParams) -> Result<()> {
        let is_uv = plane > 0;
        let ss_x = u32::from(is_uv && params.subsampling_x);
        let ss_y = u32::from(is_uv && params.subsampling_y);
        let unit_size = params.unit_sizes[plane];
        let width = round_shift(params.upscaled_width as usize, ss_x);
        let height = round_shift(params.height as usize, ss_y);

        let horz_units = count_units(unit_size, width);
        let vert_units = count_units(unit_size, height);
        let count = horz_units
            .checked_mul(vert_units)
            .ok_or_else(|| size_overflow("restoration units"))?;

        let pr = &mut self.planes[plane];
        if pr.unit_info.len() != count {
            pr.unit_info = Vec::new();
            pr.unit_info = self.budget.filled_vec(
                count,
                RestorationUnitInfo::default(),
                "restoration units",
            )?;
        }
        pr.unit_size = unit_size;
        pr.horz_units = horz_units;
        pr.vert_units = vert_units;
        Ok(())
    }

    /// Free every restoration allocation.
    pub fn release_all(&mut self) {
        for plane in self.planes.iter_mut() {
            plane.release();
        }
        self.tmpbuf = None;
        self.end_stripe.clear();
        self.num_stripes = 0;
    }

    /// Total stripes across all tile rows.
    #[inline]
    pub fn num_stripes(&self) -> usize {
        self.num_stripes
    }

    /// Global stripe index one past the last stripe of tile row `tile_row`.
    pub fn end_stripe(&self, tile_row: usize) -> Option<usize> {
        self.end_stripe.get(tile_row).copied()
    }

    /// Global stripe range of tile row `tile_row`.
    pub fn stripe_range(&self, tile_row: usize) -> Option<std::ops::Range<usize>> {
        let end = *self.end_stripe.get(tile_row)?;
        let start = if tile_row == 0 { 0 } else { self.end_stripe[tile_row - 1] };
        Some(start..end)
    }

    pub fn plane(&self, plane: usize) -> Option<&PlaneRestoration> {
        self.planes.get(plane)
    }

    pub fn plane_mut(&mut self, plane: usize) -> Option<&mut PlaneRestoration> {
        self.planes.get_mut(plane)
    }

    /// Shared filter scratch space, once planned.
    pub fn tmpbuf_mut(&mut self) -> Option<&mut [i32]> {
        self.tmpbuf.as_deref_mut()
    }
}

fn size_overflow(what: &str) -> FrameStateError {
    FrameStateError::OutOfMemory(format!("{what}: size overflow"))
}

#[inline]
fn round_shift(value: usize, n: u32) -> usize {
    if n == 0 {
        value
    } else {
        (value >> n) + ((value >> (n - 1)) & 1)
    }
}

/// Tile layout helper for callers that use a single tile row.
pub fn single_tile_layout(geometry: &FrameGeometry) -> TileLayout {
    TileLayout::single(geometry.mi_rows)
}
