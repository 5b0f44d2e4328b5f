//! Per-session common-layer state.
//!
//! `CommonState` drives the per-frame control flow: a new frame size
//! recomputes the grid geometry and grows the context buffers, restoration
//! buffers follow the tile layout, the pool supplies the picture being coded,
//! and intra or error-resilient frames reset the entropy state through
//! [`CommonState::setup_past_independence`].

use crate::params::{LoopFilterParams, SegmentationParams};
use framestate_buffers::restoration::single_tile_layout;
use framestate_buffers::{ContextBuffers, RestorationParams, RestorationPlanner, TileLayout};
use framestate_core::{
    AllocBudget, CommonConfig, FrameGeometry, FrameStateError, LoopFilterDeltas, Result,
};
use framestate_entropy::EntropyContextStore;
use framestate_pool::{BufferPool, FrameBufferAllocator, SlotHandle};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything the common layer keeps for one coding session.
pub struct CommonState {
    config: CommonConfig,
    budget: AllocBudget,
    geometry: FrameGeometry,
    pool: Arc<BufferPool>,
    contexts: ContextBuffers,
    restoration: RestorationPlanner,
    entropy: EntropyContextStore,
    seg: SegmentationParams,
    lf: LoopFilterParams,
    /// Picture being coded; holds one pool reference.
    cur_frame: Option<SlotHandle>,
}

impl CommonState {
    /// Create a session backed by the process heap.
    pub fn new(config: CommonConfig) -> Result<Self> {
        config.validate()?;
        let pool = BufferPool::with_heap_allocator(config.frame_buffers, config.budget());
        Self::with_pool(config, Arc::new(pool))
    }

    /// Create a session whose picture storage comes from `allocator`.
    pub fn with_allocator(
        config: CommonConfig,
        allocator: Arc<dyn FrameBufferAllocator>,
    ) -> Result<Self> {
        config.validate()?;
        let pool = BufferPool::new(config.frame_buffers, allocator, config.budget());
        Self::with_pool(config, Arc::new(pool))
    }

    fn with_pool(config: CommonConfig, pool: Arc<BufferPool>) -> Result<Self> {
        let budget = config.budget();
        let entropy = EntropyContextStore::new(config.frame_contexts, 0, &budget)?;
        info!(
            frame_buffers = config.frame_buffers,
            frame_contexts = config.frame_contexts,
            bit_depth = config.bit_depth,
            large_scale_tile = config.large_scale_tile,
            "Initialized common state"
        );
        Ok(Self {
            contexts: ContextBuffers::new(config.num_planes(), budget, config.loop_filter_bitmask),
            restoration: RestorationPlanner::new(budget),
            geometry: FrameGeometry::degenerate(),
            seg: SegmentationParams::default(),
            lf: LoopFilterParams::default(),
            cur_frame: None,
            config,
            budget,
            pool,
            entropy,
        })
    }

    #[inline]
    pub fn config(&self) -> &CommonConfig {
        &self.config
    }

    /// Geometry of the current frame size; degenerate before the first
    /// successful [`set_frame_size`](Self::set_frame_size).
    #[inline]
    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// Shared handle to the picture pool, for display or reorder threads.
    #[inline]
    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    #[inline]
    pub fn contexts(&self) -> &ContextBuffers {
        &self.contexts
    }

    #[inline]
    pub fn contexts_mut(&mut self) -> &mut ContextBuffers {
        &mut self.contexts
    }

    #[inline]
    pub fn restoration(&self) -> &RestorationPlanner {
        &self.restoration
    }

    #[inline]
    pub fn restoration_mut(&mut self) -> &mut RestorationPlanner {
        &mut self.restoration
    }

    #[inline]
    pub fn entropy(&self) -> &EntropyContextStore {
        &self.entropy
    }

    #[inline]
    pub fn entropy_mut(&mut self) -> &mut EntropyContextStore {
        &mut self.entropy
    }

    #[inline]
    pub fn segmentation(&self) -> &SegmentationParams {
        &self.seg
    }

    #[inline]
    pub fn segmentation_mut(&mut self) -> &mut SegmentationParams {
        &mut self.seg
    }

    #[inline]
    pub fn loop_filter(&self) -> &LoopFilterParams {
        &self.lf
    }

    #[inline]
    pub fn loop_filter_mut(&mut self) -> &mut LoopFilterParams {
        &mut self.lf
    }

    /// Picture currently being coded.
    #[inline]
    pub fn cur_frame(&self) -> Option<SlotHandle> {
        self.cur_frame
    }

    /// Adopt a new frame size.
    ///
    /// On allocation failure the context buffers are released and the
    /// geometry drops to the degenerate one.
    pub fn set_frame_size(&mut self, width: u32, height: u32) -> Result<()> {
        let geometry = FrameGeometry::compute(width, height);
        if let Err(e) = self.contexts.ensure_capacity(&geometry) {
            self.geometry = FrameGeometry::degenerate();
            return Err(e);
        }
        self.geometry = geometry;
        debug!(
            width,
            height,
            mi_cols = geometry.mi_cols,
            mi_rows = geometry.mi_rows,
            mi_stride = geometry.mi_stride,
            "Frame size set"
        );
        Ok(())
    }

    /// Size the restoration buffers for `tiles` and per-plane `unit_sizes`.
    ///
    /// Without `tiles` the whole frame is one tile row. On failure every
    /// restoration allocation is released.
    pub fn alloc_restoration_buffers(
        &mut self,
        tiles: Option<&TileLayout>,
        unit_sizes: [usize; framestate_core::MAX_MB_PLANE],
    ) -> Result<()> {
        let single;
        let tiles = match tiles {
            Some(tiles) => tiles,
            None => {
                single = single_tile_layout(&self.geometry);
                &single
            }
        };
        if tiles.mi_rows() != self.geometry.mi_rows {
            return Err(FrameStateError::InvalidParameter(format!(
                "tile layout covers {} grid rows, frame has {}",
                tiles.mi_rows(),
                self.geometry.mi_rows
            )));
        }

        let params = RestorationParams {
            upscaled_width: self.geometry.width,
            height: self.geometry.height,
            bit_depth: self.config.bit_depth,
            subsampling_x: self.config.subsampling_x,
            subsampling_y: self.config.subsampling_y,
            num_planes: self.config.num_planes(),
            unit_sizes,
        };
        self.restoration.plan(tiles, &params)
    }

    /// Claim a picture buffer for the next frame and size its side arrays.
    pub fn begin_frame(&mut self) -> Result<SlotHandle> {
        if self.cur_frame.is_some() {
            return Err(FrameStateError::InvariantViolation(
                "begin_frame called with a frame in progress".into(),
            ));
        }
        if self.geometry.is_degenerate() {
            return Err(FrameStateError::InvalidParameter("frame size not set".into()));
        }

        let spec = self
            .config
            .frame_buffer_spec(self.geometry.width, self.geometry.height);
        let handle = self.pool.acquire_slot(&spec)?;
        if let Err(e) = self.pool.ensure_side_buffers(handle, &self.geometry) {
            // Dropping our only reference frees the picture again.
            if let Err(release_err) = self.pool.release(handle) {
                warn!(error = %release_err, "Failed to release slot after side buffer failure");
            }
            return Err(e);
        }
        self.cur_frame = Some(handle);
        debug!(slot = handle.index(), "Frame begun");
        Ok(handle)
    }

    /// Drop this session's reference to the picture being coded.
    ///
    /// Callers keeping the picture as a reference must `retain` it first.
    pub fn end_frame(&mut self) -> Result<()> {
        if let Some(handle) = self.cur_frame.take() {
            let remaining = self.pool.release(handle)?;
            debug!(slot = handle.index(), remaining, "Frame ended");
        }
        Ok(())
    }

    /// Forget everything learned from earlier frames.
    ///
    /// Clears segmentation features and the current segmentation map, resets
    /// loop-filter deltas on the current picture and the session, reloads
    /// the working entropy context from the static tables for
    /// `base_qindex`, then sets up the frame contexts.
    pub fn setup_past_independence(&mut self, base_qindex: u8) -> Result<()> {
        self.seg.clear_all_features();

        if let Some(handle) = self.cur_frame {
            self.pool.with_seg_map_mut(handle, |map| map.fill(0))?;
            self.pool
                .set_loop_filter_deltas(handle, LoopFilterDeltas::default())?;
        }
        self.lf.set_default_deltas();

        self.entropy.load_static_defaults(base_qindex);
        self.setup_frame_contexts();
        info!(base_qindex, "Past independence set up");
        Ok(())
    }

    /// Capture the working entropy context as defaults, seeding every slot
    /// in large-scale-tile mode.
    pub fn setup_frame_contexts(&mut self) {
        self.entropy.setup_frame_contexts(self.config.large_scale_tile);
    }

    /// Free the context and restoration buffers.
    ///
    /// The pool and entropy store stay intact; the next
    /// [`set_frame_size`](Self::set_frame_size) allocates from scratch.
    pub fn remove_common(&mut self) {
        self.contexts.release_all();
        self.restoration.release_all();
        self.geometry = FrameGeometry::degenerate();
        info!("Released common buffers");
    }

    /// Allocation budget shared by every component.
    #[inline]
    pub fn budget(&self) -> &AllocBudget {
        &self.budget
    }
}

impl Drop for CommonState {
    fn drop(&mut self) {
        if let Err(e) = self.end_frame() {
            warn!(error = %e, "Failed to release current frame on drop");
        }
    }
}

impl std::fmt::Debug for CommonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommonState")
            .field("geometry", &self.geometry)
            .field("cur_frame", &self.cur_frame)
            .field("entropy", &self.entropy)
            .finish_non_exhaustive()
    }
}
