//! FrameState Buffers - Per-frame auxiliary storage
//!
//! Arrays whose sizes follow from the block grid of the frame being coded:
//! - [`ContextBuffers`]: mode info, boundary map and above/top contexts (grow only)
//! - [`LoopFilterBitmasks`]: optional per-superblock edge masks
//! - [`RestorationPlanner`]: stripe line buffers and restoration unit tables

pub mod context;
pub mod loop_filter;
pub mod restoration;

pub use context::{BoundaryType, ContextBuffers, ModeInfo};
pub use loop_filter::{LoopFilterBitmasks, LoopFilterMask};
pub use restoration::{
    count_units, PlaneRestoration, RestorationParams, RestorationPlanner, RestorationType,
    RestorationUnitInfo, StripeBoundaries, TileLayout,
};
