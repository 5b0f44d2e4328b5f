//! FrameState Common - Session state of the codec common layer
//!
//! Architecture:
//! - `CommonState`: top-level orchestrator owning the buffer pool, context
//!   buffers, restoration planner and entropy context store
//! - `SegmentationParams`: per-segment feature data
//! - `LoopFilterParams`: session-level loop-filter delta state

pub mod params;
pub mod state;

pub use params::{LoopFilterParams, SegFeature, SegmentationParams, SEG_LVL_MAX};
pub use state::CommonState;
