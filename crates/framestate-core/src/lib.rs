//! FrameState Core - Foundation types for the codec common layer
//!
//! This crate provides the fundamental types shared by every FrameState crate:
//! - Error taxonomy and `Result` alias
//! - Session configuration (JSON persistence)
//! - Block-grid geometry derived from picture dimensions
//! - Budgeted, fallible buffer allocation
//! - Picture buffer layout and per-reference loop-filter deltas

pub mod alloc;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;

pub use alloc::AllocBudget;
pub use config::{CommonConfig, ConfigFile};
pub use error::{FrameStateError, Result};
pub use frame::{FrameBufferSpec, LoopFilterDeltas, PlaneLayout, MAX_MB_PLANE};
pub use geometry::{macroblock_count, FrameGeometry};
