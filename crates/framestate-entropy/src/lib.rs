//! FrameState Entropy - Probability-model state for the codec common layer
//!
//! This crate provides:
//! - Inverted CDF row helpers
//! - `FrameEntropyContext`, the per-frame set of probability tables, and its
//!   static defaults
//! - The entropy context store (working context, addressable slots, defaults)
//! - Palette color-index context derivation

pub mod cdf;
pub mod context;
mod defaults;
pub mod palette;
pub mod store;

pub use context::{coefficient_qctx, CoefficientCdfs, FrameEntropyContext, NmvComponent, NmvContext};
pub use palette::{resolve_context, resolve_context_with_index, PaletteContext, PALETTE_MAX_SIZE};
pub use store::{ContextSlot, EntropyContextStore};
