//! Error types for FrameState.

use thiserror::Error;

/// Main error type for frame-state operations.
#[derive(Error, Debug)]
pub enum FrameStateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Out of frame buffer slots (capacity {capacity})")]
    OutOfSlots { capacity: usize },

    #[error("Stale slot handle: index {index}, generation {generation}")]
    StaleHandle { index: usize, generation: u32 },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FrameStateError {
    /// True for failures that leave the in-progress frame unusable.
    pub fn is_fatal_to_frame(&self) -> bool {
        matches!(
            self,
            Self::OutOfMemory(_) | Self::InvariantViolation(_) | Self::StaleHandle { .. }
        )
    }
}

/// Result type alias for frame-state operations.
pub type Result<T> = std::result::Result<T, FrameStateError>;
