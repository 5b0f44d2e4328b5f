//! FrameState Pool - Shared decoded-picture buffers
//!
//! A fixed set of reference-counted slots. Pixel storage comes from an
//! injected [`FrameBufferAllocator`]; each slot also carries the motion
//! vector cache, segmentation map and loop-filter deltas of its picture.

pub mod allocator;
pub mod pool;
pub mod slot;

pub use allocator::{FrameBufferAllocator, HeapAllocator, RawFrameBuffer};
pub use pool::BufferPool;
pub use slot::{MotionVectorRef, SlotHandle};
