//! External picture storage source.
//!
//! The pool never allocates pixel storage itself. The host application
//! injects a [`FrameBufferAllocator`]; any private state it needs (a memory
//! arena, a device handle) lives inside the implementor.

use framestate_core::{AllocBudget, FrameBufferSpec, Result};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::debug;

/// Pixel storage handed out by an allocator.
#[derive(Debug)]
pub struct RawFrameBuffer {
    data: Vec<u8>,
    id: u64,
}

impl RawFrameBuffer {
    /// Wrap storage with an allocator-chosen identifier.
    pub fn new(data: Vec<u8>, id: u64) -> Self {
        Self { data, id }
    }

    /// Allocator-chosen identifier.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Storage size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the storage is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read access to the pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Write access to the pixel bytes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Give the storage back to its owner.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// Allocation/release callback pair, fixed for a pool's lifetime.
pub trait FrameBufferAllocator: Send + Sync {
    /// Provide storage of at least `spec.total_bytes()` bytes.
    fn allocate(&self, spec: &FrameBufferSpec) -> Result<RawFrameBuffer>;

    /// Take back storage previously returned by `allocate`.
    fn release(&self, buffer: RawFrameBuffer);
}

/// Default allocator backed by the process heap.
#[derive(Debug)]
pub struct HeapAllocator {
    budget: AllocBudget,
    next_id: AtomicU64,
    live_buffers: AtomicUsize,
    live_bytes: AtomicUsize,
}

impl HeapAllocator {
    /// Create a heap allocator bounded by `budget`.
    pub fn new(budget: AllocBudget) -> Self {
        Self {
            budget,
            next_id: AtomicU64::new(1),
            live_buffers: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
        }
    }

    /// Buffers handed out and not yet released.
    pub fn live_buffers(&self) -> usize {
        self.live_buffers.load(Ordering::Acquire)
    }

    /// Bytes handed out and not yet released.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Acquire)
    }
}

impl Default for HeapAllocator {
    fn default() -> Self {
        Self::new(AllocBudget::default())
    }
}

impl FrameBufferAllocator for HeapAllocator {
    fn allocate(&self, spec: &FrameBufferSpec) -> Result<RawFrameBuffer> {
        let size = spec.total_bytes()?;
        let data = self.budget.zeroed_vec::<u8>(size, "picture buffer")?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.live_buffers.fetch_add(1, Ordering::AcqRel);
        self.live_bytes.fetch_add(size, Ordering::AcqRel);
        debug!(id, size, width = spec.width, height = spec.height, "Allocated picture buffer");
        Ok(RawFrameBuffer::new(data, id))
    }

    fn release(&self, buffer: RawFrameBuffer) {
        self.live_buffers.fetch_sub(1, Ordering::AcqRel);
        self.live_bytes.fetch_sub(buffer.len(), Ordering::AcqRel);
        debug!(id = buffer.id(), "Released picture buffer");
    }
}
