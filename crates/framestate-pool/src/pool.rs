//! Reference-counted pool of decoded-picture buffers.
//!
//! Each slot has its own lock so a display thread and a decode thread can
//! retain and release the same finished picture concurrently. Allocator
//! callbacks always run with no slot lock held.

use crate::allocator::{FrameBufferAllocator, HeapAllocator, RawFrameBuffer};
use crate::slot::{FrameSlot, MotionVectorRef, SlotHandle};
use framestate_core::{
    AllocBudget, FrameBufferSpec, FrameGeometry, FrameStateError, LoopFilterDeltas, Result,
};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fixed-capacity pool of picture buffer slots.
pub struct BufferPool {
    slots: Box<[Mutex<FrameSlot>]>,
    allocator: Arc<dyn FrameBufferAllocator>,
    budget: AllocBudget,
}

impl BufferPool {
    /// Create a pool of `capacity` slots backed by `allocator`.
    pub fn new(
        capacity: usize,
        allocator: Arc<dyn FrameBufferAllocator>,
        budget: AllocBudget,
    ) -> Self {
        let slots = (0..capacity)
            .map(|_| Mutex::new(FrameSlot::default()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        info!(capacity, "Created frame buffer pool");
        Self {
            slots,
            allocator,
            budget,
        }
    }

    /// Create a pool backed by the process heap.
    pub fn with_heap_allocator(capacity: usize, budget: AllocBudget) -> Self {
        Self::new(capacity, Arc::new(HeapAllocator::new(budget)), budget)
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots not referenced by any frame.
    pub fn free_slot_count(&self) -> usize {
        self.slots.iter().filter(|s| s.lock().ref_count == 0).count()
    }

    /// Claim a free slot and back it with storage from the allocator.
    ///
    /// The returned handle holds one reference.
    pub fn acquire_slot(&self, spec: &FrameBufferSpec) -> Result<SlotHandle> {
        spec.validate()?;
        let handle = self.reserve_free_slot()?;

        let raw = match self.allocator.allocate(spec) {
            Ok(raw) => raw,
            Err(e) => {
                let mut slot = self.slots[handle.index].lock();
                if slot.generation == handle.generation {
                    slot.retire();
                }
                warn!(slot = handle.index, error = %e, "Picture buffer allocation failed");
                return Err(match e {
                    FrameStateError::OutOfMemory(_) => e,
                    other => FrameStateError::OutOfMemory(other.to_string()),
                });
            }
        };

        let orphan = {
            let mut slot = self.slots[handle.index].lock();
            if slot.generation == handle.generation && slot.ref_count > 0 {
                slot.raw = Some(raw);
                slot.spec = Some(*spec);
                slot.lf_deltas = LoopFilterDeltas::default();
                None
            } else {
                Some(raw)
            }
        };
        if let Some(raw) = orphan {
            self.allocator.release(raw);
            return Err(FrameStateError::InvariantViolation(format!(
                "slot {} was torn down while its buffer was being allocated",
                handle.index
            )));
        }

        debug!(slot = handle.index, generation = handle.generation, "Acquired frame buffer slot");
        Ok(handle)
    }

    /// Add a shared reference. Returns the new count.
    pub fn retain(&self, handle: SlotHandle) -> Result<u32> {
        let mut slot = self.live_slot(handle)?;
        slot.ref_count = slot.ref_count.checked_add(1).ok_or_else(|| {
            FrameStateError::InvariantViolation(format!("slot {} ref count overflow", handle.index))
        })?;
        Ok(slot.ref_count)
    }

    /// Drop a reference. Returns the new count.
    ///
    /// On the transition to zero the storage goes back to the allocator and
    /// the slot's side arrays are freed; `handle` stops resolving.
    pub fn release(&self, handle: SlotHandle) -> Result<u32> {
        let released = {
            let mut slot = self.live_slot(handle)?;
            slot.ref_count -= 1;
            if slot.ref_count > 0 {
                return Ok(slot.ref_count);
            }
            slot.retire()
        };

        if let Some(raw) = released {
            self.allocator.release(raw);
        }
        debug!(slot = handle.index, "Frame buffer slot returned to pool");
        Ok(0)
    }

    /// Force every slot back to zero references.
    ///
    /// Returns the number of buffers handed back to the allocator.
    pub fn teardown_all(&self) -> usize {
        let mut released = Vec::new();
        for cell in self.slots.iter() {
            let mut slot = cell.lock();
            if slot.ref_count > 0 {
                if let Some(raw) = slot.retire() {
                    released.push(raw);
                }
            } else {
                slot.free_side_buffers();
            }
        }

        let count = released.len();
        for raw in released {
            self.allocator.release(raw);
        }
        info!(released = count, "Tore down frame buffer pool");
        count
    }

    /// Current reference count of a live handle.
    pub fn ref_count(&self, handle: SlotHandle) -> Result<u32> {
        Ok(self.live_slot(handle)?.ref_count)
    }

    /// True if `handle` still names a live acquisition.
    pub fn is_live(&self, handle: SlotHandle) -> bool {
        self.live_slot(handle).is_ok()
    }

    /// Shape the slot's storage was allocated for.
    pub fn spec(&self, handle: SlotHandle) -> Result<FrameBufferSpec> {
        let slot = self.live_slot(handle)?;
        slot.spec.ok_or_else(|| missing_storage(handle))
    }

    /// Read the picture storage.
    pub fn with_frame<R>(
        &self,
        handle: SlotHandle,
        f: impl FnOnce(&RawFrameBuffer) -> R,
    ) -> Result<R> {
        let slot = self.live_slot(handle)?;
        let raw = slot.raw.as_ref().ok_or_else(|| missing_storage(handle))?;
        Ok(f(raw))
    }

    /// Write the picture storage.
    pub fn with_frame_mut<R>(
        &self,
        handle: SlotHandle,
        f: impl FnOnce(&mut RawFrameBuffer) -> R,
    ) -> Result<R> {
        let mut slot = self.live_slot(handle)?;
        let raw = slot.raw.as_mut().ok_or_else(|| missing_storage(handle))?;
        Ok(f(raw))
    }

    /// Size the slot's motion vector cache and segmentation map for `geometry`.
    ///
    /// Both arrays only grow while the slot stays referenced.
    pub fn ensure_side_buffers(&self, handle: SlotHandle, geometry: &FrameGeometry) -> Result<()> {
        let mut slot = self.live_slot(handle)?;
        if slot.ensure_side_buffers(geometry, &self.budget)? {
            debug!(
                slot = handle.index,
                mi_rows = geometry.mi_rows,
                mi_cols = geometry.mi_cols,
                "Resized slot side buffers"
            );
        }
        Ok(())
    }

    /// Access the segmentation map (empty if not yet sized).
    pub fn with_seg_map_mut<R>(
        &self,
        handle: SlotHandle,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R> {
        let mut slot = self.live_slot(handle)?;
        Ok(f(slot.seg_map.as_deref_mut().unwrap_or(&mut [])))
    }

    /// Access the motion vector cache (empty if not yet sized).
    pub fn with_motion_vectors_mut<R>(
        &self,
        handle: SlotHandle,
        f: impl FnOnce(&mut [MotionVectorRef]) -> R,
    ) -> Result<R> {
        let mut slot = self.live_slot(handle)?;
        Ok(f(slot.mvs.as_deref_mut().unwrap_or(&mut [])))
    }

    /// Loop-filter deltas stored with the picture.
    pub fn loop_filter_deltas(&self, handle: SlotHandle) -> Result<LoopFilterDeltas> {
        Ok(self.live_slot(handle)?.lf_deltas)
    }

    /// Replace the loop-filter deltas stored with the picture.
    pub fn set_loop_filter_deltas(
        &self,
        handle: SlotHandle,
        deltas: LoopFilterDeltas,
    ) -> Result<()> {
        self.live_slot(handle)?.lf_deltas = deltas;
        Ok(())
    }

    /// Claim the first unreferenced slot.
    fn reserve_free_slot(&self) -> Result<SlotHandle> {
        for (index, cell) in self.slots.iter().enumerate() {
            let mut slot = cell.lock();
            if slot.ref_count == 0 {
                slot.ref_count = 1;
                return Ok(SlotHandle {
                    index,
                    generation: slot.generation,
                });
            }
        }
        warn!(capacity = self.capacity(), "Frame buffer pool exhausted");
        Err(FrameStateError::OutOfSlots {
            capacity: self.capacity(),
        })
    }

    /// Lock the slot named by `handle`, if the handle is still live.
    fn live_slot(&self, handle: SlotHandle) -> Result<MutexGuard<'_, FrameSlot>> {
        let stale = FrameStateError::StaleHandle {
            index: handle.index,
            generation: handle.generation,
        };
        let cell = self.slots.get(handle.index).ok_or(stale)?;
        let slot = cell.lock();
        if slot.generation != handle.generation || slot.ref_count == 0 {
            return Err(FrameStateError::StaleHandle {
                index: handle.index,
                generation: handle.generation,
            });
        }
        Ok(slot)
    }
}

impl Drop for BufferPool {
    fn drop(&mut self) {
        self.teardown_all();
    }
}

fn missing_storage(handle: SlotHandle) -> FrameStateError {
    FrameStateError::InvariantViolation(format!(
        "slot {} is referenced but has no storage",
        handle.index
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Records every release per buffer id.
    #[derive(Default)]
    struct RecordingAllocator {
        inner: HeapAllocator,
        releases: PlMutex<HashMap<u64, usize>>,
        fail_next: PlMutex<bool>,
    }

    impl RecordingAllocator {
        fn release_count(&self, id: u64) -> usize {
            self.releases.lock().get(&id).copied().unwrap_or(0)
        }

        fn total_releases(&self) -> usize {
            self.releases.lock().values().sum()
        }
    }

    impl FrameBufferAllocator for RecordingAllocator {
        fn allocate(&self, spec: &FrameBufferSpec) -> Result<RawFrameBuffer> {
            if std::mem::take(&mut *self.fail_next.lock()) {
                return Err(FrameStateError::OutOfMemory("injected".into()));
            }
            self.inner.allocate(spec)
        }

        fn release(&self, buffer: RawFrameBuffer) {
            *self.releases.lock().entry(buffer.id()).or_default() += 1;
            self.inner.release(buffer);
        }
    }

    fn pool(capacity: usize) -> (BufferPool, Arc<RecordingAllocator>) {
        let alloc = Arc::new(RecordingAllocator::default());
        let pool = BufferPool::new(capacity, alloc.clone(), AllocBudget::default());
        (pool, alloc)
    }

    fn spec() -> FrameBufferSpec {
        FrameBufferSpec::new(64, 48)
    }

    #[test]
    fn test_acquire_retain_release() {
        let (pool, alloc) = pool(4);
        let h = pool.acquire_slot(&spec()).unwrap();
        let id = pool.with_frame(h, |raw| raw.id()).unwrap();
        assert_eq!(pool.ref_count(h).unwrap(), 1);
        assert_eq!(pool.free_slot_count(), 3);

        assert_eq!(pool.retain(h).unwrap(), 2);
        assert_eq!(pool.release(h).unwrap(), 1);
        assert_eq!(alloc.release_count(id), 0);

        assert_eq!(pool.release(h).unwrap(), 0);
        assert_eq!(alloc.release_count(id), 1);
        assert_eq!(pool.free_slot_count(), 4);
    }

    #[test]
    fn test_stale_handle_rejected() {
        let (pool, _alloc) = pool(2);
        let h = pool.acquire_slot(&spec()).unwrap();
        pool.release(h).unwrap();

        assert!(matches!(pool.release(h), Err(FrameStateError::StaleHandle { .. })));
        assert!(matches!(pool.retain(h), Err(FrameStateError::StaleHandle { .. })));
        assert!(!pool.is_live(h));

        // The slot is reused under a new generation.
        let h2 = pool.acquire_slot(&spec()).unwrap();
        assert_eq!(h2.index(), h.index());
        assert_ne!(h2, h);
        assert!(pool.is_live(h2));
    }

    #[test]
    fn test_out_of_slots() {
        let (pool, _alloc) = pool(2);
        let _a = pool.acquire_slot(&spec()).unwrap();
        let _b = pool.acquire_slot(&spec()).unwrap();
        assert!(matches!(
            pool.acquire_slot(&spec()),
            Err(FrameStateError::OutOfSlots { capacity: 2 })
        ));
    }

    #[test]
    fn test_allocation_failure_leaves_slot_free() {
        let (pool, alloc) = pool(1);
        *alloc.fail_next.lock() = true;
        assert!(matches!(
            pool.acquire_slot(&spec()),
            Err(FrameStateError::OutOfMemory(_))
        ));
        assert_eq!(pool.free_slot_count(), 1);
        assert!(pool.acquire_slot(&spec()).is_ok());
    }

    #[test]
    fn test_invalid_spec_rejected() {
        let (pool, _alloc) = pool(1);
        let bad = spec().with_bit_depth(7);
        assert!(matches!(
            pool.acquire_slot(&bad),
            Err(FrameStateError::InvalidParameter(_))
        ));
        assert_eq!(pool.free_slot_count(), 1);
    }

    #[test]
    fn test_oversized_spec_is_oom() {
        let (pool, alloc) = pool(2);
        let huge = FrameBufferSpec::new(u32::MAX, u32::MAX).with_bit_depth(10);
        assert!(matches!(
            pool.acquire_slot(&huge),
            Err(FrameStateError::OutOfMemory(_))
        ));
        assert_eq!(pool.free_slot_count(), 2);
        assert_eq!(alloc.inner.live_buffers(), 0);

        // The allocator refuses the shape on its own as well.
        assert!(matches!(
            HeapAllocator::default().allocate(&huge),
            Err(FrameStateError::OutOfMemory(_))
        ));
        assert!(pool.acquire_slot(&spec()).is_ok());
    }

    #[test]
    fn test_teardown_releases_referenced_slots() {
        let (pool, alloc) = pool(4);
        let a = pool.acquire_slot(&spec()).unwrap();
        let b = pool.acquire_slot(&spec()).unwrap();
        pool.retain(b).unwrap();
        pool.ensure_side_buffers(a, &FrameGeometry::compute(64, 48)).unwrap();

        assert_eq!(pool.teardown_all(), 2);
        assert_eq!(alloc.total_releases(), 2);
        assert_eq!(pool.free_slot_count(), 4);
        assert!(!pool.is_live(a));
        assert!(!pool.is_live(b));
        assert_eq!(pool.teardown_all(), 0);
    }

    #[test]
    fn test_side_buffers_and_deltas() {
        let (pool, _alloc) = pool(1);
        let h = pool.acquire_slot(&spec()).unwrap();
        assert_eq!(pool.with_seg_map_mut(h, |m| m.len()).unwrap(), 0);

        let geometry = FrameGeometry::compute(64, 48);
        pool.ensure_side_buffers(h, &geometry).unwrap();
        assert_eq!(pool.with_seg_map_mut(h, |m| m.len()).unwrap(), 8 * 6);
        assert_eq!(pool.with_motion_vectors_mut(h, |m| m.len()).unwrap(), 4 * 3);

        let mut deltas = pool.loop_filter_deltas(h).unwrap();
        assert_eq!(deltas, LoopFilterDeltas::default());
        deltas.mode_deltas = [1, -1];
        pool.set_loop_filter_deltas(h, deltas).unwrap();
        assert_eq!(pool.loop_filter_deltas(h).unwrap().mode_deltas, [1, -1]);
    }

    #[test]
    fn test_drop_returns_storage() {
        let alloc = Arc::new(HeapAllocator::default());
        {
            let pool = BufferPool::new(3, alloc.clone(), AllocBudget::default());
            pool.acquire_slot(&spec()).unwrap();
            pool.acquire_slot(&spec()).unwrap();
            assert_eq!(alloc.live_buffers(), 2);
        }
        assert_eq!(alloc.live_buffers(), 0);
    }

    #[test]
    fn test_concurrent_retain_release() {
        let (pool, alloc) = pool(2);
        let pool = Arc::new(pool);
        let h = pool.acquire_slot(&spec()).unwrap();
        let id = pool.with_frame(h, |raw| raw.id()).unwrap();

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        pool.retain(h).unwrap();
                        pool.release(h).unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(pool.ref_count(h).unwrap(), 1);
        assert_eq!(alloc.release_count(id), 0);
        pool.release(h).unwrap();
        assert_eq!(alloc.release_count(id), 1);
    }

    proptest! {
        // Each slot's storage goes back exactly once, and only when its
        // last reference is dropped.
        #[test]
        fn release_fires_once_per_zero_crossing(
            ops in prop::collection::vec((0usize..3, any::<bool>()), 0..64),
        ) {
            let (pool, alloc) = pool(3);
            let mut live: Vec<(SlotHandle, u64, u32)> = Vec::new();
            let mut retired = Vec::new();

            for (pick, retain) in ops {
                if live.is_empty() || (retain && live.len() < 3 && pick == 0) {
                    let h = pool.acquire_slot(&spec()).unwrap();
                    let id = pool.with_frame(h, |raw| raw.id()).unwrap();
                    live.push((h, id, 1));
                    continue;
                }
                let i = pick % live.len();
                if retain {
                    live[i].2 = pool.retain(live[i].0).unwrap();
                } else {
                    let count = pool.release(live[i].0).unwrap();
                    prop_assert_eq!(count, live[i].2 - 1);
                    live[i].2 = count;
                    if count == 0 {
                        retired.push(live.swap_remove(i).1);
                    }
                }
                for (_, id, _) in &live {
                    prop_assert_eq!(alloc.release_count(*id), 0);
                }
                for id in &retired {
                    prop_assert_eq!(alloc.release_count(*id), 1);
                }
            }
        }
    }
}
