//! Integration tests for the buffer pool behind a coding session.
//!
//! Uses a host-supplied allocator to observe every allocate/release call.

use framestate_common::CommonState;
use framestate_core::{CommonConfig, FrameBufferSpec, FrameStateError, Result};
use framestate_pool::{FrameBufferAllocator, RawFrameBuffer};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crate::init_tracing;

/// Allocator that records what it hands out and can be told to refuse.
#[derive(Default)]
struct TrackingAllocator {
    next_id: AtomicU64,
    refuse: AtomicBool,
    live: Mutex<Vec<u64>>,
    released: Mutex<Vec<u64>>,
}

impl TrackingAllocator {
    fn live(&self) -> usize {
        self.live.lock().len()
    }

    fn released(&self) -> Vec<u64> {
        self.released.lock().clone()
    }
}

impl FrameBufferAllocator for TrackingAllocator {
    fn allocate(&self, spec: &FrameBufferSpec) -> Result<RawFrameBuffer> {
        if self.refuse.load(Ordering::Acquire) {
            return Err(FrameStateError::OutOfMemory("host refused".into()));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.live.lock().push(id);
        Ok(RawFrameBuffer::new(vec![0; spec.total_bytes()?], id))
    }

    fn release(&self, buffer: RawFrameBuffer) {
        self.live.lock().retain(|&id| id != buffer.id());
        self.released.lock().push(buffer.id());
    }
}

fn session(allocator: Arc<TrackingAllocator>, frame_buffers: usize) -> CommonState {
    init_tracing();
    let config = CommonConfig {
        frame_buffers,
        ..Default::default()
    };
    let mut cs = CommonState::with_allocator(config, allocator).unwrap();
    cs.set_frame_size(176, 144).unwrap();
    cs
}

#[test]
fn storage_returned_once_per_zero_crossing() {
    let allocator = Arc::new(TrackingAllocator::default());
    let mut cs = session(allocator.clone(), 4);
    let pool = cs.pool().clone();

    let frame = cs.begin_frame().unwrap();
    pool.retain(frame).unwrap();
    cs.end_frame().unwrap();
    assert_eq!(allocator.live(), 1);
    assert!(allocator.released().is_empty());

    pool.release(frame).unwrap();
    assert_eq!(allocator.live(), 0);
    assert_eq!(allocator.released(), vec![0]);

    // The handle is dead; a second release is rejected, not double-freed.
    assert!(matches!(
        pool.release(frame),
        Err(FrameStateError::StaleHandle { .. })
    ));
    assert_eq!(allocator.released().len(), 1);
}

#[test]
fn display_thread_shares_finished_pictures() {
    let allocator = Arc::new(TrackingAllocator::default());
    let mut cs = session(allocator.clone(), 4);
    let pool = cs.pool().clone();

    let frame = cs.begin_frame().unwrap();
    pool.retain(frame).unwrap();
    cs.end_frame().unwrap();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let pool = pool.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    pool.retain(frame).unwrap();
                    pool.with_frame(frame, |raw| raw.len()).unwrap();
                    pool.release(frame).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(pool.ref_count(frame).unwrap(), 1);
    assert!(allocator.released().is_empty());
    pool.release(frame).unwrap();
    assert_eq!(allocator.released().len(), 1);
}

#[test]
fn refused_allocation_leaves_slot_free() {
    let allocator = Arc::new(TrackingAllocator::default());
    let mut cs = session(allocator.clone(), 2);

    allocator.refuse.store(true, Ordering::Release);
    let err = cs.begin_frame().unwrap_err();
    assert!(matches!(err, FrameStateError::OutOfMemory(_)));
    assert_eq!(cs.cur_frame(), None);
    assert_eq!(cs.pool().free_slot_count(), 2);

    allocator.refuse.store(false, Ordering::Release);
    cs.begin_frame().unwrap();
    assert_eq!(allocator.live(), 1);
}

#[test]
fn teardown_returns_every_buffer() {
    let allocator = Arc::new(TrackingAllocator::default());
    let mut cs = session(allocator.clone(), 4);
    let pool = cs.pool().clone();

    let mut refs = Vec::new();
    for _ in 0..3 {
        let frame = cs.begin_frame().unwrap();
        pool.retain(frame).unwrap();
        pool.retain(frame).unwrap();
        cs.end_frame().unwrap();
        refs.push(frame);
    }
    assert_eq!(allocator.live(), 3);

    assert_eq!(pool.teardown_all(), 3);
    assert_eq!(allocator.live(), 0);
    assert!(refs.iter().all(|&frame| !pool.is_live(frame)));
    assert_eq!(pool.free_slot_count(), 4);
}

#[test]
fn dropping_session_releases_frame_in_progress() {
    let allocator = Arc::new(TrackingAllocator::default());
    let mut cs = session(allocator.clone(), 2);
    cs.begin_frame().unwrap();
    assert_eq!(allocator.live(), 1);

    drop(cs);
    assert_eq!(allocator.live(), 0);
}
