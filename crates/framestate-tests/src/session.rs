//! Integration tests for the per-frame control flow of a coding session.

use framestate_buffers::TileLayout;
use framestate_common::CommonState;
use framestate_core::{macroblock_count, CommonConfig, ConfigFile, FrameStateError};
use framestate_entropy::{ContextSlot, FrameEntropyContext};

use crate::init_tracing;

fn session() -> CommonState {
    init_tracing();
    CommonState::new(CommonConfig::default()).unwrap()
}

#[test]
fn odd_sized_frame_end_to_end() {
    let mut cs = session();
    cs.set_frame_size(65, 33).unwrap();

    // 65 x 33 aligns to 72 x 40
    let g = *cs.geometry();
    assert_eq!((g.mi_cols, g.mi_rows), (9, 5));
    assert_eq!((g.mb_cols, g.mb_rows, g.mbs), (2, 1, 2));
    assert_eq!(macroblock_count(65, 33), 2);

    assert_eq!(cs.contexts().mode_info_capacity(), 16 * 16);
    assert_eq!(cs.contexts().boundary_capacity(), 5 * 16);
    assert_eq!(cs.contexts().above_context_alloc_cols(), 16);

    let frame = cs.begin_frame().unwrap();
    let pool = cs.pool().clone();
    assert_eq!(pool.spec(frame).unwrap().width, 65);
    assert_eq!(pool.with_seg_map_mut(frame, |m| m.len()).unwrap(), 45);
    assert_eq!(pool.with_motion_vectors_mut(frame, |m| m.len()).unwrap(), 15);

    cs.setup_past_independence(0).unwrap();
    cs.alloc_restoration_buffers(None, [64; 3]).unwrap();
    // 8 + 40 rows fit one stripe
    assert_eq!(cs.restoration().num_stripes(), 1);

    cs.end_frame().unwrap();
    assert!(!pool.is_live(frame));
}

#[test]
fn context_buffers_keep_peak_capacity() {
    let mut cs = session();
    cs.set_frame_size(1920, 1080).unwrap();
    let peak = cs.contexts().mode_info_capacity();
    assert_eq!(peak, 240 * 144);

    cs.set_frame_size(640, 360).unwrap();
    assert_eq!(cs.geometry().mi_cols, 80);
    assert_eq!(cs.contexts().mode_info_capacity(), peak);
    assert_eq!(cs.contexts().above_context_alloc_cols(), 240);

    cs.set_frame_size(3840, 2160).unwrap();
    assert_eq!(cs.contexts().mode_info_capacity(), 480 * 272);
    assert_eq!(cs.contexts().above_context_alloc_cols(), 480);
}

#[test]
fn restoration_follows_frame_size_both_ways() {
    let mut cs = session();
    cs.set_frame_size(256, 128).unwrap();
    cs.alloc_restoration_buffers(None, [64; 3]).unwrap();
    let first = cs.restoration().plane(0).unwrap().boundaries().above().as_ptr();
    // (256 + 8) aligned to 32, two context rows per stripe, three stripes
    assert_eq!(cs.restoration().plane(0).unwrap().boundaries().size(), 3 * 288 * 2);

    cs.alloc_restoration_buffers(None, [64; 3]).unwrap();
    let again = cs.restoration().plane(0).unwrap().boundaries().above().as_ptr();
    assert_eq!(first, again);

    cs.set_frame_size(512, 128).unwrap();
    cs.alloc_restoration_buffers(None, [64; 3]).unwrap();
    assert_eq!(cs.restoration().plane(0).unwrap().boundaries().size(), 3 * 544 * 2);
    assert_eq!(cs.restoration().plane(0).unwrap().horz_units(), 8);

    // Restoration shrinks with the frame; context buffers do not.
    cs.set_frame_size(256, 128).unwrap();
    cs.alloc_restoration_buffers(None, [64; 3]).unwrap();
    assert_eq!(cs.restoration().plane(0).unwrap().boundaries().size(), 3 * 288 * 2);
    assert_eq!(cs.contexts().above_context_alloc_cols(), 64);
}

#[test]
fn restoration_stripes_per_tile_row() {
    let mut cs = session();
    cs.set_frame_size(256, 256).unwrap();
    let tiles = TileLayout::uniform(cs.geometry().mi_rows, 2, 4).unwrap();
    assert_eq!(tiles.tile_rows(), 2);

    cs.alloc_restoration_buffers(Some(&tiles), [128; 3]).unwrap();
    assert_eq!(cs.restoration().num_stripes(), 6);
    assert_eq!(cs.restoration().stripe_range(0), Some(0..3));
    assert_eq!(cs.restoration().stripe_range(1), Some(3..6));
    assert_eq!(cs.restoration().stripe_range(2), None);
}

#[test]
fn failed_resize_unwinds_and_retries() {
    init_tracing();
    let config = CommonConfig {
        max_alloc_bytes: 1 << 20,
        ..Default::default()
    };
    let mut cs = CommonState::new(config).unwrap();

    let err = cs.set_frame_size(4096, 4096).unwrap_err();
    assert!(matches!(err, FrameStateError::OutOfMemory(_)));
    assert!(err.is_fatal_to_frame());
    assert!(cs.geometry().is_degenerate());
    assert_eq!(cs.contexts().mode_info_capacity(), 0);
    assert!(matches!(
        cs.begin_frame(),
        Err(FrameStateError::InvalidParameter(_))
    ));

    cs.set_frame_size(320, 240).unwrap();
    let frame = cs.begin_frame().unwrap();
    assert_eq!(cs.pool().ref_count(frame).unwrap(), 1);
    cs.end_frame().unwrap();
}

#[test]
fn config_file_drives_session() {
    init_tracing();
    let json = br#"{
        "version": 1,
        "config": { "monochrome": true, "bit_depth": 10, "frame_buffers": 2, "frame_contexts": 3 }
    }"#;
    let file = ConfigFile::from_json(json).unwrap();
    let mut cs = CommonState::new(file.config).unwrap();
    assert_eq!(cs.contexts().num_planes(), 1);
    assert_eq!(cs.entropy().num_slots(), 3);

    cs.set_frame_size(128, 128).unwrap();
    cs.alloc_restoration_buffers(None, [64; 3]).unwrap();
    assert!(cs.restoration().plane(0).unwrap().boundaries().is_allocated());
    assert!(!cs.restoration().plane(1).unwrap().boundaries().is_allocated());

    // Fill the two-slot pool with reference frames.
    let pool = cs.pool().clone();
    let mut refs = Vec::new();
    for _ in 0..2 {
        let frame = cs.begin_frame().unwrap();
        pool.retain(frame).unwrap();
        cs.end_frame().unwrap();
        refs.push(frame);
    }
    assert!(matches!(
        cs.begin_frame(),
        Err(FrameStateError::OutOfSlots { capacity: 2 })
    ));

    pool.release(refs[0]).unwrap();
    cs.begin_frame().unwrap();
}

#[test]
fn key_frame_then_inter_frames() {
    let mut cs = session();
    cs.set_frame_size(352, 288).unwrap();

    // Key frame: reset everything, then keep the adapted context in slot 0.
    let key = cs.begin_frame().unwrap();
    cs.setup_past_independence(40).unwrap();
    cs.entropy_mut().working_mut().skip[1][0] = 1000;
    cs.entropy_mut().save_working_to(ContextSlot::Frame(0)).unwrap();
    cs.pool().retain(key).unwrap();
    cs.end_frame().unwrap();

    // Inter frame: start from the key frame's adapted context.
    cs.begin_frame().unwrap();
    cs.entropy_mut().load_working_from(ContextSlot::Frame(0)).unwrap();
    assert_eq!(cs.entropy().working().skip[1][0], 1000);
    cs.entropy_mut().reset_to_defaults();
    assert_eq!(*cs.entropy().working(), FrameEntropyContext::new(40));
    cs.end_frame().unwrap();

    assert_eq!(cs.pool().ref_count(key).unwrap(), 1);
    cs.pool().release(key).unwrap();
    assert_eq!(cs.pool().free_slot_count(), cs.pool().capacity());
}
