//! Integration tests for probability contexts and palette context selection.

use framestate_common::CommonState;
use framestate_core::{AllocBudget, CommonConfig};
use framestate_entropy::cdf::is_valid;
use framestate_entropy::{
    resolve_context, resolve_context_with_index, ContextSlot, EntropyContextStore,
    FrameEntropyContext, PALETTE_MAX_SIZE,
};

use crate::init_tracing;

/// Raster-scan a block the way the block decoder does and return every
/// pixel's context.
fn scan_contexts(map: &[u8], width: usize, height: usize, palette_size: usize) -> Vec<usize> {
    let mut contexts = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            if row == 0 && col == 0 {
                continue;
            }
            contexts.push(resolve_context(map, width, row, col, palette_size).context);
        }
    }
    contexts
}

#[test]
fn palette_contexts_select_valid_tables() {
    init_tracing();
    let fc = FrameEntropyContext::new(100);
    let (w, h) = (8, 8);
    // Vertical stripes of three colors
    let map: Vec<u8> = (0..w * h).map(|i| ((i % w) / 3) as u8).collect();

    for palette_size in 3..=PALETTE_MAX_SIZE {
        for ctx in scan_contexts(&map, w, h, palette_size) {
            let row = &fc.palette_y_color_index[palette_size - 2][ctx];
            assert!(is_valid(row, palette_size), "size {palette_size} ctx {ctx}");
        }
    }
}

#[test]
fn flat_block_uses_single_color_context() {
    let map = vec![5u8; 16];
    let contexts = scan_contexts(&map, 4, 4, 6);
    // First row and column see one neighbor, the interior sees three equal ones.
    assert_eq!(contexts.len(), 15);
    assert_eq!(&contexts[..3], &[0, 0, 0]);
    assert_eq!(contexts[3], 0);
    assert_eq!(contexts[4], 4);

    let ctx = resolve_context_with_index(&map, 4, 2, 2, 6);
    assert_eq!(ctx.color_index, Some(0));
    assert_eq!(ctx.color_order[0], 5);
}

#[test]
fn encoder_and_decoder_agree_on_order() {
    // Checkerboard of two colors
    let map: Vec<u8> = (0..36).map(|i| (((i / 6) + (i % 6)) % 2) as u8).collect();
    for row in 1..6 {
        for col in 1..6 {
            let enc = resolve_context_with_index(&map, 6, row, col, 2);
            let dec = resolve_context(&map, 6, row, col, 2);
            assert_eq!(enc.context, dec.context);
            assert_eq!(enc.color_order, dec.color_order);
            let index = usize::from(enc.color_index.unwrap());
            assert_eq!(enc.color_order[index], map[row * 6 + col]);
            // Left and top match each other, top-left differs
            assert_eq!(enc.context, 3);
        }
    }
}

#[test]
fn slots_hold_independent_adapted_state() {
    init_tracing();
    let mut store = EntropyContextStore::new(4, 30, &AllocBudget::default()).unwrap();

    // Three frames adapt differently and park their contexts.
    for slot in 0..3u8 {
        store.reset_to_defaults();
        store.working_mut().intra_inter[0][0] = 100 * u16::from(slot + 1);
        store.save_working_to(ContextSlot::Frame(slot)).unwrap();
    }

    for slot in 0..3u8 {
        store.load_working_from(ContextSlot::Frame(slot)).unwrap();
        assert_eq!(store.working().intra_inter[0][0], 100 * u16::from(slot + 1));
    }
    assert_eq!(
        *store.get_slot(ContextSlot::Frame(3)).unwrap(),
        FrameEntropyContext::new(30)
    );
}

#[test]
fn large_scale_tile_sessions_start_tiles_identically() {
    init_tracing();
    let config = CommonConfig {
        large_scale_tile: true,
        ..Default::default()
    };
    let mut cs = CommonState::new(config).unwrap();
    cs.set_frame_size(1024, 1024).unwrap();
    cs.begin_frame().unwrap();

    for slot in 0..8u8 {
        cs.entropy_mut()
            .get_slot_mut(ContextSlot::Frame(slot))
            .unwrap()
            .skip[0][0] = u16::from(slot);
    }
    cs.setup_past_independence(130).unwrap();

    let working = cs.entropy().working().as_bytes().to_vec();
    for slot in 0..8u8 {
        let ctx = cs.entropy().get_slot(ContextSlot::Frame(slot)).unwrap();
        assert_eq!(ctx.as_bytes(), working.as_slice());
    }
    assert_eq!(cs.entropy().defaults().as_bytes(), working.as_slice());
}
