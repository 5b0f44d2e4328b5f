//! Palette color-index context derivation.
//!
//! Palette indices are coded in raster order. Each pixel's context comes
//! from its left, top-left and top neighbors: neighbor colors are scored,
//! the three best are moved to the front of a color order, and their scores
//! hash to one of [`PALETTE_COLOR_INDEX_CONTEXTS`] contexts. Encoder and
//! decoder must agree exactly, so every step here is fixed.

use crate::context::PALETTE_COLOR_INDEX_CONTEXTS;

/// Largest palette a block may use.
pub const PALETTE_MAX_SIZE: usize = 8;

const NUM_NEIGHBORS: usize = 3;
/// Left, top-left, top.
const NEIGHBOR_WEIGHTS: [u8; NUM_NEIGHBORS] = [2, 1, 2];
const HASH_MULTIPLIERS: [u8; NUM_NEIGHBORS] = [1, 2, 2];
const MAX_CONTEXT_HASH: usize = 8;

/// Context per score hash. `None` marks hashes no neighbor pattern produces.
const CONTEXT_LOOKUP: [Option<u8>; MAX_CONTEXT_HASH + 1] = [
    None,
    None,
    Some(0),
    None,
    None,
    Some(4),
    Some(3),
    Some(2),
    Some(1),
];

/// Result of resolving one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteContext {
    /// Probability-table index, below [`PALETTE_COLOR_INDEX_CONTEXTS`].
    pub context: usize,
    /// Palette colors reordered with the best-scoring neighbors first.
    pub color_order: [u8; PALETTE_MAX_SIZE],
    /// The pixel's own color expressed as a position in `color_order`.
    pub color_index: Option<u8>,
}

/// Context of the pixel at (`row`, `col`) in a row-major `color_map`.
///
/// The pixel must not be the block's top-left one. Neighbors must already
/// be decoded.
pub fn resolve_context(
    color_map: &[u8],
    stride: usize,
    row: usize,
    col: usize,
    palette_size: usize,
) -> PaletteContext {
    resolve(color_map, stride, row, col, palette_size, false)
}

/// Like [`resolve_context`], but also remaps the pixel's own color through
/// the computed order. Used on the encode side, where the pixel is known.
pub fn resolve_context_with_index(
    color_map: &[u8],
    stride: usize,
    row: usize,
    col: usize,
    palette_size: usize,
) -> PaletteContext {
    resolve(color_map, stride, row, col, palette_size, true)
}

fn resolve(
    color_map: &[u8],
    stride: usize,
    row: usize,
    col: usize,
    palette_size: usize,
    want_index: bool,
) -> PaletteContext {
    debug_assert!(row > 0 || col > 0, "top-left pixel has no palette context");
    debug_assert!(palette_size <= PALETTE_MAX_SIZE);
    let palette_size = palette_size.min(PALETTE_MAX_SIZE);

    let neighbors: [Option<u8>; NUM_NEIGHBORS] = [
        (col > 0).then(|| color_map[row * stride + col - 1]),
        (col > 0 && row > 0).then(|| color_map[(row - 1) * stride + col - 1]),
        (row > 0).then(|| color_map[(row - 1) * stride + col]),
    ];

    let mut scores = [0u8; PALETTE_MAX_SIZE];
    let mut color_order: [u8; PALETTE_MAX_SIZE] = [0, 1, 2, 3, 4, 5, 6, 7];
    let mut inverse_order = color_order;

    for (neighbor, weight) in neighbors.iter().zip(NEIGHBOR_WEIGHTS) {
        if let Some(color) = *neighbor {
            let slot = scores.get_mut(usize::from(color));
            debug_assert!(slot.is_some(), "palette color {color} out of range");
            if let Some(score) = slot {
                *score += weight;
            }
        }
    }

    // Partial selection sort: bring the three best scores to the front.
    // Ties keep the lower color first.
    for i in 0..NUM_NEIGHBORS {
        let mut max = scores[i];
        let mut max_idx = i;
        for (j, &score) in scores.iter().enumerate().take(palette_size).skip(i + 1) {
            if score > max {
                max = score;
                max_idx = j;
            }
        }
        if max_idx != i {
            let max_color = color_order[max_idx];
            for k in (i + 1..=max_idx).rev() {
                scores[k] = scores[k - 1];
                color_order[k] = color_order[k - 1];
                inverse_order[usize::from(color_order[k])] = k as u8;
            }
            scores[i] = max;
            color_order[i] = max_color;
            inverse_order[usize::from(max_color)] = i as u8;
        }
    }

    let hash: usize = scores
        .iter()
        .zip(HASH_MULTIPLIERS)
        .map(|(&score, mult)| usize::from(score) * usize::from(mult))
        .sum();
    debug_assert!(hash > 0 && hash <= MAX_CONTEXT_HASH, "palette hash {hash}");
    let context = CONTEXT_LOOKUP.get(hash).copied().flatten();
    debug_assert!(context.is_some(), "no palette context for hash {hash}");
    let context = usize::from(context.unwrap_or(0));
    debug_assert!(context < PALETTE_COLOR_INDEX_CONTEXTS);

    let color_index = if want_index {
        let own = color_map[row * stride + col];
        let index = inverse_order.get(usize::from(own)).copied();
        debug_assert!(index.is_some(), "palette color {own} out of range");
        index
    } else {
        None
    };

    PaletteContext {
        context,
        color_order,
        color_index,
    }
}
