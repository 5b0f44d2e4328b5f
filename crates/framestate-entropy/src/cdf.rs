//! Cumulative distribution tables.
//!
//! A CDF over `M` symbols is stored inverted (`32768 - cumulative`) in
//! `M + 1` entries: `M - 1` thresholds, the terminal zero, and an
//! adaptation counter that starts at zero. Tables shorter than their row
//! are padded with zeros.

/// Total probability mass.
pub const CDF_PROB_TOP: u32 = 32768;

/// Row length needed for an alphabet of `symbols`.
#[inline]
pub const fn cdf_size(symbols: usize) -> usize {
    symbols + 1
}

/// Build an inverted row from cumulative thresholds.
///
/// `thresholds` holds the `M - 1` cumulative probabilities of an
/// `M`-symbol alphabet, out of 32768.
pub const fn cdf<const N: usize, const L: usize>(thresholds: [u16; N]) -> [u16; L] {
    assert!(N + 2 <= L, "row too short for alphabet");
    let mut out = [0u16; L];
    let mut i = 0;
    while i < N {
        out[i] = (CDF_PROB_TOP - thresholds[i] as u32) as u16;
        i += 1;
    }
    out
}

/// Row for an alphabet of `symbols` equally likely symbols.
pub const fn uniform<const L: usize>(symbols: usize) -> [u16; L] {
    skewed(symbols, (CDF_PROB_TOP as usize / symbols) as u16)
}

/// Row where the first symbol has probability `first / 32768` and the rest
/// share the remainder evenly.
pub const fn skewed<const L: usize>(symbols: usize, first: u16) -> [u16; L] {
    assert!(symbols >= 2 && symbols < L, "row too short for alphabet");
    let mut out = [0u16; L];
    let first = first as usize;
    let rest = CDF_PROB_TOP as usize - first;
    let mut i = 0;
    while i < symbols - 1 {
        let cumulative = first + i * rest / (symbols - 1);
        out[i] = (CDF_PROB_TOP as usize - cumulative) as u16;
        i += 1;
    }
    out
}

/// True if `row` is a well-formed inverted CDF for `symbols` symbols.
///
/// Thresholds must be non-increasing and end with the terminal zero.
pub fn is_valid(row: &[u16], symbols: usize) -> bool {
    if symbols < 2 || row.len() < cdf_size(symbols) {
        return false;
    }
    let thresholds = &row[..symbols - 1];
    let monotone = thresholds.windows(2).all(|w| w[0] >= w[1]);
    let bounded = thresholds.iter().all(|&t| u32::from(t) < CDF_PROB_TOP);
    monotone && bounded && row[symbols - 1] == 0
}

/// Probability of `symbol`, out of 32768.
pub fn symbol_probability(row: &[u16], symbols: usize, symbol: usize) -> u32 {
    let cumulative = |i: usize| -> u32 {
        match i {
            0 => 0,
            i if i >= symbols => CDF_PROB_TOP,
            i => CDF_PROB_TOP - u32::from(row[i - 1]),
        }
    };
    cumulative(symbol + 1) - cumulative(symbol)
}
