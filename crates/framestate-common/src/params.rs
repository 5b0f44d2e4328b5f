//! Frame-header parameter blocks reset by past independence.

use framestate_core::LoopFilterDeltas;
use framestate_entropy::context::MAX_SEGMENTS;
use serde::{Deserialize, Serialize};

/// Number of per-segment features.
pub const SEG_LVL_MAX: usize = 8;

/// Per-segment feature kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SegFeature {
    AltQ = 0,
    AltLfYVertical,
    AltLfYHorizontal,
    AltLfU,
    AltLfV,
    RefFrame,
    Skip,
    GlobalMv,
}

impl SegFeature {
    const DATA_MAX: [i16; SEG_LVL_MAX] = [255, 63, 63, 63, 63, 7, 0, 0];
    const SIGNED: [bool; SEG_LVL_MAX] = [true, true, true, true, true, false, false, false];

    /// Largest magnitude the feature's data can hold.
    #[inline]
    pub fn data_max(self) -> i16 {
        Self::DATA_MAX[self as usize]
    }

    /// True if the feature's data may be negative.
    #[inline]
    pub fn is_signed(self) -> bool {
        Self::SIGNED[self as usize]
    }
}

/// Segmentation state of the frame header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationParams {
    pub enabled: bool,
    pub update_map: bool,
    pub update_data: bool,
    pub temporal_update: bool,
    feature_data: [[i16; SEG_LVL_MAX]; MAX_SEGMENTS],
    /// Bit `f` set when feature `f` is active for the segment
    feature_mask: [u8; MAX_SEGMENTS],
    /// Highest segment id with an active feature
    pub last_active_segid: u8,
    /// Segment id is coded before the skip flag
    pub segid_preskip: bool,
}

impl SegmentationParams {
    /// Disable every feature and zero its data.
    pub fn clear_all_features(&mut self) {
        self.feature_data = [[0; SEG_LVL_MAX]; MAX_SEGMENTS];
        self.feature_mask = [0; MAX_SEGMENTS];
    }

    /// Turn `feature` on for `segment` with `value`, clamped to the feature's range.
    pub fn enable_feature(&mut self, segment: usize, feature: SegFeature, value: i16) {
        let Some(mask) = self.feature_mask.get_mut(segment) else {
            return;
        };
        *mask |= 1 << feature as u8;
        let max = feature.data_max();
        let min = if feature.is_signed() { -max } else { 0 };
        self.feature_data[segment][feature as usize] = value.clamp(min, max);
    }

    /// True if `feature` is on for `segment`.
    #[inline]
    pub fn feature_active(&self, segment: usize, feature: SegFeature) -> bool {
        self.feature_mask
            .get(segment)
            .is_some_and(|mask| mask & (1 << feature as u8) != 0)
    }

    /// Data of `feature` for `segment`; zero when the segment is out of range.
    #[inline]
    pub fn feature_data(&self, segment: usize, feature: SegFeature) -> i16 {
        self.feature_data
            .get(segment)
            .map_or(0, |data| data[feature as usize])
    }

    /// True if any segment has an active feature.
    pub fn any_feature_active(&self) -> bool {
        self.feature_mask.iter().any(|&mask| mask != 0)
    }
}

/// Session-level loop-filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopFilterParams {
    /// Luma levels for vertical and horizontal edges
    pub filter_level: [u8; 2],
    pub filter_level_u: u8,
    pub filter_level_v: u8,
    pub sharpness_level: u8,
    pub mode_ref_delta_enabled: bool,
    pub mode_ref_delta_update: bool,
    pub deltas: LoopFilterDeltas,
}

impl LoopFilterParams {
    /// Restore default deltas and mark them enabled and updated.
    pub fn set_default_deltas(&mut self) {
        self.mode_ref_delta_enabled = true;
        self.mode_ref_delta_update = true;
        self.deltas.reset();
    }
}
