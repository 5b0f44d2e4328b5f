//! The probability-model state of one frame.
//!
//! [`FrameEntropyContext`] is a flat, plain-old-data aggregate of CDF
//! tables, one per syntax element category. The entropy coder reads and
//! adapts the tables by field access; this crate only guarantees their shape
//! and defaults. Snapshots are whole-struct copies.

use crate::defaults;
use bytemuck::{Pod, Zeroable};

// Block partitioning and intra modes
pub const PARTITION_CONTEXTS: usize = 20;
pub const EXT_PARTITION_TYPES: usize = 10;
pub const KF_MODE_CONTEXTS: usize = 5;
pub const INTRA_MODES: usize = 13;
pub const UV_INTRA_MODES: usize = 14;
pub const CFL_ALLOWED_TYPES: usize = 2;
pub const BLOCK_SIZE_GROUPS: usize = 4;
pub const BLOCK_SIZES_ALL: usize = 22;
pub const DIRECTIONAL_MODES: usize = 8;
pub const MAX_ANGLE_DELTA: usize = 3;
pub const FILTER_INTRA_MODES: usize = 5;
pub const CFL_JOINT_SIGNS: usize = 8;
pub const CFL_ALPHA_CONTEXTS: usize = 6;
pub const CFL_ALPHABET_SIZE: usize = 16;

// Palette
pub const PALETTE_BSIZE_CTXS: usize = 9;
pub const PALETTE_SIZES: usize = 7;
pub const PALETTE_Y_MODE_CONTEXTS: usize = 3;
pub const PALETTE_UV_MODE_CONTEXTS: usize = 2;
pub const PALETTE_COLOR_INDEX_CONTEXTS: usize = 5;
pub const PALETTE_COLORS: usize = 8;

// Inter prediction
pub const NEWMV_MODE_CONTEXTS: usize = 6;
pub const GLOBALMV_MODE_CONTEXTS: usize = 2;
pub const REFMV_MODE_CONTEXTS: usize = 6;
pub const DRL_MODE_CONTEXTS: usize = 3;
pub const INTER_MODE_CONTEXTS: usize = 8;
pub const INTER_COMPOUND_MODES: usize = 8;
pub const INTERINTRA_MODES: usize = 4;
pub const MOTION_MODES: usize = 3;
pub const COMP_INDEX_CONTEXTS: usize = 6;
pub const COMP_GROUP_IDX_CONTEXTS: usize = 7;
pub const SWITCHABLE_FILTER_CONTEXTS: usize = 16;
pub const SWITCHABLE_FILTERS: usize = 3;

// Reference frames
pub const INTRA_INTER_CONTEXTS: usize = 4;
pub const COMP_INTER_CONTEXTS: usize = 5;
pub const COMP_REF_TYPE_CONTEXTS: usize = 5;
pub const UNI_COMP_REF_CONTEXTS: usize = 3;
pub const UNIDIR_COMP_REFS: usize = 4;
pub const REF_CONTEXTS: usize = 3;
pub const FWD_REFS: usize = 4;
pub const BWD_REFS: usize = 3;
pub const SINGLE_REFS: usize = 7;

// Transform, skip, segmentation, deltas, restoration
pub const TXFM_PARTITION_CONTEXTS: usize = 21;
pub const MAX_TX_CATS: usize = 4;
pub const TX_SIZE_CONTEXTS: usize = 3;
pub const MAX_TX_DEPTH: usize = 2;
pub const EXT_TX_SETS_INTRA: usize = 3;
pub const EXT_TX_SETS_INTER: usize = 4;
pub const EXT_TX_SIZES: usize = 4;
pub const TX_TYPES: usize = 16;
pub const SKIP_MODE_CONTEXTS: usize = 3;
pub const SKIP_CONTEXTS: usize = 3;
pub const MAX_SEGMENTS: usize = 8;
pub const SEG_TEMPORAL_PRED_CTXS: usize = 3;
pub const SPATIAL_PREDICTION_PROBS: usize = 3;
pub const DELTA_Q_PROBS: usize = 3;
pub const DELTA_LF_PROBS: usize = 3;
pub const FRAME_LF_COUNT: usize = 4;
pub const RESTORE_SWITCHABLE_TYPES: usize = 3;

// Coefficients
pub const TOKEN_CDF_Q_CTXS: usize = 4;
pub const TX_SIZES: usize = 5;
pub const PLANE_TYPES: usize = 2;
pub const TXB_SKIP_CONTEXTS: usize = 13;
pub const EOB_COEF_CONTEXTS: usize = 9;
pub const DC_SIGN_CONTEXTS: usize = 3;
pub const SIG_COEF_CONTEXTS_EOB: usize = 4;
pub const SIG_COEF_CONTEXTS: usize = 42;
pub const LEVEL_CONTEXTS: usize = 21;
pub const BR_CDF_SIZE: usize = 4;

// Motion vectors
pub const MV_JOINTS: usize = 4;
pub const MV_CLASSES: usize = 11;
pub const CLASS0_SIZE: usize = 2;
pub const MV_FP_SIZE: usize = 4;
pub const MV_OFFSET_BITS: usize = 10;

/// Coefficient CDFs for one quantizer range.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct CoefficientCdfs {
    pub txb_skip: [[[u16; 3]; TXB_SKIP_CONTEXTS]; TX_SIZES],
    pub eob_extra: [[[[u16; 3]; EOB_COEF_CONTEXTS]; PLANE_TYPES]; TX_SIZES],
    pub dc_sign: [[[u16; 3]; DC_SIGN_CONTEXTS]; PLANE_TYPES],
    pub eob_flag_16: [[[u16; 6]; 2]; PLANE_TYPES],
    pub eob_flag_32: [[[u16; 7]; 2]; PLANE_TYPES],
    pub eob_flag_64: [[[u16; 8]; 2]; PLANE_TYPES],
    pub eob_flag_128: [[[u16; 9]; 2]; PLANE_TYPES],
    pub eob_flag_256: [[[u16; 10]; 2]; PLANE_TYPES],
    pub eob_flag_512: [[[u16; 11]; 2]; PLANE_TYPES],
    pub eob_flag_1024: [[[u16; 12]; 2]; PLANE_TYPES],
    pub coeff_base_eob: [[[[u16; 4]; SIG_COEF_CONTEXTS_EOB]; PLANE_TYPES]; TX_SIZES],
    pub coeff_base: [[[[u16; 5]; SIG_COEF_CONTEXTS]; PLANE_TYPES]; TX_SIZES],
    pub coeff_br: [[[[u16; BR_CDF_SIZE + 1]; LEVEL_CONTEXTS]; PLANE_TYPES]; TX_SIZES],
}

/// CDFs for one motion vector component.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct NmvComponent {
    pub classes: [u16; MV_CLASSES + 1],
    pub class0_fp: [[u16; MV_FP_SIZE + 1]; CLASS0_SIZE],
    pub fp: [u16; MV_FP_SIZE + 1],
    pub sign: [u16; 3],
    pub class0_hp: [u16; 3],
    pub hp: [u16; 3],
    pub class0: [u16; CLASS0_SIZE + 1],
    pub bits: [[u16; 3]; MV_OFFSET_BITS],
}

/// Motion vector CDFs: joint type plus row and column components.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct NmvContext {
    pub joints: [u16; MV_JOINTS + 1],
    pub comps: [NmvComponent; 2],
}

/// Every adaptive probability table used to code one frame.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct FrameEntropyContext {
    pub partition: [[u16; EXT_PARTITION_TYPES + 1]; PARTITION_CONTEXTS],
    pub kf_y_mode: [[[u16; INTRA_MODES + 1]; KF_MODE_CONTEXTS]; KF_MODE_CONTEXTS],
    pub y_mode: [[u16; INTRA_MODES + 1]; BLOCK_SIZE_GROUPS],
    pub uv_mode: [[[u16; UV_INTRA_MODES + 1]; INTRA_MODES]; CFL_ALLOWED_TYPES],
    pub angle_delta: [[u16; 2 * MAX_ANGLE_DELTA + 2]; DIRECTIONAL_MODES],
    pub filter_intra: [[u16; 3]; BLOCK_SIZES_ALL],
    pub filter_intra_mode: [u16; FILTER_INTRA_MODES + 1],
    pub cfl_sign: [u16; CFL_JOINT_SIGNS + 1],
    pub cfl_alpha: [[u16; CFL_ALPHABET_SIZE + 1]; CFL_ALPHA_CONTEXTS],
    pub intrabc: [u16; 3],

    pub palette_y_size: [[u16; PALETTE_SIZES + 1]; PALETTE_BSIZE_CTXS],
    pub palette_uv_size: [[u16; PALETTE_SIZES + 1]; PALETTE_BSIZE_CTXS],
    pub palette_y_mode: [[[u16; 3]; PALETTE_Y_MODE_CONTEXTS]; PALETTE_BSIZE_CTXS],
    pub palette_uv_mode: [[u16; 3]; PALETTE_UV_MODE_CONTEXTS],
    pub palette_y_color_index:
        [[[u16; PALETTE_COLORS + 1]; PALETTE_COLOR_INDEX_CONTEXTS]; PALETTE_SIZES],
    pub palette_uv_color_index:
        [[[u16; PALETTE_COLORS + 1]; PALETTE_COLOR_INDEX_CONTEXTS]; PALETTE_SIZES],

    pub newmv: [[u16; 3]; NEWMV_MODE_CONTEXTS],
    pub zeromv: [[u16; 3]; GLOBALMV_MODE_CONTEXTS],
    pub refmv: [[u16; 3]; REFMV_MODE_CONTEXTS],
    pub drl: [[u16; 3]; DRL_MODE_CONTEXTS],
    pub inter_compound_mode: [[u16; INTER_COMPOUND_MODES + 1]; INTER_MODE_CONTEXTS],
    pub compound_type: [[u16; 3]; BLOCK_SIZES_ALL],
    pub interintra: [[u16; 3]; BLOCK_SIZE_GROUPS],
    pub interintra_mode: [[u16; INTERINTRA_MODES + 1]; BLOCK_SIZE_GROUPS],
    pub wedge_interintra: [[u16; 3]; BLOCK_SIZES_ALL],
    pub motion_mode: [[u16; MOTION_MODES + 1]; BLOCK_SIZES_ALL],
    pub obmc: [[u16; 3]; BLOCK_SIZES_ALL],
    pub compound_index: [[u16; 3]; COMP_INDEX_CONTEXTS],
    pub comp_group_idx: [[u16; 3]; COMP_GROUP_IDX_CONTEXTS],
    pub switchable_interp: [[u16; SWITCHABLE_FILTERS + 1]; SWITCHABLE_FILTER_CONTEXTS],

    pub intra_inter: [[u16; 3]; INTRA_INTER_CONTEXTS],
    pub comp_inter: [[u16; 3]; COMP_INTER_CONTEXTS],
    pub comp_ref_type: [[u16; 3]; COMP_REF_TYPE_CONTEXTS],
    pub uni_comp_ref: [[[u16; 3]; UNIDIR_COMP_REFS - 1]; UNI_COMP_REF_CONTEXTS],
    pub comp_ref: [[[u16; 3]; FWD_REFS - 1]; REF_CONTEXTS],
    pub comp_bwdref: [[[u16; 3]; BWD_REFS - 1]; REF_CONTEXTS],
    pub single_ref: [[[u16; 3]; SINGLE_REFS - 1]; REF_CONTEXTS],

    pub txfm_partition: [[u16; 3]; TXFM_PARTITION_CONTEXTS],
    pub tx_size: [[[u16; MAX_TX_DEPTH + 2]; TX_SIZE_CONTEXTS]; MAX_TX_CATS],
    pub intra_ext_tx: [[[[u16; TX_TYPES + 1]; INTRA_MODES]; EXT_TX_SIZES]; EXT_TX_SETS_INTRA],
    pub inter_ext_tx: [[[u16; TX_TYPES + 1]; EXT_TX_SIZES]; EXT_TX_SETS_INTER],
    pub skip_mode: [[u16; 3]; SKIP_MODE_CONTEXTS],
    pub skip: [[u16; 3]; SKIP_CONTEXTS],

    pub seg_tree: [u16; MAX_SEGMENTS + 1],
    pub seg_pred: [[u16; 3]; SEG_TEMPORAL_PRED_CTXS],
    pub seg_spatial_pred: [[u16; MAX_SEGMENTS + 1]; SPATIAL_PREDICTION_PROBS],

    pub delta_q: [u16; DELTA_Q_PROBS + 2],
    pub delta_lf: [u16; DELTA_LF_PROBS + 2],
    pub delta_lf_multi: [[u16; DELTA_LF_PROBS + 2]; FRAME_LF_COUNT],

    pub switchable_restore: [u16; RESTORE_SWITCHABLE_TYPES + 1],
    pub wiener_restore: [u16; 3],
    pub sgrproj_restore: [u16; 3],

    pub coef: CoefficientCdfs,
    pub nmv: NmvContext,
    pub ndvc: NmvContext,
}

/// Quantizer range used to pick coefficient defaults.
#[inline]
pub fn coefficient_qctx(base_qindex: u8) -> usize {
    match base_qindex {
        0..=20 => 0,
        21..=60 => 1,
        61..=120 => 2,
        _ => 3,
    }
}

impl FrameEntropyContext {
    /// Static defaults for a frame coded at `base_qindex`.
    pub fn new(base_qindex: u8) -> Self {
        let mut fc = defaults::DEFAULT_MODE_CONTEXT;
        fc.coef = defaults::DEFAULT_COEFFICIENT_CDFS[coefficient_qctx(base_qindex)];
        fc
    }

    /// Heap-allocated static defaults.
    pub fn boxed(base_qindex: u8) -> Box<Self> {
        Box::new(Self::new(base_qindex))
    }

    /// Raw view for whole-snapshot comparison and hashing.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Reload only the coefficient tables for `base_qindex`.
    pub fn load_coefficient_defaults(&mut self, base_qindex: u8) {
        self.coef = defaults::DEFAULT_COEFFICIENT_CDFS[coefficient_qctx(base_qindex)];
    }
}

impl PartialEq for FrameEntropyContext {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for FrameEntropyContext {}

impl std::fmt::Debug for FrameEntropyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameEntropyContext")
            .field("bytes", &std::mem::size_of::<Self>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdf::is_valid;

    #[test]
    fn test_qctx_ranges() {
        assert_eq!(coefficient_qctx(0), 0);
        assert_eq!(coefficient_qctx(20), 0);
        assert_eq!(coefficient_qctx(21), 1);
        assert_eq!(coefficient_qctx(60), 1);
        assert_eq!(coefficient_qctx(120), 2);
        assert_eq!(coefficient_qctx(121), 3);
        assert_eq!(coefficient_qctx(255), 3);
    }

    #[test]
    fn test_mode_tables_independent_of_qindex() {
        let low = FrameEntropyContext::new(0);
        let high = FrameEntropyContext::new(255);
        assert_ne!(low, high);
        assert_eq!(low.partition, high.partition);
        assert_eq!(low.nmv.joints, high.nmv.joints);
        assert_ne!(low.coef.txb_skip, high.coef.txb_skip);
    }

    #[test]
    fn test_same_qctx_same_bytes() {
        assert_eq!(FrameEntropyContext::new(61), FrameEntropyContext::new(120));
    }

    #[test]
    fn test_load_coefficient_defaults() {
        let mut fc = FrameEntropyContext::new(0);
        fc.load_coefficient_defaults(200);
        assert_eq!(fc, FrameEntropyContext::new(200));
    }

    #[test]
    fn test_default_rows_are_valid() {
        let fc = FrameEntropyContext::new(100);
        for row in &fc.partition[4..16] {
            assert!(is_valid(row, EXT_PARTITION_TYPES));
        }
        for row in &fc.partition[..4] {
            assert!(is_valid(row, 4));
        }
        for row in fc.kf_y_mode.iter().flatten() {
            assert!(is_valid(row, INTRA_MODES));
        }
        for row in &fc.uv_mode[1] {
            assert!(is_valid(row, UV_INTRA_MODES));
        }
        for row in fc.coef.coeff_base.iter().flatten().flatten() {
            assert!(is_valid(row, 4));
        }
        for comp in &fc.nmv.comps {
            assert!(is_valid(&comp.classes, MV_CLASSES));
            assert!(is_valid(&comp.fp, MV_FP_SIZE));
        }
        assert!(is_valid(&fc.seg_tree, MAX_SEGMENTS));
        assert!(is_valid(&fc.switchable_restore, RESTORE_SWITCHABLE_TYPES));
    }

    #[test]
    fn test_adaptation_counters_start_at_zero() {
        let fc = FrameEntropyContext::new(0);
        assert_eq!(fc.skip[0][2], 0);
        assert_eq!(fc.y_mode[0][INTRA_MODES], 0);
        assert_eq!(fc.delta_q[DELTA_Q_PROBS + 1], 0);
    }
}
