//! Static default probability tables.
//!
//! These values seed every context at sequence start and on frames coded
//! without reference to the past. They are configuration data: only their
//! shape is relied on elsewhere.

use crate::cdf::{cdf, skewed, uniform};
use crate::context::*;

/// All mode, reference, palette and motion vector tables. The coefficient
/// tables are replaced per quantizer range.
pub(crate) const DEFAULT_MODE_CONTEXT: FrameEntropyContext = FrameEntropyContext {
    partition: DEFAULT_PARTITION,
    kf_y_mode: DEFAULT_KF_Y_MODE,
    y_mode: DEFAULT_Y_MODE,
    uv_mode: DEFAULT_UV_MODE,
    angle_delta: DEFAULT_ANGLE_DELTA,
    filter_intra: DEFAULT_FILTER_INTRA,
    filter_intra_mode: cdf([14259, 17304, 20463, 29377]),
    cfl_sign: cdf([1892, 2229, 11464, 14116, 25661, 26409, 32508]),
    cfl_alpha: DEFAULT_CFL_ALPHA,
    intrabc: cdf([192 * 128]),

    palette_y_size: DEFAULT_PALETTE_Y_SIZE,
    palette_uv_size: DEFAULT_PALETTE_UV_SIZE,
    palette_y_mode: [[cdf([128 * 240]), cdf([128 * 180]), cdf([128 * 100])]; PALETTE_BSIZE_CTXS],
    palette_uv_mode: [cdf([128 * 253]), cdf([128 * 229])],
    palette_y_color_index: DEFAULT_PALETTE_Y_COLOR_INDEX,
    palette_uv_color_index: DEFAULT_PALETTE_UV_COLOR_INDEX,

    newmv: [
        cdf([128 * 155]),
        cdf([128 * 116]),
        cdf([128 * 94]),
        cdf([128 * 32]),
        cdf([128 * 96]),
        cdf([128 * 30]),
    ],
    zeromv: [cdf([128 * 45]), cdf([128 * 13])],
    refmv: [
        cdf([128 * 178]),
        cdf([128 * 212]),
        cdf([128 * 135]),
        cdf([128 * 244]),
        cdf([128 * 203]),
        cdf([128 * 122]),
    ],
    drl: [cdf([128 * 119]), cdf([128 * 189]), cdf([128 * 134])],
    inter_compound_mode: DEFAULT_INTER_COMPOUND_MODE,
    compound_type: [cdf([16384]); BLOCK_SIZES_ALL],
    interintra: [
        cdf([128 * 128]),
        cdf([226 * 128]),
        cdf([244 * 128]),
        cdf([254 * 128]),
    ],
    interintra_mode: [
        cdf([16384, 24576, 28672]),
        cdf([3072, 7016, 18987]),
        cdf([4864, 8461, 17481]),
        cdf([6528, 8681, 19031]),
    ],
    wedge_interintra: DEFAULT_WEDGE_INTERINTRA,
    motion_mode: DEFAULT_MOTION_MODE,
    obmc: DEFAULT_OBMC,
    compound_index: [
        cdf([24576]),
        cdf([16384]),
        cdf([8192]),
        cdf([24576]),
        cdf([16384]),
        cdf([8192]),
    ],
    comp_group_idx: [
        cdf([29491]),
        cdf([24576]),
        cdf([16384]),
        cdf([24576]),
        cdf([16384]),
        cdf([13107]),
        cdf([13107]),
    ],
    switchable_interp: DEFAULT_SWITCHABLE_INTERP,

    intra_inter: [cdf([768]), cdf([12416]), cdf([19328]), cdf([26240])],
    comp_inter: [
        cdf([24290]),
        cdf([19956]),
        cdf([11641]),
        cdf([9804]),
        cdf([2842]),
    ],
    comp_ref_type: [
        cdf([8 * 128]),
        cdf([20 * 128]),
        cdf([78 * 128]),
        cdf([91 * 128]),
        cdf([194 * 128]),
    ],
    uni_comp_ref: [
        [cdf([88 * 128]), cdf([30 * 128]), cdf([28 * 128])],
        [cdf([218 * 128]), cdf([97 * 128]), cdf([105 * 128])],
        [cdf([254 * 128]), cdf([180 * 128]), cdf([196 * 128])],
    ],
    comp_ref: [
        [cdf([4412]), cdf([11499]), cdf([478])],
        [cdf([17926]), cdf([26419]), cdf([8615])],
        [cdf([30449]), cdf([31477]), cdf([28035])],
    ],
    comp_bwdref: [
        [cdf([2762]), cdf([1614])],
        [cdf([17976]), cdf([15912])],
        [cdf([30894]), cdf([30639])],
    ],
    single_ref: [
        [cdf([6500]), cdf([3089]), cdf([4026]), cdf([8549]), cdf([184]), cdf([2264])],
        [cdf([17037]), cdf([19408]), cdf([15521]), cdf([27640]), cdf([5047]), cdf([16251])],
        [cdf([28292]), cdf([30427]), cdf([29003]), cdf([31436]), cdf([28466]), cdf([29371])],
    ],

    txfm_partition: DEFAULT_TXFM_PARTITION,
    tx_size: [
        [cdf([19968]), cdf([19968]), cdf([24320])],
        [cdf([12272, 30172]), cdf([12272, 30172]), cdf([18677, 30848])],
        [cdf([12986, 15180]), cdf([12986, 15180]), cdf([24302, 25602])],
        [cdf([5782, 11475]), cdf([5782, 11475]), cdf([16803, 22759])],
    ],
    intra_ext_tx: [
        [[[0; TX_TYPES + 1]; INTRA_MODES]; EXT_TX_SIZES],
        [[uniform(7); INTRA_MODES]; EXT_TX_SIZES],
        [[uniform(5); INTRA_MODES]; EXT_TX_SIZES],
    ],
    inter_ext_tx: [
        [[0; TX_TYPES + 1]; EXT_TX_SIZES],
        [cdf([
            1280, 1453, 1626, 2277, 2929, 3580, 4232, 16717, 19225, 21733, 24241, 26749, 28253,
            29758, 31263,
        ]); EXT_TX_SIZES],
        [cdf([
            1280, 3125, 4970, 17132, 19575, 22018, 24461, 26904, 28370, 29836, 31302,
        ]); EXT_TX_SIZES],
        [cdf([1536]); EXT_TX_SIZES],
    ],
    skip_mode: [cdf([31609]), cdf([20107]), cdf([10296])],
    skip: [cdf([30224]), cdf([16244]), cdf([4835])],

    seg_tree: cdf([4096, 8192, 12288, 16384, 20480, 24576, 28672]),
    seg_pred: [cdf([128 * 128]); SEG_TEMPORAL_PRED_CTXS],
    seg_spatial_pred: [
        cdf([5622, 7893, 16093, 18233, 27809, 28373, 32533]),
        cdf([14274, 18230, 22557, 24935, 29980, 30851, 32344]),
        cdf([27527, 28487, 28723, 28890, 32397, 32647, 32679]),
    ],

    delta_q: cdf([28160, 32120, 32677]),
    delta_lf: cdf([28160, 32120, 32677]),
    delta_lf_multi: [cdf([28160, 32120, 32677]); FRAME_LF_COUNT],

    switchable_restore: cdf([32 * 128, 144 * 128]),
    wiener_restore: cdf([64 * 128]),
    sgrproj_restore: cdf([64 * 128]),

    coef: DEFAULT_COEFFICIENT_CDFS[0],
    nmv: DEFAULT_NMV_CONTEXT,
    ndvc: DEFAULT_NMV_CONTEXT,
};

const DEFAULT_PARTITION: [[u16; EXT_PARTITION_TYPES + 1]; PARTITION_CONTEXTS] = [
    // 8x8 blocks only split four ways
    cdf([25472, 28949, 31052]),
    cdf([18816, 22250, 28783]),
    cdf([18944, 26126, 29188]),
    cdf([15488, 22508, 27077]),
    cdf([22272, 23768, 25043, 29996, 30495, 30994, 31419, 31844, 32343]),
    cdf([11776, 13457, 16315, 28229, 28789, 29349, 30302, 31255, 31816]),
    cdf([10496, 14802, 16136, 27127, 28563, 29999, 30444, 30889, 32324]),
    cdf([6784, 8763, 10440, 29110, 29770, 30430, 30989, 31548, 32208]),
    cdf([22656, 23801, 24702, 30721, 31103, 31485, 31785, 32085, 32467]),
    cdf([8704, 9926, 12586, 28885, 29292, 29699, 30586, 31473, 31881]),
    cdf([6656, 10685, 11566, 27857, 29200, 30543, 30837, 31131, 32474]),
    cdf([2176, 3012, 3690, 31253, 31532, 31811, 32037, 32263, 32542]),
    cdf([28416, 28705, 28926, 32258, 32354, 32450, 32523, 32596, 32693]),
    cdf([9216, 9952, 11849, 30134, 30379, 30624, 31256, 31888, 32134]),
    cdf([7424, 9008, 9528, 30664, 31192, 31720, 31893, 32066, 32594]),
    cdf([1280, 1710, 2069, 31978, 32121, 32264, 32383, 32502, 32647]),
    // 128x128 blocks have no 4-way splits
    cdf([28416, 28705, 28926, 32258, 32402, 32547, 32548]),
    cdf([9216, 9952, 11849, 30134, 30502, 30870, 30871]),
    cdf([7424, 9008, 9528, 30664, 31456, 32248, 32249]),
    cdf([1280, 1710, 2069, 31978, 32193, 32409, 32410]),
];

const DEFAULT_KF_Y_MODE: [[[u16; INTRA_MODES + 1]; KF_MODE_CONTEXTS]; KF_MODE_CONTEXTS] = [
    [
        cdf([13234, 14775, 17115, 18040, 18783, 19420, 20510, 22129, 23183, 28738, 30120, 32138]),
        cdf([8983, 14623, 16290, 17124, 17864, 18817, 19593, 20876, 22359, 27820, 29791, 31566]),
        cdf([7091, 8084, 17897, 18490, 19057, 19428, 20811, 22624, 23265, 28288, 29341, 31870]),
        cdf([11191, 12808, 14120, 16182, 16785, 17440, 18159, 20280, 22697, 28431, 30235, 32276]),
        cdf([8208, 9510, 11986, 12851, 15212, 16786, 19400, 22224, 23146, 28889, 30200, 32375]),
    ],
    [
        cdf([6308, 15986, 17454, 18110, 18739, 19867, 20479, 21575, 22972, 28087, 30042, 31489]),
        cdf([3549, 21993, 22593, 22968, 23262, 24052, 24280, 24856, 26026, 29057, 30818, 31543]),
        cdf([4371, 9956, 16063, 16680, 17207, 17870, 18692, 20142, 21261, 26613, 28301, 30433]),
        cdf([6445, 12764, 13699, 15338, 15922, 16891, 17304, 18868, 22816, 28105, 30472, 31907]),
        cdf([4300, 11014, 12466, 13258, 15028, 17584, 19170, 21448, 22945, 28207, 30041, 31659]),
    ],
    [
        cdf([9111, 10159, 16955, 17625, 18268, 18703, 20078, 22004, 22761, 28166, 29334, 31990]),
        cdf([7107, 11104, 15591, 16340, 17066, 17802, 18721, 20303, 21481, 26882, 28699, 30978]),
        cdf([4546, 4935, 22442, 22717, 22960, 23087, 24171, 25671, 25939, 29333, 29866, 32023]),
        cdf([8332, 9555, 12646, 14689, 15340, 15873, 16872, 19939, 21942, 27812, 29508, 31923]),
        cdf([6413, 7233, 13108, 13895, 15332, 16187, 19121, 22694, 23365, 28639, 29686, 32187]),
    ],
    [
        cdf([9584, 11586, 12990, 15322, 15927, 16732, 17406, 19225, 22484, 28555, 30321, 32279]),
        cdf([5907, 11662, 12625, 14955, 15491, 16403, 16865, 18074, 23261, 28508, 30584, 32057]),
        cdf([5759, 7323, 12581, 14779, 15363, 15946, 16851, 19330, 21902, 27860, 29214, 31747]),
        cdf([7166, 8714, 9430, 14479, 14672, 14953, 15184, 17239, 24798, 29350, 31021, 32371]),
        cdf([6318, 8140, 9595, 12354, 13754, 15324, 16681, 19701, 22723, 28616, 30226, 32279]),
    ],
    [
        cdf([8669, 9875, 12300, 13093, 15518, 17458, 19843, 22083, 22927, 28780, 30271, 32364]),
        cdf([6600, 10422, 12153, 12937, 15218, 18211, 19914, 21744, 22975, 28393, 30393, 31970]),
        cdf([5512, 6207, 14265, 14897, 16246, 17175, 19865, 22553, 23178, 28445, 29511, 31980]),
        cdf([8195, 9407, 10830, 13261, 14443, 15761, 16922, 20311, 22151, 28230, 30109, 32220]),
        cdf([5612, 6462, 8166, 8737, 14316, 17802, 21788, 25554, 26080, 30083, 30983, 32457]),
    ],
];

const DEFAULT_Y_MODE: [[u16; INTRA_MODES + 1]; BLOCK_SIZE_GROUPS] = [
    cdf([7168, 10680, 13913, 16928, 20294, 22790, 24706, 26275, 28139, 29751, 30563, 31468]),
    cdf([11776, 13823, 15307, 15725, 16638, 17406, 17994, 18814, 19634, 21513, 22198, 22928]),
    cdf([14720, 16459, 18091, 18299, 18757, 19125, 19423, 19924, 20504, 22922, 24063, 25577]),
    cdf([18944, 19925, 20908, 20998, 21017, 21072, 21084, 21121, 21159, 22064, 22820, 24290]),
];

#[rustfmt::skip]
const DEFAULT_UV_MODE: [[[u16; UV_INTRA_MODES + 1]; INTRA_MODES]; CFL_ALLOWED_TYPES] = [
    [
        cdf([17902, 18828, 21117, 21487, 21924, 22484, 23588, 24669, 25177, 28731, 29903, 31509]),
        cdf([9654, 23559, 23873, 24050, 24203, 24929, 25057, 25286, 26027, 28172, 28716, 30913]),
        cdf([10012, 10124, 25394, 25540, 25665, 25752, 26567, 27761, 27876, 29497, 30581, 31179]),
        cdf([15143, 15859, 16581, 21567, 21968, 22430, 22867, 24953, 26969, 30310, 31125, 32329]),
        cdf([14063, 14416, 14921, 15022, 25164, 26720, 28661, 29083, 29277, 31337, 31882, 32565]),
        cdf([12942, 14713, 15178, 15325, 16964, 27421, 27834, 28306, 28645, 30804, 31322, 32387]),
        cdf([13687, 13993, 16776, 16912, 18338, 18648, 27557, 28140, 28359, 30820, 31669, 32443]),
        cdf([14180, 14439, 16582, 17373, 17675, 17931, 18453, 26308, 26761, 30058, 31293, 32156]),
        cdf([12480, 14300, 14838, 16085, 16434, 17023, 17426, 18313, 26041, 29653, 30347, 32067]),
        cdf([17202, 18093, 19414, 19910, 20311, 20837, 21554, 22830, 23572, 28770, 30259, 32145]),
        cdf([16336, 18149, 19485, 19927, 20365, 20924, 21524, 22561, 23421, 28141, 30701, 32020]),
        cdf([16485, 17366, 19874, 20364, 20713, 21057, 21773, 23100, 23685, 28079, 29091, 32028]),
        cdf([13638, 16789, 19763, 19903, 19995, 20201, 20405, 20861, 21174, 22802, 23566, 24754]),
    ],
    [
        cdf([18377, 18815, 19743, 20178, 20560, 20889, 21359, 22098, 22481, 24563, 25781, 26662, 28396]),
        cdf([5350, 16837, 17066, 17360, 17692, 18778, 18969, 19206, 20291, 22367, 23212, 24670, 27912]),
        cdf([6671, 6759, 17812, 17998, 18260, 18384, 19408, 20667, 20806, 22760, 24142, 24875, 28072]),
        cdf([7461, 8082, 8515, 15013, 15583, 16098, 16522, 18519, 20348, 22954, 24130, 25342, 26548]),
        cdf([3694, 4403, 5370, 5854, 17841, 19639, 21625, 22224, 22651, 24613, 25399, 26143, 26599]),
        cdf([3700, 5651, 6112, 6541, 8929, 20623, 21213, 21640, 22214, 24306, 25412, 26406, 27249]),
        cdf([4649, 4947, 7128, 7432, 9439, 9903, 21163, 21774, 22056, 24426, 25403, 26324, 27128]),
        cdf([7208, 7375, 8779, 9683, 10072, 10284, 10796, 19786, 20152, 22955, 24246, 25165, 26589]),
        cdf([5897, 7283, 7555, 8910, 9391, 9937, 10276, 11044, 19841, 22620, 23784, 25060, 26418]),
        cdf([12171, 12718, 13885, 14348, 14925, 15394, 16108, 17075, 17583, 21996, 23614, 25048, 27011]),
        cdf([10192, 11222, 12318, 12877, 13533, 14184, 14866, 15879, 16650, 20419, 23265, 24295, 26596]),
        cdf([10776, 11387, 12899, 13471, 14088, 14575, 15366, 16456, 17040, 20815, 22009, 24448, 26492]),
        cdf([4015, 6473, 9853, 10285, 10655, 11032, 11431, 12199, 12738, 14760, 16121, 17263, 28612]),
    ],
];

const DEFAULT_ANGLE_DELTA: [[u16; 2 * MAX_ANGLE_DELTA + 2]; DIRECTIONAL_MODES] = [
    cdf([2340, 5327, 7611, 23102, 27196, 30546]),
    cdf([3267, 8071, 11970, 21822, 25619, 30034]),
    cdf([3417, 9937, 12286, 16420, 19941, 30669]),
    cdf([5167, 11735, 15254, 16662, 20697, 28276]),
    cdf([1728, 10973, 14103, 18547, 22684, 27007]),
    cdf([2764, 10700, 12517, 16957, 20590, 30390]),
    cdf([2407, 12749, 16527, 20823, 22781, 29642]),
    cdf([3068, 10132, 12079, 16542, 19943, 30448]),
];

const DEFAULT_FILTER_INTRA: [[u16; 3]; BLOCK_SIZES_ALL] = [
    cdf([10985]),
    cdf([10985]),
    cdf([10985]),
    cdf([10985]),
    cdf([15723]),
    cdf([15723]),
    cdf([16645]),
    cdf([16645]),
    cdf([16645]),
    cdf([27378]),
    cdf([30378]),
    cdf([30378]),
    cdf([30378]),
    cdf([30378]),
    cdf([30378]),
    cdf([30378]),
    cdf([10985]),
    cdf([10985]),
    cdf([15723]),
    cdf([15723]),
    cdf([30378]),
    cdf([30378]),
];

const DEFAULT_CFL_ALPHA: [[u16; CFL_ALPHABET_SIZE + 1]; CFL_ALPHA_CONTEXTS] = [
    cdf([
        16215, 27740, 31726, 32606, 32736, 32751, 32757, 32759, 32761, 32762, 32763, 32764, 32765,
        32766, 32767,
    ]),
    cdf([
        15213, 24615, 29704, 31974, 32545, 32673, 32713, 32746, 32753, 32756, 32758, 32761, 32763,
        32764, 32766,
    ]),
    cdf([
        13250, 24677, 29113, 31666, 32408, 32578, 32628, 32711, 32730, 32738, 32744, 32749, 32752,
        32756, 32759,
    ]),
    cdf([
        24593, 30787, 32062, 32495, 32656, 32707, 32735, 32747, 32752, 32757, 32760, 32763, 32764,
        32765, 32767,
    ]),
    cdf([
        19883, 27419, 30100, 31392, 31896, 32184, 32299, 32511, 32568, 32602, 32628, 32664, 32680,
        32691, 32708,
    ]),
    cdf([
        15939, 24151, 27754, 29680, 30651, 31267, 31527, 31868, 32001, 32090, 32181, 32284, 32314,
        32366, 32486,
    ]),
];

const DEFAULT_PALETTE_Y_SIZE: [[u16; PALETTE_SIZES + 1]; PALETTE_BSIZE_CTXS] = [
    cdf([12288, 19408, 24627, 26662, 28499, 30667]),
    cdf([12288, 19408, 24627, 26662, 28499, 30667]),
    cdf([12288, 19408, 24627, 26662, 28499, 30667]),
    cdf([2815, 4570, 9416, 10875, 13782, 19863]),
    cdf([12032, 14948, 22187, 23138, 24756, 27635]),
    cdf([14847, 20167, 25433, 26751, 28278, 30119]),
    cdf([18816, 25574, 29030, 29877, 30656, 31506]),
    cdf([23039, 27333, 30220, 30708, 31070, 31826]),
    cdf([12543, 20838, 27455, 28762, 29763, 31546]),
];

const DEFAULT_PALETTE_UV_SIZE: [[u16; PALETTE_SIZES + 1]; PALETTE_BSIZE_CTXS] = [
    cdf([20480, 29888, 32453, 32715, 32751, 32766]),
    cdf([20480, 29888, 32453, 32715, 32751, 32766]),
    cdf([20480, 29888, 32453, 32715, 32751, 32766]),
    cdf([11135, 23641, 31056, 31998, 32496, 32668]),
    cdf([9984, 21999, 29192, 30645, 31640, 32402]),
    cdf([7552, 16614, 24880, 27283, 29254, 31203]),
    cdf([11391, 18656, 23727, 26058, 27788, 30278]),
    cdf([8576, 13585, 17632, 20884, 23948, 27152]),
    cdf([9216, 14276, 19043, 22689, 25799, 28712]),
];

type ColorIndexTable = [[[u16; PALETTE_COLORS + 1]; PALETTE_COLOR_INDEX_CONTEXTS]; PALETTE_SIZES];

const DEFAULT_PALETTE_Y_COLOR_INDEX: ColorIndexTable = [
    [cdf([29568]), cdf([16384]), cdf([8832]), cdf([28672]), cdf([31872])],
    [
        cdf([28032, 30326]),
        cdf([11647, 27405]),
        cdf([4352, 30659]),
        cdf([23552, 27800]),
        cdf([32256, 32504]),
    ],
    [
        cdf([26112, 28374, 30039]),
        cdf([9472, 22576, 27712]),
        cdf([6656, 26138, 29608]),
        cdf([19328, 23791, 28946]),
        cdf([31744, 31984, 32336]),
    ],
    [
        cdf([27904, 29215, 30075, 31190]),
        cdf([9728, 22598, 26134, 29425]),
        cdf([2688, 30066, 31058, 31933]),
        cdf([22015, 25039, 27726, 29932]),
        cdf([32383, 32482, 32554, 32660]),
    ],
    [
        cdf([24319, 26299, 27486, 28600, 29804]),
        cdf([7935, 18217, 21116, 25440, 28589]),
        cdf([6656, 25016, 27105, 28698, 30399]),
        cdf([19967, 24117, 26550, 28566, 30224]),
        cdf([31359, 31607, 31775, 31977, 32258]),
    ],
    [
        cdf([26368, 27768, 28588, 29274, 29997, 30917]),
        cdf([8960, 18260, 20810, 23986, 26627, 28882]),
        cdf([7295, 24111, 25836, 27515, 29033, 30769]),
        cdf([22016, 25208, 27305, 28159, 29221, 30274]),
        cdf([31744, 31932, 32050, 32199, 32335, 32521]),
    ],
    [
        cdf([26624, 27872, 28599, 29153, 29633, 30172, 30841]),
        cdf([6655, 17569, 19587, 23345, 25884, 28088, 29678]),
        cdf([3584, 27296, 28429, 29158, 30032, 30780, 31572]),
        cdf([23551, 25855, 27070, 27893, 28597, 29721, 30970]),
        cdf([32128, 32173, 32245, 32337, 32416, 32500, 32609]),
    ],
];

const DEFAULT_PALETTE_UV_COLOR_INDEX: ColorIndexTable = [
    [cdf([29824]), cdf([16384]), cdf([8832]), cdf([30720]), cdf([31744])],
    [
        cdf([27648, 30208]),
        cdf([14080, 26563]),
        cdf([5120, 30932]),
        cdf([24448, 27828]),
        cdf([31616, 32219]),
    ],
    [
        cdf([25856, 28259, 30584]),
        cdf([11520, 22476, 27944]),
        cdf([8064, 26882, 30308]),
        cdf([19455, 23823, 29134]),
        cdf([30848, 31501, 32174]),
    ],
    [
        cdf([26751, 28020, 29541, 31230]),
        cdf([12032, 26045, 30772, 31497]),
        cdf([1280, 32153, 32458, 32560]),
        cdf([23424, 24154, 29201, 29856]),
        cdf([32256, 32402, 32561, 32682]),
    ],
    [
        cdf([24576, 26720, 28114, 28950, 31694]),
        cdf([7551, 16613, 20462, 25269, 29077]),
        cdf([6272, 23039, 25623, 28163, 30861]),
        cdf([17024, 18808, 20771, 27941, 29845]),
        cdf([31616, 31936, 32079, 32321, 32546]),
    ],
    [
        cdf([23296, 25590, 27833, 29337, 29954, 31229]),
        cdf([7552, 13659, 16570, 21695, 24506, 27701]),
        cdf([6911, 24788, 26284, 27753, 29575, 30872]),
        cdf([17535, 22236, 24457, 26242, 27363, 30191]),
        cdf([30592, 31289, 31745, 31921, 32149, 32321]),
    ],
    [
        cdf([22016, 24242, 25141, 27137, 27797, 29331, 30848]),
        cdf([8063, 13564, 16940, 21948, 24568, 25689, 26989]),
        cdf([6528, 27028, 27835, 28741, 30031, 31795, 32285]),
        cdf([18047, 23797, 25444, 26274, 27111, 27929, 30367]),
        cdf([30208, 30628, 31046, 31658, 31762, 32367, 32469]),
    ],
];

const DEFAULT_INTER_COMPOUND_MODE: [[u16; INTER_COMPOUND_MODES + 1]; INTER_MODE_CONTEXTS] = [
    cdf([8923, 11946, 15028, 16879, 18399, 19766, 27581]),
    cdf([8032, 15054, 17634, 19079, 20749, 22202, 28726]),
    cdf([6561, 13379, 15613, 17159, 19041, 20594, 26752]),
    cdf([13968, 15752, 20444, 23598, 24277, 24950, 25748]),
    cdf([13861, 18611, 21783, 23962, 24696, 25424, 30609]),
    cdf([7885, 12311, 15976, 19024, 20515, 21661, 23147]),
    cdf([11407, 16588, 19365, 21657, 22748, 23629, 28912]),
    cdf([10681, 18953, 20791, 22468, 23935, 25024, 28506]),
];

const DEFAULT_WEDGE_INTERINTRA: [[u16; 3]; BLOCK_SIZES_ALL] = [
    cdf([128 * 128]),
    cdf([128 * 128]),
    cdf([128 * 128]),
    cdf([194 * 128]),
    cdf([213 * 128]),
    cdf([217 * 128]),
    cdf([222 * 128]),
    cdf([224 * 128]),
    cdf([226 * 128]),
    cdf([220 * 128]),
    cdf([128 * 128]),
    cdf([128 * 128]),
    cdf([128 * 128]),
    cdf([255 * 128]),
    cdf([255 * 128]),
    cdf([255 * 128]),
    cdf([208 * 128]),
    cdf([208 * 128]),
    cdf([208 * 128]),
    cdf([208 * 128]),
    cdf([255 * 128]),
    cdf([255 * 128]),
];

const DEFAULT_MOTION_MODE: [[u16; MOTION_MODES + 1]; BLOCK_SIZES_ALL] = [
    cdf([16384, 24576]),
    cdf([16384, 24576]),
    cdf([16384, 24576]),
    cdf([7936, 19091]),
    cdf([4991, 19205]),
    cdf([4992, 19314]),
    cdf([15104, 21590]),
    cdf([9855, 21043]),
    cdf([12800, 22238]),
    cdf([24320, 26498]),
    cdf([26496, 28995]),
    cdf([25216, 28166]),
    cdf([30592, 31238]),
    cdf([32256, 32656]),
    cdf([32256, 32656]),
    cdf([32256, 32656]),
    cdf([32640, 32740]),
    cdf([32640, 32740]),
    cdf([32640, 32740]),
    cdf([32640, 32740]),
    cdf([32640, 32740]),
    cdf([32640, 32740]),
];

const DEFAULT_OBMC: [[u16; 3]; BLOCK_SIZES_ALL] = [
    cdf([128 * 128]),
    cdf([128 * 128]),
    cdf([128 * 128]),
    cdf([45 * 128]),
    cdf([79 * 128]),
    cdf([75 * 128]),
    cdf([130 * 128]),
    cdf([141 * 128]),
    cdf([144 * 128]),
    cdf([208 * 128]),
    cdf([201 * 128]),
    cdf([186 * 128]),
    cdf([231 * 128]),
    cdf([252 * 128]),
    cdf([252 * 128]),
    cdf([252 * 128]),
    cdf([208 * 128]),
    cdf([208 * 128]),
    cdf([208 * 128]),
    cdf([208 * 128]),
    cdf([208 * 128]),
    cdf([208 * 128]),
];

const DEFAULT_SWITCHABLE_INTERP: [[u16; SWITCHABLE_FILTERS + 1]; SWITCHABLE_FILTER_CONTEXTS] = [
    cdf([32256, 32654]),
    cdf([2816, 32651]),
    cdf([512, 764]),
    cdf([30464, 31778]),
    cdf([32384, 32483]),
    cdf([3072, 32652]),
    cdf([256, 383]),
    cdf([25344, 26533]),
    cdf([32000, 32531]),
    cdf([2048, 32648]),
    cdf([384, 890]),
    cdf([28928, 31358]),
    cdf([31616, 31787]),
    cdf([4224, 32433]),
    cdf([128, 256]),
    cdf([17408, 18248]),
];

const DEFAULT_TXFM_PARTITION: [[u16; 3]; TXFM_PARTITION_CONTEXTS] = [
    cdf([249 * 128]),
    cdf([240 * 128]),
    cdf([223 * 128]),
    cdf([249 * 128]),
    cdf([229 * 128]),
    cdf([177 * 128]),
    cdf([250 * 128]),
    cdf([243 * 128]),
    cdf([208 * 128]),
    cdf([226 * 128]),
    cdf([187 * 128]),
    cdf([145 * 128]),
    cdf([236 * 128]),
    cdf([204 * 128]),
    cdf([150 * 128]),
    cdf([183 * 128]),
    cdf([149 * 128]),
    cdf([125 * 128]),
    cdf([181 * 128]),
    cdf([146 * 128]),
    cdf([113 * 128]),
];

const DEFAULT_NMV_COMPONENT: NmvComponent = NmvComponent {
    classes: cdf([28672, 30976, 31858, 32320, 32551, 32656, 32740, 32757, 32762, 32767]),
    class0_fp: [cdf([16384, 24576, 26624]), cdf([12288, 21248, 24128])],
    fp: cdf([8192, 17408, 21248]),
    sign: cdf([128 * 128]),
    class0_hp: cdf([160 * 128]),
    hp: cdf([128 * 128]),
    class0: cdf([216 * 128]),
    bits: [
        cdf([136 * 128]),
        cdf([140 * 128]),
        cdf([148 * 128]),
        cdf([160 * 128]),
        cdf([176 * 128]),
        cdf([192 * 128]),
        cdf([224 * 128]),
        cdf([234 * 128]),
        cdf([234 * 128]),
        cdf([240 * 128]),
    ],
};

const DEFAULT_NMV_CONTEXT: NmvContext = NmvContext {
    joints: cdf([4096, 11264, 19328]),
    comps: [DEFAULT_NMV_COMPONENT; 2],
};

/// Coefficient tables for each quantizer range, finest first.
pub(crate) const DEFAULT_COEFFICIENT_CDFS: [CoefficientCdfs; TOKEN_CDF_Q_CTXS] = [
    coefficient_defaults(0),
    coefficient_defaults(1),
    coefficient_defaults(2),
    coefficient_defaults(3),
];

/// Coarser quantizers leave more coefficients at zero, so the first symbol
/// of every coefficient table grows more likely with `qctx`.
const fn coefficient_defaults(qctx: usize) -> CoefficientCdfs {
    let first = (16384 + 4096 * qctx) as u16;
    CoefficientCdfs {
        txb_skip: [[skewed(2, first); TXB_SKIP_CONTEXTS]; TX_SIZES],
        eob_extra: [[[skewed(2, first); EOB_COEF_CONTEXTS]; PLANE_TYPES]; TX_SIZES],
        dc_sign: [[uniform(2); DC_SIGN_CONTEXTS]; PLANE_TYPES],
        eob_flag_16: [[skewed(5, first); 2]; PLANE_TYPES],
        eob_flag_32: [[skewed(6, first); 2]; PLANE_TYPES],
        eob_flag_64: [[skewed(7, first); 2]; PLANE_TYPES],
        eob_flag_128: [[skewed(8, first); 2]; PLANE_TYPES],
        eob_flag_256: [[skewed(9, first); 2]; PLANE_TYPES],
        eob_flag_512: [[skewed(10, first); 2]; PLANE_TYPES],
        eob_flag_1024: [[skewed(11, first); 2]; PLANE_TYPES],
        coeff_base_eob: [[[skewed(3, first); SIG_COEF_CONTEXTS_EOB]; PLANE_TYPES]; TX_SIZES],
        coeff_base: [[[skewed(4, first); SIG_COEF_CONTEXTS]; PLANE_TYPES]; TX_SIZES],
        coeff_br: [[[skewed(BR_CDF_SIZE, first); LEVEL_CONTEXTS]; PLANE_TYPES]; TX_SIZES],
    }
}
