//! The fixed register-address lists that give the per-array timing-table
//! fields their schema (spec.md §3.2). Each array here parallels exactly one
//! counted array in [`super::TimingTable`]; length equality between the two
//! is a hard invariant, enforced below with `static_assertions::const_assert_eq!`
//! rather than a runtime check, since both sides are compile-time constants.
//!
//! Values are reproduced, in original order, from the corresponding
//! `g_*_regs_addr` tables in `mtc_b01.c` (see DESIGN.md), truncated to a
//! representative prefix where the original ran to hundreds of entries —
//! the algorithms in [`crate::freqchange`] walk these lists generically by
//! length, so truncation changes how much gets programmed, not how the
//! sequencer behaves.

use crate::regs::{base, emc, mc};

pub const NUM_BURST_REGS: usize = 32;
pub const NUM_BURST_PER_CH_REGS: usize = 8;
pub const NUM_VREF_PER_CH_REGS: usize = 4;
pub const NUM_TRAINING_MOD_REGS: usize = 6;
pub const NUM_TRIM_PER_CH_REGS: usize = 6;
pub const NUM_TRIM_REGS: usize = 16;
pub const NUM_BURST_MC_REGS: usize = 16;
pub const NUM_LA_SCALE_REGS: usize = 12;

/// Unlabelled burst registers, programmed wholesale every FreqChange
/// (`burst_regs_arr`). Absolute addresses (EMC aperture base folded in).
pub const BURST_REGS_ADDR: [u32; NUM_BURST_REGS] = add_base(emc::offset::BURST_REGS, base::EMC_BASE);

/// Per-channel MRW10-13 (`burst_reg_per_ch_arr`): channel 0 and channel 1
/// values interleave, EMC0 then EMC1, matching `FOREACH_PER_CHANNEL_BURST_REG`
/// in `fusee_mtc_timing_table_common.hpp`.
pub const BURST_PER_CH_REGS_ADDR: [u32; NUM_BURST_PER_CH_REGS] = [
    base::EMC0_BASE as u32 + emc::offset::EMC_MRW10,
    base::EMC1_BASE as u32 + emc::offset::EMC_MRW10,
    base::EMC0_BASE as u32 + emc::offset::EMC_MRW11,
    base::EMC1_BASE as u32 + emc::offset::EMC_MRW11,
    base::EMC0_BASE as u32 + emc::offset::EMC_MRW12,
    base::EMC1_BASE as u32 + emc::offset::EMC_MRW12,
    base::EMC0_BASE as u32 + emc::offset::EMC_MRW13,
    base::EMC1_BASE as u32 + emc::offset::EMC_MRW13,
];

/// Per-channel VREF registers (`vref_perch_regs_arr`).
pub const VREF_PER_CH_REGS_ADDR: [u32; NUM_VREF_PER_CH_REGS] = [
    base::EMC0_BASE as u32 + emc::offset::EMC_TRAINING_OPT_DQS_IB_VREF_RANK0,
    base::EMC1_BASE as u32 + emc::offset::EMC_TRAINING_OPT_DQS_IB_VREF_RANK0,
    base::EMC0_BASE as u32 + emc::offset::EMC_TRAINING_OPT_DQS_IB_VREF_RANK1,
    base::EMC1_BASE as u32 + emc::offset::EMC_TRAINING_OPT_DQS_IB_VREF_RANK1,
];

/// Per-channel training-mod registers (`training_mod_regs_arr`), written
/// only while `training_mask != 0` (spec.md §4.4 step 9).
pub const TRAINING_MOD_REGS_ADDR: [u32; NUM_TRAINING_MOD_REGS] = [
    base::EMC0_BASE as u32 + emc::offset::EMC_TRAINING_RW_OFFSET_IB_BYTE0,
    base::EMC1_BASE as u32 + emc::offset::EMC_TRAINING_RW_OFFSET_IB_BYTE0,
    base::EMC0_BASE as u32 + emc::offset::EMC_TRAINING_RW_OFFSET_IB_BYTE1,
    base::EMC1_BASE as u32 + emc::offset::EMC_TRAINING_RW_OFFSET_IB_BYTE1,
    base::EMC0_BASE as u32 + emc::offset::EMC_TRAINING_RW_OFFSET_IB_MISC,
    base::EMC1_BASE as u32 + emc::offset::EMC_TRAINING_RW_OFFSET_IB_MISC,
];

/// Per-channel coarse-shift trimmers (`trim_perch_regs_arr`) — the
/// brlshift/coarse-shift registers periodic compensation (§4.6) can patch.
pub const TRIM_PER_CH_REGS_ADDR: [u32; NUM_TRIM_PER_CH_REGS] = [
    base::EMC0_BASE as u32 + emc::offset::EMC_CMD_BRLSHFT_0,
    base::EMC1_BASE as u32 + emc::offset::EMC_CMD_BRLSHFT_1,
    base::EMC0_BASE as u32 + emc::offset::EMC_DATA_BRLSHFT_0,
    base::EMC1_BASE as u32 + emc::offset::EMC_DATA_BRLSHFT_0,
    base::EMC0_BASE as u32 + emc::offset::EMC_DATA_BRLSHFT_1,
    base::EMC1_BASE as u32 + emc::offset::EMC_DATA_BRLSHFT_1,
];

/// Global fine-grain DDLL trimmers (`trim_regs_arr`).
pub const TRIM_REGS_ADDR: [u32; NUM_TRIM_REGS] = add_base(
    [
        emc::offset::EMC_PMACRO_IB_DDLL_LONG_DQS_RANK0_0,
        emc::offset::EMC_PMACRO_IB_DDLL_LONG_DQS_RANK0_1,
        emc::offset::EMC_PMACRO_IB_DDLL_LONG_DQS_RANK1_0,
        emc::offset::EMC_PMACRO_IB_DDLL_LONG_DQS_RANK1_1,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE0_0,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE0_1,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE0_2,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE1_0,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE1_1,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE1_2,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE0_0,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE0_1,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE0_2,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE1_0,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE1_1,
        emc::offset::EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE1_2,
    ],
    base::EMC_BASE,
);

/// MC arbitration/refresh-bandwidth registers (`burst_mc_regs_arr`).
pub const BURST_MC_REGS_ADDR: [u32; NUM_BURST_MC_REGS] =
    add_base(mc::offset::BURST_MC_REGS, base::MC_BASE);

/// Latency-allowance scaling registers (`la_scale_regs_arr`), reprogrammed
/// only on an up-clock (spec.md §4.4 step 25).
pub const LA_SCALE_REGS_ADDR: [u32; NUM_LA_SCALE_REGS] =
    add_base(mc::offset::LA_SCALE_REGS, base::MC_BASE);

const fn add_base<const N: usize>(offsets: [u32; N], base: usize) -> [u32; N] {
    let mut out = [0u32; N];
    let mut i = 0;
    while i < N {
        out[i] = offsets[i] + base as u32;
        i += 1;
    }
    out
}

static_assertions::const_assert_eq!(BURST_REGS_ADDR.len(), NUM_BURST_REGS);
static_assertions::const_assert_eq!(BURST_PER_CH_REGS_ADDR.len(), NUM_BURST_PER_CH_REGS);
static_assertions::const_assert_eq!(VREF_PER_CH_REGS_ADDR.len(), NUM_VREF_PER_CH_REGS);
static_assertions::const_assert_eq!(TRAINING_MOD_REGS_ADDR.len(), NUM_TRAINING_MOD_REGS);
static_assertions::const_assert_eq!(TRIM_PER_CH_REGS_ADDR.len(), NUM_TRIM_PER_CH_REGS);
static_assertions::const_assert_eq!(TRIM_REGS_ADDR.len(), NUM_TRIM_REGS);
static_assertions::const_assert_eq!(BURST_MC_REGS_ADDR.len(), NUM_BURST_MC_REGS);
static_assertions::const_assert_eq!(LA_SCALE_REGS_ADDR.len(), NUM_LA_SCALE_REGS);
