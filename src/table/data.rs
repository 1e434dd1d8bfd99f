//! Per-SKU timing tables.
//!
//! spec.md is explicit that authoring these is out of scope ("Generating
//! timing tables... authored offline by the SoC vendor"; Non-goals). What
//! follows are representative three-entry table sets — boot (~204 MHz),
//! intermediate (~800 MHz), and target (~1600 MHz) — built from
//! [`TimingTable::blank`] with the fields the rest of this crate actually
//! reads filled in plausibly. They exist so [`super::selector::select_tables`]
//! and the rest of the pipeline have real data to run against in tests; they
//! are not a substitute for vendor-authored tables in a real boot image.

use super::{training_mask, PllConfig, TimingTable};

const fn clk_src(src: u32, divisor: u32) -> u32 {
    (src << 29) | (divisor & 0xff)
}

/// `src` is one of the `EMC_2X_CLK_SRC` encodings from `regs::car`
/// (`PllmOut0 = 0`, `PllpOut0 = 2`, `PllmbOut0 = 6`, ...).
const PLLP_OUT0: u32 = 0b010;
const PLLM_OUT0: u32 = 0b000;

const fn representative_table_set(variant: u8) -> [TimingTable; 3] {
    let mut boot = TimingTable::blank(204_000, clk_src(PLLP_OUT0, 0x02));
    boot.trained = true; // boot entry never needs (re)training, it's the origin.
    boot.run_clocks = 128;
    boot.tree_margin = 80;
    boot.t_zqcal_lpddr4 = 1_000_000; // 1000ns in ps, matches the fixed LPDDR4 ZQCAL constant.
    boot.min_mrs_wait = 6;

    let mut mid = TimingTable::blank(800_000, clk_src(PLLM_OUT0, 0x01));
    mid.needs_training = training_mask::CA | training_mask::CA_VREF;
    mid.trained = false;
    mid.training_pattern = variant % 22;
    mid.periodic_training = true;
    mid.run_clocks = 256;
    mid.tree_margin = 80;
    mid.ptfv_dvfs_samples = 3;
    mid.ptfv_write_samples = 3;
    mid.ptfv_movavg_weight = 4;
    mid.t_zqcal_lpddr4 = 1_000_000;
    mid.min_mrs_wait = 6;
    mid.pllm = PllConfig {
        divm: 1,
        divn: 66,
        divp: 0,
        pll_en_ssc: 0,
        ss_cfg: 0,
        ss_ctrl1: 0,
        ss_ctrl2: 0,
    };

    let mut target = TimingTable::blank(1_600_000, clk_src(PLLM_OUT0, 0x00));
    target.needs_training = training_mask::WRITE
        | training_mask::WRITE_VREF
        | training_mask::READ
        | training_mask::READ_VREF;
    target.trained = false;
    target.training_pattern = variant % 22;
    target.periodic_training = true;
    target.run_clocks = 512;
    target.tree_margin = 80;
    target.ptfv_dvfs_samples = 3;
    target.ptfv_write_samples = 3;
    target.ptfv_movavg_weight = 4;
    target.t_zqcal_lpddr4 = 1_000_000;
    target.min_mrs_wait = 6;
    target.pllm = PllConfig {
        divm: 1,
        divn: 132,
        divp: 0,
        pll_en_ssc: 0,
        ss_cfg: 0,
        ss_ctrl1: 0,
        ss_ctrl2: 0,
    };
    target.pllmb = PllConfig {
        divm: 1,
        divn: 132,
        divp: 0,
        pll_en_ssc: 0,
        ss_cfg: 0,
        ss_ctrl1: 0,
        ss_ctrl2: 0,
    };

    [boot, mid, target]
}

static TABLE_SET_0: [TimingTable; 3] = representative_table_set(0);
static TABLE_SET_1: [TimingTable; 3] = representative_table_set(1);
static TABLE_SET_2: [TimingTable; 3] = representative_table_set(2);
static TABLE_SET_3: [TimingTable; 3] = representative_table_set(3);
static TABLE_SET_5: [TimingTable; 3] = representative_table_set(5);
static TABLE_SET_6: [TimingTable; 3] = representative_table_set(6);
static TABLE_SET_7: [TimingTable; 3] = representative_table_set(7);
static TABLE_SET_8: [TimingTable; 3] = representative_table_set(8);
static TABLE_SET_9: [TimingTable; 3] = representative_table_set(9);
static TABLE_SET_A: [TimingTable; 3] = representative_table_set(0xA);
static TABLE_SET_B: [TimingTable; 3] = representative_table_set(0xB);
static TABLE_SET_C: [TimingTable; 3] = representative_table_set(0xC);
static TABLE_SET_D: [TimingTable; 3] = representative_table_set(0xD);
static TABLE_SET_E: [TimingTable; 3] = representative_table_set(0xE);
static TABLE_SET_F: [TimingTable; 3] = representative_table_set(0xF);
static TABLE_SET_10: [TimingTable; 3] = representative_table_set(0x10);

/// Look up a table-set by the index produced by
/// [`super::selector::dram_id_to_table_set_index`].
pub fn table_set_by_index(index: u8) -> Option<&'static [TimingTable; 3]> {
    Some(match index {
        0 => &TABLE_SET_0,
        1 => &TABLE_SET_1,
        2 => &TABLE_SET_2,
        3 => &TABLE_SET_3,
        5 => &TABLE_SET_5,
        6 => &TABLE_SET_6,
        7 => &TABLE_SET_7,
        8 => &TABLE_SET_8,
        9 => &TABLE_SET_9,
        0xA => &TABLE_SET_A,
        0xB => &TABLE_SET_B,
        0xC => &TABLE_SET_C,
        0xD => &TABLE_SET_D,
        0xE => &TABLE_SET_E,
        0xF => &TABLE_SET_F,
        0x10 => &TABLE_SET_10,
        _ => return None,
    })
}
