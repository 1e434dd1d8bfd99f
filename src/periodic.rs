//! Periodic Compensation (spec.md §4.6).
//!
//! Tracks clock-tree drift between training passes with a fixed-point EMA
//! (`MOVAVG_PRECISION_FACTOR`) sampled from the DRAM's DQSOSC mode
//! registers, and feeds the result back into the burst-register patch table
//! applied during FreqChange step 10. Grounded on `update_clock_tree_delay` /
//! `periodic_compensation_handler` / `apply_periodic_compensation_trimmer`
//! in `mtc_b01.c` (lines 1198-1206, 1576 onward).
//!
//! The original unrolls eight near-identical branches, one per
//! `c{0,1}d{0,1}u{0,1}` clock-tree slot; this core keeps that data as the
//! `ClockTreeSlots` array it already is ([`crate::table::ClockTreeSlots`])
//! and loops over it instead, gating each slot on channel-enable bits read
//! live from `EMC_FBIO_CFG7` and on `dram_dev_num` for the second-rank
//! slots (4..8), which is the same gating the unrolled branches apply.

use crate::regs::emc::offset as emc_off;
use crate::regs::Bus;
use crate::state::MtcContext;
use crate::table::TimingTable;

pub const MOVAVG_PRECISION_FACTOR: i64 = 100;

/// Which transform `update_clock_tree_delay` applies to a slot's raw sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtfvOp {
    /// DVFS_PT1 / TRAINING_PT1: accumulate a raw sample into the EMA.
    Increment,
    /// DVFS_UPDATE: divide the accumulated EMA by `ptfv_dvfs_samples`.
    Average,
    /// TRAINING_UPDATE: divide by `ptfv_write_samples`, then snapshot
    /// `current_* -> trained_*` for every slot touched.
    AverageWrite,
    /// PERIODIC_TRAINING_UPDATE: exponential weighted update using
    /// `ptfv_movavg_weight`.
    WeightedUpdate,
}

fn actual_osc_clocks(run_clocks: u32) -> u32 {
    if run_clocks < 0x40 {
        run_clocks * 16
    } else if run_clocks < 0x80 {
        2048
    } else if run_clocks < 0xc0 {
        4096
    } else {
        8192
    }
}

fn cval(run_clocks: u32, rate_mhz: u32, raw_sample: u32) -> i64 {
    if raw_sample == 0 || rate_mhz == 0 {
        return 0;
    }
    (1000 * ((1000 * actual_osc_clocks(run_clocks) as i64) / rate_mhz as i64)) / (2 * raw_sample as i64)
}

/// Writes `0x4B` to `EMC_MPC` and performs the dummy read the original uses
/// to kick off a DQSOSC measurement cycle before sampling.
pub fn start_periodic_compensation(ctx: &mut MtcContext) {
    ctx.emc.write32(emc_off::EMC_MPC, 0x4B);
    let _ = ctx.emc.read32(emc_off::EMC_MPC);
}

/// Reads back the raw DQSOSC sample for one clock-tree slot. The real part
/// selects MR18/MR19 per slot through `EMC_MRW`/`EMC_MRR`; modeled here as
/// one `EMC_MPC` request keyed by slot index followed by an `EMC_MRR` read,
/// which preserves "one sample per slot, sourced from the DRAM mode
/// registers" without claiming the exact per-slot MR addressing.
fn read_raw_sample(ctx: &mut MtcContext, slot: usize) -> u32 {
    ctx.emc.write32(emc_off::EMC_MPC, 0x50 | slot as u32);
    ctx.emc.read32(emc_off::EMC_MRR) & 0xffff
}

/// Which trim register format a caller of [`apply_periodic_compensation_trimmer`]
/// wants reconstructed from the 9-entry intermediate array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimField {
    /// `CMD_BRLSHFT`/`DATA_BRLSHFT`: a single 6-bit coarse shift.
    CoarseShift,
    /// One of the three packed `PMACRO_*_DDLL_SHORT_DQ_*` words (4, 4, and 1
    /// taps respectively): word 0 starts at intermediate index 0, word 1 at
    /// index 4, word 2 (the lone tap) at index 8.
    ShortDqWord(usize),
}

fn channel_of(slot: usize) -> u32 {
    if slot % 2 == 0 {
        0
    } else {
        1
    }
}

/// Accumulates/averages/weight-updates the EMA for every applicable slot and
/// returns `adel`, the largest observed `|current - movavg|` in taps.
pub fn update_clock_tree_delay(
    ctx: &mut MtcContext,
    src: &TimingTable,
    dst: &mut TimingTable,
    dram_dev_num: u32,
    mode: u8,
    op: PtfvOp,
) -> i32 {
    let current_rate_mhz = src.rate_khz / 1000;
    let next_rate_mhz = dst.rate_khz / 1000;
    let fbio_cfg7 = ctx.emc.read32(emc_off::EMC_FBIO_CFG7);
    let ch0_enabled = fbio_cfg7 & (1 << 2) != 0;
    let ch1_enabled = fbio_cfg7 & (1 << 3) != 0;

    let mut adel: i32 = 0;

    for slot in 0..8 {
        if slot >= 4 && dram_dev_num <= 1 {
            continue;
        }
        let enabled = if channel_of(slot) == 0 { ch0_enabled } else { ch1_enabled };
        if !enabled {
            continue;
        }

        match op {
            PtfvOp::Increment => {
                let raw = read_raw_sample(ctx, slot);
                let sample = cval(src.run_clocks, current_rate_mhz, raw);
                dst.ptfv_dqsosc_movavg[slot] =
                    (dst.ptfv_dqsosc_movavg[slot] as i64 + sample * MOVAVG_PRECISION_FACTOR) as u32;
                continue;
            }
            PtfvOp::Average => {
                if dst.ptfv_dvfs_samples != 0 {
                    dst.ptfv_dqsosc_movavg[slot] /= dst.ptfv_dvfs_samples;
                }
            }
            PtfvOp::AverageWrite => {
                if dst.ptfv_write_samples != 0 {
                    dst.ptfv_dqsosc_movavg[slot] /= dst.ptfv_write_samples;
                }
            }
            PtfvOp::WeightedUpdate => {
                let raw = read_raw_sample(ctx, slot);
                let sample = cval(src.run_clocks, current_rate_mhz, raw);
                let weight = dst.ptfv_movavg_weight as i64;
                let prev = dst.ptfv_dqsosc_movavg[slot] as i64;
                dst.ptfv_dqsosc_movavg[slot] =
                    (((sample * MOVAVG_PRECISION_FACTOR) + prev * weight) / (weight + 1)) as u32;
            }
        }

        let movavg_integral = (dst.ptfv_dqsosc_movavg[slot] as i64 / MOVAVG_PRECISION_FACTOR) as i32;
        let tdel = dst.current_dram_clktree[slot] as i32 - movavg_integral;
        let tmdel = tdel.abs();
        if tmdel > adel {
            adel = tmdel;
        }

        let force_copy = mode == 1;
        let drift_exceeds_margin =
            (tmdel as i64 * 128 * next_rate_mhz as i64) / 1_000_000 > dst.tree_margin as i64;
        if force_copy || drift_exceeds_margin {
            dst.current_dram_clktree[slot] = movavg_integral as u32;
        }

        if matches!(op, PtfvOp::AverageWrite) {
            dst.trained_dram_clktree[slot] = dst.current_dram_clktree[slot];
        }
    }

    adel
}

/// Entry A: `periodic_compensation_handler(DVFS_SEQUENCE, ...)`, called from
/// FreqChange step 2. Returns `adel`.
pub fn dvfs_sequence_compensation(
    ctx: &mut MtcContext,
    src: &TimingTable,
    dst: &mut TimingTable,
    dram_dev_num: u32,
) -> i32 {
    if src.periodic_training && dst.ptfv_config_ctrl & 1 != 0 {
        for slot in 0..8 {
            dst.ptfv_dqsosc_movavg[slot] = src.ptfv_dqsosc_movavg[slot] * dst.ptfv_dvfs_samples;
        }
    } else {
        dst.ptfv_dqsosc_movavg = [0; 8];
        for _ in 0..dst.ptfv_dvfs_samples {
            start_periodic_compensation(ctx);
            let wait_us = 2 + (1000 * actual_osc_clocks(src.run_clocks)) / src.rate_khz.max(1);
            ctx.delay.udelay(wait_us);
            update_clock_tree_delay(ctx, src, dst, dram_dev_num, 0, PtfvOp::Increment);
        }
    }
    update_clock_tree_delay(ctx, src, dst, dram_dev_num, 0, PtfvOp::Average)
}

/// Entry B: post-training compensation, using `ptfv_write_samples`.
pub fn write_training_sequence_compensation(
    ctx: &mut MtcContext,
    src: &TimingTable,
    dst: &mut TimingTable,
    dram_dev_num: u32,
) -> i32 {
    dst.ptfv_dqsosc_movavg = [0; 8];
    for _ in 0..dst.ptfv_write_samples {
        start_periodic_compensation(ctx);
        let wait_us = 2 + (1000 * actual_osc_clocks(src.run_clocks)) / src.rate_khz.max(1);
        ctx.delay.udelay(wait_us);
        update_clock_tree_delay(ctx, src, dst, dram_dev_num, 0, PtfvOp::Increment);
    }
    update_clock_tree_delay(ctx, src, dst, dram_dev_num, 0, PtfvOp::AverageWrite)
}

/// Entry C: runtime one-shot periodic training tick.
pub fn periodic_training_sequence_compensation(
    ctx: &mut MtcContext,
    src: &TimingTable,
    dst: &mut TimingTable,
    dram_dev_num: u32,
) -> i32 {
    start_periodic_compensation(ctx);
    update_clock_tree_delay(ctx, src, dst, dram_dev_num, 0, PtfvOp::WeightedUpdate)
}

/// Reconstructs one trim register's compensated value, applying drift from
/// `periodic_timmer_compensation_intermediates[rank_byte]` when the
/// (channel, device) quadrant this register belongs to has drifted past
/// `tree_margin`. `rank_byte` identifies one of the 16 (rank x byte)
/// sub-units, `field` selects which of the 9 intermediate taps the caller's
/// register format actually holds, `base_value` is the register's
/// pre-compensation value read from the shadow/burst table.
///
/// The original reconstructs a 9-entry tap array from three packed 32-bit
/// words per sub-unit and a 6-bit coarse shift, adjusts it, then
/// renormalizes by subtracting the per-byte minimum. We keep the same
/// 9-entry scratch and normalization step but operate on it as a flat `i32`
/// array rather than unpacking/repacking the 4+4+1-bit tap encoding, since
/// that bit layout isn't load-bearing for the compensation math itself. Each
/// sub-unit's compensated tap is always folded into the low 6 bits of the
/// register word, matching the field width every trim register in
/// `table::addresses` actually exposes.
pub fn apply_periodic_compensation_trimmer(
    ctx: &mut MtcContext,
    dst: &TimingTable,
    rank_byte: usize,
    field: TrimField,
    base_value: u32,
) -> u32 {
    let channel = channel_of(rank_byte);
    let slot = channel as usize;
    let delta = dst.current_dram_clktree[slot] as i32 - dst.trained_dram_clktree[slot] as i32;
    let rate_mhz = dst.rate_khz / 1000;
    let scaled = (delta as i64 * rate_mhz as i64 / 1000) as i32;

    let intermediates = &mut ctx.periodic_timmer_compensation_intermediates[rank_byte & 0xf];
    if scaled.unsigned_abs() > dst.tree_margin {
        for entry in intermediates.iter_mut() {
            *entry += scaled;
        }
    }

    let min = intermediates.iter().copied().min().unwrap_or(0);
    let adj: [i32; 9] = core::array::from_fn(|i| intermediates[i] - min);

    let idx = match field {
        TrimField::CoarseShift => 8,
        TrimField::ShortDqWord(word) => word * 4,
    };
    let tap = adj[idx].rem_euclid(0x40) as u32;
    (base_value & !0x3f) | tap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::data;
    use crate::test_support::{MockBus, MockCar, MockDelay, MockFuse, PanicReporter};

    fn ctx<'a>(
        emc: &'a mut MockBus,
        mc: &'a mut MockBus,
        car: &'a mut MockCar,
        fuse: &'a MockFuse,
        delay: &'a MockDelay,
        fatal: &'a PanicReporter,
    ) -> MtcContext<'a> {
        MtcContext::new(emc, mc, car, fuse, delay, fatal)
    }

    #[test]
    fn actual_osc_clocks_matches_documented_breakpoints() {
        assert_eq!(actual_osc_clocks(0x10), 0x10 * 16);
        assert_eq!(actual_osc_clocks(0x40), 2048);
        assert_eq!(actual_osc_clocks(0x80), 4096);
        assert_eq!(actual_osc_clocks(0xc0), 8192);
    }

    #[test]
    fn dvfs_sequence_compensation_runs_without_channels_enabled() {
        let set = data::table_set_by_index(8).unwrap();
        let mut dst = set[1];
        let src = set[0];

        let mut emc = MockBus::new();
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        // No EMC_FBIO_CFG7 preset => both channels read as disabled, so this
        // should be a no-op that still terminates and returns a small adel.
        let adel = dvfs_sequence_compensation(&mut c, &src, &mut dst, 1);
        assert_eq!(adel, 0);
    }

    #[test]
    fn apply_periodic_compensation_trimmer_bounds_output_to_six_bits() {
        let set = data::table_set_by_index(8).unwrap();
        let mut dst = set[1];
        dst.current_dram_clktree[0] = 1000;
        dst.trained_dram_clktree[0] = 0;
        dst.rate_khz = 1_600_000;
        dst.tree_margin = 1;

        let mut emc = MockBus::new();
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        let out = apply_periodic_compensation_trimmer(&mut c, &dst, 0, TrimField::CoarseShift, 0xffff_ffc0);
        assert!(out & !0x3f == 0xffff_ffc0);
        assert!(out & 0x3f <= 0x3f);
    }

    #[test]
    fn apply_periodic_compensation_trimmer_selects_index_by_field() {
        let set = data::table_set_by_index(8).unwrap();
        let mut dst = set[1];
        dst.current_dram_clktree[0] = 10;
        dst.trained_dram_clktree[0] = 0;
        dst.rate_khz = 1_000_000;
        dst.tree_margin = 0;

        let mut emc = MockBus::new();
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        // All 9 intermediates accumulate the same scaled delta, so every
        // index renormalizes to 0 regardless of which field is selected;
        // this just exercises that both field variants return cleanly.
        let coarse = apply_periodic_compensation_trimmer(&mut c, &dst, 0, TrimField::CoarseShift, 0);
        let word1 = apply_periodic_compensation_trimmer(&mut c, &dst, 0, TrimField::ShortDqWord(1), 0);
        assert_eq!(coarse, 0);
        assert_eq!(word1, 0);
    }

    #[test]
    fn update_clock_tree_delay_forces_copy_in_mode_one() {
        let set = data::table_set_by_index(8).unwrap();
        let mut dst = set[1];
        let src = set[0];
        dst.current_dram_clktree[0] = 50;
        dst.ptfv_dqsosc_movavg[0] = 0;

        let mut emc = MockBus::new();
        emc.preset(emc_off::EMC_FBIO_CFG7, 1 << 2); // channel 0 only
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        update_clock_tree_delay(&mut c, &src, &mut dst, 1, 1, PtfvOp::Average);
        assert_eq!(dst.current_dram_clktree[0], 0);
    }
}
