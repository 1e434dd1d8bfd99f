//! Frequency-Change Sequencer (spec.md §4.4) — the core of this crate.
//!
//! `freq_change` runs the 30-phase state machine that quiesces DRAM,
//! rewrites the burst/per-channel/trim register banks, crosses the clock
//! change on the CCFIFO, and brings DRAM back up at the new rate (or, for a
//! training pass, trains and switches back). Grounded on `freq_change` in
//! `mtc_b01.c` (lines 2149-3727); phase bodies live in [`phases`].

mod phases;

pub(crate) use phases::emc_timing_update;

use crate::ccfifo;
use crate::clocksource;
use crate::periodic;
use crate::regs::emc::offset as emc_off;
use crate::state::MtcContext;
use crate::table::{training_mask, TimingTable};
use crate::Result;
use log::{debug, trace};

/// Ramp-down/up rate thresholds (kHz) selecting which VTTGEN CCFIFO sequence
/// to enqueue (spec.md §4.4 step 11).
const LOW_RATE_CUTOFF_KHZ: u32 = 407_997;

fn dvfs_power_ramp_down(ctx: &mut MtcContext, rate_khz: u32) -> u32 {
    let stall = if rate_khz < LOW_RATE_CUTOFF_KHZ { 8 } else { 4 };
    ccfifo::push(ctx.emc, emc_off::EMC_PMACRO_VTTGEN_CTRL_1, 0, stall);
    stall as u32
}

fn dvfs_power_ramp_up(ctx: &mut MtcContext, rate_khz: u32) -> u32 {
    let stall = if rate_khz < LOW_RATE_CUTOFF_KHZ { 8 } else { 4 };
    ccfifo::push(ctx.emc, emc_off::EMC_PMACRO_VTTGEN_CTRL_1, 1, stall);
    stall as u32
}

/// Runs a full FreqChange: `training_mask == 0` is a plain DVFS switch,
/// anything else is a training pass (switch to `dst`, train, switch back).
pub fn freq_change(
    ctx: &mut MtcContext,
    src: &TimingTable,
    dst: &mut TimingTable,
    training_mask: u32,
    target_clk_src: u32,
) -> Result<()> {
    let training = training_mask != 0;
    debug!(
        "freq_change: {} -> {} khz, training_mask {:#x}",
        src.rate_khz, dst.rate_khz, training_mask
    );

    // Phase 1.
    trace!("phase 1: quiesce");
    phases::quiesce(ctx);

    // Phase 2.
    let mut compensate_trimmer_applicable = false;
    if !training && dst.periodic_training {
        trace!("phase 2: periodic compensation");
        dst.current_dram_clktree = dst.trained_dram_clktree;
        let adel = periodic::dvfs_sequence_compensation(ctx, src, dst, 1);
        compensate_trimmer_applicable = adel.unsigned_abs() > dst.tree_margin;
    }

    // Phase 3.
    trace!("phase 3: dll prelock");
    phases::dll_prelock(ctx, dst, training);

    // Phase 4.
    trace!("phase 4: stage autocal");
    phases::stage_autocal(ctx, dst);

    // Phase 5.
    trace!("phase 5: zqcal wait times");
    let (zq_wait_long, _zq_wait_short) = phases::zqcal_wait_times(dst.rate_khz);

    // Phase 6.
    trace!("phase 6: training cke gate");
    phases::training_cke_gate(ctx, training_mask);

    // Phase 7: FSP bank alternation.
    trace!("phase 7: fsp bank alternation");
    ctx.fsp_for_next_freq ^= 1;

    // Phase 8.
    trace!("phase 8: write burst regs");
    let burst_addrs = crate::table::addresses::BURST_REGS_ADDR;
    phases::write_burst_regs(ctx, dst, &burst_addrs, training_mask);

    // Phases 9-10.
    trace!("phases 9-10: per-channel and trim regs");
    phases::write_per_channel_and_trim_regs(
        ctx,
        dst,
        &crate::table::addresses::BURST_PER_CH_REGS_ADDR,
        &crate::table::addresses::VREF_PER_CH_REGS_ADDR,
        &crate::table::addresses::TRAINING_MOD_REGS_ADDR,
        &crate::table::addresses::TRIM_PER_CH_REGS_ADDR,
        training_mask,
        compensate_trimmer_applicable,
    );

    // Phase 11.
    trace!("phase 11: power ramp down");
    let ramp_down_cycles = dvfs_power_ramp_down(ctx, dst.rate_khz);

    // Phase 12.
    trace!("phase 12: clock change barrier");
    phases::clock_change_barrier(ctx, dst.clkchange_delay);

    // Phase 13.
    trace!("phase 13: power ramp up");
    let ramp_up_cycles = dvfs_power_ramp_up(ctx, dst.rate_khz);

    // Phase 14: CKE bring-up.
    trace!("phase 14: cke bring-up");
    let cke_pattern = if dst.misc_cfg_0 & 1 != 0 { 0b11 } else { 0b01 };
    ccfifo::push(ctx.emc, emc_off::EMC_PIN, cke_pattern, 0);

    // Phase 15: ZQ latch. `zq_wait_long` (phase 5) and the ramp-up/ramp-down
    // cycle counts from phases 11/13 are folded into the stall count so the
    // latch settles a full ZQCAL period, plus the power-ramp settle time,
    // after the calibration command before it fires.
    trace!("phase 15: zq latch");
    let zq_latch_dvfs_wait_time = ramp_down_cycles.saturating_add(ramp_up_cycles);
    let zq_latch_stall = dst
        .zqcal_before_cc_cutoff
        .saturating_add(zq_wait_long)
        .saturating_add(zq_latch_dvfs_wait_time) as u16;
    ccfifo::push(ctx.emc, emc_off::EMC_ZQ_CAL, 1 | (1 << 31), zq_latch_stall);

    // Phase 16 (training only): kickoff.
    if training {
        trace!("phase 16: training kickoff");
        ccfifo::push(
            ctx.emc,
            emc_off::EMC_TRAINING_CMD,
            1 | (training_mask << 8),
            0,
        );
        ccfifo::push(ctx.emc, emc_off::EMC_SWITCH_BACK_CTRL, 1, 0);
    }

    // Phase 23: trigger the clock change.
    trace!("phase 23: trigger clock change");
    let trigger_result = phases::trigger_clock_change(ctx, target_clk_src, training);

    // Phase 24 (training only): harvest the VREF results this pass measured.
    // Each of the 8 per-channel MRW10-13 slots in `burst_reg_per_ch` gets the
    // raw hardware-chosen vref (cycling through the 4 modeled
    // `TRAINING_OPT_DQS_IB_VREF_*` sources, channel 0/1 then rank 0/1)
    // combined with its `save_restore_mod_regs` entry: the low 7 bits add to
    // the raw value, or subtract when the entry's MSB is set.
    if training {
        trace!("phase 24: harvest training results");
        let vref_addrs = crate::table::addresses::VREF_PER_CH_REGS_ADDR;
        for i in 0..dst.burst_reg_per_ch.len() {
            let raw_vref = ctx.emc.read32(vref_addrs[i % vref_addrs.len()]);
            let mod_reg = dst.save_restore_mod_regs[i % dst.save_restore_mod_regs.len()];
            let adjust = (mod_reg & 0x7f) as i32;
            let adjusted = if mod_reg & 0x8000_0000 != 0 {
                raw_vref as i32 - adjust
            } else {
                raw_vref as i32 + adjust
            };
            dst.burst_reg_per_ch.set(i, adjusted as u32);
        }
    }

    // Phase 25: MC updown.
    if !training && dst.rate_khz > src.rate_khz {
        trace!("phase 25: mc updown");
        for (i, &addr) in crate::table::addresses::BURST_MC_REGS_ADDR.iter().enumerate() {
            ctx.mc.write32(addr, dst.burst_mc_regs.get(i));
        }
        phases::emc_timing_update(ctx);
    }

    // Phase 27: restore EMC_CFG / EMC_FDPD_CTRL_CMD_NO_RAMP / EMC_SEL_DPD_CTRL.
    trace!("phase 27: restore emc cfg");
    phases::assembly_write(ctx, emc_off::EMC_CFG, dst.emc_cfg_2);
    ctx.emc
        .write32(crate::regs::emc::offset::EMC_FDPD_CTRL_CMD_NO_RAMP, dst.emc_fdpd_ctrl_cmd_no_ramp);
    phases::assembly_write(ctx, emc_off::EMC_SEL_DPD_CTRL, dst.emc_sel_dpd_ctrl);

    // Phase 28 (training only, LPDDR4): clear TRAINING_DVFS.
    if training {
        trace!("phase 28: clear training dvfs");
        ctx.emc.write32(emc_off::EMC_TR_DVFS, 0);
    }

    // Phase 29: power-fix workaround.
    trace!("phase 29: power-fix workaround");
    phases::power_fix_workaround(ctx, dst);

    // Phase 30: re-enable autocal, restore FSP, snapshot trained clock-tree.
    trace!("phase 30: re-enable autocal");
    let autocal = ctx.emc.read32(emc_off::EMC_AUTO_CAL_CONFIG);
    ctx.emc.write32(emc_off::EMC_AUTO_CAL_CONFIG, autocal | 1);
    if training {
        ctx.fsp_for_next_freq ^= 1;
    }
    dst.trained_dram_clktree = dst.current_dram_clktree;

    debug!("freq_change: done, result {:?}", trigger_result);
    trigger_result
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
    fn plain_switch_reports_timeout_without_a_preset_clkchange_complete_bit() {
        let set = data::table_set_by_index(8).unwrap();
        let src = set[0];
        let mut dst = set[1];

        let mut emc = MockBus::new();
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        let result = freq_change(&mut c, &src, &mut dst, 0, dst.clk_src_emc);
        assert!(matches!(result, Err(crate::MtcError::UpdateTimeout(_))));
    }

    #[test]
    fn plain_switch_completes_when_clkchange_complete_bit_is_observed() {
        let set = data::table_set_by_index(8).unwrap();
        let src = set[0];
        let mut dst = set[1];

        let mut emc = MockBus::new();
        emc.preset(emc_off::EMC_INTSTATUS, 1 << 4);
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        let result = freq_change(&mut c, &src, &mut dst, 0, dst.clk_src_emc);
        assert!(result.is_ok());
        assert_eq!(dst.trained_dram_clktree, dst.current_dram_clktree);
    }

    #[test]
    fn training_pass_toggles_fsp_for_next_freq_back_to_its_starting_state() {
        let set = data::table_set_by_index(8).unwrap();
        let src = set[0];
        let mut dst = set[1];

        let mut emc = MockBus::new();
        emc.preset(emc_off::EMC_INTSTATUS, 1 << 4);
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        let before = c.fsp_for_next_freq;
        let _ = freq_change(&mut c, &src, &mut dst, training_mask::CA_PASS, dst.clk_src_emc);
        assert_eq!(c.fsp_for_next_freq, before);
    }

    #[test]
    fn training_pass_harvests_vref_results_with_mod_reg_sign_applied() {
        let set = data::table_set_by_index(8).unwrap();
        let src = set[0];
        let mut dst = set[1];
        dst.save_restore_mod_regs[0] = 0x8000_0003; // MSB set: subtract 3.
        dst.save_restore_mod_regs[1] = 0x0000_0005; // MSB clear: add 5.

        let mut emc = MockBus::new();
        emc.preset(emc_off::EMC_INTSTATUS, 1 << 4);
        let vref_addrs = crate::table::addresses::VREF_PER_CH_REGS_ADDR;
        emc.preset(vref_addrs[0], 100);
        emc.preset(vref_addrs[1], 200);
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        let result = freq_change(&mut c, &src, &mut dst, training_mask::CA_PASS, dst.clk_src_emc);
        assert!(result.is_ok());
        assert_eq!(dst.burst_reg_per_ch.get(0), 97);
        assert_eq!(dst.burst_reg_per_ch.get(1), 205);
    }
}
