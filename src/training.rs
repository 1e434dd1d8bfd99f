//! Training Orchestrator (spec.md §4.5).
//!
//! `train_freq` is the layer above [`crate::freqchange`]: it loads the RAM
//! training pattern once per boot, decomposes a table's `needs_training`
//! bitmap into the CA and RDWR sub-passes, drives one `freq_change` per
//! sub-pass, and (optionally) performs the real DVFS switch at the end.
//! Grounded on `train_freq` in `mtc_b01.c`.

use crate::external::MicroDelay;
use crate::freqchange;
use crate::pattern;
use crate::regs::emc::offset as emc_off;
use crate::regs::mc::offset as mc_off;
use crate::regs::Bus;
use crate::state::MtcContext;
use crate::table::{training_mask as mask, TimingTable};
use crate::Result;
use log::debug;

/// Reads `MC_EMEM_ADR_CFG` bit 0 (`EMEM_NUMDEV`): 0 means a single DRAM
/// device/rank is populated, 1 means two. Matches the `dram_dev_num`
/// readback in `mtc_b01.c`'s `train_freq` (lines 3956-3965).
fn dram_dev_num(ctx: &mut MtcContext) -> u32 {
    ctx.mc.read32(mc_off::MC_EMEM_ADR_CFG) & 1
}

const CFG_SWAP_ACTIVE: u32 = 0b01 << 26;
const CFG_SWAP_ASSEMBLY: u32 = 0b10 << 26;

/// Step 1: load `dst`'s RAM training pattern into the EMC's pattern RAM, once
/// per boot (`ctx.wrote_training_pattern` latches this).
fn load_training_pattern(ctx: &mut MtcContext, dst: &TimingTable) {
    if ctx.wrote_training_pattern {
        return;
    }

    let pattern = pattern::pattern_for_index(dst.training_pattern);
    for i in 0..pattern::PATTERN_LEN {
        ctx.emc.write32(emc_off::EMC_TRAINING_PATRAM_DQ, pattern.dq[i]);
        ctx.emc.write32(emc_off::EMC_TRAINING_PATRAM_DMI, pattern.dmi[i] as u32);
        ctx.emc
            .write32(emc_off::EMC_TRAINING_PATRAM_CTRL, 0x8000_0000 | i as u32);
    }

    ctx.emc.write32(
        emc_off::EMC_TRAINING_QUSE_CTRL_MISC,
        (dst.emc_training_read_ctrl_misc & 0xffff_0000) | 0x1000,
    );

    ctx.wrote_training_pattern = true;
}

/// Step 3's post-pass EMC recovery: restore the DLL and autocal state the
/// way the original does between training sub-passes, since each sub-pass's
/// `freq_change` leaves the DLL disabled for training.
fn recover_after_pass(ctx: &mut MtcContext, dst: &TimingTable) {
    let dbg = ctx.emc.read32(emc_off::EMC_DBG);
    ctx.emc.write32(emc_off::EMC_DBG, (dbg & !0x1) | CFG_SWAP_ASSEMBLY);
    freqchange::emc_timing_update(ctx);
    let dbg = ctx.emc.read32(emc_off::EMC_DBG);
    ctx.emc.write32(emc_off::EMC_DBG, (dbg & !0x1) | CFG_SWAP_ACTIVE);

    let dll_cfg_1 = ctx.emc.read32(emc_off::EMC_PMACRO_DLL_CFG_1);
    ctx.emc
        .write32(emc_off::EMC_PMACRO_DLL_CFG_1, dll_cfg_1 & !0xff);

    let dig_dll = ctx.emc.read32(emc_off::EMC_CFG_DIG_DLL);
    ctx.emc.write32(emc_off::EMC_CFG_DIG_DLL, dig_dll & !1);
    freqchange::emc_timing_update(ctx);

    let dig_dll = ctx.emc.read32(emc_off::EMC_CFG_DIG_DLL);
    let want_dll = dst.emc_cfg_dig_dll & 1 != 0;
    ctx.emc.write32(
        emc_off::EMC_CFG_DIG_DLL,
        if want_dll { dig_dll | 1 } else { dig_dll & !1 },
    );

    if want_dll {
        for _ in 0..1000 {
            if ctx.emc.read32(emc_off::EMC_DIG_DLL_STATUS) & (1 << 15) != 0 {
                break;
            }
            ctx.delay.udelay(1);
        }
    }

    freqchange::emc_timing_update(ctx);
    let autocal = ctx.emc.read32(emc_off::EMC_AUTO_CAL_CONFIG);
    ctx.emc.write32(emc_off::EMC_AUTO_CAL_CONFIG, autocal | 1);
}

/// Splits `needs_training` into the CA (and, on a two-rank table, CA second-
/// rank repeat) and RDWR sub-passes, in the order the original runs them.
/// `dram_dev_num` gates the second-rank repeat: it only runs when the table
/// describes two populated ranks.
fn sub_passes(needs_training: u32, dram_dev_num: u32) -> [Option<u32>; 3] {
    let ca = needs_training & mask::CA_PASS;
    let rdwr = needs_training & mask::RDWR_PASS;
    let two_rank = dram_dev_num & 1 != 0;

    [
        if ca != 0 { Some(ca) } else { None },
        if ca != 0 && two_rank { Some(ca | mask::SECOND_RANK) } else { None },
        if rdwr != 0 { Some(rdwr) } else { None },
    ]
}

/// Entry: `train_freq(src, dst, update_clk, target_clk_src)`.
pub fn train_freq(
    ctx: &mut MtcContext,
    src: &TimingTable,
    dst: &mut TimingTable,
    update_clk: bool,
    target_clk_src: u32,
) -> Result<()> {
    debug!(
        "train_freq: {} -> {} khz, needs_training {:#x}, update_clk {}",
        src.rate_khz, dst.rate_khz, dst.needs_training, update_clk
    );
    load_training_pattern(ctx, dst);

    if dst.needs_training != 0 && !dst.trained {
        let dev_num = dram_dev_num(ctx);
        for pass in sub_passes(dst.needs_training, dev_num).into_iter().flatten() {
            freqchange::freq_change(ctx, src, dst, pass, target_clk_src)?;
            recover_after_pass(ctx, dst);
        }
        dst.trained = true;
    }

    if update_clk {
        freqchange::freq_change(ctx, src, dst, 0, target_clk_src)?;
    }

    debug!("train_freq: done");
    Ok(())
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
    fn sub_passes_skips_ca_when_not_needed() {
        let passes = sub_passes(mask::RDWR_PASS, 1);
        assert_eq!(passes, [None, None, Some(mask::RDWR_PASS)]);
    }

    #[test]
    fn sub_passes_includes_second_rank_repeat_when_ca_is_needed_and_two_ranks_populated() {
        let passes = sub_passes(mask::CA_PASS, 1);
        assert_eq!(
            passes,
            [Some(mask::CA_PASS), Some(mask::CA_PASS | mask::SECOND_RANK), None]
        );
    }

    #[test]
    fn sub_passes_skips_second_rank_repeat_on_a_single_rank_table() {
        let passes = sub_passes(mask::CA_PASS, 0);
        assert_eq!(passes, [Some(mask::CA_PASS), None, None]);
    }

    #[test]
    fn load_training_pattern_latches_after_first_call() {
        let mut emc = MockBus::new();
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        let set = data::table_set_by_index(8).unwrap();
        load_training_pattern(&mut c, &set[0]);
        assert!(c.wrote_training_pattern);
        let writes_after_first = c.emc.read32(emc_off::EMC_TRAINING_PATRAM_CTRL);

        c.emc.write32(emc_off::EMC_TRAINING_PATRAM_CTRL, 0);
        load_training_pattern(&mut c, &set[0]);
        assert_eq!(c.emc.read32(emc_off::EMC_TRAINING_PATRAM_CTRL), 0);
        let _ = writes_after_first;
    }

    #[test]
    fn train_freq_marks_trained_and_switches_clock_when_requested() {
        let set = data::table_set_by_index(8).unwrap();
        let src = set[0];
        let mut dst = set[1];
        dst.needs_training = 0;

        let mut emc = MockBus::new();
        emc.preset(emc_off::EMC_INTSTATUS, 1 << 4);
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        let result = train_freq(&mut c, &src, &mut dst, true, dst.clk_src_emc);
        assert!(result.is_ok());
    }
}
