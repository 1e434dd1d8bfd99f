//! Phase bodies for the FreqChange sequencer (spec.md §4.4), split out of
//! [`super::freq_change`] so the 30-step state machine itself reads as a
//! linear list of calls, the same separation `mtc_b01.c` draws between
//! `freq_change` and its static helpers (`dll_prelock`, `dvfs_power_ramp_up`,
//! `dvfs_power_ramp_down`, ...).

use crate::ccfifo;
use crate::external::CarRegs;
use crate::regs::emc::offset as emc_off;
use crate::regs::mc::offset as mc_off;
use crate::regs::Bus;
use crate::state::MtcContext;
use crate::table::TimingTable;
use log::error;

/// `EMC_DBG.CFG_SWAP` values (active vs. assembly-only shadow writes).
const CFG_SWAP_ACTIVE: u32 = 0b01 << 26;
const CFG_SWAP_ASSEMBLY: u32 = 0b10 << 26;
const WRITE_MUX_ASSEMBLY: u32 = 1;

/// Performs a write through the "assembly" shadow copy, the pattern every
/// quiesce/restore phase uses to touch a shadowed register without it taking
/// effect until the next timing update: flip `EMC_DBG` to assembly, write,
/// flip back.
pub fn assembly_write(ctx: &mut MtcContext, addr: u32, value: u32) {
    let restore = ctx.emc.read32(emc_off::EMC_DBG);
    ctx.emc.write32(emc_off::EMC_DBG, restore | WRITE_MUX_ASSEMBLY | CFG_SWAP_ASSEMBLY);
    ctx.emc.write32(addr, value);
    ctx.emc.write32(emc_off::EMC_DBG, (restore & !WRITE_MUX_ASSEMBLY) | CFG_SWAP_ACTIVE);
}

/// Issues a timing update and waits for `EMC_STATUS.TIMING_UPDATE_STALLED`
/// to clear.
pub fn emc_timing_update(ctx: &mut MtcContext) {
    ctx.emc.write32(emc_off::EMC_STATUS, 0);
    for _ in 0..1000 {
        if ctx.emc.read32(emc_off::EMC_STATUS) & 1 == 0 {
            return;
        }
        ctx.delay.udelay(1);
    }
}

/// Phase 1: quiesce DLL, autocal, dynamic self-refresh / clock-stop-PD /
/// clock-stop-SR / select-DPD, via the assembly-write shadow path.
pub fn quiesce(ctx: &mut MtcContext) {
    let dig_dll = ctx.emc.read32(emc_off::EMC_CFG_DIG_DLL);
    ctx.emc.write32(emc_off::EMC_CFG_DIG_DLL, dig_dll & !1);
    emc_timing_update(ctx);
    ctx.delay.udelay(2);

    let autocal = ctx.emc.read32(emc_off::EMC_AUTO_CAL_CONFIG);
    ctx.emc.write32(emc_off::EMC_AUTO_CAL_CONFIG, (autocal & !1) | 0x600);

    let cfg = ctx.emc.read32(emc_off::EMC_CFG);
    assembly_write(ctx, emc_off::EMC_CFG, cfg & !(1 << 28));
    let sel_dpd = ctx.emc.read32(emc_off::EMC_SEL_DPD_CTRL);
    assembly_write(ctx, emc_off::EMC_SEL_DPD_CTRL, sel_dpd & !1);
    emc_timing_update(ctx);
}

/// Phase 3: DLL prelock. `training` disables the DLL again after lock since
/// training must run with the DLL off.
pub fn dll_prelock(ctx: &mut MtcContext, dst: &TimingTable, training: bool) {
    if dst.emc_cfg_dig_dll & 1 == 0 {
        let dig_dll = ctx.emc.read32(emc_off::EMC_CFG_DIG_DLL);
        ctx.emc.write32(emc_off::EMC_CFG_DIG_DLL, dig_dll & !1);
        return;
    }

    assembly_write(ctx, emc_off::EMC_PMACRO_DLL_CFG_0, dst.pllm.divn);
    ctx.emc.write32(emc_off::EMC_DLL_CLK_SRC, dst.clk_src_emc);
    let dig_dll = ctx.emc.read32(emc_off::EMC_CFG_DIG_DLL);
    ctx.emc.write32(emc_off::EMC_CFG_DIG_DLL, dig_dll | 1);

    for _ in 0..1000 {
        if ctx.emc.read32(emc_off::EMC_DIG_DLL_STATUS) & (1 << 15) != 0 {
            break;
        }
        ctx.delay.udelay(1);
    }

    if training {
        let dig_dll = ctx.emc.read32(emc_off::EMC_CFG_DIG_DLL);
        ctx.emc.write32(emc_off::EMC_CFG_DIG_DLL, dig_dll & !1);
    }
}

/// Phase 5: ZQCAL timing constants, in destination-clock cycles. This crate
/// is LPDDR4-only (spec.md §1), so only the fixed 1us/30ns formula applies;
/// the LPDDR2/LPDDR3/DDR3 variants named in spec.md step 5 have no counterpart
/// here.
pub fn zqcal_wait_times(dst_rate_khz: u32) -> (u32, u32) {
    let zq_wait_long = crate::util::div_o3(dst_rate_khz.saturating_mul(1000), 1_000_000) + 1;
    let zq_wait_short = crate::util::div_o3(dst_rate_khz.saturating_mul(30), 1_000_000) + 1;
    (zq_wait_long, zq_wait_short)
}

/// Phase 6: force both CKE pins for a two-rank CA/CA_VREF training pass.
pub fn training_cke_gate(ctx: &mut MtcContext, training_mask: u32) {
    use crate::table::training_mask as mask;

    if training_mask & (mask::CA | mask::CA_VREF) != 0 && training_mask & mask::SECOND_RANK != 0 {
        let pin = ctx.emc.read32(emc_off::EMC_PIN);
        ctx.emc.write32(emc_off::EMC_PIN, pin | 0b11);
    }
}

/// Phase 4: stage the 8 autocal config registers and rearm.
pub fn stage_autocal(ctx: &mut MtcContext, dst: &TimingTable) {
    let regs = [
        emc_off::EMC_AUTO_CAL_CONFIG2,
        emc_off::EMC_AUTO_CAL_CONFIG3,
        emc_off::EMC_AUTO_CAL_CONFIG4,
        emc_off::EMC_AUTO_CAL_CONFIG5,
        emc_off::EMC_AUTO_CAL_CONFIG6,
        emc_off::EMC_AUTO_CAL_CONFIG7,
        emc_off::EMC_AUTO_CAL_CONFIG8,
    ];
    for (reg, value) in regs.iter().zip(dst.emc_auto_cal_config[1..8].iter()) {
        ctx.emc.write32(*reg, *value);
    }
    ctx.emc
        .write32(emc_off::EMC_AUTO_CAL_CONFIG, dst.emc_auto_cal_config[0] | 1 | 0x600);
}

/// Phase 8: write the shadow burst-register bank, selecting CA-train,
/// rdwr-train, or plain burst values per `training_mask`, with the listed
/// per-register patches applied afterward.
pub fn write_burst_regs(ctx: &mut MtcContext, dst: &TimingTable, addrs: &[u32], training_mask: u32) {
    use crate::table::training_mask as mask;

    for (i, &addr) in addrs.iter().enumerate() {
        let value = if training_mask & mask::CA_PASS != 0 {
            dst.shadow_regs_ca_train.get(i)
        } else if training_mask & mask::RDWR_PASS != 0 {
            dst.shadow_regs_rdwr_train.get(i)
        } else {
            dst.burst_regs.get(i)
        };

        let patched = match addr {
            a if a == emc_off::EMC_CFG => value & 0x0fff_ffff,
            a if a == emc_off::EMC_PMACRO_BRICK_CTRL_RFU1 => value & !0xF800_F800,
            a if a == emc_off::EMC_PMACRO_CMD_PAD_TX_CTRL => value | (1 << 26),
            a if a == emc_off::EMC_PMACRO_AUTOCAL_CFG_COMMON => value | (1 << 16),
            a if a == emc_off::EMC_TRAINING_CTRL => {
                if training_mask & mask::SECOND_RANK != 0 {
                    value | (1 << 14)
                } else {
                    value
                }
            }
            _ => value,
        };
        ctx.emc.write32(addr, patched);
    }
}

/// Phases 9-10: per-channel burst/vref/training-mod registers and the
/// per-channel + global trimmers, filtered by `EMC_FBIO_CFG7` channel-enable
/// bits.
pub fn write_per_channel_and_trim_regs(
    ctx: &mut MtcContext,
    dst: &TimingTable,
    per_ch_addrs: &[u32],
    vref_addrs: &[u32],
    training_mod_addrs: &[u32],
    trim_addrs: &[u32],
    training_mask: u32,
    compensate_trimmer_applicable: bool,
) {
    let fbio_cfg7 = ctx.emc.read32(emc_off::EMC_FBIO_CFG7);
    let channel_enabled = |idx: usize| -> bool {
        if idx % 2 == 0 {
            fbio_cfg7 & (1 << 2) != 0
        } else {
            fbio_cfg7 & (1 << 3) != 0
        }
    };

    for (i, &addr) in per_ch_addrs.iter().enumerate() {
        if channel_enabled(i) {
            ctx.emc.write32(addr, dst.burst_reg_per_ch.get(i));
        }
    }
    for (i, &addr) in vref_addrs.iter().enumerate() {
        if channel_enabled(i) {
            ctx.emc.write32(addr, dst.vref_perch_regs.get(i));
        }
    }

    if training_mask != 0 {
        for (i, &addr) in training_mod_addrs.iter().enumerate() {
            if channel_enabled(i) {
                ctx.emc.write32(addr, dst.training_mod_regs.get(i));
            }
        }
    }

    for (i, &addr) in trim_addrs.iter().enumerate() {
        let base = dst.trim_perch_regs.get(i % dst.trim_perch_regs.len());
        let value = if compensate_trimmer_applicable {
            crate::periodic::apply_periodic_compensation_trimmer(
                ctx,
                dst,
                i,
                crate::periodic::TrimField::CoarseShift,
                base,
            )
        } else {
            base
        };
        ctx.emc.write32(addr, value);
    }

    // First 4 entries are the long-DQS IB coarse shift registers; the
    // remaining 12 are the short-DQ OB DDLL words, 3 per (rank, byte) pair.
    for (i, &addr) in crate::table::addresses::TRIM_REGS_ADDR.iter().enumerate() {
        let base = dst.trim_regs.get(i);
        let field = if i < 4 {
            crate::periodic::TrimField::CoarseShift
        } else {
            crate::periodic::TrimField::ShortDqWord((i - 4) % 3)
        };
        let value = if compensate_trimmer_applicable {
            crate::periodic::apply_periodic_compensation_trimmer(ctx, dst, 8 + i, field, base)
        } else {
            base
        };
        ctx.emc.write32(addr, value);
    }
}

/// Phase 12: the clock-change barrier enqueued on CCFIFO.
pub fn clock_change_barrier(ctx: &mut MtcContext, clkchange_delay: u32) {
    ccfifo::push(ctx.emc, emc_off::EMC_INTSTATUS, 1, 0);
    ccfifo::push(ctx.emc, emc_off::EMC_INTSTATUS, 0, clkchange_delay as u16);
}

/// Phase 29: power-fix workaround — reset internal PM state via the
/// PMACRO_CFG_PM_GLOBAL_0/TRAINING_CTRL sequence, then wiggle the
/// XM2COMPPADCTRL upper nibble when `misc_cfg_1` calls for it.
pub fn power_fix_workaround(ctx: &mut MtcContext, dst: &TimingTable) {
    let pm_global = ctx.emc.read32(emc_off::EMC_PMACRO_CFG_PM_GLOBAL_0);
    ctx.emc
        .write32(emc_off::EMC_PMACRO_CFG_PM_GLOBAL_0, pm_global | (1 << 16));
    ctx.emc.write32(emc_off::EMC_PMACRO_TRAINING_CTRL_0, 1);
    ctx.emc.write32(emc_off::EMC_PMACRO_TRAINING_CTRL_1, 1);
    ctx.emc.write32(emc_off::EMC_PMACRO_TRAINING_CTRL_0, 0);
    ctx.emc.write32(emc_off::EMC_PMACRO_TRAINING_CTRL_1, 0);
    ctx.emc.write32(emc_off::EMC_PMACRO_CFG_PM_GLOBAL_0, pm_global);

    if dst.misc_cfg_1 & 0x20 == 0 {
        let comppadctrl = ctx.emc.read32(emc_off::EMC_XM2COMPPADCTRL);
        ctx.emc
            .write32(emc_off::EMC_XM2COMPPADCTRL, comppadctrl ^ 0xf000_0000);
    }
}

/// Phase 23: trigger the clock change itself and wait for
/// `EMC_INTSTATUS.CLKCHANGE_COMPLETE`. Returns `Err` on timeout (spec.md §7:
/// silent, non-escalating).
pub fn trigger_clock_change(
    ctx: &mut MtcContext,
    dst_clk_src: u32,
    training: bool,
) -> crate::Result<()> {
    if training {
        let current = ctx.car.car_read(crate::regs::car::CLK_SOURCE_EMC);
        ctx.car.car_write(crate::regs::car::CLK_SOURCE_EMC_SAFE, current);
        ctx.emc.write32(emc_off::EMC_CFG_DIG_DLL, 0x08);
    }

    // Barrier reads mirrored from the original's `car_read`/`car_read`
    // pattern before the clock-source word actually lands.
    let _ = ctx.mc.read32(mc_off::MC_EMEM_ADR_CFG);
    let _ = ctx.emc.read32(emc_off::EMC_INTSTATUS);

    ctx.car.car_write(crate::regs::car::CLK_SOURCE_EMC, dst_clk_src);

    let channel_mask = {
        let fbio_cfg7 = ctx.emc.read32(emc_off::EMC_FBIO_CFG7);
        ((fbio_cfg7 & (1 << 2) != 0) as u8) | (((fbio_cfg7 & (1 << 3) != 0) as u8) << 1)
    };
    let channel_mask = if channel_mask == 0 { 1 } else { channel_mask };

    for _ in 0..10_000 {
        if ctx.emc.read32(emc_off::EMC_INTSTATUS) & (1 << 4) != 0 {
            return Ok(());
        }
        ctx.delay.udelay(1);
    }
    error!("clkchange_complete not observed, channel mask {:#x}", channel_mask);
    #[cfg(feature = "defmt-logging")]
    defmt::error!("clkchange_complete not observed, channel mask {:#x}", channel_mask);
    Err(crate::MtcError::UpdateTimeout(channel_mask))
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn zqcal_wait_times_scale_with_destination_rate() {
        let (long_1600, short_1600) = zqcal_wait_times(1_600_000);
        let (long_204, short_204) = zqcal_wait_times(204_000);
        assert!(long_1600 > long_204);
        assert!(short_1600 >= 1);
        assert!(short_204 >= 1);
    }

    #[test]
    fn training_cke_gate_only_fires_for_two_rank_ca_training() {
        use crate::table::training_mask as mask;

        let mut emc = MockBus::new();
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        training_cke_gate(&mut c, mask::CA_PASS);
        assert_eq!(c.emc.read32(emc_off::EMC_PIN), 0);

        training_cke_gate(&mut c, mask::CA_PASS | mask::SECOND_RANK);
        assert_eq!(c.emc.read32(emc_off::EMC_PIN), 0b11);
    }

    #[test]
    fn power_fix_workaround_restores_pm_global_and_wiggles_comppadctrl() {
        let set = crate::table::data::table_set_by_index(8).unwrap();
        let mut dst = set[1];
        dst.misc_cfg_1 = 0;

        let mut emc = MockBus::new();
        emc.preset(emc_off::EMC_PMACRO_CFG_PM_GLOBAL_0, 0x1234);
        emc.preset(emc_off::EMC_XM2COMPPADCTRL, 0x0000_0001);
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        power_fix_workaround(&mut c, &dst);
        assert_eq!(c.emc.read32(emc_off::EMC_PMACRO_CFG_PM_GLOBAL_0), 0x1234);
        assert_eq!(c.emc.read32(emc_off::EMC_XM2COMPPADCTRL), 0xf000_0001);
    }
}
