//! DVFS Entry Points (spec.md §4.8) — the public surface of this crate.
//!
//! [`train_dram`] is what the surrounding bootloader calls once, early in
//! boot: it resolves the fused DRAM id to a table set, confirms DRAM is
//! still sitting at the bootstrap rate, trains every intermediate operating
//! point, then switches to the fastest one. [`dvfs`] is the per-table-pair
//! primitive it's built from, also usable directly by a caller that wants a
//! single switch or training pass. Grounded on `dvfs`/`train_dram_mariko` in
//! `mtc_b01.c`.

use crate::clocksource;
use crate::external::{CarRegs, FatalReason, FatalReporter, FuseDriver};
use crate::freqchange;
use crate::regs::car;
use crate::state::MtcContext;
use crate::table::selector;
use crate::table::TimingTable;
use crate::{MtcError, Result};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DvfsMode {
    /// Switch DRAM to `to`'s rate without training (it's already trained).
    Switch,
    /// Train `to` at its rate, then switch back to `from`.
    Train,
    /// Train `to`, then leave DRAM running at `to`'s rate.
    TrainSwitch,
}

/// Entry: `dvfs(from, to, mode)`.
pub fn dvfs(ctx: &mut MtcContext, from: &TimingTable, to: &mut TimingTable, mode: DvfsMode) -> Result<()> {
    debug!("dvfs: {} -> {} khz, mode {:?}", from.rate_khz, to.rate_khz, mode);
    let (planned_clk_src, reprogrammed) = clocksource::plan_clock_source(ctx, from, to);

    let result = match mode {
        DvfsMode::Switch => freqchange::freq_change(ctx, from, to, 0, planned_clk_src),
        DvfsMode::Train => {
            let result = crate::training::train_freq(ctx, from, to, false, planned_clk_src);
            // `train_freq` with `update_clk == false` switches back to `from`
            // at the end, leaving DRAM on the PLL `from` actually runs on; if
            // planning the forward switch reprogrammed a PLL, `next_pll` now
            // points at the wrong one for the next caller, so flip it back.
            if reprogrammed {
                ctx.next_pll = !ctx.next_pll;
            }
            result
        }
        DvfsMode::TrainSwitch => crate::training::train_freq(ctx, from, to, true, planned_clk_src),
    };
    debug!("dvfs: done, result {:?}", result);
    result
}

/// Entry: `train_dram()`, the bootloader's one call into this crate.
///
/// Resolves `dram_id` to its three-entry table set (boot/mid/max), confirms
/// DRAM is still at the boot rate (a warm boot or a retry past this point
/// isn't supported — spec.md §4.8 step 3 treats any other observed rate as
/// "already trained" and returns immediately), trains every table strictly
/// between boot and max, then performs the final switch to max.
pub fn train_dram(ctx: &mut MtcContext) -> Result<()> {
    let dram_id = ctx.fuse.dram_id();
    debug!("train_dram: dram id {}", dram_id);
    let mut tables: [TimingTable; 3] = match selector::select_tables(dram_id) {
        Ok(set) => *set,
        Err(MtcError::TableNotFound(id)) => ctx.fatal.fatal_error(FatalReason::MissingTables { dram_id: id }),
        Err(err) => return Err(err),
    };

    let boot_clk_src = ctx.car.car_read(car::CLK_SOURCE_EMC);
    let boot_index = tables
        .iter()
        .position(|t| t.clk_src_emc == boot_clk_src)
        .unwrap_or_else(|| ctx.fatal.fatal_error(FatalReason::TimingTableNotFound));

    if boot_index != 0 {
        debug!("train_dram: boot index {} is not 0, already trained", boot_index);
        return Ok(());
    }

    let src = tables[0];
    let last = tables.len() - 1;
    for i in 1..last {
        let mut mid = tables[i];
        dvfs(ctx, &src, &mut mid, DvfsMode::Train)?;
        tables[i] = mid;
    }

    let mut top = tables[last];
    dvfs(ctx, &src, &mut top, DvfsMode::Switch)?;
    tables[last] = top;

    debug!("train_dram: done");
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
    fn dvfs_switch_invokes_a_plain_freq_change() {
        let set = data::table_set_by_index(8).unwrap();
        let from = set[0];
        let mut to = set[1];

        let mut emc = MockBus::new();
        emc.preset(crate::regs::emc::offset::EMC_INTSTATUS, 1 << 4);
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        car.preset(car::CLK_SOURCE_EMC, from.clk_src_emc);
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        let result = dvfs(&mut c, &from, &mut to, DvfsMode::Switch);
        assert!(result.is_ok());
    }

    #[test]
    fn dvfs_train_restores_next_pll_after_a_reprogramming_plan() {
        let set = data::table_set_by_index(8).unwrap();
        // mid (PLLM family) -> boot (PLLP family): same mismatch
        // `clocksource`'s own tests use to force a reprogram.
        let from = set[1];
        let mut to = set[0];

        let mut emc = MockBus::new();
        emc.preset(crate::regs::emc::offset::EMC_INTSTATUS, 1 << 4);
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        car.preset(car::CLK_SOURCE_EMC, from.clk_src_emc);
        car.preset(car::PLLM_BASE, 1 << 27);
        car.preset(car::PLLMB_BASE, 1 << 27);
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        let before = c.next_pll;
        let result = dvfs(&mut c, &from, &mut to, DvfsMode::Train);
        assert!(result.is_ok());
        assert_eq!(c.next_pll, before);
    }

    #[test]
    fn train_dram_returns_immediately_when_boot_index_is_not_zero() {
        let set = data::table_set_by_index(8).unwrap();

        let mut emc = MockBus::new();
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        car.preset(car::CLK_SOURCE_EMC, set[1].clk_src_emc);
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        assert!(train_dram(&mut c).is_ok());
        assert!(emc.trace().is_empty());
    }

    #[test]
    fn train_dram_trains_and_switches_from_a_cold_boot() {
        let set = data::table_set_by_index(8).unwrap();

        let mut emc = MockBus::new();
        emc.preset(crate::regs::emc::offset::EMC_INTSTATUS, 1 << 4);
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        car.preset(car::CLK_SOURCE_EMC, set[0].clk_src_emc);
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        assert!(train_dram(&mut c).is_ok());
    }
}
