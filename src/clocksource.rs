//! Clock Source Planner (spec.md §4.2).
//!
//! Decides whether the destination table's precomputed `clk_src_emc` can be
//! used verbatim, or whether the idle PLL (PLLM/PLLMB alternate via
//! `next_pll`) needs reprogramming first. Grounded on `pll_reprogram` /
//! the `g_next_pll` switch in `freq_change` (`mtc_b01.c` lines 1281-1310,
//! 4072-4106).

use crate::external::CarRegs;
use crate::pll::{self, PllVariant};
use crate::regs::car;
use crate::state::MtcContext;
use crate::table::TimingTable;

/// `EMC_2X_CLK_SRC` field values (`regs::car::CLK_SOURCE_EMC_2X::EMC_2X_CLK_SRC`).
const SRC_PLLM: u32 = 0b000;
const SRC_PLLC: u32 = 0b001;
const SRC_PLLP: u32 = 0b010;
const SRC_CLKM: u32 = 0b011;
const SRC_PLLM_UD: u32 = 0b100;
const SRC_PLLMB_UD: u32 = 0b101;
const SRC_PLLMB: u32 = 0b110;
const SRC_PLLP_UD: u32 = 0b111;

const SRC_SHIFT: u32 = 29;

fn decode_src(word: u32) -> u32 {
    word >> SRC_SHIFT
}

fn decode_divisor(word: u32) -> u32 {
    word & 0xff
}

/// Whether the PLL driving `to` must be reprogrammed before the switch, per
/// the family-mismatch-or-ratio test in `pll_reprogram`.
fn reprogram_required(car: &dyn CarRegs, to: &TimingTable, from_rate_khz: u32, from_src_word: u32) -> bool {
    let post_div = match decode_src(from_src_word) {
        SRC_PLLM | SRC_PLLM_UD => 1.0 + ((car.car_read(car::PLLM_BASE) >> 20) & 1) as f64,
        SRC_PLLMB | SRC_PLLMB_UD => 1.0 + ((car.car_read(car::PLLMB_BASE) >> 20) & 1) as f64,
        _ => 1.0,
    };

    let src_to = decode_src(to.clk_src_emc);
    let src_from = decode_src(from_src_word);

    let divisor_to = if src_to != SRC_PLLM_UD && src_to != SRC_PLLMB_UD {
        decode_divisor(to.clk_src_emc)
    } else {
        0
    };
    let divisor_from = if src_from != SRC_PLLM_UD && src_from != SRC_PLLMB_UD {
        decode_divisor(from_src_word)
    } else {
        0
    };

    // Families other than {PLLM, PLLMB, their _UD variants} (the `| 4 != 4`
    // test collapses 0/4 and 2/6 families together) never compare ratios:
    // a family change there always forces a reprogram.
    if src_to != src_from && ((src_to | 4) != 4 || (src_from | 4) != 4) {
        return true;
    }

    let val_to = ((divisor_to & 1) as f64 * 0.5 + ((divisor_to >> 1) + 1) as f64)
        * to.rate_khz as f64
        * post_div;
    let val_from = ((divisor_from & 1) as f64 * 0.5 + ((divisor_from >> 1) + 1) as f64)
        * from_rate_khz as f64
        * post_div;
    let ratio = val_from / val_to;

    !(0.99..=1.01).contains(&ratio)
}

/// Substitutes PLLMB for PLLM (or their `_UD` variants) in `word`, keeping
/// the divisor bits untouched.
fn substitute_pllmb(word: u32) -> u32 {
    let substituted_src = match decode_src(word) {
        SRC_PLLM => SRC_PLLMB,
        SRC_PLLM_UD => SRC_PLLMB_UD,
        other => other,
    };
    (word & 0x1fff_ffff) | (substituted_src << SRC_SHIFT)
}

/// Plans and, if needed, executes the PLL reprogram for a switch from `from`
/// to `to`. Returns the `clk_src_emc` word that should actually be written
/// to `CLK_SOURCE_EMC` for this switch, and whether reprogramming was
/// required — callers that re-plan after a training pass use the latter to
/// decide whether `next_pll` needs toggling back.
pub fn plan_clock_source(ctx: &mut MtcContext, from: &TimingTable, to: &TimingTable) -> (u32, bool) {
    let from_src_word = ctx.car.car_read(car::CLK_SOURCE_EMC);
    let reprogrammed = reprogram_required(ctx.car, to, from.rate_khz, from_src_word);

    let clk_src = if reprogrammed {
        match decode_src(from_src_word) {
            SRC_PLLMB | SRC_PLLMB_UD => ctx.next_pll = false,
            SRC_PLLC | SRC_PLLP | SRC_CLKM | SRC_PLLP_UD => {}
            _ => ctx.next_pll = !ctx.next_pll,
        }

        let variant = if ctx.next_pll {
            PllVariant::Pllmb
        } else {
            PllVariant::Pllm
        };
        let cfg = if ctx.next_pll { &to.pllmb } else { &to.pllm };
        pll::program_pll(ctx.car, ctx.delay, variant, cfg);

        if ctx.next_pll {
            substitute_pllmb(to.clk_src_emc)
        } else {
            to.clk_src_emc
        }
    } else if ctx.next_pll {
        match decode_src(to.clk_src_emc) {
            SRC_PLLM | SRC_PLLM_UD => substitute_pllmb(to.clk_src_emc),
            _ => to.clk_src_emc,
        }
    } else {
        to.clk_src_emc
    };

    (clk_src, reprogrammed)
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
    fn same_family_close_ratio_skips_reprogram() {
        let set = data::table_set_by_index(8).unwrap();
        let (from, to) = (&set[0], &set[0]);

        let mut emc = MockBus::new();
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        car.preset(car::CLK_SOURCE_EMC, from.clk_src_emc);
        car.preset(car::PLLM_BASE, 1 << 27);
        let fuse = MockFuse(8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;
        let mut c = ctx(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        let (planned, reprogrammed) = plan_clock_source(&mut c, from, to);
        assert_eq!(planned, to.clk_src_emc);
        assert!(!reprogrammed);
        assert!(!c.next_pll);
    }

    #[test]
    fn differing_pll_family_triggers_reprogram_and_toggles_next_pll() {
        let set = data::table_set_by_index(8).unwrap();
        // mid (PLLM family) -> boot (PLLP family): a PLLM-sourced "from" is
        // exactly the case `freq_change`'s switch toggles `next_pll` for.
        let (from, to) = (&set[1], &set[0]);

        let mut emc = MockBus::new();
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
        let (_, reprogrammed) = plan_clock_source(&mut c, from, to);
        assert!(reprogrammed);
        assert_ne!(c.next_pll, before);
    }
}
