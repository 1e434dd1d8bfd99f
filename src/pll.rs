//! PLL Programmer (spec.md §4.3).
//!
//! Writes `{divm, divn, divp}` into the target PLL's `_BASE` register,
//! enables it, optionally installs spread-spectrum, and busy-waits for lock.
//! Follows the `program_pllm`-style register sequencing in
//! `boards/hal/.../bsp/clocks/analog.rs`, generalized to the PLLM/PLLMB pair
//! this core alternates between.

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::InMemoryRegister;

use crate::external::{CarRegs, MicroDelay};
use crate::regs::car::{self, PLLM_MISC2_FIELDS, PLL_BASE};
use crate::table::PllConfig;

/// Lock-bit poll budget: 300 iterations at 2us each, comfortably above the
/// ~300us PLLM/PLLMB lock time this part family documents.
const LOCK_POLL_ITERATIONS: u32 = 300;
const LOCK_POLL_STEP_US: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PllVariant {
    Pllm,
    Pllmb,
}

struct PllOffsets {
    base: u32,
    misc2: u32,
    ss_cfg: u32,
    ss_ctrl1: u32,
    ss_ctrl2: u32,
}

impl PllVariant {
    fn offsets(self) -> PllOffsets {
        match self {
            PllVariant::Pllm => PllOffsets {
                base: car::PLLM_BASE,
                misc2: car::PLLM_MISC2,
                ss_cfg: car::PLLM_SS_CFG,
                ss_ctrl1: car::PLLM_SS_CTRL1,
                ss_ctrl2: car::PLLM_SS_CTRL2,
            },
            PllVariant::Pllmb => PllOffsets {
                base: car::PLLMB_BASE,
                misc2: car::PLLMB_MISC1, // PLLMB has no MISC2; lock-detect lives in MISC1 on this variant.
                ss_cfg: car::PLLMB_SS_CFG,
                ss_ctrl1: car::PLLMB_SS_CTRL1,
                ss_ctrl2: car::PLLMB_SS_CTRL2,
            },
        }
    }
}

/// Programs `variant` from `cfg` and busy-waits for its lock bit.
pub fn program_pll(car: &mut dyn CarRegs, delay: &dyn MicroDelay, variant: PllVariant, cfg: &PllConfig) {
    let offsets = variant.offsets();

    let base_reg: InMemoryRegister<u32, PLL_BASE::Register> = InMemoryRegister::new(0);
    base_reg.write(
        PLL_BASE::PLL_DIVM.val(cfg.divm)
            + PLL_BASE::PLL_DIVN.val(cfg.divn)
            + PLL_BASE::PLL_DIVP.val(cfg.divp)
            + PLL_BASE::PLL_ENABLE.val(1),
    );
    car.car_write(offsets.base, base_reg.get());

    if cfg.pll_en_ssc & 1 != 0 {
        car.car_write(offsets.ss_cfg, cfg.ss_cfg);
        car.car_write(offsets.ss_ctrl1, cfg.ss_ctrl1);
        car.car_write(offsets.ss_ctrl2, cfg.ss_ctrl2);
    }

    if variant == PllVariant::Pllm {
        let misc2_reg: InMemoryRegister<u32, PLLM_MISC2_FIELDS::Register> =
            InMemoryRegister::new(car.car_read(offsets.misc2));
        misc2_reg.modify(PLLM_MISC2_FIELDS::PLLM_EN_LOCKDET.val(1));
        car.car_write(offsets.misc2, misc2_reg.get());
    }

    for _ in 0..LOCK_POLL_ITERATIONS {
        let base_val: InMemoryRegister<u32, PLL_BASE::Register> =
            InMemoryRegister::new(car.car_read(offsets.base));
        if base_val.is_set(PLL_BASE::PLL_LOCK) {
            return;
        }
        #[cfg(target_arch = "aarch64")]
        cortex_a::asm::nop();
        delay.udelay(LOCK_POLL_STEP_US);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockCar, MockDelay};

    #[test]
    fn program_pllm_writes_dividers_and_sets_lockdet() {
        let mut car = MockCar::new();
        let delay = MockDelay::default();
        car.preset(car::PLLM_BASE, 1 << 27); // pre-locked so the poll exits immediately.

        let cfg = PllConfig {
            divm: 1,
            divn: 66,
            divp: 0,
            pll_en_ssc: 0,
            ss_cfg: 0,
            ss_ctrl1: 0,
            ss_ctrl2: 0,
        };
        program_pll(&mut car, &delay, PllVariant::Pllm, &cfg);

        let base_val: InMemoryRegister<u32, PLL_BASE::Register> =
            InMemoryRegister::new(car.car_read(car::PLLM_BASE));
        assert_eq!(base_val.read(PLL_BASE::PLL_DIVN), 66);
        assert!(base_val.is_set(PLL_BASE::PLL_ENABLE));

        let misc2: InMemoryRegister<u32, PLLM_MISC2_FIELDS::Register> =
            InMemoryRegister::new(car.car_read(car::PLLM_MISC2));
        assert!(misc2.is_set(PLLM_MISC2_FIELDS::PLLM_EN_LOCKDET));
    }

    #[test]
    fn spread_spectrum_config_is_installed_only_when_enabled() {
        let mut car = MockCar::new();
        let delay = MockDelay::default();
        car.preset(car::PLLMB_BASE, 1 << 27);

        let cfg = PllConfig {
            divm: 1,
            divn: 132,
            divp: 0,
            pll_en_ssc: 1,
            ss_cfg: 0xaa,
            ss_ctrl1: 0xbb,
            ss_ctrl2: 0xcc,
        };
        program_pll(&mut car, &delay, PllVariant::Pllmb, &cfg);

        assert_eq!(car.car_read(car::PLLMB_SS_CFG), 0xaa);
        assert_eq!(car.car_read(car::PLLMB_SS_CTRL1), 0xbb);
        assert_eq!(car.car_read(car::PLLMB_SS_CTRL2), 0xcc);
    }
}
