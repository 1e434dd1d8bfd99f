//! Process-wide state (spec.md §3.5) and the context struct it is threaded
//! through.
//!
//! Five variables are sticky across the whole boot: which table is active,
//! which PLL/FSP bank is next in line, whether the pattern RAM has been
//! loaded, and the periodic-compensation scratch. The Design Notes call for
//! "a context struct threaded through the APIs rather than file-scope
//! statics" — `MtcContext` below bundles that state together with the
//! external-collaborator trait objects every phase needs, the same way
//! rustBoot's board bring-up code threads a `&mut Bsp` through `DriverManager`
//! calls instead of reaching for globals.

use crate::external::{CarRegs, FatalReporter, FuseDriver, MicroDelay};
use crate::regs::Bus;

/// Scratch retained across `apply_periodic_compensation_trimmer` calls: one
/// 9-entry intermediate array per (rank, byte) sub-unit, 16 sub-units wide —
/// `periodic_timmer_compensation_intermediates[9×0x10]` in spec.md §3.5.
pub type PeriodicScratch = [[i32; 9]; 0x10];

/// The five process-wide variables from spec.md §3.5, plus the external
/// collaborators every phase needs. One instance exists per boot; nothing in
/// this crate reaches for file-scope statics.
pub struct MtcContext<'a> {
    pub emc: &'a mut dyn Bus,
    pub mc: &'a mut dyn Bus,
    pub car: &'a mut dyn CarRegs,
    pub fuse: &'a dyn FuseDriver,
    pub delay: &'a dyn MicroDelay,
    pub fatal: &'a dyn FatalReporter,

    /// Index of the currently-programmed timing table entry.
    pub active_timing_table_idx: usize,
    /// Toggles between PLLM and PLLMB so the next switch reprograms the idle
    /// PLL.
    pub next_pll: bool,
    /// Alternates 0/1 each `freq_change`; selects which DRAM FSP register
    /// bank receives the new MR values.
    pub fsp_for_next_freq: u8,
    /// Guard so the 256-entry pattern RAM is loaded only once per boot.
    pub wrote_training_pattern: bool,
    /// Scratch used by the periodic-compensation trimmer.
    pub periodic_timmer_compensation_intermediates: PeriodicScratch,
}

impl<'a> MtcContext<'a> {
    pub fn new(
        emc: &'a mut dyn Bus,
        mc: &'a mut dyn Bus,
        car: &'a mut dyn CarRegs,
        fuse: &'a dyn FuseDriver,
        delay: &'a dyn MicroDelay,
        fatal: &'a dyn FatalReporter,
    ) -> Self {
        Self {
            emc,
            mc,
            car,
            fuse,
            delay,
            fatal,
            active_timing_table_idx: 0,
            next_pll: false,
            fsp_for_next_freq: 0,
            wrote_training_pattern: false,
            periodic_timmer_compensation_intermediates: [[0; 9]; 0x10],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBus, MockCar, MockDelay, MockFuse, PanicReporter};

    #[test]
    fn new_context_starts_at_the_documented_defaults() {
        let mut emc = MockBus::new();
        let mut mc = MockBus::new();
        let mut car = MockCar::new();
        let fuse = MockFuse(0x8);
        let delay = MockDelay::default();
        let fatal = PanicReporter;

        let ctx = MtcContext::new(&mut emc, &mut mc, &mut car, &fuse, &delay, &fatal);

        assert_eq!(ctx.active_timing_table_idx, 0);
        assert!(!ctx.next_pll);
        assert_eq!(ctx.fsp_for_next_freq, 0);
        assert!(!ctx.wrote_training_pattern);
        assert!(ctx
            .periodic_timmer_compensation_intermediates
            .iter()
            .all(|row| row.iter().all(|&v| v == 0)));
    }
}
