//! External collaborators this core consumes but does not own.
//!
//! Spec.md §1 lists these as out of scope: the clock-and-reset driver, the
//! fuses driver, and the microsecond delay primitive. We model each as a
//! trait rather than free functions so the sequencer can be driven by a
//! mock in tests — the same seam rustBoot's `boards/hal` crates expose via
//! `interface::DeviceDriver` (`bsp/drivers/common.rs`), just narrowed to the
//! three operations this core actually calls.

/// Clock-and-reset register access. One instance is threaded through every
/// call in this crate instead of reaching for file-scope statics, per the
/// Design Notes' "Global mutable state" guidance.
pub trait CarRegs {
    /// Raw 32-bit read at a byte offset into the CAR aperture.
    fn car_read(&self, offset: u32) -> u32;
    /// Raw 32-bit write at a byte offset into the CAR aperture.
    fn car_write(&mut self, offset: u32, val: u32);
}

/// Fuses driver. Only the DRAM id fuse is read by this core.
pub trait FuseDriver {
    /// Returns the 5-bit fused DRAM identifier, `0x0..=0x1C` on Mariko.
    fn dram_id(&self) -> u8;
}

/// Microsecond busy-wait primitive.
pub trait MicroDelay {
    fn udelay(&self, us: u32);
}

/// Reporter for conditions this core cannot recover from (spec.md §7).
/// `report` never returns: callers treat it like a panic handler that also
/// gets to print a reason.
pub trait FatalReporter {
    fn fatal_error(&self, reason: FatalReason) -> !;
}

/// The two fatal conditions this core can hit, spelled out rather than
/// passed as a preformatted string so a host-side reporter can localize or
/// structure the message however it likes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalReason {
    /// `select_tables` found no table set for this DRAM id.
    MissingTables { dram_id: u8 },
    /// `train_dram` could not find a table whose `clk_src_emc` matches the
    /// CAR value observed at boot.
    TimingTableNotFound,
}
