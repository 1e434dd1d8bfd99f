//! Register-space definitions for the EMC, MC, and CAR apertures this core
//! touches (spec.md §6 "Register space (MMIO)").
//!
//! Follows the `boards/hal/.../bsp/clocks/ccm.rs` + `bsp/drivers/uart0.rs`
//! style from the teacher: `tock_registers::register_bitfields!` for the
//! handful of control-plane registers whose individual bits this core
//! decodes, plain offset constants for the hundreds of "burst" registers
//! that are only ever written wholesale from a timing-table array (their
//! schema is the address list in [`crate::table::addresses`], not an
//! individually-typed bitfield — spec.md §3.2 calls these address lists
//! "the schema"), and [`MmioDerefWrapper`] as the shared MMIO-aperture
//! abstraction (named after, and functionally identical to,
//! `MMIODerefWrapper` in `bsp/drivers/common.rs`).

pub mod car;
pub mod emc;
pub mod mc;

use core::marker::PhantomData;
use core::ops;

/// Thin wrapper turning a base address into a `Deref<Target = T>` so a
/// `register_structs!`-defined block can be addressed like a normal struct.
/// Identical in shape to the teacher's `MMIODerefWrapper`.
pub struct MmioDerefWrapper<T> {
    start_addr: usize,
    phantom: PhantomData<fn() -> T>,
}

impl<T> MmioDerefWrapper<T> {
    /// # Safety
    /// `start_addr` must be the base of a live MMIO aperture of type `T`.
    pub const unsafe fn new(start_addr: usize) -> Self {
        Self {
            start_addr,
            phantom: PhantomData,
        }
    }
}

impl<T> ops::Deref for MmioDerefWrapper<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { &*(self.start_addr as *const T) }
    }
}

/// A single MMIO aperture addressed by absolute offset, shared by the EMC
/// and MC drivers. Kept as a trait object seam (rather than the
/// `register_structs!` blocks above being used directly) so every phase of
/// the sequencer can be driven by the register-recording mock spec.md §8
/// calls for; production code backs it with real volatile reads/writes.
pub trait Bus {
    fn read32(&self, addr: u32) -> u32;
    fn write32(&mut self, addr: u32, value: u32);

    fn modify32(&mut self, addr: u32, mask: u32, value: u32) {
        let current = self.read32(addr);
        self.write32(addr, (current & !mask) | (value & mask));
    }
}

/// Physical base addresses (spec.md §6), carried over from
/// `fusee_mtc_timing_table_common.hpp`'s `MC_BASE`/`EMC_BASE`/`EMC0_BASE`/
/// `EMC1_BASE` defines.
pub mod base {
    pub const MC_BASE: usize = 0x7001_9000;
    pub const EMC_BASE: usize = 0x7001_B000;
    pub const EMC0_BASE: usize = 0x7001_E000;
    pub const EMC1_BASE: usize = 0x7001_F000;
}
