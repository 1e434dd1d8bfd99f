//! MC (Memory Controller) aperture: arbitration config, latency allowance,
//! and the EMEM address config register used as a barrier read in FreqChange
//! step 23.

use tock_registers::{interfaces::Readable, register_structs, registers::ReadOnly};

use super::MmioDerefWrapper;

register_structs! {
    #[allow(non_snake_case)]
    pub RegisterBlock {
        (0x000 => _reserved0),
        (0x054 => MC_EMEM_ADR_CFG: ReadOnly<u32>),
        (0x058 => @END),
    }
}

pub type Registers = MmioDerefWrapper<RegisterBlock>;

/// Plain offsets for the MC-side address arrays driven wholesale from a
/// timing table (`burst_mc_regs_arr`, `la_scale_regs_arr`). Truncated
/// subsets of `g_burst_mc_regs_addr`/`g_la_scale_regs_addr` in `mtc_b01.c`,
/// reproduced in their original order.
pub mod offset {
    pub const MC_EMEM_ADR_CFG: u32 = 0x054;

    pub const BURST_MC_REGS: [u32; 16] = [
        0x3c4, 0x3c8, 0x6d8, 0x6dc, 0x2e0, 0x2e4, 0x2e8, 0x2ec, 0x2f0, 0x2f4, 0x2f8, 0x2fc, 0x300,
        0x304, 0x308, 0x30c,
    ];

    pub const LA_SCALE_REGS: [u32; 12] = [
        0x44c, 0x350, 0x3b8, 0x354, 0x358, 0x35c, 0x360, 0x364, 0x368, 0x36c, 0x370, 0x374,
    ];
}
