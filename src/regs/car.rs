//! CAR (Clock and Reset) register *layout*.
//!
//! Per spec.md §1, the CAR driver itself is an external collaborator
//! (`car_read(offset) -> u32` / `car_write(offset, u32)`, exposed here as
//! [`crate::external::CarRegs`]) — we only need to know the byte offsets and
//! bitfields of the handful of registers this core reads and writes through
//! that trait: `CLK_SOURCE_EMC{,_DLL,_SAFE}`, `PLLM_BASE`/`PLLMB_BASE` and
//! their `MISC2`/spread-spectrum siblings, and the `CLK_OUT_ENB_X` window.

use tock_registers::register_bitfields;

pub const CLK_SOURCE_EMC: u32 = 0x3c;
pub const CLK_SOURCE_EMC_DLL: u32 = 0x664;
pub const CLK_SOURCE_EMC_SAFE: u32 = 0x374;

pub const PLLM_BASE: u32 = 0x90;
pub const PLLM_MISC1: u32 = 0x98;
pub const PLLM_MISC2: u32 = 0x9c;
pub const PLLM_SS_CFG: u32 = 0x9e4;
pub const PLLM_SS_CTRL1: u32 = 0x9e8;
pub const PLLM_SS_CTRL2: u32 = 0x9ec;

pub const PLLMB_BASE: u32 = 0x5e8;
pub const PLLMB_MISC1: u32 = 0x5ec;
pub const PLLMB_SS_CFG: u32 = 0x5f0;
pub const PLLMB_SS_CTRL1: u32 = 0x5f4;
pub const PLLMB_SS_CTRL2: u32 = 0x5f8;

pub const CLK_OUT_ENB_X: u32 = 0x280;

register_bitfields! [u32,
    pub CLK_SOURCE_EMC_2X [
        EMC_2X_CLK_DIVISOR OFFSET(0) NUMBITS(8) [],
        EMC_2X_CLK_SRC OFFSET(29) NUMBITS(3) [
            PllmOut0  = 0b000,
            PllcOut0  = 0b001,
            PllpOut0  = 0b010,
            ClkM      = 0b011,
            PllmUd    = 0b100,
            PllmbUd   = 0b101,
            PllmbOut0 = 0b110,
            PllpUd    = 0b111,
        ],
    ],
    pub PLL_BASE [
        PLL_DIVM OFFSET(0) NUMBITS(8) [],
        PLL_DIVN OFFSET(8) NUMBITS(8) [],
        PLL_DIVP OFFSET(20) NUMBITS(3) [],
        PLL_ENABLE OFFSET(30) NUMBITS(1) [],
        PLL_LOCK OFFSET(27) NUMBITS(1) [],
    ],
    pub PLLM_MISC2_FIELDS [
        PLLM_EN_LOCKDET OFFSET(4) NUMBITS(1) [],
    ],
];
