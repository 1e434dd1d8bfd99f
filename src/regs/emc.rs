//! EMC (External Memory Controller) aperture.
//!
//! Offsets for the handful of control-plane registers the sequencer decodes
//! bit-by-bit; the remaining ~400 "burst" registers a timing table drives
//! (EMC_RC and friends) are addressed purely through
//! [`crate::table::addresses`] and never need a named bitfield here, per
//! spec.md §3.2.

use tock_registers::{
    interfaces::{Readable, Writeable},
    register_bitfields, register_structs,
    registers::{ReadOnly, ReadWrite, WriteOnly},
};

use super::MmioDerefWrapper;

register_bitfields! [u32,
    pub EMC_CFG_DIG_DLL [
        CFG_DLL_EN OFFSET(0) NUMBITS(1) [],
    ],
    pub EMC_AUTO_CAL_CONFIG [
        AUTO_CAL_ENABLE OFFSET(0) NUMBITS(1) [],
        AUTO_CAL_START OFFSET(9) NUMBITS(1) [],
        AUTO_CAL_STOP OFFSET(10) NUMBITS(1) [],
    ],
    /// `EMC_DBG.WRITE_MUX` — selects whether writes to "shadowed" registers
    /// land in the assembly (staging) or active copy. Toggled around every
    /// "assembly-write" per spec.md step 1 and the restore steps.
    pub EMC_DBG [
        WRITE_MUX OFFSET(0) NUMBITS(1) [
            Active = 0,
            Assembly = 1,
        ],
        CFG_SWAP OFFSET(26) NUMBITS(2) [
            Active = 0b01,
            Assembly = 0b10,
        ],
    ],
    pub EMC_STATUS [
        TIMING_UPDATE_STALLED OFFSET(0) NUMBITS(1) [],
    ],
    pub EMC_INTSTATUS [
        CLKCHANGE_COMPLETE OFFSET(4) NUMBITS(1) [],
    ],
    pub EMC_FBIO_CFG7 [
        CH0_ENABLE OFFSET(2) NUMBITS(1) [],
        CH1_ENABLE OFFSET(3) NUMBITS(1) [],
    ],
    pub EMC_DIG_DLL_STATUS [
        DLL_LOCK_B01 OFFSET(15) NUMBITS(1) [],
    ],
    pub EMC_TR_DVFS [
        TRAINING_DVFS OFFSET(0) NUMBITS(1) [],
    ],
    pub EMC_MRW [
        MRW_MA OFFSET(16) NUMBITS(8) [],
        MRW_OP OFFSET(0) NUMBITS(8) [],
    ],
    pub EMC_PIN [
        PIN_CKE0 OFFSET(0) NUMBITS(1) [],
        PIN_CKE1 OFFSET(1) NUMBITS(1) [],
        PIN_CKEB0 OFFSET(4) NUMBITS(1) [],
        PIN_CKEB1 OFFSET(5) NUMBITS(1) [],
    ],
    pub EMC_ZQ_CAL [
        ZQ_CAL_CMD OFFSET(0) NUMBITS(1) [],
        ZQ_LATCH_CMD OFFSET(31) NUMBITS(1) [],
    ],
    pub EMC_TRAINING_CMD [
        GO OFFSET(0) NUMBITS(1) [],
        CA_TRAINING OFFSET(8) NUMBITS(1) [],
        CA_VREF_TRAINING OFFSET(9) NUMBITS(1) [],
        QUSE_TRAINING OFFSET(10) NUMBITS(1) [],
        QUSE_VREF_TRAINING OFFSET(11) NUMBITS(1) [],
        WRITE_TRAINING OFFSET(12) NUMBITS(1) [],
        WRITE_VREF_TRAINING OFFSET(13) NUMBITS(1) [],
        READ_TRAINING OFFSET(14) NUMBITS(1) [],
        READ_VREF_TRAINING OFFSET(15) NUMBITS(1) [],
    ],
    pub EMC_SWITCH_BACK_CTRL [
        SWITCH_BACK OFFSET(0) NUMBITS(1) [],
    ],
    pub EMC_CCFIFO_ADDR [
        ADDR OFFSET(0) NUMBITS(16) [],
        STALL OFFSET(16) NUMBITS(15) [],
        ARM OFFSET(31) NUMBITS(1) [],
    ],
    pub EMC_CCFIFO_DATA [
        DATA OFFSET(0) NUMBITS(32) [],
    ],
    pub EMC_SEL_DPD_CTRL [
        CA_SEL_DPD_EN OFFSET(0) NUMBITS(1) [],
    ],
    pub EMC_CFG [
        DYN_SELF_REF OFFSET(28) NUMBITS(1) [],
    ],
    pub EMC_CFG_PIPE_CLK [
        CLK_ALWAYS_ON OFFSET(0) NUMBITS(1) [],
    ],
    pub EMC_MPC [
        MPC_CMD OFFSET(0) NUMBITS(8) [],
    ],
    pub EMC_MRR [
        MRR_DATA OFFSET(0) NUMBITS(16) [],
    ],
    pub EMC_PMACRO_CFG_PM_GLOBAL_0 [
        DISABLE_CFG_BYTE0 OFFSET(16) NUMBITS(1) [],
    ],
    pub EMC_TRAINING_CTRL [
        SECOND_RANK OFFSET(14) NUMBITS(1) [],
    ],
    pub EMC_TRAINING_QUSE_CTRL_MISC [
        READ_CTRL_MISC OFFSET(0) NUMBITS(32) [],
    ],
    pub EMC_TRAINING_PATRAM_CTRL [
        INDEX OFFSET(0) NUMBITS(8) [],
        GO OFFSET(31) NUMBITS(1) [],
    ],
];

register_structs! {
    #[allow(non_snake_case)]
    pub RegisterBlock {
        (0x000 => _reserved0),
        (0x02c => EMC_RC: ReadWrite<u32>),
        (0x030 => _reserved1),
        (0x294 => EMC_CFG: ReadWrite<u32, EMC_CFG::Register>),
        (0x298 => _reserved2),
        (0x2a8 => EMC_REFRESH: ReadWrite<u32>),
        (0x2ac => _reserved3),
        (0x2e0 => EMC_TREFBW: ReadWrite<u32>),
        (0x2e4 => _reserved4),
        (0x2f8 => EMC_CFG_DIG_DLL: ReadWrite<u32, EMC_CFG_DIG_DLL::Register>),
        (0x2fc => _reserved5),
        (0x35c => EMC_DLL_CLK_SRC: ReadWrite<u32>),
        (0x360 => _reserved6),
        (0x374 => EMC_AUTO_CAL_CONFIG: ReadWrite<u32, EMC_AUTO_CAL_CONFIG::Register>),
        (0x378 => EMC_AUTO_CAL_CONFIG2: ReadWrite<u32>),
        (0x37c => EMC_AUTO_CAL_CONFIG3: ReadWrite<u32>),
        (0x380 => EMC_AUTO_CAL_CONFIG4: ReadWrite<u32>),
        (0x384 => EMC_AUTO_CAL_CONFIG5: ReadWrite<u32>),
        (0x388 => EMC_AUTO_CAL_CONFIG6: ReadWrite<u32>),
        (0x38c => EMC_AUTO_CAL_CONFIG7: ReadWrite<u32>),
        (0x390 => EMC_AUTO_CAL_CONFIG8: ReadWrite<u32>),
        (0x394 => _reserved7),
        (0x3c0 => EMC_DBG: ReadWrite<u32, EMC_DBG::Register>),
        (0x3c4 => _reserved8),
        (0x3e4 => EMC_CFG_PIPE_CLK: ReadWrite<u32, EMC_CFG_PIPE_CLK::Register>),
        (0x3e8 => _reserved9),
        (0x458 => EMC_SEL_DPD_CTRL: ReadWrite<u32, EMC_SEL_DPD_CTRL::Register>),
        (0x45c => _reserved10),
        (0x49c => EMC_XM2COMPPADCTRL: ReadWrite<u32>),
        (0x4a0 => _reserved11),
        (0x4b8 => EMC_FDPD_CTRL_CMD_NO_RAMP: ReadWrite<u32>),
        (0x4bc => _reserved12),
        (0x514 => EMC_MRW: ReadWrite<u32, EMC_MRW::Register>),
        (0x518 => EMC_MRW2: ReadWrite<u32>),
        (0x51c => EMC_MRW3: ReadWrite<u32>),
        (0x520 => EMC_MRW4: ReadWrite<u32>),
        (0x524 => EMC_MRS_WAIT_CNT: ReadWrite<u32>),
        (0x528 => _reserved13),
        (0x564 => EMC_MRR: ReadOnly<u32, EMC_MRR::Register>),
        (0x568 => _reserved14),
        (0x5a4 => EMC_FBIO_CFG7: ReadOnly<u32, EMC_FBIO_CFG7::Register>),
        (0x5a8 => _reserved15),
        (0x5e4 => EMC_CFG_2: ReadWrite<u32>),
        (0x5e8 => _reserved16),
        (0x5f8 => EMC_ZCAL_INTERVAL: ReadWrite<u32>),
        (0x5fc => EMC_ZCAL_WAIT_CNT: ReadWrite<u32>),
        (0x600 => EMC_ZQ_CAL: ReadWrite<u32, EMC_ZQ_CAL::Register>),
        (0x604 => _reserved17),
        (0x6ac => EMC_MPC: ReadWrite<u32, EMC_MPC::Register>),
        (0x6b0 => _reserved18),
        (0x89c => EMC_PIN: ReadWrite<u32, EMC_PIN::Register>),
        (0x8a0 => _reserved19),
        (0x8e0 => EMC_INTSTATUS: ReadWrite<u32, EMC_INTSTATUS::Register>),
        (0x8e4 => _reserved20),
        (0x8f8 => EMC_STATUS: ReadOnly<u32, EMC_STATUS::Register>),
        (0x8fc => _reserved21),
        (0x95c => EMC_TRAINING_CTRL: ReadWrite<u32, EMC_TRAINING_CTRL::Register>),
        (0x960 => EMC_TRAINING_CMD: ReadWrite<u32, EMC_TRAINING_CMD::Register>),
        (0x964 => _reserved22),
        (0x974 => EMC_TRAINING_PATRAM_CTRL: WriteOnly<u32, EMC_TRAINING_PATRAM_CTRL::Register>),
        (0x978 => EMC_TRAINING_PATRAM_DQ: WriteOnly<u32>),
        (0x97c => EMC_TRAINING_PATRAM_DMI: WriteOnly<u32>),
        (0x980 => _reserved23),
        (0x9a4 => EMC_TRAINING_QUSE_CTRL_MISC: ReadWrite<u32, EMC_TRAINING_QUSE_CTRL_MISC::Register>),
        (0x9a8 => _reserved24),
        (0x9b4 => EMC_TR_DVFS: ReadWrite<u32, EMC_TR_DVFS::Register>),
        (0x9b8 => _reserved25),
        (0x9c0 => EMC_SWITCH_BACK_CTRL: ReadWrite<u32, EMC_SWITCH_BACK_CTRL::Register>),
        (0x9c4 => _reserved26),
        (0xa4c => EMC_CCFIFO_ADDR: WriteOnly<u32, EMC_CCFIFO_ADDR::Register>),
        (0xa50 => EMC_CCFIFO_DATA: WriteOnly<u32, EMC_CCFIFO_DATA::Register>),
        (0xa54 => _reserved27),
        (0xbb8 => EMC_DIG_DLL_STATUS: ReadOnly<u32, EMC_DIG_DLL_STATUS::Register>),
        (0xbbc => _reserved28),
        (0xbf0 => EMC_PMACRO_VTTGEN_CTRL_1: ReadWrite<u32>),
        (0xbf4 => _reserved29),
        (0xc20 => EMC_PMACRO_BRICK_CTRL_RFU1: ReadWrite<u32>),
        (0xc24 => _reserved30),
        (0xc40 => EMC_PMACRO_CMD_PAD_TX_CTRL: ReadWrite<u32>),
        (0xc44 => _reserved31),
        (0xc70 => EMC_PMACRO_AUTOCAL_CFG_COMMON: ReadWrite<u32>),
        (0xc74 => _reserved32),
        (0xcb0 => EMC_PMACRO_DLL_CFG_0: ReadWrite<u32>),
        (0xcb4 => EMC_PMACRO_DLL_CFG_1: ReadWrite<u32>),
        (0xcb8 => _reserved33),
        (0xd60 => EMC_PMACRO_CFG_PM_GLOBAL_0: ReadWrite<u32, EMC_PMACRO_CFG_PM_GLOBAL_0::Register>),
        (0xd64 => EMC_PMACRO_TRAINING_CTRL_0: ReadWrite<u32>),
        (0xd68 => EMC_PMACRO_TRAINING_CTRL_1: ReadWrite<u32>),
        (0xd6c => @END),
    }
}

pub type Registers = MmioDerefWrapper<RegisterBlock>;

/// Per-channel EMC0/EMC1 apertures mirror a subset of the primary block
/// (spec.md §6); the register layout we care about (the per-channel MRW10-13
/// in the burst-per-channel array) is addressed generically through
/// [`crate::table::addresses`] rather than repeated here.
pub type ChannelRegisters = MmioDerefWrapper<RegisterBlock>;

/// Plain offsets referenced by name from FreqChange's value-patch table
/// (spec.md §4.4 step 8) but that don't need bit-level decode beyond a
/// shift/mask the phase code applies directly.
pub mod offset {
    // Control-plane registers the FreqChange/training phases decode bit by
    // bit through the [`super::super::Bus`] seam rather than the typed
    // [`super::RegisterBlock`] (which stays around as a reference for the
    // bitfield layouts themselves, used via `InMemoryRegister`).
    pub const EMC_CFG: u32 = 0x294;
    pub const EMC_REFRESH: u32 = 0x2a8;
    pub const EMC_TREFBW: u32 = 0x2e0;
    pub const EMC_CFG_DIG_DLL: u32 = 0x2f8;
    pub const EMC_DLL_CLK_SRC: u32 = 0x35c;
    pub const EMC_AUTO_CAL_CONFIG: u32 = 0x374;
    pub const EMC_AUTO_CAL_CONFIG2: u32 = 0x378;
    pub const EMC_AUTO_CAL_CONFIG3: u32 = 0x37c;
    pub const EMC_AUTO_CAL_CONFIG4: u32 = 0x380;
    pub const EMC_AUTO_CAL_CONFIG5: u32 = 0x384;
    pub const EMC_AUTO_CAL_CONFIG6: u32 = 0x388;
    pub const EMC_AUTO_CAL_CONFIG7: u32 = 0x38c;
    pub const EMC_AUTO_CAL_CONFIG8: u32 = 0x390;
    pub const EMC_DBG: u32 = 0x3c0;
    pub const EMC_CFG_PIPE_CLK: u32 = 0x3e4;
    pub const EMC_SEL_DPD_CTRL: u32 = 0x458;
    pub const EMC_MRW: u32 = 0x514;
    pub const EMC_MRW2: u32 = 0x518;
    pub const EMC_MRW3: u32 = 0x51c;
    pub const EMC_MRW4: u32 = 0x520;
    pub const EMC_MRS_WAIT_CNT: u32 = 0x524;
    pub const EMC_MRR: u32 = 0x564;
    pub const EMC_FBIO_CFG7: u32 = 0x5a4;
    pub const EMC_CFG_2: u32 = 0x5e4;
    pub const EMC_ZCAL_INTERVAL: u32 = 0x5f8;
    pub const EMC_ZCAL_WAIT_CNT: u32 = 0x5fc;
    pub const EMC_ZQ_CAL: u32 = 0x600;
    pub const EMC_MPC: u32 = 0x6ac;
    pub const EMC_PIN: u32 = 0x89c;
    pub const EMC_INTSTATUS: u32 = 0x8e0;
    pub const EMC_STATUS: u32 = 0x8f8;
    pub const EMC_TRAINING_CTRL: u32 = 0x95c;
    pub const EMC_TRAINING_CMD: u32 = 0x960;
    pub const EMC_TRAINING_PATRAM_CTRL: u32 = 0x974;
    pub const EMC_TRAINING_PATRAM_DQ: u32 = 0x978;
    pub const EMC_TRAINING_PATRAM_DMI: u32 = 0x97c;
    pub const EMC_TRAINING_QUSE_CTRL_MISC: u32 = 0x9a4;
    pub const EMC_TR_DVFS: u32 = 0x9b4;
    pub const EMC_SWITCH_BACK_CTRL: u32 = 0x9c0;
    pub const EMC_CCFIFO_ADDR: u32 = 0xa4c;
    pub const EMC_CCFIFO_DATA: u32 = 0xa50;
    pub const EMC_DIG_DLL_STATUS: u32 = 0xbb8;
    pub const EMC_PMACRO_DLL_CFG_0: u32 = 0xcb0;
    pub const EMC_PMACRO_DLL_CFG_1: u32 = 0xcb4;
    pub const EMC_PMACRO_CFG_PM_GLOBAL_0: u32 = 0xd60;
    pub const EMC_PMACRO_TRAINING_CTRL_0: u32 = 0xd64;
    pub const EMC_PMACRO_TRAINING_CTRL_1: u32 = 0xd68;

    pub const EMC_XM2COMPPADCTRL: u32 = 0x49c;
    pub const EMC_DLL_CFG_1: u32 = 0xcb4;
    pub const EMC_PMACRO_VTTGEN_CTRL_1: u32 = 0xbf0;
    pub const EMC_PMACRO_BRICK_CTRL_RFU1: u32 = 0xc20;
    pub const EMC_PMACRO_CMD_PAD_TX_CTRL: u32 = 0xc40;
    pub const EMC_PMACRO_AUTOCAL_CFG_COMMON: u32 = 0xc70;
    pub const EMC_FDPD_CTRL_CMD_NO_RAMP: u32 = 0x4b8;

    // Per-channel burst registers (`g_burst_perch_regs_addr` in `mtc_b01.c`):
    // the four LPDDR4 mode-register-write shadows that differ per channel.
    pub const EMC_MRW10: u32 = 0x7f0;
    pub const EMC_MRW11: u32 = 0x7f4;
    pub const EMC_MRW12: u32 = 0x7f8;
    pub const EMC_MRW13: u32 = 0x7fc;

    // VREF-per-channel (`g_vref_perch_regs_addr`).
    pub const EMC_TRAINING_OPT_DQS_IB_VREF_RANK0: u32 = 0xa80;
    pub const EMC_TRAINING_OPT_DQS_IB_VREF_RANK1: u32 = 0xa84;

    // Training-mod-per-channel (`g_training_mod_perch_regs_addr`), truncated
    // to the IB/OB byte0/1 + misc subset used by the representative tables
    // in `table::data`.
    pub const EMC_TRAINING_RW_OFFSET_IB_BYTE0: u32 = 0xa90;
    pub const EMC_TRAINING_RW_OFFSET_IB_BYTE1: u32 = 0xa94;
    pub const EMC_TRAINING_RW_OFFSET_IB_MISC: u32 = 0xa98;
    pub const EMC_TRAINING_RW_OFFSET_OB_BYTE0: u32 = 0xaa0;
    pub const EMC_TRAINING_RW_OFFSET_OB_BYTE1: u32 = 0xaa4;
    pub const EMC_TRAINING_RW_OFFSET_OB_MISC: u32 = 0xaa8;

    // Trim-per-channel (`g_trim_perch_regs_addr`).
    pub const EMC_CMD_BRLSHFT_0: u32 = 0xb00;
    pub const EMC_CMD_BRLSHFT_1: u32 = 0xb04;
    pub const EMC_DATA_BRLSHFT_0: u32 = 0xb08;
    pub const EMC_DATA_BRLSHFT_1: u32 = 0xb0c;
    pub const EMC_QUSE_BRLSHFT_0: u32 = 0xb10;
    pub const EMC_QUSE_BRLSHFT_1: u32 = 0xb14;

    // Trim (global, `g_trim_regs_addr`): clock-tree DDLL taps, long (DQS) and
    // short (per-rank, per-byte DQ) variants.
    pub const EMC_PMACRO_IB_DDLL_LONG_DQS_RANK0_0: u32 = 0xcd0;
    pub const EMC_PMACRO_IB_DDLL_LONG_DQS_RANK0_1: u32 = 0xcd4;
    pub const EMC_PMACRO_IB_DDLL_LONG_DQS_RANK1_0: u32 = 0xcd8;
    pub const EMC_PMACRO_IB_DDLL_LONG_DQS_RANK1_1: u32 = 0xcdc;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE0_0: u32 = 0xce0;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE0_1: u32 = 0xce4;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE0_2: u32 = 0xce8;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE1_0: u32 = 0xcec;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE1_1: u32 = 0xcf0;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK0_BYTE1_2: u32 = 0xcf4;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE0_0: u32 = 0xcf8;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE0_1: u32 = 0xcfc;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE0_2: u32 = 0xd00;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE1_0: u32 = 0xd04;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE1_1: u32 = 0xd08;
    pub const EMC_PMACRO_OB_DDLL_SHORT_DQ_RANK1_BYTE1_2: u32 = 0xd0c;

    // A subset of `burst_regs_arr` (`g_burst_regs_addr`), truncated from the
    // original's ~400 entries to the 32 offsets reproduced verbatim from
    // `mtc_b01.c` lines 169-201 (see DESIGN.md "Workspace flattening").
    pub const BURST_REGS: [u32; 32] = [
        0x02c, 0x030, 0x590, 0x580, 0x0c0, 0x034, 0x038, 0x03c, 0x040, 0x044, 0x048, 0x144, 0x0ac,
        0x0bc, 0x0f8, 0x0fc, 0x108, 0x10c, 0x5c0, 0x04c, 0x050, 0x054, 0x058, 0x0b8, 0x4e0, 0x05c,
        0x498, 0x494, 0x2d0, 0x490, 0x48c, 0x060,
    ];
}
