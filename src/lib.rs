#![cfg_attr(not(test), no_std)]
#![allow(non_snake_case)]

//! LPDDR4 DRAM memory-controller training and DVFS core for the Tegra X1/X1+
//! (Mariko, "B01") boot path.
//!
//! This crate brings LPDDR4 DRAM from the conservative bootstrap operating
//! point (~204 MHz) up to full operating frequency (~1600 MHz), running the
//! per-device calibration ("training") required for reliable high-speed
//! operation along the way. It owns the DRAM controller exclusively for the
//! duration of training; nothing else in the system may touch EMC, MC, the
//! PLLs, or the CCFIFO while [`dvfs::train_dram`] is running.
//!
//! The core does not load payloads, drive a display, or talk to storage —
//! those are the surrounding bootloader's job. It consumes three small
//! external collaborators (clock-and-reset, fuses, microsecond delay; see
//! [`external`]) and produces no outputs of its own beyond the DRAM being
//! ready to run at full rate.

pub mod ccfifo;
pub mod clocksource;
pub mod dvfs;
pub mod error;
pub mod external;
pub mod freqchange;
pub mod pattern;
pub mod periodic;
pub mod pll;
pub mod regs;
pub mod state;
pub mod table;
pub mod training;
pub mod util;

pub use error::{MtcError, Result};
pub use state::MtcContext;

#[cfg(test)]
pub(crate) mod test_support;
