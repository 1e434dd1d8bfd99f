//! Crate-wide error type.
//!
//! Mirrors the flat, `Copy` error-enum style used throughout rustBoot
//! (`RustbootError` in `rustBoot/src/lib.rs`): one variant per distinct
//! failure mode named in spec.md §7, no `anyhow`-style boxed causes, no
//! string formatting held inside the error.

use core::fmt;

/// Result alias used throughout this crate.
pub type Result<T> = core::result::Result<T, MtcError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The MTC (memory-training-and-clocking) error type.
pub enum MtcError {
    /// The fused DRAM id does not map to a known table set. Fatal: the
    /// caller is expected to route this to the `fatal_error` external
    /// collaborator and abort boot.
    TableNotFound(u8),
    /// No entry in the selected table array has a `clk_src_emc` matching the
    /// CAR value observed at boot. Fatal for the same reason as above.
    TimingTableNotFound,
    /// `wait_for_update` did not observe the expected status bit within the
    /// `EMC_STATUS_UPDATE_TIMEOUT` busy-wait budget. Carries a bitmask of
    /// which channel(s) timed out (bit 0 = channel 0, bit 1 = channel 1).
    /// Per spec.md §7, every caller but the final clock-change trigger
    /// ignores this; the final trigger logs it and returns early rather than
    /// escalating.
    UpdateTimeout(u8),
}

impl fmt::Display for MtcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MtcError::TableNotFound(id) => write!(f, "no timing tables for DRAM id {}", id),
            MtcError::TimingTableNotFound => {
                write!(f, "failed to find timing table matching boot clock source")
            }
            MtcError::UpdateTimeout(chans) => {
                write!(f, "timing update timed out on channel mask {:#x}", chans)
            }
        }
    }
}
