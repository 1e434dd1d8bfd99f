//! Table selector (spec.md §4.1): fuse-derived DRAM id → timing-table array.
//!
//! `dram_id_to_table_set_index` reproduces
//! `get_emc_dvfs_timing_table_index` from `mtc_b01.c` verbatim (SPEC_FULL.md
//! §3 — spec.md names the shape of the mapping, "29 documented IDs → indices
//! 0, 1, 2, 3, 5..15, 16", without giving the literal table; the original
//! source does).

use super::data;
use crate::table::TimingTable;
use crate::{MtcError, Result};

/// Maps a fused DRAM id (`0x0..=0x1C`) to a table-set index. Table-set index
/// 4 is never produced (matches the original, which has no `Sdev...4` case).
pub fn dram_id_to_table_set_index(dram_id: u8) -> Option<u8> {
    Some(match dram_id {
        0x0 => 0,
        0x1 => 2,
        0x2 => 3,
        0x3 => 0x10,
        0x4 => 1,
        0x5 => 0x10,
        0x6 => 0,
        0x7 => 0,
        0x8 => 5,
        0x9 => 6,
        0xA => 7,
        0xB => 8,
        0xC => 5,
        0xD => 6,
        0xE => 7,
        0xF => 8,
        0x10 => 9,
        0x11 => 0xC,
        0x12 => 0xD,
        0x13 => 0xC,
        0x14 => 0xA,
        0x15 => 0xB,
        0x16 => 0xE,
        0x17 => 0xD,
        0x18 => 0xC,
        0x19 => 0xF,
        0x1A => 0xF,
        0x1B => 0xF,
        0x1C => 0xD,
        _ => return None,
    })
}

/// `select_tables` (spec.md §4.1): resolve a fused DRAM id to its
/// three-entry table array. Bounds-checks the id and the resulting index;
/// a miss is the one non-timeout fatal condition in this crate.
pub fn select_tables(dram_id: u8) -> Result<&'static [TimingTable; 3]> {
    let index = dram_id_to_table_set_index(dram_id).ok_or(MtcError::TableNotFound(dram_id))?;
    data::table_set_by_index(index).ok_or(MtcError::TableNotFound(dram_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_dram_id_resolves_to_documented_index() {
        // DramId_MarikoIowaSamsung4gb, used by scenario S1 in spec.md §8.
        assert_eq!(dram_id_to_table_set_index(0x8), Some(5));
    }

    #[test]
    fn unmapped_dram_id_is_none() {
        assert_eq!(dram_id_to_table_set_index(0x1D), None);
    }

    #[test]
    fn select_tables_reports_fatal_for_unmapped_id() {
        assert_eq!(select_tables(0x1D), Err(MtcError::TableNotFound(0x1D)));
    }

    #[test]
    fn select_tables_succeeds_for_mapped_id() {
        let tables = select_tables(0x8).expect("table set must exist for 0x8");
        assert!(tables[0].rate_khz < tables[1].rate_khz);
        assert!(tables[1].rate_khz < tables[2].rate_khz);
    }
}
