//! CCFIFO driver (spec.md §4.7).
//!
//! The EMC compiles a short program of (address, data, post-stall) triples
//! at the *old* clock and executes it across the clock change itself. Every
//! FreqChange phase that needs to touch a register mid-transition pushes
//! here instead of writing the aperture directly.

use crate::regs::emc::offset::{EMC_CCFIFO_ADDR, EMC_CCFIFO_DATA};
use crate::regs::Bus;

/// Arms a CCFIFO entry: top bit of the address word per spec.md §4.7.
const CCFIFO_ARM: u32 = 0x8000_0000;

/// Queues one (address, data, post-stall-count) triple.
///
/// `stall` is the number of cycles, at whatever clock is active when this
/// entry fires, the FIFO waits after executing it before moving on.
pub fn push(emc: &mut dyn Bus, addr: u32, data: u32, stall: u16) {
    let stall = (stall & 0x7fff) as u32;
    emc.write32(EMC_CCFIFO_DATA, data);
    emc.write32(EMC_CCFIFO_ADDR, (addr & 0xffff) | (stall << 16) | CCFIFO_ARM);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBus;

    #[test]
    fn push_writes_data_before_arming_address() {
        let mut emc = MockBus::new();
        push(&mut emc, 0x294, 0x1234_5678, 12);

        let trace = emc.trace();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[0].addr, EMC_CCFIFO_DATA);
        assert_eq!(trace[0].value, 0x1234_5678);
        assert_eq!(trace[1].addr, EMC_CCFIFO_ADDR);
        assert_eq!(trace[1].value, 0x294 | (12 << 16) | CCFIFO_ARM);
    }

    #[test]
    fn stall_count_is_masked_to_15_bits() {
        let mut emc = MockBus::new();
        push(&mut emc, 0, 0, 0xffff);

        let trace = emc.trace();
        assert_eq!(trace[1].value & 0x7fff_0000, 0x7fff_0000);
    }
}
