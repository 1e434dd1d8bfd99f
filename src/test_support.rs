//! Register-recording MMIO mock used by the inline `#[cfg(test)]` suites
//! throughout this crate (spec.md §8: "use a register-recording MMIO mock").
//! Only compiled for `cfg(test)`, same as the rest of this crate's use of
//! `std` — see `rustBoot`'s `#![cfg_attr(not(test), no_std)]` convention in
//! `lib.rs`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::vec::Vec;

use crate::external::{CarRegs, FatalReason, FatalReporter, FuseDriver, MicroDelay};
use crate::regs::Bus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
    pub addr: u32,
    pub value: u32,
}

#[derive(Default)]
pub struct MockBus {
    regs: RefCell<BTreeMap<u32, u32>>,
    pub trace: RefCell<Vec<Write>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preset(&self, addr: u32, value: u32) {
        self.regs.borrow_mut().insert(addr, value);
    }

    pub fn trace(&self) -> Vec<Write> {
        self.trace.borrow().clone()
    }
}

impl Bus for MockBus {
    fn read32(&self, addr: u32) -> u32 {
        *self.regs.borrow().get(&addr).unwrap_or(&0)
    }

    fn write32(&mut self, addr: u32, value: u32) {
        self.regs.borrow_mut().insert(addr, value);
        self.trace.borrow_mut().push(Write { addr, value });
    }
}

#[derive(Default)]
pub struct MockCar {
    regs: RefCell<BTreeMap<u32, u32>>,
}

impl MockCar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preset(&self, offset: u32, value: u32) {
        self.regs.borrow_mut().insert(offset, value);
    }
}

impl CarRegs for MockCar {
    fn car_read(&self, offset: u32) -> u32 {
        *self.regs.borrow().get(&offset).unwrap_or(&0)
    }

    fn car_write(&mut self, offset: u32, val: u32) {
        self.regs.borrow_mut().insert(offset, val);
    }
}

pub struct MockFuse(pub u8);

impl FuseDriver for MockFuse {
    fn dram_id(&self) -> u8 {
        self.0
    }
}

#[derive(Default)]
pub struct MockDelay {
    pub total_us: RefCell<u64>,
}

impl MicroDelay for MockDelay {
    fn udelay(&self, us: u32) {
        *self.total_us.borrow_mut() += us as u64;
    }
}

pub struct PanicReporter;

impl FatalReporter for PanicReporter {
    fn fatal_error(&self, reason: FatalReason) -> ! {
        panic!("fatal_error: {:?}", reason);
    }
}
