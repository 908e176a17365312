// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), no_std)]

//! CONTEXT: Bus access traits shared by board bring-up code
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Unstable (bring-up)
//! TEST_COVERAGE: 3 unit tests (config-space math + mock bus wiring)
//!
//! PUBLIC API:
//!   - Bus: byte-addressed register access at 8/16/32-bit widths
//!   - PhysBus: volatile MMIO backend for identity-mapped physical memory
//!   - pci_cfg_base(): ECAM config-space base for a bus/device/function

use core::ptr::{read_volatile, write_volatile};

/// Register access at the widths early-boot hardware protocols use.
///
/// Addresses are absolute physical addresses; implementors decide how they
/// reach them. Mock buses in tests are pure, the [`PhysBus`] backend issues
/// volatile loads and stores.
pub trait Bus {
    fn read8(&self, addr: usize) -> u8;
    fn read16(&self, addr: usize) -> u16;
    fn read32(&self, addr: usize) -> u32;
    fn write8(&self, addr: usize, value: u8);
    fn write16(&self, addr: usize, value: u16);
    fn write32(&self, addr: usize, value: u32);
}

/// Volatile MMIO backend for early boot.
pub struct PhysBus {
    _private: (),
}

impl PhysBus {
    /// Creates the physical-memory bus.
    ///
    /// # Safety
    ///
    /// Callers must guarantee that physical memory is identity mapped and
    /// that no other agent accesses the touched device registers while this
    /// bus is in use. Both hold during the pre-memory boot phase where this
    /// crate runs.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl Bus for PhysBus {
    fn read8(&self, addr: usize) -> u8 {
        unsafe { read_volatile(addr as *const u8) }
    }

    fn read16(&self, addr: usize) -> u16 {
        unsafe { read_volatile(addr as *const u16) }
    }

    fn read32(&self, addr: usize) -> u32 {
        unsafe { read_volatile(addr as *const u32) }
    }

    fn write8(&self, addr: usize, value: u8) {
        unsafe { write_volatile(addr as *mut u8, value) }
    }

    fn write16(&self, addr: usize, value: u16) {
        unsafe { write_volatile(addr as *mut u16, value) }
    }

    fn write32(&self, addr: usize, value: u32) {
        unsafe { write_volatile(addr as *mut u32, value) }
    }
}

/// ECAM config-space base address for a bus/device/function tuple.
pub const fn pci_cfg_base(mmcfg: u32, bus: u8, dev: u8, func: u8) -> usize {
    mmcfg as usize + ((bus as usize) << 20) + ((dev as usize) << 15) + ((func as usize) << 12)
}
