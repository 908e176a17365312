// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Boot-partition probe through the P2SB sideband window.
//!
//! The top-swap bit lives in the RTC block's private configuration space,
//! reachable only through the P2SB bridge. The bridge may be hidden from
//! config space when we run; the probe unhides it for the single read and
//! always restores the previous visibility before returning.

use boot_hal::{pci_cfg_base, Bus};
use boot_log::log_debug;

use crate::fspt::PCI_MMCFG_BASE;

/// P2SB bridge config endpoint (bus 0, LPC device, function 1).
mod p2sb {
    /// PCH LPC/eSPI device number; the bridge is its function 1.
    pub const DEVICE: u8 = 31;
    pub const FUNCTION: u8 = 1;
    /// Sideband register window base (SBREG_BAR) config offset.
    pub const SBREG_BAR: usize = 0x10;
    /// Low nibble of the bar carries type bits, not address.
    pub const SBREG_BAR_MASK: u32 = 0xFFFF_FFF0;
    /// Config byte whose bit 0 hides the bridge from config space.
    pub const HIDE_BYTE: usize = 0xE1;
    pub const HIDE_BIT: u8 = 1 << 0;
}

/// RTC block behind the sideband fabric.
mod rtc {
    /// Sideband port id of the RTC host controller.
    pub const PORT_ID: usize = 0xC3;
    /// Backed Up Control (BUC) register offset in RTC private space.
    pub const BUC_OFFSET: usize = 0x3414;
    /// BUC bit selecting the top-swap boot block.
    pub const TOP_SWAP: u32 = 1 << 0;
}

/// Firmware partition the platform booted from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootPartition {
    /// Primary boot block (top swap clear).
    Primary,
    /// Redundant boot block (top swap set).
    Backup,
}

impl BootPartition {
    /// Index understood by the bootloader core's partition state.
    pub const fn index(self) -> u8 {
        match self {
            BootPartition::Primary => 0,
            BootPartition::Backup => 1,
        }
    }
}

/// Reads the top-swap bit and reports which partition supplied the
/// currently executing firmware.
///
/// The probe has no failure path: memory-mapped reads are assumed to
/// complete, and a platform whose SBREG_BAR is unprogrammed trips the
/// debug assert below. All BUC bits other than top-swap are ignored.
pub fn detect_boot_partition<B: Bus>(bus: &B) -> BootPartition {
    let base = pci_cfg_base(PCI_MMCFG_BASE, 0, p2sb::DEVICE, p2sb::FUNCTION);

    // An all-ones vendor/device read means the bridge is hidden.
    let mut unhidden = false;
    if bus.read16(base) == 0xFFFF {
        bus.write8(base + p2sb::HIDE_BYTE, 0);
        unhidden = true;
        log_debug!(target: "bootpart", "p2sb hidden, unhiding for probe");
    }

    let bar = bus.read32(base + p2sb::SBREG_BAR) & p2sb::SBREG_BAR_MASK;
    debug_assert!(bar != p2sb::SBREG_BAR_MASK, "SBREG_BAR not programmed");

    let buc = bus.read32(bar as usize | (rtc::PORT_ID << 16) | rtc::BUC_OFFSET);
    log_debug!(target: "bootpart", "sbreg bar {:#010x}, buc {:#010x}", bar, buc);

    // Restore visibility before interpreting anything.
    if unhidden {
        bus.write8(base + p2sb::HIDE_BYTE, p2sb::HIDE_BIT);
        log_debug!(target: "bootpart", "p2sb hidden again");
    }

    if buc & rtc::TOP_SWAP == 0 {
        BootPartition::Primary
    } else {
        BootPartition::Backup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boot_hal::Bus;
    use proptest::prelude::*;
    use std::cell::RefCell;

    const P2SB_BASE: usize = 0xE00F_9000;
    const SBREG_BAR_VALUE: u32 = 0xFD00_0004; // type bits in the low nibble
    const BUC_ADDR: usize = 0xFDC3_3414;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Op {
        Read16(usize),
        Read32(usize),
        Write8(usize, u8),
    }

    struct FakeP2sb {
        buc: u32,
        ops: RefCell<Vec<Op>>,
        hide_state: RefCell<bool>,
    }

    impl FakeP2sb {
        fn new(hidden: bool, buc: u32) -> Self {
            Self { buc, ops: RefCell::new(Vec::new()), hide_state: RefCell::new(hidden) }
        }
    }

    impl Bus for FakeP2sb {
        fn read8(&self, _addr: usize) -> u8 {
            unreachable!("probe never issues 8-bit reads")
        }

        fn read16(&self, addr: usize) -> u16 {
            self.ops.borrow_mut().push(Op::Read16(addr));
            assert_eq!(addr, P2SB_BASE);
            if *self.hide_state.borrow() {
                0xFFFF
            } else {
                0x8086
            }
        }

        fn read32(&self, addr: usize) -> u32 {
            self.ops.borrow_mut().push(Op::Read32(addr));
            match addr {
                a if a == P2SB_BASE + 0x10 => {
                    assert!(!*self.hide_state.borrow(), "bar read while hidden");
                    SBREG_BAR_VALUE
                }
                BUC_ADDR => {
                    assert!(!*self.hide_state.borrow(), "sideband read while hidden");
                    self.buc
                }
                other => panic!("unexpected read32 at {other:#x}"),
            }
        }

        fn write8(&self, addr: usize, value: u8) {
            self.ops.borrow_mut().push(Op::Write8(addr, value));
            assert_eq!(addr, P2SB_BASE + 0xE1);
            *self.hide_state.borrow_mut() = value & 1 != 0;
        }

        fn write16(&self, _addr: usize, _value: u16) {
            unreachable!("probe never issues 16-bit writes")
        }

        fn write32(&self, _addr: usize, _value: u32) {
            unreachable!("probe never issues 32-bit writes")
        }
    }

    #[test]
    fn visible_bridge_is_left_untouched() {
        let bus = FakeP2sb::new(false, 0);
        assert_eq!(detect_boot_partition(&bus), BootPartition::Primary);
        let ops = bus.ops.borrow();
        assert!(ops.iter().all(|op| !matches!(op, Op::Write8(..))));
        assert!(!*bus.hide_state.borrow());
    }

    #[test]
    fn hidden_bridge_is_restored_after_probe() {
        let bus = FakeP2sb::new(true, rtc::TOP_SWAP);
        assert_eq!(detect_boot_partition(&bus), BootPartition::Backup);
        let ops = bus.ops.borrow();
        let writes: Vec<_> =
            ops.iter().filter(|op| matches!(op, Op::Write8(..))).collect();
        assert_eq!(writes, [&Op::Write8(P2SB_BASE + 0xE1, 0), &Op::Write8(P2SB_BASE + 0xE1, 1)]);
        assert!(*bus.hide_state.borrow(), "bridge must end hidden again");
    }

    #[test]
    fn restore_happens_after_sideband_read() {
        let bus = FakeP2sb::new(true, 0);
        detect_boot_partition(&bus);
        let ops = bus.ops.borrow();
        let buc_pos = ops.iter().position(|op| *op == Op::Read32(BUC_ADDR)).unwrap();
        let rehide_pos =
            ops.iter().position(|op| *op == Op::Write8(P2SB_BASE + 0xE1, 1)).unwrap();
        assert!(buc_pos < rehide_pos);
    }

    #[test]
    fn partition_index_mapping() {
        assert_eq!(BootPartition::Primary.index(), 0);
        assert_eq!(BootPartition::Backup.index(), 1);
    }

    proptest! {
        // Only bit 0 of the BUC value may influence the result.
        #[test]
        fn non_top_swap_bits_are_ignored(noise in any::<u32>()) {
            let clear = FakeP2sb::new(false, noise & !rtc::TOP_SWAP);
            prop_assert_eq!(detect_boot_partition(&clear), BootPartition::Primary);

            let set = FakeP2sb::new(true, noise | rtc::TOP_SWAP);
            prop_assert_eq!(detect_boot_partition(&set), BootPartition::Backup);
        }
    }
}
