// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), no_std)]

//! CONTEXT: Coffeelake board bring-up for the stage-1A boot flow
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Unstable (bring-up)
//! TEST_COVERAGE: unit tests per module + tests/board_init.rs
//!
//! PUBLIC API:
//!   - board_init(): phase-dispatched board hook
//!   - BootServices: framework surface the board calls into
//!   - fspt::TEMP_RAM_INIT_PARAMS: FSP-T UPD data export
//!   - platform_data_size(): sizing for the stage platform-data slot
//!
//! DEPENDENCIES:
//!   - boot-hal::Bus: register access during the P2SB probe
//!   - boot-log: probe diagnostics

pub mod bootpart;
pub mod fspt;
pub mod gpio;

use boot_hal::Bus;

use bootpart::detect_boot_partition;
pub use bootpart::BootPartition;
use gpio::uart_pads;
pub use gpio::{PadEntry, MAX_SERIAL_IO_UARTS};

/// Debug port value selecting the external 0x3F8-based I/O UART instead of
/// an internal SerialIo controller.
pub const EXTERNAL_UART: u8 = 0xFF;

// Board policy: console on the legacy external UART. Values 0..=2 would
// route an internal SerialIo UART through its GPP_C pads instead.
const DEBUG_PORT: u8 = EXTERNAL_UART;

/// Boot flow phases delivered by the bootloader core. The board only acts
/// on [`BoardInitPhase::PostTempRamInit`]; every other phase is a defined
/// no-op for this board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardInitPhase {
    PostTempRamInit,
    PreConfigInit,
    PostConfigInit,
    PreMemoryInit,
    PostMemoryInit,
    PreTempRamExit,
    PostTempRamExit,
    PreSiliconInit,
    PostSiliconInit,
    PrePciEnumeration,
    PostPciEnumeration,
    PrePayloadLoading,
    PostPayloadLoading,
    EndOfStages,
    ReadyToBoot,
    EndOfFirmware,
}

/// Framework services the board drives during bring-up. Keeping these on a
/// trait makes the board's outward dependencies explicit and lets tests
/// observe exactly which hardware-facing calls a phase performs.
pub trait BootServices {
    /// Stops the watchdog so a slow early boot cannot trip a reset.
    fn disable_watchdog(&mut self);
    /// Selects the stage-wide debug console port.
    fn set_debug_port(&mut self, port: u8);
    /// Applies pad descriptors through the silicon GPIO library.
    fn configure_pads(&mut self, pads: &[PadEntry]);
    /// Board-specific hook that runs before the serial driver comes up.
    fn platform_serial_hook(&mut self);
    /// Brings up the serial console driver.
    fn serial_port_init(&mut self);
    /// Records which firmware partition later stages should trust.
    fn set_boot_partition(&mut self, index: u8);
}

/// Board-specific initialization hook, called once per boot phase.
pub fn board_init<B: Bus, S: BootServices>(phase: BoardInitPhase, bus: &B, services: &mut S) {
    match phase {
        BoardInitPhase::PostTempRamInit => {
            services.disable_watchdog();
            services.set_debug_port(DEBUG_PORT);
            if let Some(pads) = uart_pads(DEBUG_PORT) {
                services.configure_pads(pads);
            }
            services.platform_serial_hook();
            services.serial_port_init();
            let partition = detect_boot_partition(bus);
            services.set_boot_partition(partition.index());
        }
        _ => {}
    }
}

/// Boot Guard state captured while stage 1 runs.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct BootGuardInfo {
    pub verified_boot: u8,
    pub measured_boot: u8,
    pub boot_guard_capability: u8,
    reserved: u8,
    pub tpm_type: u32,
}

/// Platform-specific data block carried between stages. Defined here so
/// the core can size its allocation without knowing the contents.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PlatformData {
    pub boot_guard: BootGuardInfo,
}

/// Byte size of [`PlatformData`] for the stage allocator.
pub const fn platform_data_size() -> u32 {
    core::mem::size_of::<PlatformData>() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_data_size_matches_record() {
        assert_eq!(platform_data_size(), core::mem::size_of::<PlatformData>() as u32);
        assert_eq!(platform_data_size(), 8);
    }

    #[test]
    fn debug_port_policy_selects_external_uart() {
        assert_eq!(DEBUG_PORT, EXTERNAL_UART);
        assert!(uart_pads(DEBUG_PORT).is_none());
    }
}
