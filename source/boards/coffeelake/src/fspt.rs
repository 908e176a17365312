// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! FSP-T UPD record handed to the stage-1A loader.
//!
//! The loader reads [`TEMP_RAM_INIT_PARAMS`] out of the flash image before
//! any code in this crate executes, so the record is a pure data export.
//! Layout is locked by the const asserts at the bottom; the FSP binary
//! rejects a record whose signature, revision, or terminator drift.

use static_assertions::const_assert_eq;

/// ASCII "CFLUPD_T", little-endian.
pub const FSPT_UPD_SIGNATURE: u64 = 0x545F_4450_554C_4643;
/// UPD layout revision matched against the FSP-T binary.
pub const FSPT_UPD_REVISION: u8 = 1;
/// Sentinel closing every UPD region.
pub const UPD_TERMINATOR: u16 = 0x55AA;

/// Microcode patch region staged in flash.
pub const UCODE_REGION_BASE: u32 = 0xFFE8_0000;
pub const UCODE_REGION_SIZE: u32 = 0x0007_0000;

/// Stage code region: top-swap block + stage 1 images directly below the
/// 4 GiB boundary. The size is the two's complement of the base so the
/// region spans to the top of the address space.
pub const CODE_REGION_BASE: u32 = 0xFFCE_0000;
pub const CODE_REGION_SIZE: u32 = CODE_REGION_BASE.wrapping_neg();

/// PCI MMCONF window programmed by the platform.
pub const PCI_MMCFG_BASE: u32 = 0xE000_0000;
pub const PCI_EXPRESS_REGION_LENGTH: u32 = 0x2000_0000;

/// Common UPD header shared by every FSP phase.
#[repr(C)]
pub struct FsptUpdHeader {
    pub signature: u64,
    pub revision: u8,
    pub reserved: [u8; 23],
}

/// Core parameters consumed before temporary RAM exists.
#[repr(C)]
pub struct FsptCoreUpd {
    pub microcode_region_base: u32,
    pub microcode_region_size: u32,
    pub code_region_base: u32,
    pub code_region_size: u32,
    pub reserved: [u8; 16],
}

/// FSP-T configuration block.
#[repr(C)]
pub struct FsptConfig {
    pub serial_io_uart_debug_enable: u8,
    pub serial_io_uart_number: u8,
    pub serial_io_uart0_pin_muxing: u8,
    pub unused_upd_space0: u8,
    pub serial_io_uart_input_clock: u32,
    pub pci_express_base_address: u32,
    pub pci_express_region_length: u32,
    pub reserved: [u8; 12],
}

/// Complete FSP-T UPD region.
#[repr(C)]
pub struct FsptUpd {
    pub header: FsptUpdHeader,
    pub core: FsptCoreUpd,
    pub config: FsptConfig,
    pub terminator: u16,
}

/// Temp-RAM-init parameters for this board. Serial debug through the FSP
/// stays off; the board routes its console through the legacy UART instead
/// (see the debug-port policy in the crate root).
pub static TEMP_RAM_INIT_PARAMS: FsptUpd = FsptUpd {
    header: FsptUpdHeader {
        signature: FSPT_UPD_SIGNATURE,
        revision: FSPT_UPD_REVISION,
        reserved: [0; 23],
    },
    core: FsptCoreUpd {
        microcode_region_base: UCODE_REGION_BASE,
        microcode_region_size: UCODE_REGION_SIZE,
        code_region_base: CODE_REGION_BASE,
        code_region_size: CODE_REGION_SIZE,
        reserved: [0; 16],
    },
    config: FsptConfig {
        serial_io_uart_debug_enable: 0,
        serial_io_uart_number: 0,
        serial_io_uart0_pin_muxing: 0,
        unused_upd_space0: 0,
        serial_io_uart_input_clock: 0,
        pci_express_base_address: PCI_MMCFG_BASE,
        pci_express_region_length: PCI_EXPRESS_REGION_LENGTH,
        reserved: [0; 12],
    },
    terminator: UPD_TERMINATOR,
};

const_assert_eq!(core::mem::size_of::<FsptUpdHeader>(), 32);
const_assert_eq!(core::mem::size_of::<FsptCoreUpd>(), 32);
const_assert_eq!(core::mem::size_of::<FsptConfig>(), 28);
const_assert_eq!(core::mem::offset_of!(FsptUpd, terminator), 92);
const_assert_eq!(core::mem::size_of::<FsptUpd>(), 96);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_header_and_terminator_fixed() {
        assert_eq!(TEMP_RAM_INIT_PARAMS.header.signature, FSPT_UPD_SIGNATURE);
        assert_eq!(TEMP_RAM_INIT_PARAMS.header.revision, 1);
        assert_eq!(TEMP_RAM_INIT_PARAMS.terminator, 0x55AA);
    }

    #[test]
    fn code_region_spans_to_top_of_address_space() {
        assert_eq!(CODE_REGION_BASE.wrapping_add(CODE_REGION_SIZE), 0);
        assert_eq!(TEMP_RAM_INIT_PARAMS.core.code_region_size, 0x0032_0000);
    }

    #[test]
    fn serial_config_stays_disabled() {
        assert_eq!(TEMP_RAM_INIT_PARAMS.config.serial_io_uart_debug_enable, 0);
        assert_eq!(TEMP_RAM_INIT_PARAMS.config.pci_express_base_address, PCI_MMCFG_BASE);
        assert_eq!(
            TEMP_RAM_INIT_PARAMS.config.pci_express_region_length,
            PCI_EXPRESS_REGION_LENGTH
        );
    }
}
