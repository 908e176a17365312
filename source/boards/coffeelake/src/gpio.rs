// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! UART pad routing for the Coffeelake-LP GPP_C community.
//!
//! The pad descriptors here are handed to the silicon GPIO library; this
//! crate only owns the table and the per-channel slicing.

use bitflags::bitflags;

/// SerialIo UART controllers wired to muxable pads on this PCH.
pub const MAX_SERIAL_IO_UARTS: u8 = 3;

/// Pad identifier: community group in the high half, pad number in the low.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpioPad(u32);

impl GpioPad {
    pub const fn new(group: u16, pad: u16) -> Self {
        Self(((group as u32) << 16) | pad as u32)
    }

    /// Raw encoding understood by the GPIO library.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// GPP_C group id on Coffeelake-LP.
pub const GROUP_GPP_C: u16 = 0x02;

pub const GPP_C8: GpioPad = GpioPad::new(GROUP_GPP_C, 8);
pub const GPP_C9: GpioPad = GpioPad::new(GROUP_GPP_C, 9);
pub const GPP_C12: GpioPad = GpioPad::new(GROUP_GPP_C, 12);
pub const GPP_C13: GpioPad = GpioPad::new(GROUP_GPP_C, 13);
pub const GPP_C20: GpioPad = GpioPad::new(GROUP_GPP_C, 20);
pub const GPP_C21: GpioPad = GpioPad::new(GROUP_GPP_C, 21);

/// Pad function selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadMode {
    Gpio,
    Native1,
    Native2,
    Native3,
    Native4,
}

/// Which host agent owns the pad after configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostOwnership {
    Default,
    Acpi,
    Gpio,
}

/// Pad direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Default,
    In,
    Out,
    InOut,
    None,
}

/// Initial output level for output-capable pads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputState {
    Default,
    Low,
    High,
}

bitflags! {
    /// Pad interrupt routing and trigger selection.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct IntConfig: u32 {
        const DISABLE = 1 << 0;
        const NMI = 1 << 1;
        const SMI = 1 << 2;
        const IOAPIC = 1 << 3;
        const SCI = 1 << 4;
        const LEVEL = 1 << 5;
        const EDGE = 1 << 6;
    }
}

/// Reset domain that clears the pad configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetConfig {
    Default,
    PowerGood,
    DeepReset,
    HostReset,
}

/// Pull termination applied to the pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Default,
    None,
    PullDown20K,
    PullUp1K,
    PullUp20K,
    Native,
}

/// Pad configuration descriptor consumed by the GPIO library.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PadConfig {
    pub mode: PadMode,
    pub ownership: HostOwnership,
    pub direction: Direction,
    pub output: OutputState,
    pub interrupt: IntConfig,
    pub reset: ResetConfig,
    pub termination: Termination,
}

/// One row of a pad-initialization table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PadEntry {
    pub pad: GpioPad,
    pub config: PadConfig,
}

impl PadEntry {
    const fn new(pad: GpioPad, config: PadConfig) -> Self {
        Self { pad, config }
    }
}

// All UART pads share one shape: native function 1, host-owned, no
// direction override, interrupts off, cleared on deep reset.
const UART_PAD: PadConfig = PadConfig {
    mode: PadMode::Native1,
    ownership: HostOwnership::Gpio,
    direction: Direction::None,
    output: OutputState::Default,
    interrupt: IntConfig::DISABLE,
    reset: ResetConfig::DeepReset,
    termination: Termination::None,
};

/// SerialIo UART pads: channels 0..=2, RX before TX per channel.
pub static UART_PAD_TABLE: [PadEntry; 6] = [
    PadEntry::new(GPP_C8, UART_PAD),  // UART0 RXD
    PadEntry::new(GPP_C9, UART_PAD),  // UART0 TXD
    PadEntry::new(GPP_C12, UART_PAD), // UART1 RXD
    PadEntry::new(GPP_C13, UART_PAD), // UART1 TXD
    PadEntry::new(GPP_C20, UART_PAD), // UART2 RXD
    PadEntry::new(GPP_C21, UART_PAD), // UART2 TXD
];

/// The (RX, TX) pad pair for an internal UART channel.
///
/// Returns `None` for the external-UART sentinel and anything else outside
/// the internal controller range; those ports have no pads to mux.
pub fn uart_pads(port: u8) -> Option<&'static [PadEntry]> {
    if port >= MAX_SERIAL_IO_UARTS {
        return None;
    }
    let start = usize::from(port) * 2;
    Some(&UART_PAD_TABLE[start..start + 2])
}
