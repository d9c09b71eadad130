//! hvcore Test Suite
//!
//! This crate tests the scheduling core by directly including its source
//! files. This bypasses no_std restrictions while testing the actual
//! scheduler logic.
//!
//! # How it works
//! 1. We define stub macros (kinfo!, ktrace!, etc.) that map to eprintln! or no-op
//! 2. We use `#[path = "..."]` to include the core's source files directly
//! 3. The `core::` references in the source work because std re-exports core
//!
//! This allows testing real scheduler code without booting a hypervisor.

// ===========================================================================
// Logging macro stubs - these replace the core's macros for testing
// ===========================================================================

/// Stub for the core's kinfo! macro - prints to stderr in tests
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        eprintln!("[INFO] {}", format_args!($($arg)*));
    }};
}

/// Stub for the core's ktrace! macro - no-op in tests (too verbose)
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => {{}};
}

/// Stub for the core's kwarn! macro - prints to stderr in tests
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        eprintln!("[WARN] {}", format_args!($($arg)*));
    }};
}

/// Stub for the core's kerror! macro - prints to stderr in tests
#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        eprintln!("[ERROR] {}", format_args!($($arg)*));
    }};
}

/// Stub for the core's kfatal! macro - prints to stderr in tests
#[macro_export]
macro_rules! kfatal {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        eprintln!("[FATAL] {}", format_args!($($arg)*));
    }};
}

/// Stub for the core's kdebug! macro - no-op in tests
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {{}};
}

// ===========================================================================
// Import the core's source files directly using #[path]
// ===========================================================================

#[path = "../../src/config.rs"]
pub mod config;

#[path = "../../src/time.rs"]
pub mod time;

#[path = "../../src/platform.rs"]
pub mod platform;

#[path = "../../src/sched/mod.rs"]
pub mod sched;

// logger.rs and serial.rs are deliberately not included: they talk to
// the TSC and the UART, and the macro stubs above replace them.

// ===========================================================================
// Platform mock (simulates the embedding kernel, NOT scheduler logic)
// ===========================================================================

pub mod mock;

// ===========================================================================
// Test modules
// ===========================================================================
