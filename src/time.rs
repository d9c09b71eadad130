//! System time representation.
//!
//! All scheduler arithmetic is done on `STime`, a signed 64-bit count of
//! nanoseconds since boot. Signed so that deadline comparisons survive
//! subtraction without wrapping; at nanosecond resolution the sign bit
//! buys us just under 300 years of uptime.

/// Nanoseconds since boot.
pub type STime = i64;

pub const NANOSECS: STime = 1;
pub const MICROSECS: STime = 1_000;
pub const MILLISECS: STime = 1_000_000;
pub const SECONDS: STime = 1_000_000_000;

/// `n` microseconds as an `STime`.
#[inline]
pub const fn microsecs(n: i64) -> STime {
    n * MICROSECS
}

/// `n` milliseconds as an `STime`.
#[inline]
pub const fn millisecs(n: i64) -> STime {
    n * MILLISECS
}

/// `n` seconds as an `STime`.
#[inline]
pub const fn seconds(n: i64) -> STime {
    n * SECONDS
}
