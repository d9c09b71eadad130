//! Virtual-time accounting
//!
//! Pure arithmetic over u32 virtual time. All additions and subtractions
//! wrap; the re-base in `core.rs` keeps values below the point where
//! wrapping would reorder comparisons.

use crate::time::STime;

use super::types::MCU;

/// Charge a domain for the wall time since it last went on CPU.
///
/// Accrual is in whole MCUs, rounded up, so a domain is never
/// under-charged. The inverse weight does not enter here; weighting is
/// applied when slices are computed.
pub fn advance(avt: u32, last_schd: STime, now: STime) -> u32 {
    let elapsed = now - last_schd;
    if elapsed <= 0 {
        return avt;
    }
    let mcus = ((elapsed + MCU - 1) / MCU) as u32;
    avt.wrapping_add(mcus)
}

/// Effective virtual time: warped domains run `warp_value` units in the
/// past, which is what lets them jump the queue.
pub fn effective(avt: u32, warp: bool, warp_value: i32) -> u32 {
    if warp {
        avt.wrapping_sub(warp_value as u32)
    } else {
        avt
    }
}

/// Wrap-aware strict ordering: is `a` earlier than `b`? Valid only while
/// the two values are within half the u32 range of each other, so it is
/// reserved for actively accounted times (the running domain against a
/// waker). A long-blocked domain's `avt` can trail `svt` by more than
/// that; the wake floor uses a plain comparison instead.
pub fn vt_before(a: u32, b: u32) -> bool {
    (a.wrapping_sub(b) as i32) < 0
}
