//! Control interface
//!
//! Administrative tuning: the global context-switch allowance and
//! per-domain BVT parameters. Bad values are rejected before any state
//! is touched; changes take effect on the next recomputation.

use core::sync::atomic::{AtomicI64, Ordering};

use crate::kinfo;
use crate::time::STime;

use super::table::{slot_of, DOM_TABLE};
use super::types::{BvtParams, DomId, DEFAULT_CTX_ALLOW};

static CTX_ALLOW: AtomicI64 = AtomicI64::new(DEFAULT_CTX_ALLOW);

/// Minimum slice granted on every dispatch, and the floor under every
/// computed slice.
pub fn ctx_allow() -> STime {
    CTX_ALLOW.load(Ordering::Relaxed)
}

pub fn set_ctx_allow(v: STime) -> Result<(), &'static str> {
    if v < 0 {
        return Err("negative context-switch allowance");
    }
    CTX_ALLOW.store(v, Ordering::Relaxed);
    kinfo!("sched: ctx_allow set to {} ns", v);
    Ok(())
}

/// Current tunables of `id`.
pub fn domain_params(id: DomId) -> Result<BvtParams, &'static str> {
    let table = DOM_TABLE.lock();
    let idx = slot_of(&table, id).ok_or("unknown domain id")?;
    let d = table[idx].as_ref().ok_or("unknown domain id")?;
    Ok(BvtParams {
        mcu_advance: d.mcu_advance,
        warpback: d.warpback,
        warp_value: d.warp_value,
        warp_limit: d.warp_limit,
        unwarp_time: d.unwarp_time,
    })
}

/// Replace the tunables of `id`. A domain with `warpback` set starts
/// warping immediately; the effect on ordering shows up at the next
/// effective-virtual-time recomputation, never retroactively.
pub fn adjust_domain(id: DomId, params: BvtParams) -> Result<(), &'static str> {
    if params.mcu_advance == 0 {
        return Err("mcu_advance must be non-zero");
    }
    if params.warp_limit < 0 || params.unwarp_time < 0 {
        return Err("negative warp limit");
    }

    let mut table = DOM_TABLE.lock();
    let idx = slot_of(&table, id).ok_or("unknown domain id")?;
    let d = table[idx].as_mut().ok_or("unknown domain id")?;

    d.mcu_advance = params.mcu_advance;
    d.warpback = params.warpback;
    d.warp_value = params.warp_value;
    d.warp_limit = params.warp_limit;
    d.unwarp_time = params.unwarp_time;
    // evt is left alone; the next fold-back or wake recomputes it from
    // the new warp state.
    d.warp = d.warpback;

    kinfo!(
        "sched: {} params: mcu_advance={} warpback={} warp_value={} warpl={} warpu={}",
        id,
        params.mcu_advance,
        params.warpback,
        params.warp_value,
        params.warp_limit,
        params.unwarp_time
    );
    Ok(())
}
