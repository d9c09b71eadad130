//! Borrow timer controller
//!
//! A warped domain may borrow for at most `warp_limit` of continuous run
//! time, then must sit out `unwarp_time` before borrowing again. Both
//! limits are enforced by per-domain platform timers whose firings come
//! back through [`on_timer`] in timer-interrupt context.
//!
//! The armed flags on the record carry the at-most-one-pending contract:
//! a fired or cancelled timer clears its flag, and a firing that arrives
//! after cancellation sees the flag down and is ignored.

use crate::platform::{platform, SchedPlatform, TimerEvent, TimerKind};
use crate::time::STime;
use crate::{kdebug, kwarn};

use super::table::{slot_of, DOM_TABLE};
use super::types::DomInfo;

/// Timer-interrupt entry point. Takes the scheduler locks itself; only
/// ever requests a reschedule, never performs one.
pub fn on_timer(ev: TimerEvent) {
    let p = platform();
    let mut table = DOM_TABLE.lock();
    let idx = match slot_of(&table, ev.dom) {
        Some(idx) => idx,
        None => {
            kwarn!("sched: timer fired for unknown domain {}", ev.dom);
            return;
        }
    };
    let d = match table[idx].as_mut() {
        Some(d) => d,
        None => return,
    };

    match ev.kind {
        TimerKind::WarpLimit => warp_expired(d, p),
        TimerKind::UnwarpHold => unwarp_expired(d, p),
    }
}

/// The domain has been borrowing for its full warp limit.
fn warp_expired(d: &mut DomInfo, p: &dyn SchedPlatform) {
    if !d.warp_armed {
        // Cancelled after the firing was already in flight.
        return;
    }
    d.warp_armed = false;
    d.warp = false;

    if d.unwarp_time == 0 {
        // No cooldown configured: borrowing stops outright until the
        // administrator re-enables it.
        d.warpback = false;
    } else {
        d.unwarp_armed = true;
        p.arm_dom_timer(
            TimerEvent {
                dom: d.id,
                kind: TimerKind::UnwarpHold,
            },
            p.now() + d.unwarp_time,
        );
    }

    kdebug!("sched: {} warp limit expired", d.id);
    p.raise_resched(d.cpu as usize);
}

/// The mandatory non-borrowing interval has elapsed.
fn unwarp_expired(d: &mut DomInfo, p: &dyn SchedPlatform) {
    if !d.unwarp_armed {
        return;
    }
    d.unwarp_armed = false;

    if d.warpback {
        d.warp = true;
        kdebug!("sched: {} resumes warping", d.id);
        p.raise_resched(d.cpu as usize);
    }
}

/// Arm the warp-limit timer for a domain going on CPU warped.
pub(super) fn arm_warp_limit(d: &mut DomInfo, p: &dyn SchedPlatform, now: STime) {
    d.warp_armed = true;
    p.arm_dom_timer(
        TimerEvent {
            dom: d.id,
            kind: TimerKind::WarpLimit,
        },
        now + d.warp_limit,
    );
}

/// Cancel whatever borrow timers `d` has pending. Called on every
/// fold-back so a stale firing can never land on a record whose state
/// has moved on. No-op for unarmed timers.
pub(super) fn cancel_dom_timers(d: &mut DomInfo, p: &dyn SchedPlatform) {
    if d.warp_armed {
        d.warp_armed = false;
        p.cancel_dom_timer(TimerEvent {
            dom: d.id,
            kind: TimerKind::WarpLimit,
        });
    }
    if d.unwarp_armed {
        d.unwarp_armed = false;
        p.cancel_dom_timer(TimerEvent {
            dom: d.id,
            kind: TimerKind::UnwarpHold,
        });
    }
}
