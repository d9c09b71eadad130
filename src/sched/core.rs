//! Decision engine
//!
//! The BVT selection loop: fold the previous domain back onto the queue,
//! pick the lowest effective virtual time, size its slice from its lead
//! over the runner-up, and hand the (domain, slice) pair to the
//! dispatcher. Wake and sleep feed the queue from the outside.
//!
//! Runnable domains wait on the queue; the domain actually on CPU is
//! held off it, with the idle sentinel as the one exception so the queue
//! can never be empty.

use core::sync::atomic::Ordering;

use crate::config::MAX_CPUS;
use crate::platform::platform;
use crate::time::STime;
use crate::{kdebug, kinfo, ktrace, kwarn};

use super::ctl;
use super::percpu::{self, CpuRq};
use super::table::{slot_of, DOM_TABLE};
use super::timers;
use super::types::{
    DomId, DomInfo, DomState, SchedDecision, IDLE_VTIME, SLICE_PER_VTU, SVT_HIGH_WATER, SVT_REBASE,
};
use super::vtime;

/// One-time subsystem banner.
pub fn init() {
    kinfo!(
        "BVT scheduler initialized ({} cpus max, {} domains max)",
        MAX_CPUS,
        crate::config::MAX_DOMAINS
    );
}

/// Bring `cpu`'s scheduler online: admit its idle sentinel, queue it,
/// and make it current. Must run before any wake or reschedule targets
/// the CPU.
pub fn init_cpu(cpu: usize) {
    let mut table = DOM_TABLE.lock();
    let sched = percpu::cpu_sched(cpu);
    let mut rq = sched.rq.lock();
    assert!(!rq.online, "scheduler already online on this cpu");

    let idle = DomInfo::new_idle(cpu as u16);
    let idle_id = idle.id;
    let free = table
        .iter()
        .position(|slot| slot.is_none())
        .unwrap_or_else(|| panic!("domain table full at cpu bring-up"));
    table[free] = Some(idle);

    rq.queue.insert_head(&mut table, idle_id);
    if let Some(d) = table[free].as_mut() {
        d.state = DomState::Running;
    }
    rq.current = idle_id;
    rq.svt = 0;
    rq.s_deadline = 0;
    rq.online = true;

    kinfo!("sched: cpu{} online, idle sentinel {}", cpu, idle_id);
}

/// Make `id` runnable and queue it on its CPU, preempting or tightening
/// the running domain's deadline as its effective virtual time warrants.
/// Waking a domain that is already queued or running is a no-op.
pub fn wake(id: DomId) {
    let p = platform();
    let mut table = DOM_TABLE.lock();
    let idx = match slot_of(&table, id) {
        Some(idx) => idx,
        None => {
            kwarn!("sched: wake of unknown domain {}", id);
            return;
        }
    };

    let cpu = match table[idx].as_ref() {
        Some(d) => d.cpu as usize,
        None => return,
    };
    let sched = percpu::cpu_sched(cpu);
    let mut rq = sched.rq.lock();
    assert!(rq.online, "wake before cpu bring-up");

    {
        let d = match table[idx].as_mut() {
            Some(d) => d,
            None => return,
        };
        if d.on_runqueue || d.state == DomState::Running {
            return;
        }
        d.state = DomState::Runnable;

        // A sleeper whose avt fell behind the queue would otherwise be
        // handed all the CPU time it did not consume while blocked.
        // Re-homed domains get a fresh base on the new queue for the
        // same reason. Plain comparison: a sleeper can trail svt by
        // more than half the u32 range, where the wrap-aware ordering
        // gives the wrong answer.
        if d.avt < rq.svt || d.migrated {
            d.avt = rq.svt;
            d.migrated = false;
        }
        d.evt = vtime::effective(d.avt, d.warp, d.warp_value);
        // Warp is never granted here, even with warpback set; borrowing
        // state changes only through the control interface and the
        // borrow timers.
    }

    rq.queue.insert_head(&mut table, id);
    sched.wakes.fetch_add(1, Ordering::Relaxed);

    let woken_evt = match table[idx].as_ref() {
        Some(d) => d.evt,
        None => return,
    };

    let curr_idx = slot_of(&table, rq.current)
        .unwrap_or_else(|| panic!("current domain {} missing from table", rq.current));
    let curr = match table[curr_idx].as_ref() {
        Some(d) => *d,
        None => return,
    };

    if curr.is_idle {
        p.raise_resched(cpu);
        return;
    }

    let now = p.now();
    let curr_avt = vtime::advance(curr.avt, curr.last_schd, now);
    let curr_evt = vtime::effective(curr_avt, curr.warp, curr.warp_value);

    if !vtime::vt_before(curr_evt, woken_evt) {
        // The newcomer is at or ahead of the running domain; switch now.
        p.raise_resched(cpu);
    } else {
        // Let the running domain keep its lead, but no longer than it
        // takes that lead to drain against the newcomer.
        let lead = woken_evt.wrapping_sub(curr_evt) as i64;
        let deadline = curr.last_schd
            + (lead / curr.mcu_advance as i64) * SLICE_PER_VTU
            + ctl::ctx_allow();
        if deadline < rq.s_deadline {
            rq.s_deadline = deadline;
            p.mod_sched_timer(cpu, deadline);
        }
    }
}

/// Block `id`. A running domain keeps the CPU until the reschedule this
/// raises; a queued one is removed immediately.
pub fn sleep(id: DomId) {
    let p = platform();
    let mut table = DOM_TABLE.lock();
    let idx = match slot_of(&table, id) {
        Some(idx) => idx,
        None => {
            kwarn!("sched: sleep of unknown domain {}", id);
            return;
        }
    };
    let cpu = match table[idx].as_ref() {
        Some(d) => d.cpu as usize,
        None => return,
    };
    let sched = percpu::cpu_sched(cpu);
    let mut rq = sched.rq.lock();

    let was_running = {
        let d = match table[idx].as_mut() {
            Some(d) => d,
            None => return,
        };
        assert!(!d.is_idle, "blocking the idle sentinel");
        let was_running = d.state == DomState::Running;
        d.state = DomState::Blocked;
        was_running
    };

    if was_running {
        p.raise_resched(cpu);
    } else {
        rq.queue.remove(&mut table, id);
    }
}

/// The reschedule entry point: account the outgoing domain, pick the
/// next one, and size its slice. The dispatcher must re-enter no later
/// than `now + slice`.
pub fn do_schedule(cpu: usize, now: STime) -> SchedDecision {
    let p = platform();
    let sched = percpu::cpu_sched(cpu);
    let mut table = DOM_TABLE.lock();
    let mut rq = sched.rq.lock();
    assert!(rq.online, "reschedule before cpu bring-up");

    let prev_id = rq.current;
    fold_back(&mut table, &mut rq, prev_id, now);

    let scan = rq.queue.scan_min_two(&table);
    if scan.min_avt != IDLE_VTIME {
        rq.svt = scan.min_avt;
    }

    if rq.svt >= SVT_HIGH_WATER {
        rebase_virtual_time(&mut table, &mut rq, cpu);
        sched.rebases.fetch_add(1, Ordering::Relaxed);
    }

    let next_idx = slot_of(&table, scan.next)
        .unwrap_or_else(|| panic!("selected domain {} missing from table", scan.next));
    let next = match table[next_idx].as_ref() {
        Some(d) => *d,
        None => panic!("selected domain {} missing from table", scan.next),
    };

    let ctx_allow = ctl::ctx_allow();
    let slice = if next.is_idle {
        // Nothing runnable; check back in one allowance.
        ctx_allow
    } else {
        match scan.next_prime {
            Some((prime_id, prime_evt)) if !prime_id.is_idle_id() => {
                let lead = prime_evt.wrapping_sub(scan.next_evt) as i64;
                let slice = (lead / next.mcu_advance as i64) * SLICE_PER_VTU + ctx_allow;
                assert!(slice >= ctx_allow, "computed slice below ctx_allow");
                slice
            }
            // Only the idle sentinel competes; grant a long slice.
            _ => 10 * ctx_allow,
        }
    };

    if !next.is_idle {
        rq.queue.remove(&mut table, scan.next);
    }
    if let Some(d) = table[next_idx].as_mut() {
        d.state = DomState::Running;
        d.last_schd = now;
        if d.warp && d.warp_limit > 0 {
            timers::arm_warp_limit(d, p, now);
        }
    }

    rq.current = scan.next;
    rq.s_deadline = now + slice;
    if scan.next != prev_id {
        sched.context_switches.fetch_add(1, Ordering::Relaxed);
        kdebug!(
            "sched: cpu{} {} -> {} (evt={} svt={} slice={}us)",
            cpu,
            prev_id,
            scan.next,
            scan.next_evt,
            rq.svt,
            slice / crate::time::MICROSECS
        );
    } else {
        ktrace!(
            "sched: cpu{} keeps {} (slice={}us)",
            cpu,
            scan.next,
            slice / crate::time::MICROSECS
        );
    }

    SchedDecision {
        dom: scan.next,
        slice,
    }
}

/// Account the outgoing domain and return it to the queue if it is
/// still runnable. A domain that blocked mid-run stays off the queue;
/// the idle sentinel never left it.
fn fold_back(
    table: &mut [Option<DomInfo>; crate::config::MAX_DOMAINS],
    rq: &mut CpuRq,
    prev_id: DomId,
    now: STime,
) {
    let p = platform();
    let idx = slot_of(table, prev_id)
        .unwrap_or_else(|| panic!("current domain {} missing from table", prev_id));
    let still_running = {
        let d = match table[idx].as_mut() {
            Some(d) => d,
            None => panic!("current domain {} missing from table", prev_id),
        };

        if !d.is_idle {
            d.avt = vtime::advance(d.avt, d.last_schd, now);
            d.evt = vtime::effective(d.avt, d.warp, d.warp_value);
        }
        if now > d.last_schd {
            d.cpu_time += now - d.last_schd;
        }
        timers::cancel_dom_timers(d, p);

        let still_running = d.state == DomState::Running;
        if still_running {
            d.state = DomState::Runnable;
        }
        still_running && !d.is_idle
    };

    if still_running {
        rq.queue.insert_tail(table, prev_id);
    }
}

/// Shift every domain homed on `cpu` down by `SVT_REBASE` so u32 virtual
/// time stays clear of wraparound. Blocked domains are included; their
/// next wake compares against the shifted `svt`. Pairwise order is
/// unchanged since every value moves by the same amount.
fn rebase_virtual_time(
    table: &mut [Option<DomInfo>; crate::config::MAX_DOMAINS],
    rq: &mut CpuRq,
    cpu: usize,
) {
    for slot in table.iter_mut() {
        let Some(d) = slot else { continue };
        if d.cpu as usize != cpu || d.is_idle {
            continue;
        }
        d.avt = d.avt.wrapping_sub(SVT_REBASE);
        d.evt = d.evt.wrapping_sub(SVT_REBASE);
    }
    rq.svt = rq.svt.wrapping_sub(SVT_REBASE);
    kdebug!("sched: cpu{} virtual time re-based, svt={}", cpu, rq.svt);
}
