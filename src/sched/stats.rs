//! Diagnostics
//!
//! Read-only snapshots and log dumps for the administrator tooling.
//! Everything here copies state out under the normal locks and must not
//! perturb scheduling decisions.

use crate::config::RUNQUEUE_CAPACITY;
use crate::kinfo;
use crate::time::{STime, MILLISECS};

use super::percpu;
use super::table::{slot_of, DOM_TABLE};
use super::types::{DomId, DomState};

/// Point-in-time copy of one domain's scheduling state.
#[derive(Clone, Copy, Debug)]
pub struct DomainSnapshot {
    pub id: DomId,
    pub cpu: usize,
    pub state: DomState,
    pub on_runqueue: bool,
    pub mcu_advance: u32,
    pub avt: u32,
    pub evt: u32,
    pub warp: bool,
    pub warpback: bool,
    pub cpu_time: STime,
}

/// Point-in-time copy of one CPU's queue and accounting state.
#[derive(Clone, Copy)]
pub struct CpuSnapshot {
    pub cpu: usize,
    pub svt: u32,
    pub current: DomId,
    pub s_deadline: STime,
    pub queue: [DomId; RUNQUEUE_CAPACITY],
    pub queue_len: usize,
    pub context_switches: u64,
    pub wakes: u64,
    pub rebases: u64,
}

pub fn domain_snapshot(id: DomId) -> Option<DomainSnapshot> {
    let table = DOM_TABLE.lock();
    let idx = slot_of(&table, id)?;
    let d = table[idx].as_ref()?;
    Some(DomainSnapshot {
        id: d.id,
        cpu: d.cpu as usize,
        state: d.state,
        on_runqueue: d.on_runqueue,
        mcu_advance: d.mcu_advance,
        avt: d.avt,
        evt: d.evt,
        warp: d.warp,
        warpback: d.warpback,
        cpu_time: d.cpu_time,
    })
}

pub fn cpu_snapshot(cpu: usize) -> CpuSnapshot {
    let sched = percpu::cpu_sched(cpu);
    let rq = sched.rq.lock();
    let mut queue = [DomId(0); RUNQUEUE_CAPACITY];
    let mut queue_len = 0;
    for id in rq.queue.iter() {
        queue[queue_len] = id;
        queue_len += 1;
    }
    let (context_switches, wakes, rebases) = percpu::counters(cpu);
    CpuSnapshot {
        cpu,
        svt: rq.svt,
        current: rq.current,
        s_deadline: rq.s_deadline,
        queue,
        queue_len,
        context_switches,
        wakes,
        rebases,
    }
}

/// Log a table of every admitted domain.
pub fn list_domains() {
    let table = DOM_TABLE.lock();
    kinfo!("  DOMAIN  CPU  STATE     MCUADV        AVT        EVT  WARP  CPUTIME(ms)");
    for slot in table.iter() {
        let Some(d) = slot else { continue };
        kinfo!(
            "  {:<6}  {:<3}  {:<8}  {:<6}  {:>9}  {:>9}  {}{}    {}",
            d.id,
            d.cpu,
            state_name(d.state),
            d.mcu_advance,
            d.avt,
            d.evt,
            if d.warp { 'W' } else { '-' },
            if d.warpback { 'B' } else { '-' },
            d.cpu_time / MILLISECS
        );
    }
}

/// Log one CPU's queue in order, with its accounting state.
pub fn dump_cpu_state(cpu: usize) {
    let snap = cpu_snapshot(cpu);
    kinfo!(
        "cpu{}: svt={} current={} ctxsw={} wakes={} rebases={}",
        cpu,
        snap.svt,
        snap.current,
        snap.context_switches,
        snap.wakes,
        snap.rebases
    );
    for (pos, id) in snap.queue[..snap.queue_len].iter().enumerate() {
        kinfo!("  [{}] {}", pos, id);
    }
}

fn state_name(state: DomState) -> &'static str {
    match state {
        DomState::Blocked => "blocked",
        DomState::Runnable => "runnable",
        DomState::Running => "running",
    }
}
