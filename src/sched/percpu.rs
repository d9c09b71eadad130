//! Per-CPU scheduler state
//!
//! One `CpuSched` per physical CPU, statically allocated. The run-queue
//! mutex guards the ordered queue, the scheduled virtual time `svt`, the
//! current domain, and the armed reschedule deadline.
//!
//! Lock ordering, outermost first:
//!   1. `table::DOM_TABLE`
//!   2. a per-CPU run-queue lock (`CpuSched::rq`)
//! Never take the table lock while holding a run-queue lock, and never
//! hold two run-queue locks at once.

use core::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex;

use crate::config::MAX_CPUS;
use crate::time::STime;

use super::runqueue::RunQueue;
use super::types::DomId;

/// Fields guarded by the run-queue lock.
pub struct CpuRq {
    pub queue: RunQueue,
    /// Scheduled virtual time: minimum `avt` over the queue at the last
    /// selection. Wake re-bases stale sleepers against this.
    pub svt: u32,
    /// The domain currently on this CPU. Real domains are held off the
    /// queue while current; the idle sentinel stays queued.
    pub current: DomId,
    /// Absolute expiry of the reschedule timer armed by the last
    /// decision. The wake path tightens this to preempt sooner.
    pub s_deadline: STime,
    /// Set once `init_cpu` has installed the idle sentinel.
    pub online: bool,
}

pub struct CpuSched {
    pub rq: Mutex<CpuRq>,
    pub context_switches: AtomicU64,
    pub wakes: AtomicU64,
    pub rebases: AtomicU64,
}

impl CpuSched {
    const fn new() -> Self {
        Self {
            rq: Mutex::new(CpuRq {
                queue: RunQueue::new(),
                svt: 0,
                current: DomId(0),
                s_deadline: 0,
                online: false,
            }),
            context_switches: AtomicU64::new(0),
            wakes: AtomicU64::new(0),
            rebases: AtomicU64::new(0),
        }
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const CPU_INIT: CpuSched = CpuSched::new();
static CPUS: [CpuSched; MAX_CPUS] = [CPU_INIT; MAX_CPUS];

/// Per-CPU scheduler state for `cpu`.
pub fn cpu_sched(cpu: usize) -> &'static CpuSched {
    assert!(cpu < MAX_CPUS, "cpu id out of range");
    &CPUS[cpu]
}

/// Current scheduled virtual time of `cpu`'s queue.
pub fn svt(cpu: usize) -> u32 {
    cpu_sched(cpu).rq.lock().svt
}

/// Lock-free counter snapshot: (context switches, wakes, re-bases).
pub fn counters(cpu: usize) -> (u64, u64, u64) {
    let c = cpu_sched(cpu);
    (
        c.context_switches.load(Ordering::Relaxed),
        c.wakes.load(Ordering::Relaxed),
        c.rebases.load(Ordering::Relaxed),
    )
}
