//! Scheduler type definitions
//!
//! Types and constants shared across the BVT scheduling subsystem.

use core::fmt;

use crate::time::{STime, MICROSECS, MILLISECS};

/// Minimum charging unit: virtual time accrues in whole MCUs of real time.
pub const MCU: STime = 100 * MICROSECS;

/// Default inverse weight. One MCU of real time advances `avt` by one
/// unit; `mcu_advance` scales the slice a domain is granted, not accrual.
pub const DEFAULT_MCU_ADVANCE: u32 = 10;

/// Default context-switch allowance.
pub const DEFAULT_CTX_ALLOW: STime = 5 * MILLISECS;

/// Default borrow limits for a freshly admitted domain.
pub const DEFAULT_WARP_LIMIT: STime = 2000 * MILLISECS;
pub const DEFAULT_UNWARP_TIME: STime = 1000 * MILLISECS;

/// Real time granted per weighted unit of effective-virtual-time lead
/// when computing a slice.
pub const SLICE_PER_VTU: STime = MILLISECS;

/// When the per-CPU minimum `avt` crosses this line, every domain on the
/// CPU is re-based downward to keep u32 virtual time from wrapping.
pub const SVT_HIGH_WATER: u32 = 0xf000_0000;

/// Amount subtracted from every virtual time during a re-base.
pub const SVT_REBASE: u32 = 0xe000_0000;

/// Virtual time pinned on idle sentinels so any real domain beats them.
pub const IDLE_VTIME: u32 = u32::MAX;

/// Reserved id range for per-CPU idle sentinels.
const IDLE_DOMAIN_BASE: u32 = 0x7fff_0000;

/// Identifies a schedulable entity (a domain's virtual CPU).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomId(pub u32);

impl DomId {
    /// The idle sentinel id for `cpu`.
    pub const fn idle(cpu: usize) -> Self {
        DomId(IDLE_DOMAIN_BASE + cpu as u32)
    }

    pub const fn is_idle_id(self) -> bool {
        self.0 >= IDLE_DOMAIN_BASE
    }
}

impl fmt::Display for DomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_idle_id() {
            write!(f, "idle{}", self.0 - IDLE_DOMAIN_BASE)
        } else {
            write!(f, "d{}", self.0)
        }
    }
}

/// Scheduling state of a domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomState {
    /// Asleep or blocked; not on any run queue.
    Blocked,
    /// Waiting on its CPU's run queue.
    Runnable,
    /// Current on its CPU, held off the run queue (idle excepted).
    Running,
}

/// Per-domain scheduling record, one table slot per admitted domain.
#[derive(Clone, Copy)]
pub struct DomInfo {
    pub id: DomId,
    pub cpu: u16,           // owning physical CPU
    pub state: DomState,
    pub is_idle: bool,      // idle sentinel: avt/evt pinned at IDLE_VTIME
    pub on_runqueue: bool,  // membership marker, at most one queue
    pub migrated: bool,     // re-homed; next wake re-bases avt
    pub mcu_advance: u32,   // inverse weight, never zero
    pub avt: u32,           // actual virtual time
    pub evt: u32,           // effective virtual time
    pub warp: bool,         // currently running warped
    pub warpback: bool,     // permission to warp at all
    pub warp_value: i32,    // virtual-time credit while warped
    pub warp_limit: STime,  // max continuous warped time, 0 = unlimited
    pub unwarp_time: STime, // cooldown before warping again
    pub warp_armed: bool,   // warp-limit timer pending
    pub unwarp_armed: bool, // unwarp-hold timer pending
    pub last_schd: STime,   // wall time this domain last went on CPU
    pub cpu_time: STime,    // accumulated run time
}

impl DomInfo {
    /// Fresh record with admission defaults. Virtual times start at the
    /// caller-supplied `svt` so the newcomer competes fairly.
    pub const fn new(id: DomId, cpu: u16, svt: u32) -> Self {
        Self {
            id,
            cpu,
            state: DomState::Blocked,
            is_idle: false,
            on_runqueue: false,
            migrated: false,
            mcu_advance: DEFAULT_MCU_ADVANCE,
            avt: svt,
            evt: svt,
            warp: false,
            warpback: false,
            warp_value: 0,
            warp_limit: DEFAULT_WARP_LIMIT,
            unwarp_time: DEFAULT_UNWARP_TIME,
            warp_armed: false,
            unwarp_armed: false,
            last_schd: 0,
            cpu_time: 0,
        }
    }

    /// Idle sentinel record for `cpu`.
    pub const fn new_idle(cpu: u16) -> Self {
        let mut d = Self::new(DomId::idle(cpu as usize), cpu, IDLE_VTIME);
        d.is_idle = true;
        d
    }
}

/// Administrator-tunable per-domain parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BvtParams {
    pub mcu_advance: u32,
    pub warpback: bool,
    pub warp_value: i32,
    pub warp_limit: STime,
    pub unwarp_time: STime,
}

/// What `do_schedule` tells the dispatcher: who runs, and for how long
/// before the scheduler must be re-entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedDecision {
    pub dom: DomId,
    pub slice: STime,
}
