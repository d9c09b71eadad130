//! Scheduler subsystem
//!
//! This module implements Borrowed Virtual Time (BVT) scheduling for
//! guest domains, one scheduler instance per physical CPU.
//!
//! ## BVT Key Ideas
//! - **Actual virtual time (avt)**: accrues one unit per MCU (100us) of
//!   real run time, independent of weight
//! - **Effective virtual time (evt)**: `avt` minus `warp_value` while a
//!   domain is borrowing; selection always picks the lowest `evt`
//! - **Warp/unwarp**: latency-sensitive domains borrow against their
//!   future allocation, bounded by `warp_limit` and `unwarp_time`
//! - **Weights**: `mcu_advance` (inverse weight) scales the slice a
//!   domain is granted before the scheduler re-enters; heavier domains
//!   get shorter uninterrupted slices for the same lead
//!
//! ## Per-CPU Architecture
//!
//! Each CPU owns an ordered run queue of runnable domains plus an idle
//! sentinel that keeps the queue non-empty. The running domain is held
//! off the queue; `svt` tracks the queue's minimum `avt` so sleepers
//! rejoin without a windfall. Cross-CPU wakes take the target CPU's
//! lock.
//!
//! ## Module Organization
//!
//! - `types`: ids, records, parameters, constants
//! - `vtime`: pure virtual-time arithmetic
//! - `table`: global domain table and lifecycle
//! - `runqueue`: ordered per-CPU queue and the two-minimum scan
//! - `percpu`: per-CPU state, lock ordering, counters
//! - `core`: do_schedule / wake / sleep
//! - `timers`: warp-limit and unwarp-hold expiry handling
//! - `ctl`: administrative tuning
//! - `stats`: snapshots and log dumps

mod core;
mod ctl;
pub mod percpu;
pub mod runqueue;
mod stats;
pub mod table;
mod timers;
pub mod types;
pub mod vtime;

pub use types::{BvtParams, DomId, DomInfo, DomState, SchedDecision};
pub use types::{
    DEFAULT_CTX_ALLOW, DEFAULT_MCU_ADVANCE, DEFAULT_UNWARP_TIME, DEFAULT_WARP_LIMIT, MCU,
    SLICE_PER_VTU, SVT_HIGH_WATER, SVT_REBASE,
};

pub use table::{get_dom, on_admit, on_remove, set_domain_cpu};

pub use self::core::{do_schedule, init, init_cpu, sleep, wake};

pub use timers::on_timer;

pub use ctl::{adjust_domain, ctx_allow, domain_params, set_ctx_allow};

pub use stats::{cpu_snapshot, domain_snapshot, dump_cpu_state, list_domains, CpuSnapshot, DomainSnapshot};
