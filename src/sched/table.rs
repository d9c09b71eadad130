//! Domain table and global scheduler state
//!
//! One slot per admitted domain. The table mutex is the outermost lock
//! of the subsystem; see `percpu.rs` for the full ordering.

use spin::Mutex;

use crate::config::MAX_DOMAINS;
use crate::{kdebug, kinfo};

use super::percpu;
use super::types::{DomId, DomInfo, DomState};

/// All admitted domains, idle sentinels included.
pub static DOM_TABLE: Mutex<[Option<DomInfo>; MAX_DOMAINS]> = Mutex::new([None; MAX_DOMAINS]);

/// Lock the domain table for direct access.
pub fn dom_table_lock() -> spin::MutexGuard<'static, [Option<DomInfo>; MAX_DOMAINS]> {
    DOM_TABLE.lock()
}

/// Table index of `id`, if admitted.
pub(super) fn slot_of(table: &[Option<DomInfo>; MAX_DOMAINS], id: DomId) -> Option<usize> {
    table.iter().position(|slot| match slot {
        Some(d) => d.id == id,
        None => false,
    })
}

/// Copy of the scheduling record for `id`.
pub fn get_dom(id: DomId) -> Option<DomInfo> {
    let table = DOM_TABLE.lock();
    slot_of(&table, id).and_then(|idx| table[idx])
}

/// Admit a domain to the scheduler on `cpu`. Its virtual times start at
/// the CPU's current `svt` so it competes fairly with the incumbents; it
/// enters `Blocked` and joins the run queue on its first wake.
pub fn on_admit(id: DomId, cpu: usize) -> Result<(), &'static str> {
    if cpu >= crate::config::MAX_CPUS {
        return Err("cpu id out of range");
    }
    if id.is_idle_id() {
        return Err("domain id in reserved idle range");
    }

    let mut table = DOM_TABLE.lock();
    if slot_of(&table, id).is_some() {
        return Err("domain id already admitted");
    }

    let free = table
        .iter()
        .position(|slot| slot.is_none())
        .ok_or("domain table full")?;

    let svt = percpu::svt(cpu);
    table[free] = Some(DomInfo::new(id, cpu as u16, svt));
    kinfo!("sched: admitted {} on cpu{} (svt={})", id, cpu, svt);
    Ok(())
}

/// Remove a domain from the scheduler. The caller must have taken it off
/// CPU and off the run queue first; a record still queued, still running,
/// or with an armed borrow timer indicates lifecycle corruption.
pub fn on_remove(id: DomId) -> Result<(), &'static str> {
    let mut table = DOM_TABLE.lock();
    let idx = slot_of(&table, id).ok_or("unknown domain id")?;
    let d = table[idx].as_ref().ok_or("unknown domain id")?;

    assert!(!d.on_runqueue, "removing a queued domain");
    assert!(d.state != DomState::Running, "removing a running domain");
    assert!(
        !d.warp_armed && !d.unwarp_armed,
        "removing a domain with an armed borrow timer"
    );

    table[idx] = None;
    kinfo!("sched: removed {}", id);
    Ok(())
}

/// Re-home a blocked domain onto another CPU. The next wake re-bases its
/// virtual time against the new queue's `svt`.
pub fn set_domain_cpu(id: DomId, cpu: usize) -> Result<(), &'static str> {
    if cpu >= crate::config::MAX_CPUS {
        return Err("cpu id out of range");
    }

    let mut table = DOM_TABLE.lock();
    let idx = slot_of(&table, id).ok_or("unknown domain id")?;
    let d = table[idx].as_mut().ok_or("unknown domain id")?;

    if d.on_runqueue || d.state != DomState::Blocked {
        return Err("domain is active; block it before re-homing");
    }

    kdebug!("sched: {} re-homed cpu{} -> cpu{}", id, d.cpu, cpu);
    d.cpu = cpu as u16;
    d.migrated = true;
    Ok(())
}
