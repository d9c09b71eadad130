//! Per-CPU ordered run queue
//!
//! A fixed-capacity list of domain ids in queue order. Insertion order
//! is significant: the selection scan breaks effective-virtual-time ties
//! in favor of the earlier queue position, which is what makes
//! insert-at-head wakes preempt promptly. Scans are O(n) linear passes
//! over a small array; there is no sorted structure to maintain.
//!
//! All operations require the owning CPU's run-queue lock. Membership is
//! double-checked against the record's `on_runqueue` marker so a domain
//! can never sit on two queues at once.

use crate::config::{MAX_DOMAINS, RUNQUEUE_CAPACITY};

use super::table::slot_of;
use super::types::{DomId, DomInfo, IDLE_VTIME};

/// Result of the two-minimum selection scan.
#[derive(Clone, Copy, Debug)]
pub struct Scan {
    /// Lowest-evt domain on the queue (earliest position wins ties).
    pub next: DomId,
    pub next_evt: u32,
    /// Second-lowest, if at least two domains are queued.
    pub next_prime: Option<(DomId, u32)>,
    /// Minimum actual virtual time seen, `IDLE_VTIME` if only idle.
    pub min_avt: u32,
}

pub struct RunQueue {
    order: [DomId; RUNQUEUE_CAPACITY],
    len: usize,
}

impl RunQueue {
    pub const fn new() -> Self {
        Self {
            order: [DomId(0); RUNQUEUE_CAPACITY],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: DomId) -> bool {
        self.order[..self.len].iter().any(|&d| d == id)
    }

    /// Ids in queue order.
    pub fn iter(&self) -> impl Iterator<Item = DomId> + '_ {
        self.order[..self.len].iter().copied()
    }

    /// Queue a freshly woken domain at the head so it is scanned first
    /// among equal effective virtual times.
    pub fn insert_head(&mut self, table: &mut [Option<DomInfo>; MAX_DOMAINS], id: DomId) {
        self.mark_queued(table, id);
        assert!(self.len < RUNQUEUE_CAPACITY, "run queue overflow");
        self.order.copy_within(0..self.len, 1);
        self.order[0] = id;
        self.len += 1;
    }

    /// Queue a domain at the tail (fold-back of the previous current).
    pub fn insert_tail(&mut self, table: &mut [Option<DomInfo>; MAX_DOMAINS], id: DomId) {
        self.mark_queued(table, id);
        assert!(self.len < RUNQUEUE_CAPACITY, "run queue overflow");
        self.order[self.len] = id;
        self.len += 1;
    }

    /// Detach `id` if its membership marker confirms it is queued here.
    /// Returns whether anything was removed; absent ids are a no-op.
    pub fn remove(&mut self, table: &mut [Option<DomInfo>; MAX_DOMAINS], id: DomId) -> bool {
        let idx = match slot_of(table, id) {
            Some(idx) => idx,
            None => return false,
        };
        let d = match table[idx].as_mut() {
            Some(d) => d,
            None => return false,
        };
        if !d.on_runqueue {
            return false;
        }
        d.on_runqueue = false;

        let pos = self.order[..self.len]
            .iter()
            .position(|&q| q == id)
            .unwrap_or_else(|| panic!("membership marker set but {} not queued", id));
        self.order.copy_within(pos + 1..self.len, pos);
        self.len -= 1;
        true
    }

    /// Single pass over the queue collecting the two lowest effective
    /// virtual times and the minimum actual virtual time. Comparisons are
    /// strict so the earlier queue position wins ties. The idle sentinel
    /// guarantees the queue is never empty at selection time.
    pub fn scan_min_two(&self, table: &[Option<DomInfo>; MAX_DOMAINS]) -> Scan {
        assert!(self.len > 0, "selection scan on an empty run queue");

        let mut next: Option<(DomId, u32)> = None;
        let mut next_prime: Option<(DomId, u32)> = None;
        let mut min_avt = IDLE_VTIME;

        for id in self.iter() {
            let idx = slot_of(table, id)
                .unwrap_or_else(|| panic!("queued domain {} missing from table", id));
            let d = table[idx]
                .as_ref()
                .unwrap_or_else(|| panic!("queued domain {} missing from table", id));

            match next {
                Some((_, best_evt)) if d.evt < best_evt => {
                    next_prime = next;
                    next = Some((id, d.evt));
                }
                Some((_, _)) => match next_prime {
                    Some((_, second_evt)) if d.evt >= second_evt => {}
                    _ => next_prime = Some((id, d.evt)),
                },
                None => next = Some((id, d.evt)),
            }

            if !d.is_idle && d.avt < min_avt {
                min_avt = d.avt;
            }
        }

        let (next, next_evt) = next.unwrap_or_else(|| panic!("empty scan result"));
        Scan {
            next,
            next_evt,
            next_prime,
            min_avt,
        }
    }

    fn mark_queued(&self, table: &mut [Option<DomInfo>; MAX_DOMAINS], id: DomId) {
        let idx = slot_of(table, id)
            .unwrap_or_else(|| panic!("queueing unadmitted domain {}", id));
        let d = table[idx]
            .as_mut()
            .unwrap_or_else(|| panic!("queueing unadmitted domain {}", id));
        assert!(!d.on_runqueue, "double insert of {} on a run queue", id);
        d.on_runqueue = true;
    }
}
