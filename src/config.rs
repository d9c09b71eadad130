//! Build-time sizing for the scheduling core.

/// Physical CPUs the scheduler will manage. Each gets its own run queue.
pub const MAX_CPUS: usize = 64;

/// Domain slots in the global domain table. Domain ids index nothing
/// directly; admission assigns the first free slot.
pub const MAX_DOMAINS: usize = 256;

/// Capacity of a single per-CPU run queue. Every domain in the system
/// plus the idle sentinel could in principle land on one queue.
pub const RUNQUEUE_CAPACITY: usize = MAX_DOMAINS + 1;
