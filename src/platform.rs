//! The seam between the scheduler and the rest of the hypervisor.
//!
//! The scheduling core never touches hardware timers or interrupt
//! controllers directly. The embedding kernel implements
//! [`SchedPlatform`] and registers it once at boot; scheduler code
//! reaches the platform through [`platform()`].

use spin::Once;

use crate::kfatal;
use crate::sched::types::DomId;
use crate::time::STime;

/// Which per-domain timer fired or is being armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Warp-limit expiry: the domain has been warped for `warp_limit`.
    WarpLimit,
    /// Unwarp-hold expiry: the domain may warp again.
    UnwarpHold,
}

/// Capability token naming exactly one per-domain timer. Timer callbacks
/// carry the token back into [`crate::sched::on_timer`], so a
/// fired timer can only ever act on the domain it was armed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerEvent {
    pub dom: DomId,
    pub kind: TimerKind,
}

/// Services the scheduler requires from its host kernel.
///
/// All methods may be called with scheduler locks held, so
/// implementations must not call back into the scheduler.
pub trait SchedPlatform: Sync {
    /// Current system time, nanoseconds since boot.
    fn now(&self) -> STime;

    /// Arm (or re-arm) the per-domain timer named by `event` to fire at
    /// absolute time `at`.
    fn arm_dom_timer(&self, event: TimerEvent, at: STime);

    /// Cancel the per-domain timer named by `event`. Must tolerate the
    /// timer not being armed.
    fn cancel_dom_timer(&self, event: TimerEvent);

    /// Move this CPU's scheduler timer to fire at absolute time `at`,
    /// replacing any previously programmed expiry.
    fn mod_sched_timer(&self, cpu: usize, at: STime);

    /// Request that `cpu` re-enter the scheduler as soon as possible.
    fn raise_resched(&self, cpu: usize);
}

static PLATFORM: Once<&'static dyn SchedPlatform> = Once::new();

/// Register the platform. Boot-time, once; later calls are ignored.
pub fn set_platform(p: &'static dyn SchedPlatform) {
    PLATFORM.call_once(|| p);
}

/// The registered platform. Calling before [`set_platform`] is a
/// hypervisor bug and halts.
pub fn platform() -> &'static dyn SchedPlatform {
    match PLATFORM.get() {
        Some(p) => *p,
        None => {
            kfatal!("scheduler entered before platform registration");
            panic!("no scheduler platform registered");
        }
    }
}

pub fn is_registered() -> bool {
    PLATFORM.get().is_some()
}
