//! Recording mock of the embedding kernel.
//!
//! Implements `SchedPlatform` over a manually advanced clock and logs
//! every call the scheduler makes across the seam, so tests can assert
//! on reschedule requests and timer traffic.

use std::sync::atomic::{AtomicI64, Ordering};

use spin::Mutex;

use crate::platform::{self, SchedPlatform, TimerEvent};
use crate::time::STime;

/// One recorded call across the platform seam.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    ArmDomTimer(TimerEvent, STime),
    CancelDomTimer(TimerEvent),
    ModSchedTimer(usize, STime),
    RaiseResched(usize),
}

pub struct MockPlatform {
    now: AtomicI64,
    calls: Mutex<Vec<Call>>,
}

impl MockPlatform {
    const fn new() -> Self {
        Self {
            now: AtomicI64::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_now(&self, t: STime) {
        self.now.store(t, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: STime) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }

    /// Clear the call log. The clock is left alone; tests set it.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn resched_raised(&self, cpu: usize) -> bool {
        self.calls
            .lock()
            .iter()
            .any(|c| *c == Call::RaiseResched(cpu))
    }

    /// Expiry of the most recent arm for `ev`, if it was not cancelled
    /// afterwards.
    pub fn armed_at(&self, ev: TimerEvent) -> Option<STime> {
        let mut armed = None;
        for call in self.calls.lock().iter() {
            match *call {
                Call::ArmDomTimer(e, at) if e == ev => armed = Some(at),
                Call::CancelDomTimer(e) if e == ev => armed = None,
                _ => {}
            }
        }
        armed
    }

    /// Expiry of the most recent `mod_sched_timer` for `cpu`.
    pub fn sched_timer_moved_to(&self, cpu: usize) -> Option<STime> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find_map(|c| match *c {
                Call::ModSchedTimer(c2, at) if c2 == cpu => Some(at),
                _ => None,
            })
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl SchedPlatform for MockPlatform {
    fn now(&self) -> STime {
        self.now.load(Ordering::SeqCst)
    }

    fn arm_dom_timer(&self, event: TimerEvent, at: STime) {
        self.record(Call::ArmDomTimer(event, at));
    }

    fn cancel_dom_timer(&self, event: TimerEvent) {
        self.record(Call::CancelDomTimer(event));
    }

    fn mod_sched_timer(&self, cpu: usize, at: STime) {
        self.record(Call::ModSchedTimer(cpu, at));
    }

    fn raise_resched(&self, cpu: usize) {
        self.record(Call::RaiseResched(cpu));
    }
}

static MOCK: MockPlatform = MockPlatform::new();

/// Register the mock (first caller wins the `spin::Once`; every caller
/// gets the same instance back) and clear its call log.
pub fn install() -> &'static MockPlatform {
    platform::set_platform(&MOCK);
    MOCK.reset();
    &MOCK
}
