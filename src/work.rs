//! Single-shot, cancellable delayed work.
//!
//! A [`DelayedWork`] executes a callback once, after an optional delay, on
//! a worker context distinct from the one that armed it. The type itself is
//! a tagged state machine; the embedding environment drives it by calling
//! [`run_due`](DelayedWork::run_due) from its worker loop with a monotonic
//! millisecond timestamp, the same caller-supplied-clock model smoltcp uses
//! for `poll()`.
//!
//! The hard requirement is race-free synchronous stop:
//! [`stop_sync`](DelayedWork::stop_sync) returns only once the work is
//! neither queued nor executing, so the caller may tear down everything the
//! callback touches. The wait is a bounded-interval poll against the state
//! cell, never a sleep under a critical section.
//!
//! # Example
//!
//! ```ignore
//! static WORK: DelayedWork = DelayedWork::new();
//!
//! // control plane
//! WORK.start(now_ms, 100);
//!
//! // worker loop
//! WORK.run_due(now_ms, || check_neighbour());
//!
//! // teardown
//! WORK.stop_sync(&mut delay);
//! ```

use embedded_hal::delay::DelayNs;

use crate::sync::CriticalSectionCell;

/// Interval between state polls while `stop_sync` waits out a running
/// callback.
pub const WORK_POLL_INTERVAL_US: u32 = 50;

/// Execution state of a delayed work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkState {
    /// Inert; nothing queued, nothing running.
    Idle,
    /// Armed to fire once `now_ms` reaches the deadline.
    Armed { deadline_ms: u64 },
    /// The callback is executing on the worker.
    Running,
}

/// A single-shot delayed work item.
///
/// Const-constructible and inert until armed. One arming produces at most
/// one callback invocation; re-arming before the work fires replaces the
/// deadline rather than queueing a second invocation, so the work can never
/// double-fire.
///
/// Dropping the work releases it. Owners that shared it with a worker must
/// call [`stop_sync`](Self::stop_sync) first; the drop itself cannot wait.
pub struct DelayedWork {
    state: CriticalSectionCell<WorkState>,
}

impl DelayedWork {
    /// Create an idle, inert work item (const, suitable for static
    /// initialization).
    pub const fn new() -> Self {
        Self {
            state: CriticalSectionCell::new(WorkState::Idle),
        }
    }

    /// Arm the work to fire `delay_ms` milliseconds after `now_ms`.
    ///
    /// Timestamps are milliseconds from an arbitrary monotonic epoch; the
    /// worker must poll with the same epoch. If the work is already armed
    /// the deadline is replaced. Arming while the callback is running is
    /// allowed and queues exactly one further invocation.
    ///
    /// Returns `true` (the work is always accepted).
    pub fn start(&self, now_ms: u64, delay_ms: u32) -> bool {
        self.state.with(|s| {
            *s = WorkState::Armed {
                deadline_ms: now_ms.saturating_add(u64::from(delay_ms)),
            };
        });
        true
    }

    /// Arm the work to fire at the worker's next poll, regardless of clock.
    pub fn start_now(&self) -> bool {
        self.state.with(|s| {
            *s = WorkState::Armed { deadline_ms: 0 };
        });
        true
    }

    /// Whether the work is armed or its callback is currently running.
    pub fn is_pending(&self) -> bool {
        self.state.with_ref(|s| !matches!(*s, WorkState::Idle))
    }

    /// Worker entry point: run the callback if the work is due.
    ///
    /// Atomically claims an `Armed` work whose deadline has passed, runs
    /// `body` outside the critical section, then returns the work to idle.
    /// A re-arm performed while `body` runs is left in place. When several
    /// workers poll concurrently, exactly one claims a given arming.
    ///
    /// Returns `true` if the callback was invoked.
    pub fn run_due<F: FnOnce()>(&self, now_ms: u64, body: F) -> bool {
        let due = self.state.with(|s| match *s {
            WorkState::Armed { deadline_ms } if deadline_ms <= now_ms => {
                *s = WorkState::Running;
                true
            }
            _ => false,
        });
        if !due {
            return false;
        }

        body();

        self.state.with(|s| {
            if matches!(*s, WorkState::Running) {
                *s = WorkState::Idle;
            }
        });
        true
    }

    /// Synchronously stop the work.
    ///
    /// Disarms a queued invocation and, if the callback is in flight on the
    /// worker, waits until it has fully completed. The loop also swallows a
    /// re-arm racing the stop, so on return the work is neither queued nor
    /// running. Must not be called with any related lock held; the worker
    /// needs to make progress for the wait to end.
    ///
    /// Returns `true` if an invocation was actually cancelled or waited out.
    pub fn stop_sync<D: DelayNs>(&self, delay: &mut D) -> bool {
        let mut stopped = false;
        loop {
            let running = self.state.with(|s| match *s {
                WorkState::Idle => false,
                WorkState::Armed { .. } => {
                    *s = WorkState::Idle;
                    stopped = true;
                    false
                }
                WorkState::Running => true,
            });
            if !running {
                return stopped;
            }
            stopped = true;
            delay.delay_us(WORK_POLL_INTERVAL_US);
        }
    }
}

impl Default for DelayedWork {
    fn default() -> Self {
        Self::new()
    }
}
