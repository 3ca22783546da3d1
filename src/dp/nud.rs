//! Neighbour-unreachability (NUD) tracking.
//!
//! Tracks the neighbour cache state of each interface's gateway. When the
//! cache reports a failed resolution, a delayed check is armed; if the
//! neighbour has not recovered by the time the check runs, the failure is
//! reported upward so the upper stack can react (typically by triggering a
//! roam or disconnect).
//!
//! Tracking is ignored while the interface is down; lifecycle hooks flip
//! the ignore flag and flush the check before teardown.

use embedded_hal::delay::DelayNs;

use super::interface::intf_id_is_valid;
use crate::hal::{DpCallbacks, ObjManager};
use crate::sync::CriticalSectionCell;
use crate::work::DelayedWork;

/// Neighbour cache state reported by the network stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NudState {
    /// No state tracked yet.
    #[default]
    None,
    /// Resolution in progress.
    Incomplete,
    /// Neighbour verified reachable.
    Reachable,
    /// Reachability being re-confirmed.
    Probe,
    /// Resolution failed.
    Failed,
}

#[derive(Debug, Default)]
pub(crate) struct NudTrackState {
    pub(crate) ignore: bool,
    pub(crate) curr: NudState,
    pub(crate) resolved_count: u32,
    pub(crate) failed_count: u32,
}

/// Per-interface NUD tracking: state behind one cell plus the delayed
/// failure check.
pub(crate) struct NudTracking {
    pub(crate) state: CriticalSectionCell<NudTrackState>,
    pub(crate) work: DelayedWork,
}

impl NudTracking {
    pub(crate) const fn new() -> Self {
        Self {
            state: CriticalSectionCell::new(NudTrackState {
                ignore: true,
                curr: NudState::None,
                resolved_count: 0,
                failed_count: 0,
            }),
            work: DelayedWork::new(),
        }
    }
}

impl<CB: DpCallbacks, OM: ObjManager> crate::DpContext<CB, OM> {
    /// Entry point for neighbour cache state updates.
    ///
    /// `now_ms` uses the same monotonic epoch as
    /// [`poll_work`](crate::DpContext::poll_work). A transition to
    /// [`NudState::Failed`] arms the delayed failure check; a later
    /// recovery simply moves the state on, and the check observes it.
    pub fn nud_event(&self, intf_id: u8, state: NudState, now_ms: u64) {
        let Some(slot) = self.registry.slot_by_intf_id(intf_id) else {
            dp_debug!("nud event on unknown interface {}", intf_id);
            return;
        };

        let arm = self.nud[slot].state.with(|s| {
            if s.ignore {
                return false;
            }
            s.curr = state;
            match state {
                NudState::Reachable => {
                    s.resolved_count += 1;
                    false
                }
                NudState::Failed => {
                    s.failed_count += 1;
                    true
                }
                _ => false,
            }
        });

        if arm {
            let delay_ms = self.config.with_ref(|c| c.nud_failure_delay_ms);
            self.nud[slot].work.start(now_ms, delay_ms);
        }
    }

    /// Delayed failure check body; runs on the worker.
    pub(crate) fn nud_work_fn(&self, slot: usize) {
        let failed = self
            .nud[slot]
            .state
            .with_ref(|s| !s.ignore && s.curr == NudState::Failed);
        if !failed {
            return;
        }

        match self.registry.get(slot) {
            Some(intf) if intf_id_is_valid(intf.intf_id) => {
                dp_info!("nud failure on interface {}", intf.intf_id);
                self.callbacks.process_nud_failure(intf.intf_id);
            }
            _ => dp_err!("nud work on invalid interface"),
        }
    }

    /// Bring up tracking for an interface slot (ignored until enabled).
    pub(crate) fn nud_init_tracking(&self, slot: usize) {
        self.nud[slot].state.with(|s| {
            *s = NudTrackState {
                ignore: true,
                ..NudTrackState::default()
            };
        });
    }

    /// Set whether tracking events for the slot are ignored.
    pub(crate) fn nud_ignore_tracking(&self, slot: usize, ignore: bool) {
        self.nud[slot].state.with(|s| s.ignore = ignore);
    }

    /// Zero the tracked state and counters.
    pub(crate) fn nud_reset_tracking(&self, slot: usize) {
        self.nud[slot].state.with(|s| {
            s.curr = NudState::None;
            s.resolved_count = 0;
            s.failed_count = 0;
        });
    }

    /// Synchronously stop the delayed failure check.
    pub(crate) fn nud_flush_work<D: DelayNs>(&self, slot: usize, delay: &mut D) {
        dp_info!("flush the nud failure work");
        self.nud[slot].work.stop_sync(delay);
    }

    /// Tear down tracking for the slot.
    pub(crate) fn nud_deinit_tracking<D: DelayNs>(&self, slot: usize, delay: &mut D) {
        self.nud[slot].work.stop_sync(delay);
        self.nud_init_tracking(slot);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
