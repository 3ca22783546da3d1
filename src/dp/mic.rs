//! MIC error deferred-work state machine.
//!
//! A MIC (message integrity check) failure is detected on the receive
//! path, in a context that cannot call into the upper stack. Each
//! interface therefore carries a work item that decouples the indication
//! from the report: the indication stores the failure record and schedules
//! the work; the work callback dispatches the report on the worker and
//! releases the record.
//!
//! The state machine is the contract:
//!
//! ```text
//! Uninitialized --init--> Initialized --indicate--> Scheduled
//!   Scheduled --work callback--> Initialized
//!   Initialized/Scheduled --flush--> Disabled --enable--> Initialized
//!   any --deinit--> Uninitialized
//! ```
//!
//! At most one failure record is in flight per interface: an indication
//! arriving while one is Scheduled is dropped, bounding memory to one
//! pending record. Flush is the teardown barrier: once it returns, no
//! callback for the interface executes again until enable + indicate.
//!
//! Every status or pending-record access happens under the per-interface
//! MIC cell; the blocking wait in flush/deinit happens outside it.

use embedded_hal::delay::DelayNs;

use super::config::{MacAddr, OpMode};
use super::interface::intf_id_is_valid;
use crate::hal::{DpCallbacks, ObjManager};
use crate::sync::CriticalSectionCell;
use crate::work::DelayedWork;

/// Size of the cipher sequence counter carried in a MIC failure record.
pub const CIPHER_SEQ_CTR_SIZE: usize = 6;

/// Status of an interface's MIC error work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MicStatus {
    /// No work exists for the interface.
    #[default]
    Uninitialized,
    /// Idle and ready to accept an indication.
    Initialized,
    /// A failure record is pending and the work is queued or running.
    Scheduled,
    /// Reporting is disabled (interface tearing down); indications drop.
    Disabled,
}

/// One MIC failure event, owned by the work while scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicErrorInfo {
    /// Transmitter address of the offending frame.
    pub ta_mac_addr: MacAddr,
    /// Whether the failing frame was multicast.
    pub multicast: bool,
    /// Key id the failure was reported against.
    pub key_id: u8,
    /// Cipher sequence counter of the failing frame.
    pub tsc: [u8; CIPHER_SEQ_CTR_SIZE],
    /// Interface the failure belongs to.
    pub vdev_id: u8,
}

/// MIC failure indication as delivered by the receive layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxMicFailureInfo {
    /// Transmitter address of the offending frame.
    pub ta_mac_addr: MacAddr,
    /// Whether the failing frame was multicast.
    pub multicast: bool,
    /// Key id the failure was reported against.
    pub key_id: u8,
    /// Cipher sequence counter of the failing frame.
    pub tsc: [u8; CIPHER_SEQ_CTR_SIZE],
    /// Interface the failure was seen on.
    pub vdev_id: u8,
}

impl From<&RxMicFailureInfo> for MicErrorInfo {
    fn from(failure: &RxMicFailureInfo) -> Self {
        Self {
            ta_mac_addr: failure.ta_mac_addr,
            multicast: failure.multicast,
            key_id: failure.key_id,
            tsc: failure.tsc,
            vdev_id: failure.vdev_id,
        }
    }
}

#[derive(Debug)]
pub(crate) struct MicState {
    pub(crate) status: MicStatus,
    pub(crate) pending: Option<MicErrorInfo>,
}

/// Per-interface MIC work: status + pending record behind one cell, plus
/// the underlying deferred work.
pub(crate) struct MicWork {
    pub(crate) state: CriticalSectionCell<MicState>,
    pub(crate) work: DelayedWork,
}

impl MicWork {
    pub(crate) const fn new() -> Self {
        Self {
            state: CriticalSectionCell::new(MicState {
                status: MicStatus::Uninitialized,
                pending: None,
            }),
            work: DelayedWork::new(),
        }
    }
}

impl<CB: DpCallbacks, OM: ObjManager> crate::DpContext<CB, OM> {
    /// Entry point for MIC failure indications from the receive layer.
    ///
    /// Routes the failure to the owning interface, stores the record and
    /// schedules the work for immediate execution. Never blocks: if the
    /// vdev is gone, the interface is unknown, or the work is not in the
    /// Initialized state (covering not-ready, already-scheduled and
    /// disabled), the indication is dropped.
    pub fn rx_mic_error_ind(&self, failure: &RxMicFailureInfo) {
        if self.objmgr.vdev_get_ref(failure.vdev_id).is_err() {
            return;
        }
        let Some(slot) = self.registry.slot_by_intf_id(failure.vdev_id) else {
            self.objmgr.vdev_put_ref(failure.vdev_id);
            dp_debug!("mic error on unknown interface {}", failure.vdev_id);
            return;
        };

        let info = MicErrorInfo::from(failure);
        self.mic[slot].state.with(|s| {
            if s.status != MicStatus::Initialized {
                dp_debug!("mic error dropped, work busy or disabled");
                return;
            }
            // The pending slot owns the record so that a flush or deinit
            // cancelling the scheduled work can release it. Arming inside
            // the same critical section keeps Scheduled and a cancellable
            // work in lockstep.
            s.status = MicStatus::Scheduled;
            s.pending = Some(info);
            self.mic[slot].work.start_now();
        });
        self.objmgr.vdev_put_ref(failure.vdev_id);
    }

    /// Work callback body; runs on the worker via
    /// [`poll_work`](crate::DpContext::poll_work).
    pub(crate) fn mic_work_fn(&self, slot: usize) {
        let info = self.mic[slot].state.with_ref(|s| s.pending);

        match (self.registry.get(slot), info) {
            (Some(intf), Some(info)) if intf_id_is_valid(intf.intf_id) => {
                self.process_mic_error(intf.device_mode, intf.intf_id, &info);
            }
            _ => dp_err!("mic work on invalid interface"),
        }

        self.mic[slot].state.with(|s| {
            s.pending = None;
            if s.status == MicStatus::Scheduled {
                s.status = MicStatus::Initialized;
            }
        });
    }

    /// Dispatch one MIC failure to the upper stack by operating mode.
    fn process_mic_error(&self, mode: OpMode, vdev_id: u8, info: &MicErrorInfo) {
        if self.objmgr.vdev_get_ref(vdev_id).is_err() {
            dp_err!("vdev ref get error");
            return;
        }

        match mode {
            OpMode::Sta | OpMode::P2pClient if self.objmgr.vdev_is_active(vdev_id) => {
                self.callbacks.process_sta_mic_error(info, vdev_id);
            }
            OpMode::Sap | OpMode::P2pGo => {
                self.callbacks.process_sap_mic_error(info, vdev_id);
            }
            other => dp_err!("invalid interface type: {}", other.as_str()),
        }

        self.objmgr.vdev_put_ref(vdev_id);
    }

    /// Bring up the MIC work for an interface slot.
    pub(crate) fn mic_init_work(&self, slot: usize) {
        self.mic[slot].state.with(|s| {
            s.status = MicStatus::Initialized;
            s.pending = None;
        });
    }

    /// Disable and synchronously stop the interface's MIC work.
    ///
    /// No-op (and no wait) unless a report is scheduled; a scheduled work
    /// is first demoted to Disabled, so a racing enable cannot re-arm it
    /// before the stop completes, then stopped. A record the stop
    /// cancelled before it ran is released here.
    pub(crate) fn mic_flush_work<D: DelayNs>(&self, slot: usize, delay: &mut D) {
        dp_info!("flush the mic error work");

        let scheduled = self.mic[slot].state.with(|s| {
            if s.status != MicStatus::Scheduled {
                return false;
            }
            s.status = MicStatus::Disabled;
            true
        });
        if !scheduled {
            return;
        }

        self.mic[slot].work.stop_sync(delay);

        self.mic[slot].state.with(|s| s.pending = None);
    }

    /// Re-enable MIC reporting after a flush.
    pub(crate) fn mic_enable_work(&self, slot: usize) {
        dp_info!("enable the mic error work");

        self.mic[slot].state.with(|s| {
            if s.status == MicStatus::Disabled {
                s.status = MicStatus::Initialized;
            }
        });
    }

    /// Tear down the interface's MIC work completely.
    pub(crate) fn mic_deinit_work<D: DelayNs>(&self, slot: usize, delay: &mut D) {
        dp_info!("deinitialize the mic error work");

        let uninitialized = self
            .mic[slot]
            .state
            .with_ref(|s| s.status == MicStatus::Uninitialized);
        if uninitialized {
            return;
        }

        self.mic[slot].work.stop_sync(delay);

        self.mic[slot].state.with(|s| {
            s.status = MicStatus::Uninitialized;
            s.pending = None;
        });
    }

    /// Current MIC work status for an interface slot.
    pub(crate) fn mic_status(&self, slot: usize) -> MicStatus {
        self.mic[slot].state.with_ref(|s| s.status)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
