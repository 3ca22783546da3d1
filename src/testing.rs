//! Testing utilities and fake collaborators
//!
//! This module provides recording fakes for the collaborator seams so the
//! DP core can be exercised on the host without a driver framework.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicU32, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::dp::config::{DpConfig, MacAddr, OpMode};
use crate::dp::mic::{MicErrorInfo, RxMicFailureInfo};
use crate::dp::rps::RpsIndication;
use crate::hal::{DpCallbacks, HierarchyObj, ObjManager, ObjMgrError, ObjMgrResult, SvcMsgType};
use crate::DpContext;

// =============================================================================
// Host Delay
// =============================================================================

/// `DelayNs` backed by `std::thread::sleep`.
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

// =============================================================================
// Recording Callbacks
// =============================================================================

/// One recorded upper-stack callback invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackEvent {
    StaMicError {
        vdev_id: u8,
        info: MicErrorInfo,
    },
    SapMicError {
        vdev_id: u8,
        info: MicErrorInfo,
    },
    SvcMsg {
        radio_index: u32,
        msg_type: SvcMsgType,
        data: RpsIndication,
    },
    NudFailure {
        vdev_id: u8,
    },
}

/// Upper-stack fake that records every invocation.
///
/// The station MIC callback can be given an artificial latency to hold the
/// worker inside a callback while another thread races it.
#[derive(Default)]
pub struct RecordingCallbacks {
    events: Mutex<Vec<CallbackEvent>>,
    sta_delay_ms: AtomicU32,
    in_flight: AtomicUsize,
}

impl RecordingCallbacks {
    /// Drain and return the recorded events.
    pub fn take_events(&self) -> Vec<CallbackEvent> {
        core::mem::take(&mut *self.events.lock().unwrap())
    }

    /// Make the station MIC callback sleep before returning.
    pub fn set_sta_delay_ms(&self, ms: u32) {
        self.sta_delay_ms.store(ms, Ordering::SeqCst);
    }

    /// Number of callbacks currently executing.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, event: CallbackEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl DpCallbacks for RecordingCallbacks {
    fn process_sta_mic_error(&self, info: &MicErrorInfo, vdev_id: u8) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.record(CallbackEvent::StaMicError {
            vdev_id,
            info: *info,
        });
        let ms = self.sta_delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            thread::sleep(Duration::from_millis(u64::from(ms)));
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn process_sap_mic_error(&self, info: &MicErrorInfo, vdev_id: u8) {
        self.record(CallbackEvent::SapMicError {
            vdev_id,
            info: *info,
        });
    }

    fn send_svc_msg(&self, radio_index: u32, msg_type: SvcMsgType, data: &RpsIndication) {
        self.record(CallbackEvent::SvcMsg {
            radio_index,
            msg_type,
            data: *data,
        });
    }

    fn process_nud_failure(&self, vdev_id: u8) {
        self.record(CallbackEvent::NudFailure { vdev_id });
    }
}

// =============================================================================
// Fake Object Manager
// =============================================================================

/// Object-manager fake with a vdev table, reference balancing and failure
/// injection for attach/detach.
#[derive(Default)]
pub struct FakeObjManager {
    vdevs: Mutex<HashMap<u8, bool>>,
    refs: AtomicIsize,
    fail_attach: AtomicBool,
    fail_detach: AtomicBool,
}

impl FakeObjManager {
    /// Make a vdev resolvable.
    pub fn add_vdev(&self, vdev_id: u8, active: bool) {
        self.vdevs.lock().unwrap().insert(vdev_id, active);
    }

    /// Remove a vdev; later `vdev_get_ref` calls fail.
    pub fn remove_vdev(&self, vdev_id: u8) {
        self.vdevs.lock().unwrap().remove(&vdev_id);
    }

    /// Flip the connection-manager active state of a vdev.
    pub fn set_active(&self, vdev_id: u8, active: bool) {
        self.vdevs.lock().unwrap().insert(vdev_id, active);
    }

    /// Make component attach calls fail.
    pub fn set_fail_attach(&self, fail: bool) {
        self.fail_attach.store(fail, Ordering::SeqCst);
    }

    /// Make component detach calls fail.
    pub fn set_fail_detach(&self, fail: bool) {
        self.fail_detach.store(fail, Ordering::SeqCst);
    }

    /// Outstanding get/put imbalance; zero when every reference was
    /// released.
    pub fn ref_balance(&self) -> isize {
        self.refs.load(Ordering::SeqCst)
    }
}

impl ObjManager for FakeObjManager {
    fn component_attach(&self, _obj: HierarchyObj) -> ObjMgrResult<()> {
        if self.fail_attach.load(Ordering::SeqCst) {
            return Err(ObjMgrError::ComponentAttached);
        }
        Ok(())
    }

    fn component_detach(&self, _obj: HierarchyObj) -> ObjMgrResult<()> {
        if self.fail_detach.load(Ordering::SeqCst) {
            return Err(ObjMgrError::ComponentNotAttached);
        }
        Ok(())
    }

    fn vdev_get_ref(&self, vdev_id: u8) -> ObjMgrResult<()> {
        if !self.vdevs.lock().unwrap().contains_key(&vdev_id) {
            return Err(ObjMgrError::ObjectNotFound);
        }
        self.refs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn vdev_put_ref(&self, _vdev_id: u8) {
        self.refs.fetch_sub(1, Ordering::SeqCst);
    }

    fn vdev_is_active(&self, vdev_id: u8) -> bool {
        self.vdevs.lock().unwrap().get(&vdev_id).copied().unwrap_or(false)
    }
}

// =============================================================================
// Context Builders
// =============================================================================

/// A MIC failure indication for `vdev_id` with fixed payload fields.
pub fn test_failure(vdev_id: u8) -> RxMicFailureInfo {
    RxMicFailureInfo {
        ta_mac_addr: [0xaa, 0xbb, 0xcc, 0, 0, vdev_id],
        multicast: false,
        key_id: 2,
        tsc: [1, 2, 3, 4, 5, 6],
        vdev_id,
    }
}

/// Register an interface and run the VDEV create notification for it.
///
/// The hardware address is derived from the vdev id.
pub fn add_vdev_interface(
    dp: &DpContext<RecordingCallbacks, FakeObjManager>,
    vdev_id: u8,
    mode: OpMode,
    name: &str,
) {
    let mac: MacAddr = [0x02, 0, 0, 0, 0, vdev_id];
    dp.objmgr.add_vdev(vdev_id, true);
    dp.register_interface(&mac, name).unwrap();
    dp.vdev_obj_create_notification(vdev_id, &mac, mode).unwrap();
}

/// A fully brought-up context with one active station interface
/// (`vdev 1`, `wlan0`).
pub fn test_context() -> DpContext<RecordingCallbacks, FakeObjManager> {
    let dp = DpContext::new(
        DpConfig::new(),
        RecordingCallbacks::default(),
        FakeObjManager::default(),
    );
    dp.attach_context();
    dp.psoc_obj_create_notification().unwrap();
    dp.pdev_obj_create_notification(0).unwrap();
    add_vdev_interface(&dp, 1, OpMode::Sta, "wlan0");
    dp
}
