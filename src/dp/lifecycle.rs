//! PSOC/PDEV/VDEV lifecycle notification handlers.
//!
//! The object-manager framework invokes these as hierarchy objects are
//! created and destroyed. Create handlers bind the DP private state to the
//! object through a capability-checked attach; destroy handlers halt the
//! interface's background work before detaching. Attach/detach failures
//! propagate to the caller without rolling back steps that already
//! completed; cleanup of a half-bound object is the framework's call.
//!
//! Context attach is idempotent-with-warning; detaching a detached
//! context is an error.

use core::sync::atomic::Ordering;

use embedded_hal::delay::DelayNs;

use super::config::{MacAddr, OpMode};
use super::error::{DpError, DpResult, LifecycleError};
use crate::hal::{DpCallbacks, HierarchyObj, ObjManager};

impl<CB: DpCallbacks, OM: ObjManager> crate::DpContext<CB, OM> {
    /// Mark the context attached to the driver host.
    ///
    /// Attaching an attached context is a logged no-op.
    pub fn attach_context(&self) {
        if self.attached.swap(true, Ordering::SeqCst) {
            dp_debug!("already attached global dp context");
        }
    }

    /// Mark the context detached.
    pub fn detach_context(&self) -> DpResult<()> {
        if !self.attached.swap(false, Ordering::SeqCst) {
            dp_err!("global dp context is already detached");
            return Err(LifecycleError::NotAttached.into());
        }
        Ok(())
    }

    /// Whether the context is currently attached.
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// PSOC create notification: bind the DP component to the radio
    /// subsystem object.
    pub fn psoc_obj_create_notification(&self) -> DpResult<()> {
        self.objmgr
            .component_attach(HierarchyObj::Psoc)
            .map_err(|e| {
                dp_err!("failed to attach psoc component obj");
                DpError::from(e)
            })?;
        self.psoc_bound.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// PSOC destroy notification.
    pub fn psoc_obj_destroy_notification(&self) -> DpResult<()> {
        if !self.psoc_bound.load(Ordering::SeqCst) {
            dp_err!("psoc priv is null");
            return Err(LifecycleError::PsocNotBound.into());
        }
        self.objmgr
            .component_detach(HierarchyObj::Psoc)
            .map_err(|e| {
                dp_err!("failed to detach psoc component obj");
                DpError::from(e)
            })?;
        self.psoc_bound.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// PDEV create notification: bind the context to the physical device.
    pub fn pdev_obj_create_notification(&self, pdev_id: u8) -> DpResult<()> {
        dp_info!("dp pdev obj create notification");

        self.objmgr
            .component_attach(HierarchyObj::Pdev(pdev_id))
            .map_err(|e| {
                dp_err!("failed to attach dp context to pdev");
                DpError::from(e)
            })?;
        self.pdev.with(|p| *p = Some(pdev_id));
        Ok(())
    }

    /// PDEV destroy notification.
    pub fn pdev_obj_destroy_notification(&self, pdev_id: u8) -> DpResult<()> {
        dp_info!("dp pdev obj destroy notification");

        self.objmgr
            .component_detach(HierarchyObj::Pdev(pdev_id))
            .map_err(|e| {
                dp_err!("failed to detach dp context from pdev");
                DpError::from(e)
            })?;
        self.pdev.with(|p| {
            if p.is_none() {
                dp_err!("dp pdev is null");
            }
            *p = None;
        });
        Ok(())
    }

    /// VDEV create notification.
    ///
    /// The interface must already be registered under `mac_addr` (the
    /// allocation step precedes this notification); the handler fills in
    /// the id and mode, attaches the DP private object to the vdev and
    /// re-arms the per-interface trackers.
    pub fn vdev_obj_create_notification(
        &self,
        vdev_id: u8,
        mac_addr: &MacAddr,
        mode: OpMode,
    ) -> DpResult<()> {
        dp_info!("dp vdev obj create notification");

        let Some(slot) = self.registry.slot_by_addr(mac_addr) else {
            dp_err!("failed to get dp interface for the notified address");
            return Err(LifecycleError::InterfaceNotFound.into());
        };

        self.registry.update(slot, |e| {
            e.device_mode = mode;
            e.intf_id = vdev_id;
        });

        self.objmgr
            .component_attach(HierarchyObj::Vdev(vdev_id))
            .map_err(|e| {
                dp_err!("failed to attach dp interface with vdev");
                DpError::from(e)
            })?;

        self.nud_ignore_tracking(slot, false);
        self.mic_enable_work(slot);

        Ok(())
    }

    /// VDEV destroy notification.
    ///
    /// Halts the interface's background work (NUD check, MIC report)
    /// before detaching; blocks until in-flight work has completed, so it
    /// must not be called from the worker context.
    pub fn vdev_obj_destroy_notification<D: DelayNs>(
        &self,
        vdev_id: u8,
        delay: &mut D,
    ) -> DpResult<()> {
        dp_info!("dp vdev obj destroy notification");

        let Some(slot) = self.registry.slot_by_intf_id(vdev_id) else {
            dp_err!("failed to get dp interface obj");
            return Err(LifecycleError::InterfaceNotFound.into());
        };

        self.nud_ignore_tracking(slot, true);
        self.nud_reset_tracking(slot);
        self.nud_flush_work(slot, delay);
        self.mic_flush_work(slot, delay);

        self.objmgr
            .component_detach(HierarchyObj::Vdev(vdev_id))
            .map_err(|e| {
                dp_err!("failed to detach dp interface from vdev");
                DpError::from(e)
            })?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
