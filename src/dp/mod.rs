//! Core DP component: context, interface registry, MIC error handling,
//! NUD tracking and RPS dispatch.
//!
//! This module contains the building blocks of the datapath manager:
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`interface`] - The per-interface registry
//! - [`lifecycle`] - PSOC/PDEV/VDEV object notification handlers
//! - [`mic`] - The MIC error deferred-work state machine
//! - [`nud`] - Neighbour-unreachability tracking
//! - [`rps`] - Receive packet steering configuration dispatch
//!
//! The [`DpContext`] ties them together. It is an explicit context object:
//! the embedding environment creates exactly one per driver instance and
//! passes it by reference into every entry point, instead of the classic
//! module-global pointer.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::hal::{DpCallbacks, ObjManager};
use crate::sync::CriticalSectionCell;

// Submodules
pub mod config;
pub mod error;
pub mod interface;
pub mod lifecycle;
pub mod mic;
pub mod nud;
pub mod rps;

// Re-exports for convenience
pub use config::{DpConfig, MacAddr, OpMode};
pub use error::{
    ConfigError, ConfigResult, DpError, DpResult, LifecycleError, LifecycleResult, RegistryError,
    RegistryResult,
};
pub use interface::InterfaceInfo;
pub use mic::{MicErrorInfo, MicStatus, RxMicFailureInfo};
pub use nud::NudState;
pub use rps::RpsIndication;

use config::MAX_INTERFACES;
use interface::Registry;
use mic::MicWork;
use nud::NudTracking;

/// The DP component context.
///
/// Owns the interface registry, the per-interface MIC and NUD work state,
/// the configuration and the RPS runtime flag. Generic over the two
/// collaborator seams: `CB` is the upper-stack callback table, `OM` the
/// object-manager framework.
///
/// All entry points take `&self`; interior state is guarded by
/// per-concern critical-section cells so the receive path, the worker and
/// the control plane can share one context. The per-interface cells are
/// never acquired while the registry cell is held.
///
/// # Example
///
/// ```ignore
/// let dp = DpContext::new(DpConfig::new(), callbacks, objmgr);
/// dp.attach_context();
/// dp.register_interface(&[0x02, 0, 0, 0, 0, 1], "wlan0")?;
///
/// // worker loop, on its own execution context:
/// loop {
///     dp.poll_work(clock.now_ms());
/// }
/// ```
pub struct DpContext<CB: DpCallbacks, OM: ObjManager> {
    pub(crate) callbacks: CB,
    pub(crate) objmgr: OM,
    pub(crate) config: CriticalSectionCell<DpConfig>,
    pub(crate) registry: Registry,
    pub(crate) mic: [MicWork; MAX_INTERFACES],
    pub(crate) nud: [NudTracking; MAX_INTERFACES],
    pub(crate) attached: AtomicBool,
    pub(crate) psoc_bound: AtomicBool,
    pub(crate) pdev: CriticalSectionCell<Option<u8>>,
    pub(crate) rps_enabled: AtomicBool,
}

impl<CB: DpCallbacks, OM: ObjManager> DpContext<CB, OM> {
    /// Create a detached context with an empty registry.
    pub fn new(config: DpConfig, callbacks: CB, objmgr: OM) -> Self {
        Self {
            callbacks,
            objmgr,
            config: CriticalSectionCell::new(config),
            registry: Registry::new(),
            mic: [const { MicWork::new() }; MAX_INTERFACES],
            nud: [const { NudTracking::new() }; MAX_INTERFACES],
            attached: AtomicBool::new(false),
            psoc_bound: AtomicBool::new(false),
            pdev: CriticalSectionCell::new(None),
            rps_enabled: AtomicBool::new(false),
        }
    }

    /// Drive all deferred work that has come due.
    ///
    /// Call from a worker context distinct from the threads that schedule
    /// or flush work; `now_ms` is milliseconds from the same arbitrary
    /// monotonic epoch the schedulers use. Callback dispatch happens on the
    /// caller's context with no DP lock held.
    pub fn poll_work(&self, now_ms: u64) {
        for slot in 0..MAX_INTERFACES {
            self.mic[slot].work.run_due(now_ms, || self.mic_work_fn(slot));
            self.nud[slot].work.run_due(now_ms, || self.nud_work_fn(slot));
        }
    }

    /// Whether RPS is currently marked enabled.
    pub fn rps_enabled(&self) -> bool {
        self.rps_enabled.load(Ordering::SeqCst)
    }

    /// The PDEV this context is bound to, if any.
    pub fn pdev_id(&self) -> Option<u8> {
        self.pdev.with_ref(|p| *p)
    }

    /// Read a copy of the current configuration.
    pub fn config(&self) -> DpConfig {
        self.config.with_ref(Clone::clone)
    }

    /// Access the upper-stack callback table.
    pub fn callbacks(&self) -> &CB {
        &self.callbacks
    }

    /// Access the object-manager seam.
    pub fn objmgr(&self) -> &OM {
        &self.objmgr
    }
}
