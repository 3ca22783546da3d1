//! WLAN Datapath (DP) Interface Manager
//!
//! A `no_std` Rust implementation of a WLAN datapath driver component:
//! per-interface lifecycle management, MIC (message integrity check) error
//! handling and receive-packet-steering (RPS) CPU-affinity configuration.
//!
//! # Architecture
//!
//! The crate is organized into three layers:
//!
//! 1. **DP Layer** ([`dp`]): the interface registry, the MIC error work
//!    state machine, NUD tracking and RPS dispatch, tied together by
//!    [`DpContext`]
//! 2. **Seam Layer** ([`hal`]): traits for the two external collaborators,
//!    the object-manager hierarchy and the upper-stack callback table
//! 3. **Primitives** ([`work`], [`sync`]): the single-shot cancellable
//!    delayed work and the critical-section cell everything is built on
//!
//! # Execution Model
//!
//! The core never spawns anything. The embedding environment provides a
//! worker context that calls [`DpContext::poll_work`] with a monotonic
//! millisecond timestamp; receive-path indications and control-plane calls
//! enter on their own contexts. All cross-context state is guarded by
//! short critical sections, and the only blocking operation is the
//! synchronous stop used on interface teardown.
//!
//! # Example
//!
//! ```ignore
//! use wlan_dp::{DpConfig, DpContext, OpMode};
//!
//! let dp = DpContext::new(
//!     DpConfig::new().with_cpu_map_list("a b c d"),
//!     callbacks, // impl DpCallbacks
//!     objmgr,    // impl ObjManager
//! );
//! dp.attach_context();
//!
//! // Interface allocation step, then the framework notifications:
//! dp.register_interface(&[0x02, 0, 0, 0, 0, 1], "wlan0")?;
//! dp.vdev_obj_create_notification(1, &[0x02, 0, 0, 0, 0, 1], OpMode::Sta)?;
//!
//! // Receive path reports a MIC failure:
//! dp.rx_mic_error_ind(&failure_info);
//!
//! // Worker loop, on its own context:
//! loop {
//!     dp.poll_work(clock.now_ms());
//! }
//! ```
//!
//! # Features
//!
//! - `defmt`: log through `defmt`
//! - `log`: log through the `log` facade
//!
//! With neither feature enabled, logging compiles to nothing.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

// =============================================================================
// Modules
// =============================================================================

#[macro_use]
mod fmt;

pub mod dp;
pub mod hal;
pub mod sync;
pub mod work;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use dp::DpContext;
pub use dp::config::{
    CPU_MAP_LIST_LEN, DpConfig, IFNAME_LEN, INTF_ID_INVALID, MAX_INTERFACES, MacAddr,
    NUM_RX_QUEUES, OpMode, SVC_IFACE_NUM_QUEUES,
};
pub use dp::error::{
    ConfigError, ConfigResult, DpError, DpResult, LifecycleError, LifecycleResult, RegistryError,
    RegistryResult,
};
pub use dp::interface::InterfaceInfo;
pub use dp::mic::{CIPHER_SEQ_CTR_SIZE, MicErrorInfo, MicStatus, RxMicFailureInfo};
pub use dp::nud::NudState;
pub use dp::rps::RpsIndication;
pub use hal::{DpCallbacks, HierarchyObj, ObjManager, ObjMgrError, ObjMgrResult, SvcMsgType};
pub use work::DelayedWork;
