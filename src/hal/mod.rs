//! Collaborator seams
//!
//! The DP core consumes two external subsystems it does not implement: the
//! driver object-manager hierarchy (PSOC/PDEV/VDEV) and the OS-interface
//! layer above the driver. Both are modelled as traits the embedding
//! environment implements.
//!
//! # Modules
//!
//! - [`objmgr`]: object-manager hierarchy operations (component
//!   attach/detach, vdev reference counting)
//! - [`callbacks`]: upper-stack callback table (MIC error reporting, RPS
//!   signalling, NUD failure reporting)
//!
//! # Delay Integration
//!
//! All blocking waits in the crate use `embedded_hal::delay::DelayNs`
//! directly. Pass any delay implementation from your HAL.

pub mod callbacks;
pub mod objmgr;

// Re-export commonly used types
pub use callbacks::{DpCallbacks, SvcMsgType};
pub use objmgr::{HierarchyObj, ObjManager, ObjMgrError, ObjMgrResult};
