//! Object-manager hierarchy seam.
//!
//! The driver framework owns a three-level object hierarchy: PSOC (radio
//! subsystem), PDEV (physical device) and VDEV (virtual interface), with
//! per-component private-object attachment and reference counting. The DP
//! core only ever talks to it through this trait; objects are addressed by
//! stable ids rather than pointers.

/// An object in the PSOC/PDEV/VDEV hierarchy, addressed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HierarchyObj {
    /// The radio subsystem object.
    Psoc,
    /// A physical device object.
    Pdev(u8),
    /// A virtual interface object.
    Vdev(u8),
}

/// Errors reported by the object-manager framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ObjMgrError {
    /// The referenced hierarchy object does not exist (or is being torn
    /// down and no longer hands out references).
    ObjectNotFound,
    /// A component private object is already attached to the object.
    ComponentAttached,
    /// No component private object is attached to the object.
    ComponentNotAttached,
}

impl ObjMgrError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ObjMgrError::ObjectNotFound => "hierarchy object not found",
            ObjMgrError::ComponentAttached => "component already attached",
            ObjMgrError::ComponentNotAttached => "component not attached",
        }
    }
}

impl core::fmt::Display for ObjMgrError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for object-manager operations
pub type ObjMgrResult<T> = core::result::Result<T, ObjMgrError>;

/// Operations the object-manager framework provides to component code.
///
/// Attach/detach are capability-checked by the framework and may fail;
/// failures propagate to the notification caller without rollback.
/// `vdev_get_ref` takes a reference that keeps the vdev alive until the
/// matching `vdev_put_ref`; holders must pair every successful get with a
/// put.
///
/// Implementations are shared with the worker context, hence `Sync`.
pub trait ObjManager: Sync {
    /// Attach the DP component private object to a hierarchy object.
    fn component_attach(&self, obj: HierarchyObj) -> ObjMgrResult<()>;

    /// Detach the DP component private object from a hierarchy object.
    fn component_detach(&self, obj: HierarchyObj) -> ObjMgrResult<()>;

    /// Take a reference on a vdev. Fails if the vdev no longer exists.
    fn vdev_get_ref(&self, vdev_id: u8) -> ObjMgrResult<()>;

    /// Release a reference taken with [`vdev_get_ref`](Self::vdev_get_ref).
    fn vdev_put_ref(&self, vdev_id: u8);

    /// Connection-manager check: whether the vdev is in the connected/active
    /// state. Station-mode MIC errors are only reported for active vdevs.
    fn vdev_is_active(&self, vdev_id: u8) -> bool;
}
