//! Error types for the DP component
//!
//! Errors are organized by domain for better diagnostics:
//! - [`RegistryError`]: Interface registry failures
//! - [`LifecycleError`]: Attach/detach and notification ordering failures
//! - [`ConfigError`]: Configuration value failures
//!
//! The unified [`DpError`] enum wraps all domain errors (plus the
//! object-manager framework's [`ObjMgrError`]) and is returned by most
//! fallible entry points. Lookups that can legitimately miss return
//! `Option`, not an error.

use crate::hal::ObjMgrError;

// =============================================================================
// Registry Errors
// =============================================================================

/// Interface registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// All interface slots are in use
    TableFull,
    /// An interface with this hardware address is already registered
    DuplicateAddress,
    /// No interface with this hardware address is registered
    NotFound,
}

impl RegistryError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RegistryError::TableFull => "interface table full",
            RegistryError::DuplicateAddress => "duplicate hardware address",
            RegistryError::NotFound => "interface not registered",
        }
    }
}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Lifecycle Errors
// =============================================================================

/// Attach/detach and notification ordering errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleError {
    /// The context is not attached
    NotAttached,
    /// No PSOC is bound to the context
    PsocNotBound,
    /// The notification names an interface the registry does not hold
    InterfaceNotFound,
}

impl LifecycleError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LifecycleError::NotAttached => "context not attached",
            LifecycleError::PsocNotBound => "psoc not bound",
            LifecycleError::InterfaceNotFound => "interface not found",
        }
    }
}

impl core::fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration value errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The CPU map list does not fit the bounded configuration string
    CpuMapListTooLong,
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::CpuMapListTooLong => "cpu map list too long",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(DpError::Registry(RegistryError::TableFull)) => { /* ... */ }
///     Err(DpError::ObjMgr(ObjMgrError::ObjectNotFound)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DpError {
    /// Interface registry error
    Registry(RegistryError),
    /// Lifecycle error
    Lifecycle(LifecycleError),
    /// Configuration error
    Config(ConfigError),
    /// Object-manager framework error, propagated unchanged
    ObjMgr(ObjMgrError),
}

impl core::fmt::Display for DpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DpError::Registry(e) => write!(f, "registry: {}", e.as_str()),
            DpError::Lifecycle(e) => write!(f, "lifecycle: {}", e.as_str()),
            DpError::Config(e) => write!(f, "config: {}", e.as_str()),
            DpError::ObjMgr(e) => write!(f, "objmgr: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<RegistryError> for DpError {
    fn from(e: RegistryError) -> Self {
        DpError::Registry(e)
    }
}

impl From<LifecycleError> for DpError {
    fn from(e: LifecycleError) -> Self {
        DpError::Lifecycle(e)
    }
}

impl From<ConfigError> for DpError {
    fn from(e: ConfigError) -> Self {
        DpError::Config(e)
    }
}

impl From<ObjMgrError> for DpError {
    fn from(e: ObjMgrError) -> Self {
        DpError::ObjMgr(e)
    }
}

/// Result type alias for DP operations
pub type DpResult<T> = core::result::Result<T, DpError>;

/// Result type alias for registry operations
pub type RegistryResult<T> = core::result::Result<T, RegistryError>;

/// Result type alias for lifecycle operations
pub type LifecycleResult<T> = core::result::Result<T, LifecycleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================
