//! Synchronization primitives for ISR-safe access.
//!
//! The DP core is entered from several execution contexts at once: the
//! receive-path indication callbacks, the deferred-work executor, and
//! control-plane configuration calls. Every piece of shared state is held
//! in a [`CriticalSectionCell`], the spinlock-equivalent for this crate.
//!
//! Critical sections must stay short: never block, never call
//! [`stop_sync`](crate::work::DelayedWork::stop_sync) while one is held.

use core::cell::RefCell;
use critical_section::Mutex;

/// Cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` for safe mutable access
/// from both normal code and interrupt handlers.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive mutable access.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Execute a closure with immutable access.
    #[inline]
    pub fn with_ref<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        critical_section::with(|cs| {
            let value = self.inner.borrow_ref(cs);
            f(&value)
        })
    }
}

// SAFETY: CriticalSectionCell uses critical sections to protect all access;
// the contained value only moves across contexts as a whole.
unsafe impl<T: Send> Sync for CriticalSectionCell<T> {}
