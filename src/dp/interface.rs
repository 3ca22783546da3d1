//! Per-interface registry.
//!
//! Interfaces are keyed by hardware address and stored in a fixed-slot
//! table guarded by a single cell, the registry lock. An entry is created
//! by [`register_interface`](crate::DpContext::register_interface) before
//! the VDEV create notification fires; the notification only fills in the
//! interface id and mode.
//!
//! Lock discipline: every scan and mutation happens under the registry
//! cell, and nothing invoked under it takes another DP cell. The traversal
//! helper hands the body a per-slot snapshot outside the cell, so the body
//! may unregister the current entry (or take per-interface locks) safely.

use embedded_hal::delay::DelayNs;
use heapless::String;

use super::config::{IFNAME_LEN, INTF_ID_INVALID, MAX_INTERFACES, MacAddr, OpMode};
use super::error::{DpResult, RegistryError, RegistryResult};
use crate::hal::{DpCallbacks, ObjManager};
use crate::sync::CriticalSectionCell;

/// Snapshot of one registered interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    /// Hardware address; unique within the registry.
    pub mac_addr: MacAddr,
    /// Interface id assigned at VDEV create; [`INTF_ID_INVALID`] until then.
    pub intf_id: u8,
    /// Operating mode assigned at VDEV create.
    pub device_mode: OpMode,
    /// Interface name, as shown to the upper stack.
    pub name: String<IFNAME_LEN>,
}

/// Check that an interface id routes to a live interface.
///
/// The sentinel means the interface never came up; anything past the table
/// bound is corruption from the caller.
pub(crate) fn intf_id_is_valid(intf_id: u8) -> bool {
    if intf_id == INTF_ID_INVALID {
        dp_err!("interface is not up");
        return false;
    }
    if usize::from(intf_id) >= MAX_INTERFACES {
        dp_err!("bad interface id: {}", intf_id);
        return false;
    }
    true
}

/// Fixed-slot interface table behind the registry cell.
pub(crate) struct Registry {
    slots: CriticalSectionCell<[Option<InterfaceInfo>; MAX_INTERFACES]>,
}

impl Registry {
    pub(crate) const fn new() -> Self {
        Self {
            slots: CriticalSectionCell::new([const { None }; MAX_INTERFACES]),
        }
    }

    /// Insert a new entry in the first free slot.
    pub(crate) fn register(&self, mac_addr: &MacAddr, name: &str) -> RegistryResult<usize> {
        self.slots.with(|slots| {
            if slots
                .iter()
                .flatten()
                .any(|entry| entry.mac_addr == *mac_addr)
            {
                return Err(RegistryError::DuplicateAddress);
            }
            let Some(slot) = slots.iter().position(Option::is_none) else {
                return Err(RegistryError::TableFull);
            };

            let mut bounded_name = String::new();
            for ch in name.chars() {
                if bounded_name.push(ch).is_err() {
                    break;
                }
            }
            slots[slot] = Some(InterfaceInfo {
                mac_addr: *mac_addr,
                intf_id: INTF_ID_INVALID,
                device_mode: OpMode::Unknown,
                name: bounded_name,
            });
            Ok(slot)
        })
    }

    /// Remove and return the entry in `slot`.
    pub(crate) fn remove_slot(&self, slot: usize) -> Option<InterfaceInfo> {
        self.slots.with(|slots| slots[slot].take())
    }

    /// Snapshot the entry in `slot`.
    pub(crate) fn get(&self, slot: usize) -> Option<InterfaceInfo> {
        self.slots.with_ref(|slots| slots[slot].clone())
    }

    /// Mutate the entry in `slot`; returns whether it existed.
    pub(crate) fn update<F: FnOnce(&mut InterfaceInfo)>(&self, slot: usize, f: F) -> bool {
        self.slots.with(|slots| match slots[slot].as_mut() {
            Some(entry) => {
                f(entry);
                true
            }
            None => false,
        })
    }

    /// Linear scan for an exact hardware-address match.
    pub(crate) fn slot_by_addr(&self, mac_addr: &MacAddr) -> Option<usize> {
        self.slots.with_ref(|slots| {
            slots
                .iter()
                .position(|e| e.as_ref().is_some_and(|e| e.mac_addr == *mac_addr))
        })
    }

    /// Linear scan for the interface holding `intf_id`.
    pub(crate) fn slot_by_intf_id(&self, intf_id: u8) -> Option<usize> {
        if intf_id == INTF_ID_INVALID {
            return None;
        }
        self.slots.with_ref(|slots| {
            slots
                .iter()
                .position(|e| e.as_ref().is_some_and(|e| e.intf_id == intf_id))
        })
    }

    /// First occupied slot, as a `(cursor, snapshot)` pair.
    pub(crate) fn first(&self) -> Option<(usize, InterfaceInfo)> {
        self.next_from(0)
    }

    /// Next occupied slot after `cursor`.
    pub(crate) fn next(&self, cursor: usize) -> Option<(usize, InterfaceInfo)> {
        self.next_from(cursor + 1)
    }

    fn next_from(&self, start: usize) -> Option<(usize, InterfaceInfo)> {
        self.slots.with_ref(|slots| {
            slots
                .iter()
                .enumerate()
                .skip(start)
                .find_map(|(i, e)| e.as_ref().map(|e| (i, e.clone())))
        })
    }

    /// Visit every entry. The body runs outside the registry cell on a
    /// snapshot, so it may remove the current entry or take other cells.
    pub(crate) fn for_each<F: FnMut(usize, &InterfaceInfo)>(&self, mut f: F) {
        for slot in 0..MAX_INTERFACES {
            if let Some(entry) = self.get(slot) {
                f(slot, &entry);
            }
        }
    }

    /// Number of registered interfaces.
    pub(crate) fn count(&self) -> usize {
        self.slots
            .with_ref(|slots| slots.iter().filter(|e| e.is_some()).count())
    }
}

// =============================================================================
// Registry entry points
// =============================================================================

impl<CB: DpCallbacks, OM: ObjManager> crate::DpContext<CB, OM> {
    /// Register an interface under its hardware address.
    ///
    /// This is the allocation step that precedes the VDEV create
    /// notification; it also brings up the per-interface MIC work and NUD
    /// tracking. Names longer than [`IFNAME_LEN`] are truncated.
    pub fn register_interface(&self, mac_addr: &MacAddr, name: &str) -> DpResult<()> {
        let slot = self.registry.register(mac_addr, name)?;
        self.mic_init_work(slot);
        self.nud_init_tracking(slot);
        Ok(())
    }

    /// Remove an interface, tearing down its MIC work and NUD tracking.
    ///
    /// Blocks until any in-flight work for the interface has completed, so
    /// it must not be called from the worker context.
    pub fn unregister_interface<D: DelayNs>(
        &self,
        mac_addr: &MacAddr,
        delay: &mut D,
    ) -> DpResult<()> {
        let Some(slot) = self.registry.slot_by_addr(mac_addr) else {
            return Err(RegistryError::NotFound.into());
        };
        self.mic_deinit_work(slot, delay);
        self.nud_deinit_tracking(slot, delay);
        self.registry.remove_slot(slot);
        Ok(())
    }

    /// Look up an interface by hardware address. `None` when absent; not
    /// an error.
    pub fn interface_by_addr(&self, mac_addr: &MacAddr) -> Option<InterfaceInfo> {
        let slot = self.registry.slot_by_addr(mac_addr)?;
        self.registry.get(slot)
    }

    /// Look up an interface by its interface id.
    pub fn interface_by_id(&self, intf_id: u8) -> Option<InterfaceInfo> {
        let slot = self.registry.slot_by_intf_id(intf_id)?;
        self.registry.get(slot)
    }

    /// First registered interface, with a cursor for
    /// [`next_interface`](Self::next_interface).
    pub fn first_interface(&self) -> Option<(usize, InterfaceInfo)> {
        self.registry.first()
    }

    /// Registered interface following `cursor`.
    pub fn next_interface(&self, cursor: usize) -> Option<(usize, InterfaceInfo)> {
        self.registry.next(cursor)
    }

    /// Visit every registered interface; the body may unregister the
    /// current entry.
    pub fn for_each_interface<F: FnMut(&InterfaceInfo)>(&self, mut f: F) {
        self.registry.for_each(|_, entry| f(entry));
    }

    /// Number of registered interfaces.
    pub fn interface_count(&self) -> usize {
        self.registry.count()
    }

    /// First interface operating in `mode`, if any.
    pub(crate) fn interface_by_mode(&self, mode: OpMode) -> Option<InterfaceInfo> {
        let mut cursor = self.registry.first();
        while let Some((slot, entry)) = cursor {
            if entry.device_mode == mode {
                return Some(entry);
            }
            cursor = self.registry.next(slot);
        }
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;

    fn mac(n: u8) -> MacAddr {
        [0x02, 0, 0, 0, 0, n]
    }

    #[test]
    fn register_and_find_by_address() {
        let registry = Registry::new();
        for n in 0..4 {
            registry.register(&mac(n), "wlan").unwrap();
        }

        for n in 0..4 {
            let slot = registry.slot_by_addr(&mac(n)).unwrap();
            assert_eq!(registry.get(slot).unwrap().mac_addr, mac(n));
        }
        assert!(registry.slot_by_addr(&mac(9)).is_none());
        assert_eq!(registry.count(), 4);
    }

    #[test]
    fn duplicate_address_rejected() {
        let registry = Registry::new();
        registry.register(&mac(1), "wlan0").unwrap();
        assert_eq!(
            registry.register(&mac(1), "wlan1"),
            Err(RegistryError::DuplicateAddress)
        );
    }

    #[test]
    fn table_full_rejected() {
        let registry = Registry::new();
        for n in 0..MAX_INTERFACES as u8 {
            registry.register(&mac(n), "wlan").unwrap();
        }
        assert_eq!(
            registry.register(&mac(0x20), "wlan"),
            Err(RegistryError::TableFull)
        );
    }

    #[test]
    fn new_entry_starts_with_invalid_id() {
        let registry = Registry::new();
        let slot = registry.register(&mac(1), "wlan0").unwrap();
        let entry = registry.get(slot).unwrap();
        assert_eq!(entry.intf_id, INTF_ID_INVALID);
        assert_eq!(entry.device_mode, OpMode::Unknown);
        assert_eq!(entry.name.as_str(), "wlan0");
    }

    #[test]
    fn long_name_truncated() {
        let registry = Registry::new();
        let slot = registry
            .register(&mac(1), "a-very-long-interface-name")
            .unwrap();
        assert_eq!(registry.get(slot).unwrap().name.len(), IFNAME_LEN);
    }

    #[test]
    fn slot_by_intf_id_ignores_sentinel() {
        let registry = Registry::new();
        registry.register(&mac(1), "wlan0").unwrap();
        // No id assigned yet; the sentinel must never match.
        assert!(registry.slot_by_intf_id(INTF_ID_INVALID).is_none());

        let slot = registry.slot_by_addr(&mac(1)).unwrap();
        registry.update(slot, |e| e.intf_id = 3);
        assert_eq!(registry.slot_by_intf_id(3), Some(slot));
    }

    #[test]
    fn cursor_iteration_visits_all() {
        let registry = Registry::new();
        for n in 0..3 {
            registry.register(&mac(n), "wlan").unwrap();
        }

        let mut seen = Vec::new();
        let mut cursor = registry.first();
        while let Some((slot, entry)) = cursor {
            seen.push(entry.mac_addr);
            cursor = registry.next(slot);
        }
        assert_eq!(seen, std::vec![mac(0), mac(1), mac(2)]);
    }

    #[test]
    fn for_each_survives_removal_of_current() {
        let registry = Registry::new();
        for n in 0..4 {
            registry.register(&mac(n), "wlan").unwrap();
        }

        let mut visited = Vec::new();
        registry.for_each(|slot, entry| {
            visited.push(entry.mac_addr);
            // Delete the entry being visited; the rest must still be seen.
            registry.remove_slot(slot);
        });

        assert_eq!(visited, std::vec![mac(0), mac(1), mac(2), mac(3)]);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn intf_id_validation() {
        assert!(intf_id_is_valid(0));
        assert!(intf_id_is_valid(MAX_INTERFACES as u8 - 1));
        assert!(!intf_id_is_valid(INTF_ID_INVALID));
        assert!(!intf_id_is_valid(MAX_INTERFACES as u8));
    }
}
