//! Receive packet steering (RPS) configuration dispatch.
//!
//! RPS spreads receive processing across CPU cores with one CPU bitmask
//! per receive queue. The masks come from configuration as a
//! space-separated hex string (`"a b c d"` → queues `[0xa, 0xb, 0xc,
//! 0xd]`), are parsed on demand and sent to the upper stack as a service
//! signal message per interface. A context-wide flag records whether RPS
//! is currently enabled.

use core::sync::atomic::Ordering;

use super::config::{IFNAME_LEN, NUM_RX_QUEUES, OpMode, SVC_IFACE_NUM_QUEUES};
use super::error::{ConfigError, ConfigResult};
use super::interface::InterfaceInfo;
use crate::hal::{DpCallbacks, ObjManager, SvcMsgType};

/// RPS indication payload sent to the upper stack.
///
/// This is the one bit-exact structure at the signalling boundary; queues
/// past `num_queues` carry zero masks.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpsIndication {
    /// Interface name, NUL-padded.
    pub ifname: [u8; IFNAME_LEN],
    /// Number of queues the masks apply to.
    pub num_queues: u16,
    /// Per-queue CPU bitmasks.
    pub cpu_map_list: [u16; SVC_IFACE_NUM_QUEUES],
}

/// Convert a space-separated hex string into `u16` masks.
///
/// Parses at most `out.len()` tokens; malformed tokens are skipped and the
/// scan continues. Returns the number of masks written.
pub(crate) fn hex_string_to_u16_array(s: &str, out: &mut [u16]) -> usize {
    let mut len = 0;
    for token in s.split_whitespace() {
        if len == out.len() {
            break;
        }
        if let Ok(value) = u32::from_str_radix(token, 16) {
            out[len] = value as u16;
            len += 1;
        }
    }
    len
}

fn ifname_bytes(name: &str) -> [u8; IFNAME_LEN] {
    let mut ifname = [0u8; IFNAME_LEN];
    let bytes = name.as_bytes();
    let n = bytes.len().min(IFNAME_LEN);
    ifname[..n].copy_from_slice(&bytes[..n]);
    ifname
}

impl<CB: DpCallbacks, OM: ObjManager> crate::DpContext<CB, OM> {
    /// Replace the configured CPU map list.
    pub fn set_cpu_map_list(&self, list: &str) -> ConfigResult<()> {
        self.config.with(|c| {
            let mut bounded = heapless::String::new();
            if bounded.push_str(list).is_err() {
                return Err(ConfigError::CpuMapListTooLong);
            }
            c.cpu_map_list = bounded;
            Ok(())
        })
    }

    /// Send the RPS CPU-map indication for one interface.
    ///
    /// An empty or unparseable CPU map list marks RPS disabled without
    /// sending; otherwise the effective queue count is the smaller of the
    /// parsed length and [`NUM_RX_QUEUES`], the message goes out and RPS is
    /// marked enabled.
    pub fn send_rps_ind(&self, intf: &InterfaceInfo) {
        let (map, radio_index) = self
            .config
            .with_ref(|c| (c.cpu_map_list.clone(), c.radio_index));

        dp_info!("cpu_map_list '{}'", map.as_str());

        if map.is_empty() {
            dp_info!("no cpu map list found");
            self.rps_config_failed();
            return;
        }

        let mut cpu_map_list = [0u16; SVC_IFACE_NUM_QUEUES];
        let parsed = hex_string_to_u16_array(map.as_str(), &mut cpu_map_list);
        if parsed == 0 {
            dp_err!("invalid cpu map list");
            self.rps_config_failed();
            return;
        }

        let num_queues = parsed.min(NUM_RX_QUEUES) as u16;
        for (i, mask) in cpu_map_list.iter().enumerate().take(usize::from(num_queues)) {
            dp_info!("cpu_map_list[{}] = {}", i, *mask);
        }

        let data = RpsIndication {
            ifname: ifname_bytes(intf.name.as_str()),
            num_queues,
            cpu_map_list,
        };
        self.callbacks
            .send_svc_msg(radio_index, SvcMsgType::RpsEnable, &data);

        self.rps_enabled.store(true, Ordering::SeqCst);
    }

    fn rps_config_failed(&self) {
        dp_info!("wrong rps configuration, leaving rx on the receive thread");
        self.rps_enabled.store(false, Ordering::SeqCst);
    }

    /// Send an all-zero CPU map for one interface and mark RPS disabled.
    pub fn send_rps_disable_ind(&self, intf: &InterfaceInfo) {
        let radio_index = self.config.with_ref(|c| c.radio_index);

        dp_info!("set cpu_map_list 0");

        let data = RpsIndication {
            ifname: ifname_bytes(intf.name.as_str()),
            num_queues: NUM_RX_QUEUES as u16,
            cpu_map_list: [0; SVC_IFACE_NUM_QUEUES],
        };
        self.callbacks
            .send_svc_msg(radio_index, SvcMsgType::RpsEnable, &data);

        self.rps_enabled.store(false, Ordering::SeqCst);
    }

    /// Send the RPS indication for an interface coming up, if RPS is
    /// statically enabled in configuration.
    pub fn try_send_rps_ind(&self, intf_id: u8) {
        let Some(intf) = self.interface_by_id(intf_id) else {
            dp_err!("dp interface is not present");
            return;
        };
        if self.config.with_ref(|c| c.rps) {
            self.send_rps_ind(&intf);
        }
    }

    /// Dynamically enable or disable RPS for one interface.
    ///
    /// A no-op when RPS is statically forced from configuration. The vdev
    /// is resolved through the object manager with a reference held.
    pub fn set_rps(&self, intf_id: u8, enable: bool) {
        if self.objmgr.vdev_get_ref(intf_id).is_err() {
            return;
        }
        let Some(intf) = self.interface_by_id(intf_id) else {
            self.objmgr.vdev_put_ref(intf_id);
            dp_err!("dp interface not found for intf_id: {}", intf_id);
            return;
        };

        dp_info!("set rps to {} for intf_id {}", enable, intf_id);
        if !self.config.with_ref(|c| c.rps) {
            if enable {
                self.send_rps_ind(&intf);
            } else {
                self.send_rps_disable_ind(&intf);
            }
        }
        self.objmgr.vdev_put_ref(intf_id);
    }

    /// Toggle RPS with the receive mode, on the first SAP interface.
    ///
    /// Gated on the unified-copy offload path and only acts on an actual
    /// enabled-state transition.
    pub fn set_rx_mode_rps(&self, enable: bool) {
        let Some(intf) = self.interface_by_mode(OpMode::Sap) else {
            return;
        };

        let (rps, uc_offload) = self
            .config
            .with_ref(|c| (c.rps, c.uc_offload_enabled));
        if rps || !uc_offload {
            return;
        }

        let currently = self.rps_enabled.load(Ordering::SeqCst);
        if enable && !currently {
            self.send_rps_ind(&intf);
        } else if !enable && currently {
            self.send_rps_disable_ind(&intf);
        }
    }

    /// Apply the configured CPU map to every registered interface.
    pub fn set_rps_cpu_mask(&self) {
        self.registry.for_each(|_, intf| self.send_rps_ind(intf));
    }

    /// Send an all-zero CPU map to every registered interface.
    pub fn clear_rps_cpu_mask(&self) {
        self.registry.for_each(|_, intf| self.send_rps_disable_ind(intf));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]
mod tests {
    extern crate std;

    use super::*;
    use crate::dp::config::OpMode;
    use crate::testing::{CallbackEvent, add_vdev_interface, test_context};

    #[test]
    fn hex_parse_basic() {
        let mut out = [0u16; 6];
        let len = hex_string_to_u16_array("a b c d", &mut out);
        assert_eq!(len, 4);
        assert_eq!(out[..4], [0xA, 0xB, 0xC, 0xD]);
    }

    #[test]
    fn hex_parse_respects_output_capacity() {
        let mut out = [0u16; 2];
        let len = hex_string_to_u16_array("a b c d", &mut out);
        assert_eq!(len, 2);
        assert_eq!(out, [0xA, 0xB]);
    }

    #[test]
    fn hex_parse_skips_malformed_tokens() {
        let mut out = [0u16; 6];
        let len = hex_string_to_u16_array("xx a", &mut out);
        assert_eq!(len, 1);
        assert_eq!(out[0], 0xA);
    }

    #[test]
    fn hex_parse_empty_yields_nothing() {
        let mut out = [0u16; 6];
        assert_eq!(hex_string_to_u16_array("", &mut out), 0);
    }

    #[test]
    fn send_rps_ind_builds_indication() {
        let dp = test_context();
        dp.set_cpu_map_list("a b c d").unwrap();

        let intf = dp.interface_by_id(1).unwrap();
        dp.send_rps_ind(&intf);

        assert!(dp.rps_enabled());
        let events = dp.callbacks.take_events();
        let CallbackEvent::SvcMsg {
            radio_index,
            data,
            ..
        } = &events[0]
        else {
            panic!("expected svc msg");
        };
        assert_eq!(*radio_index, 0);
        assert_eq!(data.num_queues, 4);
        assert_eq!(data.cpu_map_list[..4], [0xA, 0xB, 0xC, 0xD]);
        assert_eq!(&data.ifname[..5], b"wlan0");
        assert_eq!(data.ifname[5], 0);
    }

    #[test]
    fn queue_count_clamped_to_rx_queues() {
        let dp = test_context();
        dp.set_cpu_map_list("1 2 3 4 5 6").unwrap();

        let intf = dp.interface_by_id(1).unwrap();
        dp.send_rps_ind(&intf);

        let events = dp.callbacks.take_events();
        let CallbackEvent::SvcMsg { data, .. } = &events[0] else {
            panic!("expected svc msg");
        };
        assert_eq!(data.num_queues, NUM_RX_QUEUES as u16);
        assert_eq!(data.cpu_map_list, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn empty_cpu_map_disables_without_sending() {
        let dp = test_context();

        let intf = dp.interface_by_id(1).unwrap();
        dp.send_rps_ind(&intf);

        assert!(!dp.rps_enabled());
        assert!(dp.callbacks.take_events().is_empty());
    }

    #[test]
    fn unparseable_cpu_map_disables_without_sending() {
        let dp = test_context();
        dp.set_cpu_map_list("xx yy zz").unwrap();

        let intf = dp.interface_by_id(1).unwrap();
        dp.send_rps_ind(&intf);

        assert!(!dp.rps_enabled());
        assert!(dp.callbacks.take_events().is_empty());
    }

    #[test]
    fn disable_ind_sends_zero_masks() {
        let dp = test_context();
        dp.set_cpu_map_list("a b").unwrap();
        let intf = dp.interface_by_id(1).unwrap();
        dp.send_rps_ind(&intf);
        assert!(dp.rps_enabled());
        dp.callbacks.take_events();

        dp.send_rps_disable_ind(&intf);

        assert!(!dp.rps_enabled());
        let events = dp.callbacks.take_events();
        let CallbackEvent::SvcMsg { data, .. } = &events[0] else {
            panic!("expected svc msg");
        };
        assert_eq!(data.num_queues, NUM_RX_QUEUES as u16);
        assert_eq!(data.cpu_map_list, [0; SVC_IFACE_NUM_QUEUES]);
    }

    #[test]
    fn try_send_requires_static_rps() {
        let dp = test_context();
        dp.set_cpu_map_list("a b c d").unwrap();

        dp.try_send_rps_ind(1);
        assert!(dp.callbacks.take_events().is_empty());

        dp.config.with(|c| c.rps = true);
        dp.try_send_rps_ind(1);
        assert_eq!(dp.callbacks.take_events().len(), 1);
    }

    #[test]
    fn set_rps_skipped_when_statically_forced() {
        let dp = test_context();
        dp.set_cpu_map_list("a b c d").unwrap();
        dp.config.with(|c| c.rps = true);

        dp.set_rps(1, true);

        assert!(dp.callbacks.take_events().is_empty());
        assert_eq!(dp.objmgr.ref_balance(), 0);
    }

    #[test]
    fn set_rps_dispatches_enable_and_disable() {
        let dp = test_context();
        dp.set_cpu_map_list("a b c d").unwrap();

        dp.set_rps(1, true);
        assert!(dp.rps_enabled());

        dp.set_rps(1, false);
        assert!(!dp.rps_enabled());

        assert_eq!(dp.callbacks.take_events().len(), 2);
        assert_eq!(dp.objmgr.ref_balance(), 0);
    }

    #[test]
    fn set_rps_on_unknown_vdev_is_noop() {
        let dp = test_context();
        dp.set_cpu_map_list("a b c d").unwrap();

        dp.set_rps(5, true);

        assert!(dp.callbacks.take_events().is_empty());
        assert_eq!(dp.objmgr.ref_balance(), 0);
    }

    #[test]
    fn rx_mode_rps_requires_sap_and_uc_offload() {
        let dp = test_context();
        dp.set_cpu_map_list("a b c d").unwrap();
        dp.config.with(|c| c.uc_offload_enabled = true);

        // No SAP interface registered yet.
        dp.set_rx_mode_rps(true);
        assert!(dp.callbacks.take_events().is_empty());

        add_vdev_interface(&dp, 2, OpMode::Sap, "softap0");

        dp.config.with(|c| c.uc_offload_enabled = false);
        dp.set_rx_mode_rps(true);
        assert!(dp.callbacks.take_events().is_empty());

        dp.config.with(|c| c.uc_offload_enabled = true);
        dp.set_rx_mode_rps(true);
        assert_eq!(dp.callbacks.take_events().len(), 1);
        assert!(dp.rps_enabled());

        // Already enabled: no transition, no message.
        dp.set_rx_mode_rps(true);
        assert!(dp.callbacks.take_events().is_empty());

        dp.set_rx_mode_rps(false);
        assert!(!dp.rps_enabled());
        assert_eq!(dp.callbacks.take_events().len(), 1);
    }

    #[test]
    fn cpu_mask_broadcast_covers_all_interfaces() {
        let dp = test_context();
        dp.set_cpu_map_list("a b").unwrap();
        add_vdev_interface(&dp, 2, OpMode::Sap, "softap0");

        dp.set_rps_cpu_mask();
        assert_eq!(dp.callbacks.take_events().len(), 2);
        assert!(dp.rps_enabled());

        dp.clear_rps_cpu_mask();
        assert_eq!(dp.callbacks.take_events().len(), 2);
        assert!(!dp.rps_enabled());
    }

    #[test]
    fn cpu_map_list_update_bounds_checked() {
        let dp = test_context();
        assert!(dp.set_cpu_map_list("1 2 3 4").is_ok());
        assert_eq!(dp.config().cpu_map_list.as_str(), "1 2 3 4");

        let long = "1 2 3 4 5 6 7 8 9 a b c d e f 10 11 12 13 14 15 16";
        assert_eq!(
            dp.set_cpu_map_list(long),
            Err(ConfigError::CpuMapListTooLong)
        );
        // Failed update leaves the previous value intact.
        assert_eq!(dp.config().cpu_map_list.as_str(), "1 2 3 4");
    }
}
