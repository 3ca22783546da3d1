//! Upper-stack callback seam.
//!
//! The OS-interface layer registers the operations the DP core calls
//! upward: MIC failure reporting to the supplicant path, the service
//! signalling channel RPS indications travel on, and NUD failure
//! reporting. This is the moral equivalent of the driver's callback table;
//! entries are invoked from worker context as well as control-plane
//! context.

use crate::dp::mic::MicErrorInfo;
use crate::dp::rps::RpsIndication;

/// Service signal message types carried to the upper stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum SvcMsgType {
    /// RPS CPU-map indication (also used with an all-zero map to disable).
    RpsEnable,
}

/// Callbacks into the OS-interface layer above the DP core.
///
/// Implementations are shared with the worker context, hence `Sync`. None
/// of these calls may re-enter the DP core's locking (they are invoked
/// with no DP lock held, and must keep it that way).
pub trait DpCallbacks: Sync {
    /// Report a MIC failure on a station / P2P-client interface.
    fn process_sta_mic_error(&self, info: &MicErrorInfo, vdev_id: u8);

    /// Report a MIC failure on a SAP / P2P-GO interface.
    fn process_sap_mic_error(&self, info: &MicErrorInfo, vdev_id: u8);

    /// Send a service signal message for the given radio.
    fn send_svc_msg(&self, radio_index: u32, msg_type: SvcMsgType, data: &RpsIndication);

    /// Report a neighbour-unreachability failure on an interface.
    fn process_nud_failure(&self, vdev_id: u8);
}
