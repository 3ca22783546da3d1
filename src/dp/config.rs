//! Configuration types for the DP component

use heapless::String;

/// Maximum number of interface slots in the registry.
pub const MAX_INTERFACES: usize = 8;

/// Sentinel interface id: the interface exists but is not up.
pub const INTF_ID_INVALID: u8 = 0xff;

/// Number of receive queues an interface steers across.
pub const NUM_RX_QUEUES: usize = 4;

/// Number of queue slots in the service indication payload.
///
/// The signal message always carries this many mask words; queues past the
/// effective count are zero.
pub const SVC_IFACE_NUM_QUEUES: usize = 6;

/// Maximum interface name length.
pub const IFNAME_LEN: usize = 16;

/// Maximum length of the CPU map configuration string.
pub const CPU_MAP_LIST_LEN: usize = 48;

/// Default delay before the NUD failure check runs, in milliseconds.
pub const DEFAULT_NUD_FAILURE_DELAY_MS: u32 = 100;

/// A hardware (MAC) address.
pub type MacAddr = [u8; 6];

/// Operating mode of a virtual interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpMode {
    /// Infrastructure station
    Sta,
    /// Software access point
    Sap,
    /// P2P client
    P2pClient,
    /// P2P group owner
    P2pGo,
    /// Monitor interface
    Monitor,
    /// Mode not assigned yet (interface registered but not up)
    #[default]
    Unknown,
}

impl OpMode {
    /// Returns a human-readable name of the mode
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            OpMode::Sta => "sta",
            OpMode::Sap => "sap",
            OpMode::P2pClient => "p2p-client",
            OpMode::P2pGo => "p2p-go",
            OpMode::Monitor => "monitor",
            OpMode::Unknown => "unknown",
        }
    }
}

/// DP component configuration.
///
/// Built once by the embedding environment and handed to
/// [`DpContext::new`](crate::DpContext::new); the CPU map list may be
/// replaced at runtime through
/// [`set_cpu_map_list`](crate::DpContext::set_cpu_map_list).
///
/// # Example
///
/// ```ignore
/// let config = DpConfig::new()
///     .with_cpu_map_list("a b c d")
///     .with_radio_index(1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpConfig {
    /// Space-separated hex CPU masks, one token per receive queue.
    /// Empty means RPS is unconfigured.
    pub cpu_map_list: String<CPU_MAP_LIST_LEN>,
    /// RPS statically forced on from configuration. When set, the dynamic
    /// [`set_rps`](crate::DpContext::set_rps) path is a no-op and the
    /// indication is sent as interfaces come up.
    pub rps: bool,
    /// Whether the unified-copy offload path is enabled; gates the
    /// rx-mode RPS toggle.
    pub uc_offload_enabled: bool,
    /// Radio index carried in service signal messages.
    pub radio_index: u32,
    /// Delay before the NUD failure check runs, in milliseconds.
    pub nud_failure_delay_ms: u32,
}

impl DpConfig {
    /// Create a configuration with defaults (no CPU map, RPS not forced).
    pub fn new() -> Self {
        Self {
            cpu_map_list: String::new(),
            rps: false,
            uc_offload_enabled: false,
            radio_index: 0,
            nud_failure_delay_ms: DEFAULT_NUD_FAILURE_DELAY_MS,
        }
    }

    /// Set the CPU map list. Input longer than [`CPU_MAP_LIST_LEN`] is
    /// truncated.
    #[must_use]
    pub fn with_cpu_map_list(mut self, list: &str) -> Self {
        self.cpu_map_list.clear();
        for ch in list.chars() {
            if self.cpu_map_list.push(ch).is_err() {
                break;
            }
        }
        self
    }

    /// Force RPS on from configuration.
    #[must_use]
    pub fn with_rps(mut self, rps: bool) -> Self {
        self.rps = rps;
        self
    }

    /// Enable the unified-copy offload gate.
    #[must_use]
    pub fn with_uc_offload(mut self, enabled: bool) -> Self {
        self.uc_offload_enabled = enabled;
        self
    }

    /// Set the radio index for service signal messages.
    #[must_use]
    pub fn with_radio_index(mut self, radio_index: u32) -> Self {
        self.radio_index = radio_index;
        self
    }

    /// Set the NUD failure check delay.
    #[must_use]
    pub fn with_nud_failure_delay_ms(mut self, delay_ms: u32) -> Self {
        self.nud_failure_delay_ms = delay_ms;
        self
    }
}

impl Default for DpConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
