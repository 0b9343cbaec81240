//! Device configuration
//!
//! This module contains configuration types for the OBD-II device,
//! including transport selection, timeouts and the module address plan.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for an OBD-II device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Transport configuration
    #[serde(default)]
    pub transport: TransportConfig,
    /// Per-request response timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Background refresh cadence of live queries in milliseconds
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
    /// Module used for capability discovery, current-data request filtering
    /// and vehicle information
    #[serde(default = "default_primary_module")]
    pub primary_module: u32,
    /// Request addresses probed by module enumeration
    #[serde(default = "default_module_candidates")]
    pub module_candidates: Vec<u32>,
}

fn default_request_timeout_ms() -> u64 {
    1000
}

fn default_refresh_ms() -> u64 {
    1000
}

fn default_primary_module() -> u32 {
    obd_core::PRIMARY_MODULE
}

fn default_module_candidates() -> Vec<u32> {
    (0x7E0..=0x7E7).collect()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            request_timeout_ms: default_request_timeout_ms(),
            refresh_ms: default_refresh_ms(),
            primary_module: default_primary_module(),
            module_candidates: default_module_candidates(),
        }
    }
}

impl DeviceConfig {
    /// Build a config for a network name: `mock` selects the simulated
    /// vehicle, anything else is treated as a SocketCAN interface.
    pub fn for_network(network: &str) -> Self {
        let transport = if network.eq_ignore_ascii_case("mock") {
            TransportConfig::Mock(MockConfig::default())
        } else {
            TransportConfig::SocketCan(SocketCanConfig {
                interface: network.to_string(),
                extended_ids: false,
            })
        };

        Self {
            transport,
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }
}

// =============================================================================
// Transport Configuration
// =============================================================================

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// SocketCAN with ISO-TP (Linux only)
    SocketCan(SocketCanConfig),
    /// Simulated vehicle for testing
    Mock(MockConfig),
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Mock(MockConfig::default())
    }
}

/// SocketCAN configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketCanConfig {
    /// CAN interface name (e.g., "can0")
    pub interface: String,
    /// Use 29-bit identifiers instead of 11-bit
    #[serde(default)]
    pub extended_ids: bool,
}

/// Mock transport configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockConfig {
    /// Simulated latency in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
}
