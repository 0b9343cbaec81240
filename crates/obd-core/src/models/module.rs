//! Module (ECU) and vehicle identification models

use std::fmt;

use serde::{Deserialize, Serialize};

/// An electronic control unit reachable on the vehicle network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Request address (e.g. 0x7E0)
    pub address: u32,
    /// Human-readable name
    pub name: String,
}

impl ModuleInfo {
    pub fn new(address: u32, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
        }
    }
}

impl fmt::Display for ModuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03X}: {}", self.address, self.name)
    }
}

/// Engine ignition type as reported by the monitor status PID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IgnitionType {
    Spark,
    Compression,
    Unknown,
}

impl fmt::Display for IgnitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IgnitionType::Spark => "Spark",
            IgnitionType::Compression => "Compression",
            IgnitionType::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Identification data for the connected vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInfo {
    /// Vehicle identification number (empty when not reported)
    pub vin: String,
    pub ignition: IgnitionType,
    /// Modules that answered enumeration, in address order
    pub modules: Vec<ModuleInfo>,
}
