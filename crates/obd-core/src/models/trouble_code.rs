//! Diagnostic trouble code models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Trouble code category, from the top two bits of the code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DtcCategory {
    /// P codes - engine, transmission
    Powertrain,
    /// C codes - ABS, suspension
    Chassis,
    /// B codes - airbags, climate control
    Body,
    /// U codes - communication
    Network,
}

impl DtcCategory {
    /// Get category from the high byte of a two-byte code
    pub fn from_high_byte(high_byte: u8) -> Self {
        match (high_byte >> 6) & 0x03 {
            0 => DtcCategory::Powertrain,
            1 => DtcCategory::Chassis,
            2 => DtcCategory::Body,
            _ => DtcCategory::Network,
        }
    }

    pub fn prefix(&self) -> char {
        match self {
            DtcCategory::Powertrain => 'P',
            DtcCategory::Chassis => 'C',
            DtcCategory::Body => 'B',
            DtcCategory::Network => 'U',
        }
    }
}

impl fmt::Display for DtcCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DtcCategory::Powertrain => "powertrain",
            DtcCategory::Chassis => "chassis",
            DtcCategory::Body => "body",
            DtcCategory::Network => "network",
        };
        f.write_str(s)
    }
}

/// A stored trouble code, e.g. `P0123`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroubleCode {
    /// Two-byte code as reported by the module
    pub raw: u16,
    pub category: DtcCategory,
    /// Display form: category letter plus four hex digits
    pub code: String,
}

impl TroubleCode {
    /// Decode a two-byte code (SAE J2012 layout)
    pub fn from_raw(raw: u16) -> Self {
        let high = (raw >> 8) as u8;
        let category = DtcCategory::from_high_byte(high);
        let code = format!(
            "{}{}{:03X}",
            category.prefix(),
            (high >> 4) & 0x03,
            raw & 0x0FFF
        );
        Self {
            raw,
            category,
            code,
        }
    }
}

impl fmt::Display for TroubleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
