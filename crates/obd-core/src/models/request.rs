//! Request definition - one declarative diagnostic query

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Separator used when a request is written as `ECU:SERVICE:PID`
pub const ARG_SEPARATOR: char = ':';

/// Describes one diagnostic query against a vehicle module.
///
/// Identity is assigned at construction and is the only thing equality
/// looks at: two definitions with identical fields but different ids are
/// different requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDefinition {
    id: Uuid,
    /// Display label (may be empty)
    pub name: String,
    pub description: String,
    /// Free-text grouping
    pub category: String,
    /// Target module address (e.g. 0x7E0)
    pub ecu: u32,
    /// Service code (0x01 = current data)
    pub service: u8,
    /// Parameter id within the service
    pub pid: u16,
    /// Value expression over the response bytes; empty means raw bytes only
    pub formula: String,
    /// Display suffix for computed values
    pub unit: String,
}

impl RequestDefinition {
    /// Create a request with a fresh identity
    pub fn new(ecu: u32, service: u8, pid: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            description: String::new(),
            category: String::new(),
            ecu,
            service,
            pid,
            formula: String::new(),
            unit: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = formula.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Stable identity of this request
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The formula, if one is configured
    pub fn formula(&self) -> Option<&str> {
        let trimmed = self.formula.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Label used for display and log headers.
    ///
    /// Falls back to `ECU:SERVICE:PID` in hex for unnamed requests.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.address_string()
        } else {
            self.name.clone()
        }
    }

    /// `ECU:SERVICE:PID` in uppercase hex
    pub fn address_string(&self) -> String {
        format!(
            "{:03X}{sep}{:02X}{sep}{:02X}",
            self.ecu,
            self.service,
            self.pid,
            sep = ARG_SEPARATOR
        )
    }

    /// Parse a command-line request spec: `ECU:SERVICE:PID[:FORMULA[:UNIT]]`.
    ///
    /// Address fields are hex, with or without a `0x` prefix.
    pub fn parse_spec(spec: &str) -> CoreResult<Self> {
        let mut parts = spec.splitn(5, ARG_SEPARATOR);
        let mut field = |what: &str| {
            parts
                .next()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| {
                    CoreError::MalformedDefinition(format!("request '{}' is missing {}", spec, what))
                })
        };

        let ecu = parse_hex(field("ECU")?, spec)?;
        let service = u8::try_from(parse_hex(field("SERVICE")?, spec)?).map_err(|_| {
            CoreError::MalformedDefinition(format!("service out of range in '{}'", spec))
        })?;
        let pid = u16::try_from(parse_hex(field("PID")?, spec)?).map_err(|_| {
            CoreError::MalformedDefinition(format!("pid out of range in '{}'", spec))
        })?;

        let mut request = Self::new(ecu, service, pid);
        if let Ok(formula) = field("FORMULA") {
            request.formula = formula.to_string();
        }
        if let Ok(unit) = field("UNIT") {
            request.unit = unit.to_string();
        }
        Ok(request)
    }
}

fn parse_hex(s: &str, spec: &str) -> CoreResult<u32> {
    let cleaned = s.trim().trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(cleaned, 16)
        .map_err(|_| CoreError::MalformedDefinition(format!("invalid hex '{}' in '{}'", s, spec)))
}

impl PartialEq for RequestDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RequestDefinition {}

impl Hash for RequestDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for RequestDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.address_string())
    }
}
