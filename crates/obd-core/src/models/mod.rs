//! Data models for vehicles, requests and diagnostic results

mod module;
mod request;
mod trouble_code;
mod vehicle;

pub use module::{IgnitionType, ModuleInfo, VehicleInfo};
pub use request::{RequestDefinition, ARG_SEPARATOR};
pub use trouble_code::{DtcCategory, TroubleCode};
pub use vehicle::VehicleDefinition;
