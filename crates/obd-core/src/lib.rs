//! obd-core - Vehicle/request definitions and the device port
//!
//! This crate holds the declarative vehicle model (request definitions,
//! vehicle definitions and their JSON file format), the shared error
//! taxonomy, and the `ObdDevice` trait that device implementations provide
//! to the telemetry pipeline.

pub mod device;
pub mod error;
pub mod models;

pub use device::{LiveQuery, ObdDevice, PRIMARY_MODULE, SERVICE_CURRENT_DATA};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use models::*;
