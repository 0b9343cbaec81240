//! Command implementations for obd2

pub mod dtc;
pub mod info;
pub mod log;
pub mod pids;
pub mod vehicle;

pub use dtc::{dtc_clear, dtc_list};
pub use info::info;
pub use log::{build_vehicle, log};
pub use pids::pids;
pub use vehicle::{vehicle_add, vehicle_new, vehicle_remove, vehicle_show, RequestDetails};
