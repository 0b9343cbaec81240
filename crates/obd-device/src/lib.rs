//! obd-device - OBD-II device access for the telemetry pipeline
//!
//! This crate provides the device side of the `obd_core::ObdDevice` port:
//! it talks to vehicle modules over CAN/ISO-TP (or a simulated network),
//! discovers supported parameters and keeps bound live queries refreshed
//! in the background.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Obd2Device                  │
//! │  Implements ObdDevice trait                 │
//! │                                             │
//! │  ┌──────────────────┐  ┌─────────────────┐  │
//! │  │ LiveQueryManager │  │    Formula      │  │
//! │  │ (refresh task)   │  │ (A, B, C bytes) │  │
//! │  └────────┬─────────┘  └─────────────────┘  │
//! │           │                                 │
//! │     ┌─────┴──────┐                          │
//! │     │ ObdService │                          │
//! │     │ (protocol) │                          │
//! │     └─────┬──────┘                          │
//! │           │                                 │
//! │  ┌────────┴─────────┐                       │
//! │  │ TransportAdapter │                       │
//! │  │ (SocketCAN/mock) │                       │
//! │  └──────────────────┘                       │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod device;
pub mod formula;
pub mod live;
pub mod obd;
pub mod transport;

pub use config::{DeviceConfig, MockConfig, SocketCanConfig, TransportConfig};
pub use device::{module_name, Obd2Device};
pub use formula::Formula;
pub use live::{LiveQueryHandle, LiveQueryManager};
pub use obd::{NegativeResponseCode, ObdError, ObdService};
pub use transport::{create_transport, TransportAdapter, TransportError};
