//! Continuously refreshed live queries

mod manager;

pub use manager::{LiveQueryHandle, LiveQueryManager};
