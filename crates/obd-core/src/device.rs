//! ObdDevice trait - the capability surface the telemetry pipeline consumes

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::models::{ModuleInfo, TroubleCode, VehicleInfo};

/// Primary engine module address
pub const PRIMARY_MODULE: u32 = 0x7E0;

/// Standard "current data" service
pub const SERVICE_CURRENT_DATA: u8 = 0x01;

/// Handle to a continuously refreshed read against the device.
///
/// Reads never block on device I/O; they return the last known state.
pub trait LiveQuery: Send + Sync {
    /// Latest raw response payload. Empty means no response received.
    fn current_raw(&self) -> CoreResult<Vec<u8>>;

    /// Latest computed value, NaN when there is no response or the formula
    /// cannot be resolved. Always NaN for queries bound without a formula.
    fn current_value(&self) -> CoreResult<f64>;

    /// Formula this query was bound with
    fn formula(&self) -> Option<&str>;
}

/// The device-communication collaborator.
///
/// Implementations own the transport and the background refresh of live
/// queries. Only the capability discovery, binding and trouble-code calls
/// are required; the rest default to `DeviceUnavailable`.
#[async_trait]
pub trait ObdDevice: Send + Sync {
    /// Query the supported current-data parameter ids of a module.
    ///
    /// One batched device operation; may block on I/O.
    async fn supported_pids(&self, module: u32) -> CoreResult<BTreeSet<u16>>;

    /// Module used for capability discovery and current-data filtering
    fn primary_module(&self) -> u32 {
        PRIMARY_MODULE
    }

    /// Bind a continuously refreshed query. Does not perform I/O.
    fn bind_live_query(
        &self,
        module: u32,
        service: u8,
        pid: u16,
        formula: Option<&str>,
    ) -> Arc<dyn LiveQuery>;

    /// Read stored trouble codes from one module
    async fn trouble_codes(&self, module: u32) -> CoreResult<Vec<TroubleCode>>;

    /// Clear stored trouble codes on one module
    async fn clear_trouble_codes(&self, _module: u32) -> CoreResult<()> {
        Err(CoreError::DeviceUnavailable(
            "clearing trouble codes is not supported".to_string(),
        ))
    }

    /// Enumerate the modules that answer on the network
    async fn modules(&self) -> CoreResult<Vec<ModuleInfo>> {
        Err(CoreError::DeviceUnavailable(
            "module enumeration is not supported".to_string(),
        ))
    }

    /// Read VIN, ignition type and module list
    async fn vehicle_info(&self) -> CoreResult<VehicleInfo> {
        Err(CoreError::DeviceUnavailable(
            "vehicle information is not supported".to_string(),
        ))
    }

    /// Change the background refresh cadence of live queries
    fn set_refresh_interval(&self, _interval: Duration) {}
}
