//! Transport adapter trait

use std::time::Duration;

use async_trait::async_trait;

use super::TransportError;

/// Transport-agnostic interface for OBD-II communication
///
/// Every exchange names its target module, so one adapter serves all
/// modules on the network.
#[async_trait]
pub trait TransportAdapter: Send + Sync {
    /// Send a request to a module and wait for its response
    ///
    /// # Arguments
    /// * `target` - Request address of the module (e.g. 0x7E0)
    /// * `request` - The raw request bytes (service id first)
    /// * `timeout` - Maximum time to wait for a response
    async fn send_receive(
        &self,
        target: u32,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError>;

    /// Check if the transport is connected
    async fn is_connected(&self) -> bool;

    /// Attempt to reconnect if disconnected
    async fn reconnect(&self) -> Result<(), TransportError>;

    /// Short description of the underlying network (e.g. "can0")
    fn name(&self) -> String;
}
