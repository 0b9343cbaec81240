//! Mock transport adapter simulating a small vehicle network
//!
//! Two modules answer: an engine controller at 0x7E0 and a transmission
//! controller at 0x7E1. Requests nobody answers time out, as on a real bus.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{TransportAdapter, TransportError};
use crate::config::MockConfig;
use crate::obd::service_id;

/// VIN reported by the simulated engine module
pub const MOCK_VIN: &str = "JM1NA3510N1234567";

/// Mock transport adapter for testing
pub struct MockTransportAdapter {
    config: MockConfig,
    connected: AtomicBool,
    /// Whether `reconnect` succeeds
    reconnectable: AtomicBool,
    /// Predefined responses (target, request, response), one per request
    responses: RwLock<Vec<(u32, Vec<u8>, Vec<u8>)>>,
}

impl MockTransportAdapter {
    pub fn new(config: &MockConfig) -> Self {
        Self {
            config: config.clone(),
            connected: AtomicBool::new(true),
            reconnectable: AtomicBool::new(true),
            responses: RwLock::new(Self::default_responses()),
        }
    }

    /// Add a mock response for a request to `target`, overriding any
    /// existing response for the same request
    pub fn add_response(&self, target: u32, request: Vec<u8>, response: Vec<u8>) {
        let mut responses = self.responses.write();
        responses.retain(|(t, req, _)| !(*t == target && *req == request));
        responses.insert(0, (target, request, response));
    }

    /// Remove every response for a request to `target`, so it times out
    pub fn remove_response(&self, target: u32, request: &[u8]) {
        self.responses
            .write()
            .retain(|(t, req, _)| !(*t == target && req == request));
    }

    /// Set connection state
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make subsequent reconnect attempts fail (or succeed again)
    pub fn set_reconnectable(&self, reconnectable: bool) {
        self.reconnectable.store(reconnectable, Ordering::SeqCst);
    }

    fn default_responses() -> Vec<(u32, Vec<u8>, Vec<u8>)> {
        const ENGINE: u32 = 0x7E0;
        const TRANSMISSION: u32 = 0x7E1;

        vec![
            // Supported PIDs 01-20: 01, 04, 05, 0C, 0D, 11 and the next range
            (ENGINE, vec![0x01, 0x00], vec![0x41, 0x00, 0x98, 0x18, 0x80, 0x01]),
            // Supported PIDs 21-40: 2F
            (ENGINE, vec![0x01, 0x20], vec![0x41, 0x20, 0x00, 0x02, 0x00, 0x00]),
            // Monitor status, byte B bit 3 clear: spark ignition
            (ENGINE, vec![0x01, 0x01], vec![0x41, 0x01, 0x00, 0x07, 0xE5, 0x00]),
            // Engine load: 0x80 -> 50.2%
            (ENGINE, vec![0x01, 0x04], vec![0x41, 0x04, 0x80]),
            // Coolant temperature: 0x5A - 40 = 50 degC
            (ENGINE, vec![0x01, 0x05], vec![0x41, 0x05, 0x5A]),
            // Engine speed: 0x0BB8 / 4 = 750 rpm
            (ENGINE, vec![0x01, 0x0C], vec![0x41, 0x0C, 0x0B, 0xB8]),
            // Vehicle speed: 50 km/h
            (ENGINE, vec![0x01, 0x0D], vec![0x41, 0x0D, 0x32]),
            // Throttle position: 0x33 -> 20%
            (ENGINE, vec![0x01, 0x11], vec![0x41, 0x11, 0x33]),
            // Fuel level: 0x80 -> 50.2%
            (ENGINE, vec![0x01, 0x2F], vec![0x41, 0x2F, 0x80]),
            // Stored DTCs: P0123, U0156
            (ENGINE, vec![0x03], vec![0x43, 0x02, 0x01, 0x23, 0xC1, 0x56]),
            (ENGINE, vec![0x04], vec![0x44]),
            // VIN, one message
            (ENGINE, vec![0x09, 0x02], {
                let mut resp = vec![0x49, 0x02, 0x01];
                resp.extend_from_slice(MOCK_VIN.as_bytes());
                resp
            }),
            // Supported PIDs 01-20: 01 only
            (
                TRANSMISSION,
                vec![0x01, 0x00],
                vec![0x41, 0x00, 0x80, 0x00, 0x00, 0x00],
            ),
            (
                TRANSMISSION,
                vec![0x01, 0x01],
                vec![0x41, 0x01, 0x00, 0x00, 0x00, 0x00],
            ),
            // Stored DTCs: P0700
            (TRANSMISSION, vec![0x03], vec![0x43, 0x01, 0x07, 0x00]),
            (TRANSMISSION, vec![0x04], vec![0x44]),
        ]
    }

    fn find_response(&self, target: u32, request: &[u8]) -> Option<Vec<u8>> {
        let responses = self.responses.read();

        responses
            .iter()
            .find(|(t, req, _)| *t == target && req == request)
            .map(|(_, _, resp)| resp.clone())
    }

    /// A clear request also empties the module's stored codes
    fn apply_side_effects(&self, target: u32, request: &[u8]) {
        if request.first() == Some(&service_id::CLEAR_DTCS) {
            self.add_response(target, vec![service_id::STORED_DTCS], vec![0x43, 0x00]);
        }
    }
}

#[async_trait]
impl TransportAdapter for MockTransportAdapter {
    async fn send_receive(
        &self,
        target: u32,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionClosed);
        }

        // Simulate latency
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        match self.find_response(target, request) {
            Some(response) => {
                tracing::trace!(target_addr = target, ?request, ?response, "Mock exchange");
                self.apply_side_effects(target, request);
                Ok(response)
            }
            None => Err(TransportError::Timeout(format!(
                "No response from 0x{:03X} within {:?}",
                target, timeout
            ))),
        }
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn reconnect(&self) -> Result<(), TransportError> {
        if !self.reconnectable.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionFailed(
                "simulated network is down".to_string(),
            ));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> String {
        "mock".to_string()
    }
}
