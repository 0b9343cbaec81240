//! OBD-II service layer

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use obd_core::{IgnitionType, TroubleCode};

use super::{
    decode_support_bitmap, dtc, pid, request_frame, response_header_len, service_id,
    NegativeResponseCode, ObdError,
};
use crate::transport::TransportAdapter;

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);
const RESPONSE_PENDING_TIMEOUT: Duration = Duration::from_millis(5000);

/// Highest PID support range (0xE0 covers 0xE1-0x100)
const LAST_SUPPORT_RANGE: u16 = 0xE0;

/// Ignition type flag in byte B of the monitor status PID
const COMPRESSION_IGNITION_BIT: u8 = 0x08;

/// OBD-II service layer for diagnostic communication
#[derive(Clone)]
pub struct ObdService {
    transport: Arc<dyn TransportAdapter>,
    timeout: Duration,
}

impl ObdService {
    pub fn new(transport: Arc<dyn TransportAdapter>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn transport(&self) -> &Arc<dyn TransportAdapter> {
        &self.transport
    }

    /// Send a request and handle response pending
    ///
    /// Returns the full positive response, service byte included.
    async fn send_request(&self, target: u32, request: &[u8]) -> Result<Vec<u8>, ObdError> {
        let start = Instant::now();
        let request_sid = request.first().copied().unwrap_or_default();

        loop {
            let response = self
                .transport
                .send_receive(target, request, self.timeout)
                .await?;

            // Check for negative response
            if response.first() == Some(&service_id::NEGATIVE_RESPONSE) {
                if response.len() < 3 {
                    return Err(ObdError::InvalidResponse(
                        "Negative response too short".to_string(),
                    ));
                }

                let service_id = response[1];
                let nrc = NegativeResponseCode::from(response[2]);

                // Handle response pending
                if nrc == NegativeResponseCode::ResponsePending {
                    if start.elapsed() > RESPONSE_PENDING_TIMEOUT {
                        return Err(ObdError::Timeout);
                    }
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }

                return Err(ObdError::NegativeResponse { service_id, nrc });
            }

            let expected = request_sid.wrapping_add(service_id::POSITIVE_OFFSET);
            if response.first() != Some(&expected) {
                return Err(ObdError::InvalidResponse(format!(
                    "Expected 0x{:02X}, got {}",
                    expected,
                    hex::encode(&response)
                )));
            }

            return Ok(response);
        }
    }

    /// Read one parameter and return the data bytes after the echoed
    /// service and parameter id
    pub async fn read(&self, target: u32, service: u8, pid: u16) -> Result<Vec<u8>, ObdError> {
        let request = request_frame(service, pid);
        let response = self.send_request(target, &request).await?;

        let header_len = response_header_len(service, pid);
        if response.len() < header_len {
            return Err(ObdError::InvalidResponse(format!(
                "Response too short: {}",
                hex::encode(&response)
            )));
        }

        if response[1..header_len] != request[1..] {
            return Err(ObdError::InvalidResponse(format!(
                "Parameter echo mismatch: {}",
                hex::encode(&response)
            )));
        }

        Ok(response[header_len..].to_vec())
    }

    /// Discover the service 0x01 PIDs a module supports
    ///
    /// Walks the support bitmaps at 0x00, 0x20, ... following the
    /// "next range supported" bit. Every PID whose bit is set is included,
    /// range PIDs too, since the module answers them.
    pub async fn supported_pids(&self, target: u32) -> Result<BTreeSet<u16>, ObdError> {
        let mut supported = BTreeSet::new();
        let mut base = pid::SUPPORTED_PIDS_01_20;

        loop {
            let bitmap = self.read(target, service_id::CURRENT_DATA, base).await?;
            if bitmap.len() < 4 {
                return Err(ObdError::InvalidResponse(format!(
                    "Support bitmap for 0x{:02X} too short",
                    base
                )));
            }

            let pids = decode_support_bitmap(base, &bitmap);
            let next = base + 0x20;
            let has_next = pids.contains(&next);

            supported.extend(pids);

            if !has_next || next > LAST_SUPPORT_RANGE {
                break;
            }
            base = next;
        }

        tracing::debug!(
            module = %format!("{:03X}", target),
            count = supported.len(),
            "Supported PIDs discovered"
        );

        Ok(supported)
    }

    /// Read stored trouble codes (service 0x03)
    pub async fn stored_trouble_codes(&self, target: u32) -> Result<Vec<TroubleCode>, ObdError> {
        let response = self
            .send_request(target, &[service_id::STORED_DTCS])
            .await?;
        dtc::parse_stored_codes_response(&response).map_err(ObdError::InvalidResponse)
    }

    /// Clear stored trouble codes (service 0x04)
    pub async fn clear_trouble_codes(&self, target: u32) -> Result<(), ObdError> {
        self.send_request(target, &[service_id::CLEAR_DTCS]).await?;
        Ok(())
    }

    /// Read the vehicle identification number (service 0x09 PID 0x02)
    pub async fn vin(&self, target: u32) -> Result<String, ObdError> {
        let data = self.read(target, service_id::VEHICLE_INFO, pid::VIN).await?;

        // First byte is the message count on CAN
        let vin_bytes = if data.len() > 17 { &data[1..] } else { &data[..] };

        Ok(String::from_utf8_lossy(vin_bytes)
            .trim_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string())
    }

    /// Read the ignition type from the monitor status PID
    pub async fn ignition_type(&self, target: u32) -> Result<IgnitionType, ObdError> {
        let data = self
            .read(target, service_id::CURRENT_DATA, pid::MONITOR_STATUS)
            .await?;

        Ok(match data.get(1) {
            Some(b) if b & COMPRESSION_IGNITION_BIT != 0 => IgnitionType::Compression,
            Some(_) => IgnitionType::Spark,
            None => IgnitionType::Unknown,
        })
    }
}
