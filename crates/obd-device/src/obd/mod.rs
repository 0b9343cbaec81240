//! OBD-II (SAE J1979) protocol layer
//!
//! This module frames requests, validates responses and decodes the few
//! structured payloads the device needs (PID support bitmaps, stored codes).

pub mod dtc;
mod error;
mod nrc;
mod services;

pub use error::ObdError;
pub use nrc::NegativeResponseCode;
pub use services::ObdService;

/// Standard OBD-II service (mode) constants
pub mod service_id {
    pub const CURRENT_DATA: u8 = 0x01;
    pub const FREEZE_FRAME: u8 = 0x02;
    pub const STORED_DTCS: u8 = 0x03;
    pub const CLEAR_DTCS: u8 = 0x04;
    pub const PENDING_DTCS: u8 = 0x07;
    pub const VEHICLE_INFO: u8 = 0x09;
    pub const PERMANENT_DTCS: u8 = 0x0A;
    pub const READ_DATA_BY_ID: u8 = 0x22;
    pub const NEGATIVE_RESPONSE: u8 = 0x7F;
    /// Added to the request service id in a positive response
    pub const POSITIVE_OFFSET: u8 = 0x40;
}

/// Well-known parameter ids
pub mod pid {
    /// Service 0x01: supported PIDs 0x01-0x20 (then 0x20, 0x40, ... 0xE0)
    pub const SUPPORTED_PIDS_01_20: u16 = 0x00;
    /// Service 0x01: monitor status since DTCs cleared
    pub const MONITOR_STATUS: u16 = 0x01;
    /// Service 0x09: vehicle identification number
    pub const VIN: u16 = 0x02;
}

/// Whether requests for `service` carry a parameter id
pub fn service_has_pid(service: u8) -> bool {
    !matches!(
        service,
        service_id::STORED_DTCS
            | service_id::CLEAR_DTCS
            | service_id::PENDING_DTCS
            | service_id::PERMANENT_DTCS
    )
}

/// Number of bytes the parameter id occupies on the wire
fn pid_width(service: u8, pid: u16) -> usize {
    if !service_has_pid(service) {
        0
    } else if service == service_id::READ_DATA_BY_ID || pid > 0xFF {
        2
    } else {
        1
    }
}

/// Build the request bytes for `service`/`pid`
pub fn request_frame(service: u8, pid: u16) -> Vec<u8> {
    let mut frame = vec![service];
    match pid_width(service, pid) {
        0 => {}
        1 => frame.push(pid as u8),
        _ => frame.extend_from_slice(&pid.to_be_bytes()),
    }
    frame
}

/// Length of the positive response header (service byte plus echoed pid)
pub fn response_header_len(service: u8, pid: u16) -> usize {
    1 + pid_width(service, pid)
}

/// Decode a 4-byte PID support bitmap for the range starting at `base`.
///
/// Bit 7 of the first byte is PID `base + 1`; the last bit is `base + 0x20`,
/// which also signals that the next range is supported.
pub fn decode_support_bitmap(base: u16, bitmap: &[u8]) -> Vec<u16> {
    bitmap
        .iter()
        .take(4)
        .enumerate()
        .flat_map(|(byte_idx, byte)| {
            (0..8u16).filter_map(move |bit| {
                if byte & (0x80 >> bit) != 0 {
                    Some(base + byte_idx as u16 * 8 + bit + 1)
                } else {
                    None
                }
            })
        })
        .collect()
}
