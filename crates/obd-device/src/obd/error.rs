//! OBD-II protocol errors

use thiserror::Error;

use super::NegativeResponseCode;
use crate::transport::TransportError;

#[derive(Debug, Error, Clone)]
pub enum ObdError {
    #[error("Negative response: {nrc} (0x{nrc:02X}) for service 0x{service_id:02X}")]
    NegativeResponse {
        service_id: u8,
        nrc: NegativeResponseCode,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response timeout")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<TransportError> for ObdError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(_) => ObdError::Timeout,
            other => ObdError::Transport(other.to_string()),
        }
    }
}

impl From<ObdError> for obd_core::CoreError {
    fn from(err: ObdError) -> Self {
        obd_core::CoreError::DeviceUnavailable(err.to_string())
    }
}
