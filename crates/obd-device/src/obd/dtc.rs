//! Stored trouble code parsing (service 0x03)

use obd_core::TroubleCode;

use super::service_id;

/// Parse a full service 0x03 response: `43 [count] (hi lo)*`
///
/// The count byte is present on CAN (odd payload length) and absent on
/// older protocols. `00 00` pairs are padding and are skipped.
pub fn parse_stored_codes_response(response: &[u8]) -> Result<Vec<TroubleCode>, String> {
    let Some((&sid, payload)) = response.split_first() else {
        return Err("Empty response".to_string());
    };

    if sid != service_id::STORED_DTCS + service_id::POSITIVE_OFFSET {
        return Err(format!("Invalid response SID: 0x{:02X}", sid));
    }

    let codes = if payload.len() % 2 == 1 {
        &payload[1..]
    } else {
        payload
    };

    Ok(codes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .filter(|&raw| raw != 0)
        .map(TroubleCode::from_raw)
        .collect())
}
