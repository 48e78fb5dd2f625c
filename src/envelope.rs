//! Capture envelope extraction.
//!
//! The scanner writes one JSON object per received advertisement packet:
//!
//! ```json
//! {"time": "2023-09-27T07:38:44.951123+00:00", "addr": "ac:de:48:28:ac:ed",
//!  "structs": [{"adtype": 22, "desc": "16b Service Data", "value": "000d540064009b4c"}]}
//! ```
//!
//! [`extract`] validates the envelope and splits it into one
//! [`AdStructure`] per advertisement data element.

use crate::address::{HardwareAddress, ParseAddressError};
use crate::timestamp::{CaptureTimestamp, ParseTimestampError};
use serde::Deserialize;
use thiserror::Error;

/// AD type of a 16-bit UUID service data element.
pub const SERVICE_DATA: u8 = 0x16;

/// AD type of a manufacturer-specific data element.
pub const MANUFACTURER_DATA: u8 = 0xff;

/// AD type of the flags element.
pub const FLAGS: u8 = 0x01;

/// One advertisement data element, tagged with where and when it was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct AdStructure {
    pub timestamp: CaptureTimestamp,
    pub address: HardwareAddress,
    pub ad_type: u8,
    /// Payload as received, hex encoded. Decoded lazily by the device rules.
    pub payload: String,
}

/// Errors returned by [`extract`].
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[from] serde_json::Error),
    #[error("invalid field format: {0}")]
    InvalidFieldFormat(#[from] FieldFormatError),
}

/// A grammar violation in one of the envelope fields.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldFormatError {
    #[error("time: {0}")]
    Time(#[from] ParseTimestampError),
    #[error("addr: {0}")]
    Addr(#[from] ParseAddressError),
}

#[derive(Deserialize)]
struct RawEnvelope {
    time: String,
    addr: String,
    structs: Vec<RawStruct>,
}

#[derive(Deserialize)]
struct RawStruct {
    // One byte in the AD structure; anything wider is a corrupt capture.
    adtype: u8,
    // Human readable name of the AD type; carries no information beyond `adtype`.
    #[allow(dead_code)]
    #[serde(default)]
    desc: String,
    value: String,
}

/// Parse one capture message into its advertisement structures.
///
/// All structures share the envelope's timestamp and address and keep the
/// order of the `structs` array.
///
/// # Errors
/// - [`ExtractError::MalformedEnvelope`] if the message is not a JSON envelope
/// - [`ExtractError::InvalidFieldFormat`] if `time` or `addr` fails validation
pub fn extract(message: &str) -> Result<Vec<AdStructure>, ExtractError> {
    let raw: RawEnvelope = serde_json::from_str(message)?;

    let timestamp: CaptureTimestamp = raw.time.parse().map_err(FieldFormatError::from)?;
    let address: HardwareAddress = raw.addr.parse().map_err(FieldFormatError::from)?;

    Ok(raw
        .structs
        .into_iter()
        .map(|s| AdStructure {
            timestamp: timestamp.clone(),
            address,
            ad_type: s.adtype,
            payload: s.value,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const METER_MESSAGE: &str = r#"{"time": "2023-09-27T07:38:44.951123+00:00", "addr": "ac:de:48:28:ac:ed", "structs": [
        {"adtype": 1, "desc": "Flags", "value": "06"},
        {"adtype": 22, "desc": "16b Service Data", "value": "000d540064009b4c"},
        {"adtype": 255, "desc": "Manufacturer", "value": "6909e02b7e6b4f4a610300994600"}
    ]}"#;

    #[test]
    fn test_extract_preserves_order_and_shares_envelope_fields() {
        let structs = extract(METER_MESSAGE).unwrap();

        assert_eq!(structs.len(), 3);
        assert_eq!(
            structs.iter().map(|s| s.ad_type).collect::<Vec<_>>(),
            vec![FLAGS, SERVICE_DATA, MANUFACTURER_DATA]
        );
        assert_eq!(structs[1].payload, "000d540064009b4c");
        for s in &structs {
            assert_eq!(s.timestamp.as_str(), "2023-09-27T07:38:44.951123+00:00");
            assert_eq!(s.address.to_string(), "ac:de:48:28:ac:ed");
        }
    }

    #[test]
    fn test_extract_is_idempotent() {
        assert_eq!(extract(METER_MESSAGE).unwrap(), extract(METER_MESSAGE).unwrap());
    }

    #[test]
    fn test_extract_empty_structs() {
        let msg = r#"{"time": "2023-09-30T13:05:48+00:00", "addr": "ac:de:48:6c:5f:f0", "structs": []}"#;
        assert!(extract(msg).unwrap().is_empty());
    }

    #[test]
    fn test_extract_without_desc() {
        let msg = r#"{"time": "2023-09-30T13:05:48+00:00", "addr": "ac:de:48:6c:5f:f0", "structs": [{"adtype": 255, "value": "00"}]}"#;
        assert_eq!(extract(msg).unwrap()[0].ad_type, MANUFACTURER_DATA);
    }

    #[test]
    fn test_extract_malformed_json() {
        assert!(matches!(
            extract("xxx"),
            Err(ExtractError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            extract(r#"{"time": "2023-09-30T13:05:48+00:00"}"#),
            Err(ExtractError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_extract_rejects_out_of_range_adtype() {
        // One bad structure fails the line even when its neighbours are valid
        let msg = r#"{"time": "2023-09-30T13:05:48+00:00", "addr": "ac:de:48:6c:5f:f0", "structs": [
            {"adtype": 255, "value": "69096055f93599ff048010260a8f"},
            {"adtype": 256, "value": ""}
        ]}"#;
        assert!(matches!(
            extract(msg),
            Err(ExtractError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            extract(&msg.replace("256", "-1")),
            Err(ExtractError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_extract_invalid_time() {
        let msg = r#"{"time": "2023-09-30T13:05:48Z", "addr": "ac:de:48:6c:5f:f0", "structs": []}"#;
        assert!(matches!(
            extract(msg),
            Err(ExtractError::InvalidFieldFormat(FieldFormatError::Time(_)))
        ));
    }

    #[test]
    fn test_extract_invalid_addr() {
        let msg = r#"{"time": "2023-09-30T13:05:48+00:00", "addr": "AC:DE:48:6C:5F:F0", "structs": []}"#;
        let err = extract(msg).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::InvalidFieldFormat(FieldFormatError::Addr(_))
        ));
        assert!(err.to_string().starts_with("invalid field format: addr:"));
    }
}
