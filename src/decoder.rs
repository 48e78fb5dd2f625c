//! Per-device decoding of SwitchBot advertisement payloads.
//!
//! Byte layouts follow the SwitchBot BLE documentation where it exists
//! (<https://github.com/OpenWonderLabs/SwitchBotAPI-BLE>), and captures from
//! real devices where it does not (WoIOSensor, MeterPro(CO2)).
//!
//! Temperatures share one encoding across devices: the low nibble of one byte
//! holds tenths of a degree, the next byte holds whole degrees in its low seven
//! bits and the sign in its high bit. A *clear* sign bit means below zero.

use crate::address::DeviceId;
use crate::device::{Classifier, DeviceType, DirectoryError};
use crate::envelope::{AdStructure, MANUFACTURER_DATA, SERVICE_DATA};
use crate::reading::{ReadingType, SensorReading};
use thiserror::Error;

/// Errors returned by [`decode`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The payload is shorter than the device layout requires
    #[error("truncated {device} payload: need {required} bytes, got {actual}")]
    TruncatedPayload {
        device: &'static str,
        required: usize,
        actual: usize,
    },
    /// The payload is not a hex string
    #[error("invalid payload hex '{0}'")]
    InvalidPayload(String),
    /// The device type could not be resolved
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Leading bytes of the Meter service data that are the same for every device.
/// Offsets in the Meter documentation start after them.
const SERVICE_DATA_HEADER_LEN: usize = 2;

const METER_MIN_LEN: usize = SERVICE_DATA_HEADER_LEN + 6;
const BATTERY_ONLY_MIN_LEN: usize = SERVICE_DATA_HEADER_LEN + 3;
const WO_IO_SENSOR_MIN_LEN: usize = 13;
const METER_PRO_CO2_MIN_LEN: usize = 17;
const PLUG_MINI_MIN_LEN: usize = 14;

/// Value of the plug state byte when the relay is on.
const PLUG_POWER_ON: u8 = 0x80;

/// Decode one advertisement structure into sensor readings.
///
/// The sender's device type is looked up through `classifier`. Devices that are
/// not registered, device types without a known layout, and advertisement types
/// a device does not put readings in all decode to an empty list.
///
/// # Errors
/// - [`DecodeError::Directory`] if the classifier fails
/// - [`DecodeError::TruncatedPayload`] / [`DecodeError::InvalidPayload`] if the
///   payload of a recognized advertisement cannot be read
pub fn decode<C>(s: &AdStructure, classifier: &C) -> Result<Vec<SensorReading>, DecodeError>
where
    C: Classifier + ?Sized,
{
    let device_type = classifier.classify(&DeviceId::from(s.address))?;

    match device_type {
        DeviceType::Meter => decode_meter(s),
        DeviceType::MeterProCo2 => decode_meter_pro_co2(s),
        DeviceType::WoIoSensor => decode_wo_io_sensor(s),
        DeviceType::PlugMiniUs | DeviceType::PlugMiniJp => decode_plug_mini(s),
        // No payload layout published yet
        DeviceType::MotionSensor | DeviceType::CeilingLight => Ok(Vec::new()),
        DeviceType::HubMini | DeviceType::NotMyDevice | DeviceType::Unrecognized(_) => {
            Ok(Vec::new())
        }
    }
}

fn payload(
    s: &AdStructure,
    device: &'static str,
    required: usize,
) -> Result<Vec<u8>, DecodeError> {
    let bytes =
        hex::decode(&s.payload).map_err(|_| DecodeError::InvalidPayload(s.payload.clone()))?;
    if bytes.len() < required {
        return Err(DecodeError::TruncatedPayload {
            device,
            required,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

fn reading(s: &AdStructure, kind: ReadingType, value: f64) -> SensorReading {
    SensorReading {
        timestamp: s.timestamp.clone(),
        address: s.address,
        kind,
        value,
    }
}

fn temperature(tenths: u8, whole: u8) -> f64 {
    let magnitude = f64::from(u16::from(whole & 0x7F) * 10 + u16::from(tenths & 0x0F)) / 10.0;
    if whole & 0x80 == 0 && magnitude != 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

fn percent(byte: u8) -> f64 {
    f64::from(byte & 0x7F)
}

fn decode_meter(s: &AdStructure) -> Result<Vec<SensorReading>, DecodeError> {
    if s.ad_type != SERVICE_DATA {
        return Ok(Vec::new());
    }

    let bytes = payload(s, "Meter", METER_MIN_LEN)?;
    let b = &bytes[SERVICE_DATA_HEADER_LEN..];

    Ok(vec![
        reading(s, ReadingType::Battery, percent(b[2])),
        reading(s, ReadingType::Temperature, temperature(b[3], b[4])),
        reading(s, ReadingType::Humidity, percent(b[5])),
    ])
}

fn decode_meter_pro_co2(s: &AdStructure) -> Result<Vec<SensorReading>, DecodeError> {
    match s.ad_type {
        SERVICE_DATA => {
            let bytes = payload(s, "MeterPro(CO2)", BATTERY_ONLY_MIN_LEN)?;
            let b = &bytes[SERVICE_DATA_HEADER_LEN..];
            Ok(vec![reading(s, ReadingType::Battery, percent(b[2]))])
        }
        MANUFACTURER_DATA => {
            let b = payload(s, "MeterPro(CO2)", METER_PRO_CO2_MIN_LEN)?;
            let co2 = u16::from_be_bytes([b[15], b[16]]);
            Ok(vec![
                reading(s, ReadingType::Temperature, temperature(b[10], b[11])),
                reading(s, ReadingType::Humidity, percent(b[12])),
                reading(s, ReadingType::Co2, f64::from(co2)),
            ])
        }
        _ => Ok(Vec::new()),
    }
}

fn decode_wo_io_sensor(s: &AdStructure) -> Result<Vec<SensorReading>, DecodeError> {
    // Battery level is reported in the service data according to unofficial
    // sources, but the layout is unverified and is not decoded.
    if s.ad_type != MANUFACTURER_DATA {
        return Ok(Vec::new());
    }

    let b = payload(s, "WoIOSensor", WO_IO_SENSOR_MIN_LEN)?;

    Ok(vec![
        reading(s, ReadingType::Temperature, temperature(b[10], b[11])),
        reading(s, ReadingType::Humidity, percent(b[12])),
    ])
}

fn decode_plug_mini(s: &AdStructure) -> Result<Vec<SensorReading>, DecodeError> {
    if s.ad_type != MANUFACTURER_DATA {
        return Ok(Vec::new());
    }

    let b = payload(s, "Plug Mini", PLUG_MINI_MIN_LEN)?;

    let power_on = if b[9] == PLUG_POWER_ON { 1.0 } else { 0.0 };
    let load_msb = u32::from(b[12] & 0x7F);
    let load_lsb = u32::from(b[13]);
    let load = f64::from(load_msb * 255 + load_lsb) / 10.0;

    Ok(vec![
        reading(s, ReadingType::PowerOn, power_on),
        reading(s, ReadingType::Load, load),
    ])
}
