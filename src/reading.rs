//! Sensor readings decoded from SwitchBot advertisements.

use crate::address::HardwareAddress;
use crate::timestamp::CaptureTimestamp;
use serde::Serialize;
use std::fmt;

/// The kind of value carried by a [`SensorReading`].
///
/// Units:
/// - Battery in percent (0-100)
/// - Temperature in Celsius
/// - Humidity in percent (0-100)
/// - CO2 in parts per million (ppm)
/// - PowerOn is 1 when the plug relay is on, 0 otherwise
/// - Load in Watts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReadingType {
    Battery,
    Temperature,
    Humidity,
    #[serde(rename = "CO2")]
    Co2,
    PowerOn,
    Load,
}

impl ReadingType {
    /// The name stored in the `Type` column of the metrics table.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingType::Battery => "Battery",
            ReadingType::Temperature => "Temperature",
            ReadingType::Humidity => "Humidity",
            ReadingType::Co2 => "CO2",
            ReadingType::PowerOn => "PowerOn",
            ReadingType::Load => "Load",
        }
    }
}

impl fmt::Display for ReadingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single value read from one advertisement.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Capture time reported by the scanner, kept verbatim
    pub timestamp: CaptureTimestamp,
    /// Address of the device that sent the advertisement
    pub address: HardwareAddress,
    pub kind: ReadingType,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_type_names() {
        assert_eq!(ReadingType::Battery.to_string(), "Battery");
        assert_eq!(ReadingType::Co2.to_string(), "CO2");
        assert_eq!(ReadingType::PowerOn.as_str(), "PowerOn");
    }

    #[test]
    fn test_reading_type_serializes_as_column_value() {
        assert_eq!(serde_json::to_string(&ReadingType::Co2).unwrap(), "\"CO2\"");
        assert_eq!(
            serde_json::to_string(&ReadingType::Humidity).unwrap(),
            "\"Humidity\""
        );
    }
}
