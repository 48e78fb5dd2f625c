//! JSON row output formatter.
//!
//! Each reading becomes one object with the columns of the `metrics` table:
//! `Time`, `DeviceId`, `Type` and `Value`. `DeviceId` holds the hardware
//! address, and `Time` is the capture timestamp exactly as received.

use crate::output::OutputFormatter;
use crate::reading::SensorReading;
use serde_json::json;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, reading: &SensorReading, _name: &str) -> String {
        json!({
            "Time": reading.timestamp.as_str(),
            "DeviceId": reading.address.to_string(),
            "Type": reading.kind,
            "Value": reading.value,
        })
        .to_string()
    }
}
