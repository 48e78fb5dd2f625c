//! InfluxDB line protocol output formatter.

use crate::output::OutputFormatter;
use crate::reading::SensorReading;
use crate::timestamp::CaptureTimestamp;
use log::warn;
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Data point in InfluxDB line protocol
#[derive(Debug)]
pub struct DataPoint {
    pub measurement: String,
    pub tag_set: BTreeMap<String, String>,
    pub field_set: BTreeMap<String, f64>,
    /// Nanoseconds since the Unix epoch
    pub timestamp: Option<i128>,
}

/// Escape a measurement name, tag key or tag value.
fn escape(s: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn fmt_tags(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    for (key, value) in data_point.tag_set.iter() {
        write!(
            fmt,
            ",{}={}",
            escape(key, &[',', '=', ' ']),
            escape(value, &[',', '=', ' '])
        )?;
    }
    Ok(())
}

fn fmt_fields(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    let mut first = true;
    for (key, value) in data_point.field_set.iter() {
        if first {
            first = false;
        } else {
            write!(fmt, ",")?;
        }
        write!(fmt, "{}={}", escape(key, &[',', '=', ' ']), value)?;
    }
    Ok(())
}

fn fmt_timestamp(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    if let Some(nanos) = data_point.timestamp {
        write!(fmt, " {}", nanos)?;
    }
    Ok(())
}

impl fmt::Display for DataPoint {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", escape(&self.measurement, &[',', ' ']))?;
        fmt_tags(self, fmt)?;
        write!(fmt, " ")?;
        fmt_fields(self, fmt)?;
        fmt_timestamp(self, fmt)
    }
}

/// Convert a capture timestamp to nanoseconds since the Unix epoch.
///
/// Microseconds are kept; nothing is rounded.
pub fn unix_nanos(timestamp: &CaptureTimestamp) -> Option<i128> {
    OffsetDateTime::parse(timestamp.as_str(), &Rfc3339)
        .ok()
        .map(|t| t.unix_timestamp_nanos())
}

/// InfluxDB line protocol formatter.
///
/// Every reading becomes one point with a single `value` field. The reading
/// type is a tag, so all SwitchBot values share one measurement.
pub struct InfluxDbFormatter {
    /// The measurement name in InfluxDB
    measurement_name: String,
}

impl InfluxDbFormatter {
    /// Create a new InfluxDB formatter.
    ///
    /// # Arguments
    /// * `measurement_name` - The measurement name to use in the line protocol
    pub fn new(measurement_name: String) -> Self {
        Self { measurement_name }
    }

    fn tag_set(&self, reading: &SensorReading, name: &str) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        tags.insert("address".to_string(), reading.address.to_string());
        tags.insert("name".to_string(), name.to_string());
        tags.insert("type".to_string(), reading.kind.to_string());
        tags
    }

    fn to_data_point(&self, reading: &SensorReading, name: &str) -> DataPoint {
        let timestamp = unix_nanos(&reading.timestamp);
        if timestamp.is_none() {
            // Let InfluxDB stamp the point on arrival instead of dropping it
            warn!("cannot convert timestamp {} to epoch time", reading.timestamp);
        }

        DataPoint {
            measurement: self.measurement_name.clone(),
            tag_set: self.tag_set(reading, name),
            field_set: BTreeMap::from([("value".to_string(), reading.value)]),
            timestamp,
        }
    }
}

impl OutputFormatter for InfluxDbFormatter {
    fn format(&self, reading: &SensorReading, name: &str) -> String {
        format!("{}", self.to_data_point(reading, name))
    }
}
