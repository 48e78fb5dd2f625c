//! Line and batch decoding on top of [`extract`] and [`decode`].
//!
//! A capture batch is newline-delimited JSON. Every line is decoded on its own,
//! so one malformed line never costs the rest of the batch.

use crate::decoder::{DecodeError, decode};
use crate::device::Classifier;
use crate::envelope::{ExtractError, extract};
use crate::reading::SensorReading;
use thiserror::Error;

/// Why a single capture line produced no readings.
#[derive(Error, Debug)]
pub enum LineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A line that failed to decode.
#[derive(Debug)]
pub struct LineFailure {
    /// 1-based line number within the batch
    pub line: usize,
    pub error: LineError,
}

/// Result of decoding a whole batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub readings: Vec<SensorReading>,
    pub failures: Vec<LineFailure>,
}

/// Decode all advertisement structures of one capture message.
///
/// Stops at the first structure that fails.
pub fn decode_line<C>(line: &str, classifier: &C) -> Result<Vec<SensorReading>, LineError>
where
    C: Classifier + ?Sized,
{
    let mut readings = Vec::new();
    for s in extract(line)? {
        readings.extend(decode(&s, classifier)?);
    }
    Ok(readings)
}

/// Decode a newline-delimited batch of capture messages.
///
/// Empty lines are skipped. An empty `readings` list is a normal outcome: a
/// batch may well contain only advertisements from other people's devices.
pub fn decode_batch<C>(input: &str, classifier: &C) -> BatchReport
where
    C: Classifier + ?Sized,
{
    let mut report = BatchReport::default();

    for (index, line) in input.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        match decode_line(line, classifier) {
            Ok(readings) => report.readings.extend(readings),
            Err(error) => report.failures.push(LineFailure {
                line: index + 1,
                error,
            }),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::DeviceId;
    use crate::device::{DeviceType, DirectoryError};
    use crate::reading::ReadingType;

    fn classifier(id: &DeviceId) -> Result<DeviceType, DirectoryError> {
        match id.to_string().as_str() {
            "ACDE4828ACED" => Ok(DeviceType::Meter),
            "ACDE486C5FF0" => Ok(DeviceType::PlugMiniUs),
            _ => Ok(DeviceType::NotMyDevice),
        }
    }

    const METER_LINE: &str = r#"{"time": "2023-09-27T07:38:44.951123+00:00", "addr": "ac:de:48:28:ac:ed", "structs": [{"adtype": 1, "desc": "Flags", "value": "06"}, {"adtype": 22, "desc": "16b Service Data", "value": "000d540064009b4c"}]}"#;
    const PLUG_LINE: &str = r#"{"time": "2023-09-30T13:05:48+00:00", "addr": "ac:de:48:6c:5f:f0", "structs": [{"adtype": 255, "desc": "Manufacturer", "value": "69096055f93599ff048010260a8f"}]}"#;
    const STRANGER_LINE: &str = r#"{"time": "2023-09-27T07:38:44.951123+00:00", "addr": "ac:de:48:ff:ff:ff", "structs": [{"adtype": 22, "desc": "16b Service Data", "value": "000d540064009b4c"}]}"#;

    #[test]
    fn test_decode_line_flattens_structures() {
        let readings = decode_line(METER_LINE, &classifier).unwrap();
        assert_eq!(
            readings.iter().map(|r| r.kind).collect::<Vec<_>>(),
            vec![
                ReadingType::Battery,
                ReadingType::Temperature,
                ReadingType::Humidity
            ]
        );
    }

    #[test]
    fn test_decode_line_keeps_timestamp_verbatim() {
        let readings = decode_line(PLUG_LINE, &classifier).unwrap();
        assert_eq!(readings.len(), 2);
        for r in &readings {
            assert_eq!(r.timestamp.as_str(), "2023-09-30T13:05:48+00:00");
            assert_eq!(r.address.to_string(), "ac:de:48:6c:5f:f0");
        }
    }

    #[test]
    fn test_decode_line_unknown_device() {
        assert!(decode_line(STRANGER_LINE, &classifier).unwrap().is_empty());
    }

    #[test]
    fn test_decode_line_malformed() {
        assert!(matches!(
            decode_line("xxx", &classifier),
            Err(LineError::Extract(ExtractError::MalformedEnvelope(_)))
        ));
    }

    #[test]
    fn test_decode_batch_isolates_failures() {
        let input = format!("{METER_LINE}\n\nxxx\r\n{PLUG_LINE}\n{STRANGER_LINE}\n");
        let report = decode_batch(&input, &classifier);

        assert_eq!(report.readings.len(), 5);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].line, 3);
    }

    #[test]
    fn test_decode_batch_without_readings() {
        let report = decode_batch(&format!("{STRANGER_LINE}\n\n"), &classifier);
        assert!(report.readings.is_empty());
        assert!(report.failures.is_empty());

        let report = decode_batch("", &classifier);
        assert!(report.readings.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_decode_batch_reports_truncated_payload() {
        let truncated = r#"{"time": "2023-09-27T07:38:44+00:00", "addr": "ac:de:48:28:ac:ed", "structs": [{"adtype": 22, "desc": "16b Service Data", "value": "000d54"}]}"#;
        let report = decode_batch(truncated, &classifier);
        assert!(matches!(
            report.failures[0].error,
            LineError::Decode(DecodeError::TruncatedPayload { .. })
        ));
    }
}
