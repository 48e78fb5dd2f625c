//! Capture timestamps as reported by the scanner.
//!
//! A capture timestamp is carried through the decoder verbatim, microseconds
//! included. Only the output formatters interpret it.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An RFC 3339 UTC timestamp of the form `2023-09-27T07:38:44.951123+00:00`.
///
/// The fractional part is optional, but when present it has exactly six digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureTimestamp(String);

/// Error returned when a string is not a valid capture timestamp.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid capture timestamp '{0}': expected YYYY-MM-DDTHH:MM:SS[.ffffff]+00:00")]
pub struct ParseTimestampError(pub String);

const UTC_SUFFIX: &str = "+00:00";

/// Shape of the part before the UTC suffix: `d` for a digit, anything else literal.
const DATE_TIME_PATTERN: &[u8] = b"dddd-dd-ddTdd:dd:dd";

fn matches_pattern(s: &[u8], pattern: &[u8]) -> bool {
    s.len() == pattern.len()
        && s.iter().zip(pattern).all(|(c, p)| match p {
            b'd' => c.is_ascii_digit(),
            _ => c == p,
        })
}

impl CaptureTimestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CaptureTimestamp {
    type Err = ParseTimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseTimestampError(s.to_string());

        let body = s.strip_suffix(UTC_SUFFIX).ok_or_else(invalid)?.as_bytes();
        if body.len() < DATE_TIME_PATTERN.len() {
            return Err(invalid());
        }

        let (date_time, fraction) = body.split_at(DATE_TIME_PATTERN.len());
        if !matches_pattern(date_time, DATE_TIME_PATTERN) {
            return Err(invalid());
        }
        if !fraction.is_empty() && !matches_pattern(fraction, b".dddddd") {
            return Err(invalid());
        }

        Ok(CaptureTimestamp(s.to_string()))
    }
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
