//! Human-readable durations for command-line options.

use std::time::Duration;

/// Suffixes checked in order; `ms` must come before `m` and `s`.
const UNITS: &[(&str, fn(u64) -> Duration)] = &[
    ("ms", Duration::from_millis),
    ("h", |n| Duration::from_secs(n.saturating_mul(3600))),
    ("m", |n| Duration::from_secs(n.saturating_mul(60))),
    ("s", Duration::from_secs),
];

/// Parse a duration such as `3s`, `1m`, `500ms` or `2h`.
///
/// Without a suffix the value is interpreted as seconds.
///
/// # Examples
/// ```
/// use switchbot_recorder::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
/// assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
/// ```
pub fn parse_duration(src: &str) -> Result<Duration, String> {
    let src = src.trim();
    if src.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (number, to_duration) = UNITS
        .iter()
        .find_map(|(suffix, f)| src.strip_suffix(suffix).map(|n| (n, *f)))
        .unwrap_or((src, Duration::from_secs as fn(u64) -> Duration));

    number
        .trim()
        .parse::<u64>()
        .map(to_duration)
        .map_err(|_| format!("invalid duration: {src}"))
}
