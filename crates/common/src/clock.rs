//! Time-unit utilities for sample timestamps.
//!
//! All Stridelab streams carry signed nanosecond timestamps. Durations
//! coming from configuration are expressed in seconds or milliseconds;
//! this module converts between those units and renders timestamps for
//! humans.

use chrono::{SecondsFormat, TimeZone, Utc};

pub const NANOS_PER_MILLI: i64 = 1_000_000;
pub const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Convert (possibly negative, fractional) seconds to nanoseconds.
pub fn secs_to_ns(secs: f64) -> i64 {
    (secs * NANOS_PER_SEC as f64).round() as i64
}

/// Convert (possibly fractional) milliseconds to nanoseconds.
pub fn ms_to_ns(ms: f64) -> i64 {
    (ms * NANOS_PER_MILLI as f64).round() as i64
}

/// Convert nanoseconds to fractional milliseconds.
pub fn ns_to_ms(ns: i64) -> f64 {
    ns as f64 / NANOS_PER_MILLI as f64
}

/// Convert nanoseconds to fractional seconds.
pub fn ns_to_secs(ns: i64) -> f64 {
    ns as f64 / NANOS_PER_SEC as f64
}

/// Render a nanosecond Unix timestamp as RFC 3339 with millisecond precision.
pub fn format_timestamp(ns: i64) -> String {
    Utc.timestamp_nanos(ns)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Estimate the nominal sampling rate of a sorted timestamp series from
/// the median positive sample interval.
///
/// Returns `None` when fewer than two distinct timestamps are present.
pub fn estimate_sample_rate_hz(times: &[i64]) -> Option<f64> {
    let mut intervals: Vec<i64> = times
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|dt| *dt > 0)
        .collect();
    if intervals.is_empty() {
        return None;
    }
    intervals.sort_unstable();
    let mid = intervals.len() / 2;
    let median = if intervals.len() % 2 == 0 {
        (intervals[mid - 1] + intervals[mid]) as f64 / 2.0
    } else {
        intervals[mid] as f64
    };
    Some(NANOS_PER_SEC as f64 / median)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversions() {
        assert_eq!(secs_to_ns(1.5), 1_500_000_000);
        assert_eq!(secs_to_ns(-2.0), -2_000_000_000);
        assert_eq!(ms_to_ns(150.0), 150_000_000);
        assert!((ns_to_ms(333_000_000) - 333.0).abs() < 1e-9);
        assert!((ns_to_secs(2_500_000_000) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(
            format_timestamp(1_600_000_000_250_000_000),
            "2020-09-13T12:26:40.250Z"
        );
    }

    #[test]
    fn test_estimate_sample_rate() {
        let times: Vec<i64> = (0..100).map(|i| i * 10_000_000).collect();
        let rate = estimate_sample_rate_hz(&times).unwrap();
        assert!((rate - 100.0).abs() < 1e-9);

        assert_eq!(estimate_sample_rate_hz(&[5]), None);
        assert_eq!(estimate_sample_rate_hz(&[5, 5, 5]), None);
    }
}
