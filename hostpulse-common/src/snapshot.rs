use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Raw figures reported by a metrics provider for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSample {
    /// CPU utilization over the sampling window, in percent.
    pub cpu_percent: f64,
    /// Number of live processes.
    pub process_count: u64,
    /// Total physical memory in bytes.
    pub memory_total: u64,
    /// Memory available for allocation in bytes.
    pub memory_available: u64,
    /// Memory in use, in percent.
    pub memory_percent: f64,
}

/// One point-in-time capture of host metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot {
    pub cpu_percent: f64,
    pub process_count: u64,
    pub memory_total: u64,
    pub memory_available: u64,
    pub memory_percent: f64,
    /// Unix epoch milliseconds when the sample was collected.
    pub timestamp: i64,
}

impl MetricsSnapshot {
    /// Build a snapshot from a provider sample taken at `timestamp`.
    ///
    /// Percentages are rounded to one decimal and clamped to `[0, 100]`,
    /// and available memory never exceeds the total.
    pub fn from_sample(sample: MetricsSample, timestamp: i64) -> Self {
        Self {
            cpu_percent: normalize_percent(sample.cpu_percent),
            process_count: sample.process_count,
            memory_total: sample.memory_total,
            memory_available: sample.memory_available.min(sample.memory_total),
            memory_percent: normalize_percent(sample.memory_percent),
            timestamp,
        }
    }

    /// Convert to the string-valued wire form.
    pub fn to_record(&self) -> SnapshotRecord {
        SnapshotRecord {
            cpu_percent: format!("{:.1}", self.cpu_percent),
            process_count: self.process_count.to_string(),
            memory_total: self.memory_total.to_string(),
            memory_available: self.memory_available.to_string(),
            memory_percent: format!("{:.1}", self.memory_percent),
            timestamp: self.timestamp.to_string(),
        }
    }
}

/// Wire form of a [`MetricsSnapshot`]: a flat mapping where every value is a string.
///
/// Fields serialize in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotRecord {
    pub cpu_percent: String,
    pub process_count: String,
    pub memory_total: String,
    pub memory_available: String,
    pub memory_percent: String,
    pub timestamp: String,
}

impl SnapshotRecord {
    /// Field names in wire order.
    pub const FIELDS: [&'static str; 6] = [
        "cpu_percent",
        "process_count",
        "memory_total",
        "memory_available",
        "memory_percent",
        "timestamp",
    ];

    /// Key/value pairs in wire order.
    pub fn pairs(&self) -> [(&'static str, &str); 6] {
        [
            ("cpu_percent", self.cpu_percent.as_str()),
            ("process_count", self.process_count.as_str()),
            ("memory_total", self.memory_total.as_str()),
            ("memory_available", self.memory_available.as_str()),
            ("memory_percent", self.memory_percent.as_str()),
            ("timestamp", self.timestamp.as_str()),
        ]
    }

    /// Parse the numeric strings back into a typed snapshot.
    pub fn parse(&self) -> Result<MetricsSnapshot> {
        Ok(MetricsSnapshot {
            cpu_percent: parse_field("cpu_percent", &self.cpu_percent)?,
            process_count: parse_field("process_count", &self.process_count)?,
            memory_total: parse_field("memory_total", &self.memory_total)?,
            memory_available: parse_field("memory_available", &self.memory_available)?,
            memory_percent: parse_field("memory_percent", &self.memory_percent)?,
            timestamp: parse_field("timestamp", &self.timestamp)?,
        })
    }
}

fn parse_field<T>(field: &'static str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if value.is_empty() {
        return Err(Error::invalid_record(field, "empty value"));
    }
    value
        .parse()
        .map_err(|e: T::Err| Error::invalid_record(field, format!("'{}': {}", value, e)))
}

fn normalize_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    ((value * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

/// Get the current timestamp in milliseconds since Unix epoch.
///
/// Returns 0 if system time is before Unix epoch (should never happen in practice).
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetricsSample {
        MetricsSample {
            cpu_percent: 12.5,
            process_count: 200,
            memory_total: 16_000_000_000,
            memory_available: 8_000_000_000,
            memory_percent: 50.0,
        }
    }

    #[test]
    fn test_record_string_encoding() {
        let snapshot = MetricsSnapshot::from_sample(sample(), 1_700_000_000_123);
        let record = snapshot.to_record();

        assert_eq!(record.cpu_percent, "12.5");
        assert_eq!(record.process_count, "200");
        assert_eq!(record.memory_total, "16000000000");
        assert_eq!(record.memory_available, "8000000000");
        assert_eq!(record.memory_percent, "50.0");
        assert_eq!(record.timestamp, "1700000000123");
    }

    #[test]
    fn test_percent_normalization() {
        let mut raw = sample();
        raw.cpu_percent = 100.04;
        raw.memory_percent = -0.2;
        let snapshot = MetricsSnapshot::from_sample(raw, 0);
        assert_eq!(snapshot.cpu_percent, 100.0);
        assert_eq!(snapshot.memory_percent, 0.0);

        raw.cpu_percent = f64::NAN;
        raw.memory_percent = 33.333;
        let snapshot = MetricsSnapshot::from_sample(raw, 0);
        assert_eq!(snapshot.cpu_percent, 0.0);
        assert_eq!(snapshot.memory_percent, 33.3);
    }

    #[test]
    fn test_available_clamped_to_total() {
        let mut raw = sample();
        raw.memory_available = raw.memory_total + 4096;
        let snapshot = MetricsSnapshot::from_sample(raw, 0);
        assert_eq!(snapshot.memory_available, snapshot.memory_total);
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        let mut record = MetricsSnapshot::from_sample(sample(), 42).to_record();
        assert_eq!(record.parse().unwrap().process_count, 200);

        record.memory_total = String::new();
        let err = record.parse().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRecord {
                field: "memory_total",
                ..
            }
        ));

        record.memory_total = "lots".to_string();
        assert!(record.parse().is_err());
    }

    #[test]
    fn test_pairs_follow_field_order() {
        let record = MetricsSnapshot::from_sample(sample(), 7).to_record();
        let names: Vec<_> = record.pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, SnapshotRecord::FIELDS);
    }

    #[test]
    fn test_current_timestamp_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(current_timestamp_millis() > 1_577_836_800_000);
    }
}
