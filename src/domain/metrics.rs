use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Derived metric kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    ByteRate,
    PacketErrorRatio,
    DatagramErrorRatio,
    LinkUtilization,
    ForwardingRate,
    Uptime,
    CounterSnapshot,
}

impl MetricKind {
    /// Whether a cycle needs two sampling passes separated by the sampling gap
    pub fn is_rate(&self) -> bool {
        matches!(
            self,
            MetricKind::ByteRate | MetricKind::LinkUtilization | MetricKind::ForwardingRate
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::ByteRate => "Bytes per second",
            MetricKind::PacketErrorRatio => "Received packets with errors",
            MetricKind::DatagramErrorRatio => "Received IP datagrams with errors",
            MetricKind::LinkUtilization => "Link utilization",
            MetricKind::ForwardingRate => "Forwarded datagrams per second",
            MetricKind::Uptime => "Agent uptime",
            MetricKind::CounterSnapshot => "Counter",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::ByteRate => "bytes/s",
            MetricKind::PacketErrorRatio => "ratio",
            MetricKind::DatagramErrorRatio => "%",
            MetricKind::LinkUtilization => "ratio",
            MetricKind::ForwardingRate => "datagrams/s",
            MetricKind::Uptime => "ticks",
            MetricKind::CounterSnapshot => "count",
        }
    }
}

/// Identifier of one registered metric series
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricId(String);

impl MetricId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MetricId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A derived metric value at the instant its last input was read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub kind: MetricKind,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl MetricSample {
    /// Non-finite values are replaced by 0.
    pub fn new(kind: MetricKind, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            value: if value.is_finite() { value } else { 0.0 },
            timestamp,
        }
    }

    pub fn zero(kind: MetricKind, timestamp: DateTime<Utc>) -> Self {
        Self::new(kind, 0.0, timestamp)
    }

    /// Wall-clock label shown on chart axes
    pub fn label(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_values_become_zero() {
        let now = Utc::now();
        assert_eq!(MetricSample::new(MetricKind::ByteRate, f64::NAN, now).value, 0.0);
        assert_eq!(MetricSample::new(MetricKind::ByteRate, f64::INFINITY, now).value, 0.0);
        assert_eq!(MetricSample::new(MetricKind::ByteRate, 12.5, now).value, 12.5);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&MetricKind::PacketErrorRatio).unwrap();
        assert_eq!(json, "\"packet_error_ratio\"");
    }

    #[test]
    fn test_rate_kinds() {
        assert!(MetricKind::ByteRate.is_rate());
        assert!(MetricKind::LinkUtilization.is_rate());
        assert!(MetricKind::ForwardingRate.is_rate());
        assert!(!MetricKind::Uptime.is_rate());
        assert!(!MetricKind::PacketErrorRatio.is_rate());
    }
}
