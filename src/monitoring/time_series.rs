//! Raw Cloud Monitoring time-series data model
//!
//! serde structures matching the Cloud Monitoring v3 REST API JSON shapes.
//! These are owned transiently between fetch and conversion; nothing here
//! outlives one scrape invocation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fetched time series for a metric/resource combination
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    /// Metric type and labels
    pub metric: MetricDescriptor,

    /// Monitored resource the series was collected from
    pub resource: MonitoredResource,

    /// Optional resource metadata (user and system labels)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResourceMetadata>,

    /// How values of the series relate over time
    #[serde(default)]
    pub metric_kind: MetricKind,

    /// Unit of the point values, as reported by the provider
    #[serde(default)]
    pub unit: String,

    /// Data points in provider arrival order
    #[serde(default)]
    pub points: Vec<Point>,
}

/// Metric type plus metric-level labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDescriptor {
    /// Fully qualified metric type, e.g. `compute.googleapis.com/instance/cpu/usage_time`
    #[serde(rename = "type")]
    pub metric_type: String,

    /// Metric-level labels
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Monitored resource identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredResource {
    /// Resource type, e.g. `gce_instance`
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Resource labels, e.g. instance id and zone
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Auxiliary resource metadata attached by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    /// User-assigned labels
    #[serde(default)]
    pub user_labels: HashMap<String, String>,

    /// System labels; values are arbitrary JSON and are string-converted
    /// when flattened into resource attributes
    #[serde(default)]
    pub system_labels: serde_json::Map<String, serde_json::Value>,
}

/// Classification of how a metric's values relate over time
///
/// Closed union: any kind this library does not convert lands on
/// `Unspecified` and takes the drop-with-diagnostic path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricKind {
    /// Instantaneous measurement
    Gauge,
    /// Change over the point's interval
    Delta,
    /// Monotonically accumulating value since a start time
    Cumulative,
    /// Unknown or unsupported kind
    #[default]
    #[serde(other, rename = "METRIC_KIND_UNSPECIFIED")]
    Unspecified,
}

/// One timestamped observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    /// Time interval the point applies to
    pub interval: TimeInterval,

    /// Observed value
    pub value: TypedValue,
}

/// Half-open time interval attached to a point
///
/// Gauge points carry only an end time; delta and cumulative points also
/// carry the interval start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    /// Interval start; absent for gauge points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// Interval end, always present
    pub end_time: DateTime<Utc>,
}

/// Provider-reported point value
///
/// Only the numeric variants convert to OTLP data points; the rest are
/// dropped with a diagnostic. Cloud Monitoring encodes int64 values as JSON
/// strings, handled by the `int64_string` serde shim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypedValue {
    /// 64-bit integer value (JSON string encoded)
    Int64Value(#[serde(with = "int64_string")] i64),
    /// Double precision value
    DoubleValue(f64),
    /// Boolean value (not convertible to a number data point)
    BoolValue(bool),
    /// String value (not convertible)
    StringValue(String),
    /// Distribution value (histogram support is out of scope)
    DistributionValue(serde_json::Value),
}

/// One page of a `ListTimeSeries` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTimeSeriesResponse {
    /// Series returned on this page
    #[serde(default)]
    pub time_series: Vec<TimeSeries>,

    /// Cursor for the next page; absent or empty on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,

    /// Per-query partial execution errors reported by the API
    #[serde(default)]
    pub execution_errors: Vec<serde_json::Value>,
}

mod int64_string {
    //! Cloud Monitoring serializes int64 point values as JSON strings.

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrInt {
            Str(String),
            Int(i64),
        }

        match StringOrInt::deserialize(deserializer)? {
            StringOrInt::Str(s) => s.parse().map_err(serde::de::Error::custom),
            StringOrInt::Int(i) => Ok(i),
        }
    }
}
