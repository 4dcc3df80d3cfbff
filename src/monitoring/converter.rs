//! Conversion of Cloud Monitoring time series into OTLP metrics
//!
//! Builds one `ExportMetricsServiceRequest` from the full set of series a
//! scrape accumulated, dispatching on metric kind. Resource attributes are
//! keyed per distinct resource identity, so series from different monitored
//! resources never clobber each other's labels.

use std::collections::{BTreeMap, HashMap};

use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue, InstrumentationScope, KeyValue};
use opentelemetry_proto::tonic::metrics::v1::{
    metric::Data, number_data_point, AggregationTemporality, Gauge, Metric, NumberDataPoint,
    ResourceMetrics, ScopeMetrics, Sum,
};
use opentelemetry_proto::tonic::resource::v1::Resource;
use tracing::warn;

use crate::monitoring::time_series::{
    MetricKind, MonitoredResource, Point, ResourceMetadata, TimeSeries, TypedValue,
};

/// Instrumentation scope name stamped on every converted batch
const SCOPE_NAME: &str = "gcm-otlp-receiver";

/// Convert the accumulated series of one scrape into an OTLP batch
///
/// Applied once, after all services have been fetched. Series with an
/// unsupported kind are dropped with a diagnostic and never fail the scrape.
pub fn convert_time_series(all_series: &[TimeSeries]) -> ExportMetricsServiceRequest {
    let mut groups: Vec<ResourceGroup> = Vec::new();
    let mut index: HashMap<ResourceKey, usize> = HashMap::new();

    for series in all_series {
        let key = ResourceKey::from_resource(&series.resource);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                groups.push(ResourceGroup::new(&series.resource));
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };

        let group = &mut groups[slot];
        group.merge_metadata(series.metadata.as_ref());

        if let Some(metric) = convert_series(series) {
            group.metrics.push(metric);
        }
    }

    ExportMetricsServiceRequest {
        // A resource whose series were all dropped contributes nothing.
        resource_metrics: groups
            .into_iter()
            .filter(|group| !group.metrics.is_empty())
            .map(ResourceGroup::into_resource_metrics)
            .collect(),
    }
}

/// Identity of a monitored resource: type plus the full label set
#[derive(Debug, PartialEq, Eq, Hash)]
struct ResourceKey {
    resource_type: String,
    labels: BTreeMap<String, String>,
}

impl ResourceKey {
    fn from_resource(resource: &MonitoredResource) -> Self {
        Self {
            resource_type: resource.resource_type.clone(),
            labels: resource
                .labels
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Metrics accumulated for one resource identity, in first-seen order
struct ResourceGroup {
    attributes: BTreeMap<String, String>,
    metrics: Vec<Metric>,
}

impl ResourceGroup {
    fn new(resource: &MonitoredResource) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("resource_type".to_string(), resource.resource_type.clone());
        for (k, v) in &resource.labels {
            attributes.insert(k.clone(), v.clone());
        }
        Self {
            attributes,
            metrics: Vec::new(),
        }
    }

    /// Merge user labels and string-converted system labels into the
    /// resource attributes; same-named keys take the latest value.
    fn merge_metadata(&mut self, metadata: Option<&ResourceMetadata>) {
        let Some(metadata) = metadata else {
            return;
        };

        for (k, v) in &metadata.user_labels {
            self.attributes.insert(k.clone(), v.clone());
        }

        for (k, v) in &metadata.system_labels {
            let value = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.attributes.insert(k.clone(), value);
        }
    }

    fn into_resource_metrics(self) -> ResourceMetrics {
        let attributes = self
            .attributes
            .into_iter()
            .map(|(key, value)| KeyValue {
                key,
                value: Some(AnyValue {
                    value: Some(any_value::Value::StringValue(value)),
                }),
            })
            .collect();

        ResourceMetrics {
            resource: Some(Resource {
                attributes,
                dropped_attributes_count: 0,
                entity_refs: vec![],
            }),
            scope_metrics: vec![ScopeMetrics {
                scope: Some(InstrumentationScope {
                    name: SCOPE_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    attributes: vec![],
                    dropped_attributes_count: 0,
                }),
                metrics: self.metrics,
                schema_url: String::new(),
            }],
            schema_url: String::new(),
        }
    }
}

/// Convert one series into a metric record, dispatching on its kind
fn convert_series(series: &TimeSeries) -> Option<Metric> {
    let data = match series.metric_kind {
        MetricKind::Gauge => Data::Gauge(Gauge {
            // Gauge points carry no start time and no monotonicity.
            data_points: number_data_points(series, false),
        }),
        MetricKind::Cumulative => Data::Sum(Sum {
            data_points: number_data_points(series, true),
            aggregation_temporality: AggregationTemporality::Cumulative as i32,
            is_monotonic: true,
        }),
        MetricKind::Delta => Data::Sum(Sum {
            data_points: number_data_points(series, true),
            aggregation_temporality: AggregationTemporality::Delta as i32,
            is_monotonic: false,
        }),
        MetricKind::Unspecified => {
            warn!(
                metric_type = %series.metric.metric_type,
                kind = ?series.metric_kind,
                "Dropping series with unsupported metric kind"
            );
            return None;
        }
    };

    Some(Metric {
        name: series.metric.metric_type.clone(),
        description: "Converted from Cloud Monitoring time series".to_string(),
        unit: series.unit.clone(),
        metadata: vec![],
        data: Some(data),
    })
}

/// Build number data points for a series, one per numeric raw point
///
/// Values pass through as reported: integers stay integers, doubles stay
/// doubles. Non-numeric values are dropped with a diagnostic.
fn number_data_points(series: &TimeSeries, include_start: bool) -> Vec<NumberDataPoint> {
    series
        .points
        .iter()
        .filter_map(|point| number_data_point(series, point, include_start))
        .collect()
}

fn number_data_point(
    series: &TimeSeries,
    point: &Point,
    include_start: bool,
) -> Option<NumberDataPoint> {
    let value = match &point.value {
        TypedValue::Int64Value(i) => number_data_point::Value::AsInt(*i),
        TypedValue::DoubleValue(d) => number_data_point::Value::AsDouble(*d),
        other => {
            warn!(
                metric_type = %series.metric.metric_type,
                value = ?other,
                "Dropping point with non-numeric value"
            );
            return None;
        }
    };

    let start_time_unix_nano = if include_start {
        point
            .interval
            .start_time
            .map(|t| t.timestamp_nanos_opt().unwrap_or(0) as u64)
            .unwrap_or(0)
    } else {
        0
    };

    Some(NumberDataPoint {
        attributes: vec![],
        start_time_unix_nano,
        time_unix_nano: point.interval.end_time.timestamp_nanos_opt().unwrap_or(0) as u64,
        value: Some(value),
        exemplars: vec![],
        flags: 0,
    })
}
