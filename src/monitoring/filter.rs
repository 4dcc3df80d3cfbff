//! Filter query construction
//!
//! Maps a configured service to the Cloud Monitoring filter expression
//! selecting its metric stream. Service categories live in a static
//! registry; adding a category is one table entry.

use crate::config::ServiceConfig;

/// Default metric type per recognized service category
const DEFAULT_METRIC_TYPES: &[(&str, &str)] = &[
    ("compute", "compute.googleapis.com/instance/cpu/usage_time"),
    (
        "cloudfunctions",
        "cloudfunctions.googleapis.com/function/instance_count",
    ),
];

/// Look up the default metric type for a service category
pub fn default_metric_type(service_name: &str) -> Option<&'static str> {
    DEFAULT_METRIC_TYPES
        .iter()
        .find(|(name, _)| *name == service_name)
        .map(|(_, metric_type)| *metric_type)
}

/// Build the filter expression for one configured service
///
/// The service category must be in the registry; within a recognized
/// category an explicit `metric_name` overrides the default. Returns `None`
/// for an unrecognized category even when a metric name is set; the caller
/// must skip the service rather than send an unscoped query.
pub fn build_filter(service: &ServiceConfig) -> Option<String> {
    let default = default_metric_type(&service.service_name)?;
    let metric_type = service.metric_name.as_deref().unwrap_or(default);

    Some(format!(r#"metric.type = "{}""#, metric_type))
}
