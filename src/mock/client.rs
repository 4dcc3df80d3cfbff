//! Mock Monitoring API client for testing
//!
//! Serves canned pages per filter expression and records every request so
//! tests can assert on the queries the receiver issued.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::GcmClientError;
use crate::monitoring::client::{ListTimeSeriesRequest, MetricsClient, TimeSeriesPage};
use crate::monitoring::time_series::{
    MetricDescriptor, MetricKind, MonitoredResource, Point, TimeInterval, TimeSeries, TypedValue,
};

/// Mock client state
#[derive(Debug, Default)]
struct MockClientState {
    /// Queued responses keyed by filter expression
    pages: HashMap<String, VecDeque<Result<TimeSeriesPage, GcmClientError>>>,
    /// Requests received, in call order
    requests: Vec<ListTimeSeriesRequest>,
}

/// Mock Monitoring API client
///
/// Filters with no queued response return an empty final page, so a test
/// only has to stage the services it cares about.
#[derive(Debug, Clone, Default)]
pub struct MockMetricsClient {
    state: Arc<RwLock<MockClientState>>,
}

impl MockMetricsClient {
    /// Create an empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a final page of series for a filter
    pub async fn stage_series(&self, filter: impl Into<String>, series: Vec<TimeSeries>) {
        self.stage_page(
            filter,
            TimeSeriesPage {
                series,
                next_page_token: None,
            },
        )
        .await;
    }

    /// Queue one page (with an explicit continuation token) for a filter
    pub async fn stage_page(&self, filter: impl Into<String>, page: TimeSeriesPage) {
        let mut state = self.state.write().await;
        state
            .pages
            .entry(filter.into())
            .or_default()
            .push_back(Ok(page));
    }

    /// Queue a failure for a filter
    pub async fn stage_error(&self, filter: impl Into<String>, error: GcmClientError) {
        let mut state = self.state.write().await;
        state
            .pages
            .entry(filter.into())
            .or_default()
            .push_back(Err(error));
    }

    /// Requests received so far, in call order
    pub async fn recorded_requests(&self) -> Vec<ListTimeSeriesRequest> {
        self.state.read().await.requests.clone()
    }

    /// Number of list calls received
    pub async fn call_count(&self) -> usize {
        self.state.read().await.requests.len()
    }
}

#[async_trait]
impl MetricsClient for MockMetricsClient {
    async fn list_time_series(
        &self,
        request: &ListTimeSeriesRequest,
        _page_token: Option<&str>,
    ) -> Result<TimeSeriesPage, GcmClientError> {
        let mut state = self.state.write().await;
        state.requests.push(request.clone());

        match state
            .pages
            .get_mut(&request.filter)
            .and_then(VecDeque::pop_front)
        {
            Some(result) => result,
            None => Ok(TimeSeriesPage::default()),
        }
    }
}

/// Build a series with an explicit resource identity
pub fn series_for_resource(
    metric_type: &str,
    kind: MetricKind,
    resource_type: &str,
    resource_labels: &[(&str, &str)],
    points: Vec<Point>,
) -> TimeSeries {
    TimeSeries {
        metric: MetricDescriptor {
            metric_type: metric_type.to_string(),
            labels: HashMap::new(),
        },
        resource: MonitoredResource {
            resource_type: resource_type.to_string(),
            labels: resource_labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        },
        metadata: None,
        metric_kind: kind,
        unit: "1".to_string(),
        points,
    }
}

fn default_series(metric_type: &str, kind: MetricKind, points: Vec<Point>) -> TimeSeries {
    series_for_resource(
        metric_type,
        kind,
        "gce_instance",
        &[("instance_id", "1234567890"), ("zone", "us-central1-a")],
        points,
    )
}

/// Gauge series on a canned GCE instance resource
pub fn gauge_series(metric_type: &str, points: Vec<Point>) -> TimeSeries {
    default_series(metric_type, MetricKind::Gauge, points)
}

/// Cumulative series on a canned GCE instance resource
pub fn cumulative_series(metric_type: &str, points: Vec<Point>) -> TimeSeries {
    default_series(metric_type, MetricKind::Cumulative, points)
}

/// Delta series on a canned GCE instance resource
pub fn delta_series(metric_type: &str, points: Vec<Point>) -> TimeSeries {
    default_series(metric_type, MetricKind::Delta, points)
}

/// Point with a double value and no interval start
pub fn double_point(end: DateTime<Utc>, value: f64) -> Point {
    Point {
        interval: TimeInterval {
            start_time: None,
            end_time: end,
        },
        value: TypedValue::DoubleValue(value),
    }
}

/// Point with an integer value over an explicit interval
pub fn int_point(start: DateTime<Utc>, end: DateTime<Utc>, value: i64) -> Point {
    Point {
        interval: TimeInterval {
            start_time: Some(start),
            end_time: end,
        },
        value: TypedValue::Int64Value(value),
    }
}
