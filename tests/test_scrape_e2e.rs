//! End-to-end scrape tests against the mock client

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use gcm_otlp_receiver::error::GcmClientError;
use gcm_otlp_receiver::mock::{double_point, gauge_series, MockMetricsClient};
use gcm_otlp_receiver::monitoring::TimeSeriesPage;
use gcm_otlp_receiver::{Config, ConfigBuilder, MonitoringReceiver, ServiceConfig};
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

const COMPUTE_FILTER: &str =
    r#"metric.type = "compute.googleapis.com/instance/cpu/usage_time""#;
const CLOUDFUNCTIONS_FILTER: &str =
    r#"metric.type = "cloudfunctions.googleapis.com/function/instance_count""#;

fn two_service_config() -> Config {
    ConfigBuilder::new()
        .project_id("my-project-id")
        .collection_interval_secs(120)
        .service(ServiceConfig::new("compute"))
        .service(ServiceConfig::new("cloudfunctions"))
        .build()
        .unwrap()
}

fn metric_count(
    batch: &opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest,
) -> usize {
    batch
        .resource_metrics
        .iter()
        .flat_map(|rm| rm.scope_metrics.iter())
        .map(|sm| sm.metrics.len())
        .sum()
}

#[tokio::test]
async fn test_two_service_scrape_produces_two_metrics() {
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 0, 1, 0).unwrap();
    let mock = MockMetricsClient::new();
    mock.stage_series(
        COMPUTE_FILTER,
        vec![gauge_series(
            "compute.googleapis.com/instance/cpu/usage_time",
            vec![double_point(end, 0.5)],
        )],
    )
    .await;
    mock.stage_series(
        CLOUDFUNCTIONS_FILTER,
        vec![gauge_series(
            "cloudfunctions.googleapis.com/function/instance_count",
            vec![double_point(end, 3.0)],
        )],
    )
    .await;

    let receiver = MonitoringReceiver::with_client(two_service_config(), Arc::new(mock.clone()));
    let outcome = receiver.scrape(&CancellationToken::new()).await.unwrap();

    assert!(outcome.errors.is_empty());
    assert_eq!(metric_count(&outcome.metrics), 2);

    // Every metric carries exactly one data point.
    for rm in &outcome.metrics.resource_metrics {
        for sm in &rm.scope_metrics {
            for metric in &sm.metrics {
                let Some(opentelemetry_proto::tonic::metrics::v1::metric::Data::Gauge(gauge)) =
                    &metric.data
                else {
                    panic!("expected gauge data");
                };
                assert_eq!(gauge.data_points.len(), 1);
            }
        }
    }

    // The receiver issued exactly the registry default filters.
    let requests = mock.recorded_requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].filter, COMPUTE_FILTER);
    assert_eq!(requests[1].filter, CLOUDFUNCTIONS_FILTER);
    assert_eq!(requests[0].name, "projects/my-project-id");
}

#[tokio::test]
async fn test_request_windows_span_the_collection_interval() {
    let mock = MockMetricsClient::new();
    let receiver = MonitoringReceiver::with_client(two_service_config(), Arc::new(mock.clone()));
    let before = Utc::now();
    receiver.scrape(&CancellationToken::new()).await.unwrap();

    for request in mock.recorded_requests().await {
        let window = request.interval;
        assert_eq!(window.end - window.start, ChronoDuration::seconds(120));
        // Zero delay: the window ends no later than "now".
        assert!(window.start <= before);
    }
}

#[tokio::test]
async fn test_partial_failure_keeps_successful_service_metrics() {
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 0, 1, 0).unwrap();
    let mock = MockMetricsClient::new();
    mock.stage_series(
        COMPUTE_FILTER,
        vec![gauge_series(
            "compute.googleapis.com/instance/cpu/usage_time",
            vec![double_point(end, 0.5)],
        )],
    )
    .await;
    mock.stage_error(
        CLOUDFUNCTIONS_FILTER,
        GcmClientError::Api {
            status: 500,
            message: "backend unavailable".to_string(),
        },
    )
    .await;

    let receiver = MonitoringReceiver::with_client(two_service_config(), Arc::new(mock));
    let outcome = receiver.scrape(&CancellationToken::new()).await.unwrap();

    // Compute's metric survived even though cloudfunctions failed.
    assert_eq!(metric_count(&outcome.metrics), 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors.to_string().contains("cloudfunctions"));
}

#[tokio::test]
async fn test_unrecognized_service_is_skipped() {
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 0, 1, 0).unwrap();
    let mock = MockMetricsClient::new();
    mock.stage_series(
        COMPUTE_FILTER,
        vec![gauge_series(
            "compute.googleapis.com/instance/cpu/usage_time",
            vec![double_point(end, 0.5)],
        )],
    )
    .await;

    let config = ConfigBuilder::new()
        .project_id("my-project-id")
        .collection_interval_secs(120)
        .service(ServiceConfig::new("unknown-service"))
        .service(ServiceConfig::new("compute"))
        .build()
        .unwrap();

    let receiver = MonitoringReceiver::with_client(config, Arc::new(mock.clone()));
    let outcome = receiver.scrape(&CancellationToken::new()).await.unwrap();

    // The unknown service contributed zero series and no request.
    assert_eq!(mock.call_count().await, 1);
    assert_eq!(metric_count(&outcome.metrics), 1);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn test_pagination_accumulates_all_pages() {
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 0, 1, 0).unwrap();
    let mock = MockMetricsClient::new();
    mock.stage_page(
        COMPUTE_FILTER,
        TimeSeriesPage {
            series: vec![gauge_series(
                "compute.googleapis.com/instance/cpu/usage_time",
                vec![double_point(end, 0.1)],
            )],
            next_page_token: Some("page-2".to_string()),
        },
    )
    .await;
    mock.stage_series(
        COMPUTE_FILTER,
        vec![gauge_series(
            "compute.googleapis.com/instance/cpu/usage_time",
            vec![double_point(end, 0.2)],
        )],
    )
    .await;

    let config = ConfigBuilder::new()
        .project_id("my-project-id")
        .collection_interval_secs(120)
        .service(ServiceConfig::new("compute"))
        .build()
        .unwrap();

    let receiver = MonitoringReceiver::with_client(config, Arc::new(mock.clone()));
    let outcome = receiver.scrape(&CancellationToken::new()).await.unwrap();

    assert!(outcome.errors.is_empty());
    assert_eq!(mock.call_count().await, 2);
    assert_eq!(metric_count(&outcome.metrics), 2);
}

#[tokio::test]
async fn test_page_error_keeps_earlier_pages() {
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 0, 1, 0).unwrap();
    let mock = MockMetricsClient::new();
    mock.stage_page(
        COMPUTE_FILTER,
        TimeSeriesPage {
            series: vec![gauge_series(
                "compute.googleapis.com/instance/cpu/usage_time",
                vec![double_point(end, 0.1)],
            )],
            next_page_token: Some("page-2".to_string()),
        },
    )
    .await;
    mock.stage_error(
        COMPUTE_FILTER,
        GcmClientError::Http("connection reset".to_string()),
    )
    .await;

    let config = ConfigBuilder::new()
        .project_id("my-project-id")
        .collection_interval_secs(120)
        .service(ServiceConfig::new("compute"))
        .build()
        .unwrap();

    let receiver = MonitoringReceiver::with_client(config, Arc::new(mock));
    let outcome = receiver.scrape(&CancellationToken::new()).await.unwrap();

    // Page one's series converted; the page-two failure is reported.
    assert_eq!(metric_count(&outcome.metrics), 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors.to_string().contains("compute"));
}

#[tokio::test]
async fn test_explicit_metric_name_overrides_default_filter() {
    let mock = MockMetricsClient::new();
    let config = ConfigBuilder::new()
        .project_id("my-project-id")
        .collection_interval_secs(120)
        .service(
            ServiceConfig::new("compute")
                .with_metric_name("compute.googleapis.com/instance/disk/read_bytes_count"),
        )
        .build()
        .unwrap();

    let receiver = MonitoringReceiver::with_client(config, Arc::new(mock.clone()));
    receiver.scrape(&CancellationToken::new()).await.unwrap();

    let requests = mock.recorded_requests().await;
    assert_eq!(
        requests[0].filter,
        r#"metric.type = "compute.googleapis.com/instance/disk/read_bytes_count""#
    );
}

#[tokio::test]
async fn test_cancelled_scrape_reports_cancellation() {
    let mock = MockMetricsClient::new();
    let receiver = MonitoringReceiver::with_client(two_service_config(), Arc::new(mock));

    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = receiver.scrape(&cancel).await.unwrap();

    assert!(!outcome.errors.is_empty());
    assert!(outcome.errors.to_string().contains("cancelled"));
}

#[tokio::test]
async fn test_cancellation_mid_request_aborts_the_in_flight_fetch() {
    use async_trait::async_trait;
    use gcm_otlp_receiver::error::GcmScrapeError;
    use gcm_otlp_receiver::monitoring::client::{ListTimeSeriesRequest, MetricsClient};
    use gcm_otlp_receiver::monitoring::fetcher::fetch_all_pages;
    use gcm_otlp_receiver::monitoring::{ScrapeWindow, TimeSeriesPage};

    /// Client whose requests never complete
    struct StallingClient;

    #[async_trait]
    impl MetricsClient for StallingClient {
        async fn list_time_series(
            &self,
            _request: &ListTimeSeriesRequest,
            _page_token: Option<&str>,
        ) -> Result<TimeSeriesPage, GcmClientError> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok(TimeSeriesPage::default())
        }
    }

    let window = ScrapeWindow::compute(
        std::time::Duration::from_secs(120),
        std::time::Duration::from_secs(0),
    );
    let request = ListTimeSeriesRequest::new("my-project-id", COMPUTE_FILTER, window);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let outcome = fetch_all_pages(&StallingClient, &request, "compute", &cancel).await;

    assert!(outcome.series.is_empty());
    match outcome.error {
        Some(GcmScrapeError::Cancelled { service }) => assert_eq!(service, "compute"),
        other => panic!("expected cancellation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scrape_before_start_fails() {
    let receiver = MonitoringReceiver::new(two_service_config());
    let result = receiver.scrape(&CancellationToken::new()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_concurrent_start_initializes_once() {
    let config = ConfigBuilder::new()
        .project_id("my-project-id")
        .collection_interval_secs(120)
        .access_token("test-token")
        .service(ServiceConfig::new("compute"))
        .build()
        .unwrap();
    let receiver = Arc::new(MonitoringReceiver::new(config));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let receiver = receiver.clone();
        handles.push(tokio::spawn(async move { receiver.start().await }));
    }
    for handle in handles {
        tokio_test::assert_ok!(handle.await.unwrap());
    }

    // A second start after initialization is a no-op.
    tokio_test::assert_ok!(receiver.start().await);
}
