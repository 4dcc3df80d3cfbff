//! Scrape orchestration
//!
//! `MonitoringReceiver` owns the configuration and the lazily-initialized
//! API client, and runs one complete fetch-and-convert cycle per `scrape`
//! call. It holds no other cross-call state; the caller decides the cadence.

use std::sync::Arc;
use std::time::Duration;

use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{GcmClientError, GcmError, GcmScrapeError, ScrapeErrors};
use crate::monitoring::client::{HttpMetricsClient, ListTimeSeriesRequest, MetricsClient};
use crate::monitoring::converter::convert_time_series;
use crate::monitoring::fetcher::fetch_all_pages;
use crate::monitoring::filter::build_filter;
use crate::monitoring::time_series::TimeSeries;
use crate::monitoring::window::ScrapeWindow;

/// Result of one scrape invocation
///
/// `metrics` and `errors` are independent: a scrape that lost one service
/// still delivers the other services' converted metrics alongside a
/// non-empty error set.
#[derive(Debug)]
pub struct ScrapeOutcome {
    /// Converted OTLP batch for this cycle
    pub metrics: ExportMetricsServiceRequest,
    /// Accumulated per-service failures (possibly empty)
    pub errors: ScrapeErrors,
}

/// Google Cloud Monitoring receiver
pub struct MonitoringReceiver {
    config: Config,
    // One-time initialization gate: set exactly once no matter how many
    // callers race through start().
    client: Mutex<Option<Arc<dyn MetricsClient>>>,
}

impl MonitoringReceiver {
    /// Create a receiver; the API client is initialized on `start`
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Mutex::new(None),
        }
    }

    /// Create a receiver over an externally supplied client
    ///
    /// Used by tests and by callers that manage their own transport.
    pub fn with_client(config: Config, client: Arc<dyn MetricsClient>) -> Self {
        Self {
            config,
            client: Mutex::new(Some(client)),
        }
    }

    /// Receiver configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Initialize the API client exactly once
    ///
    /// Concurrent callers serialize on the gate; whoever finds it already
    /// populated returns without re-initializing. A failed initialization
    /// leaves the gate empty so a later `start` can retry.
    pub async fn start(&self) -> Result<(), GcmError> {
        let mut guard = self.client.lock().await;
        if guard.is_some() {
            debug!("Monitoring client already initialized");
            return Ok(());
        }

        let token = self.config.access_token.clone().ok_or_else(|| {
            let err = GcmClientError::Init("no access token configured".to_string());
            error!(error = %err, "Failed to create monitoring client");
            err
        })?;

        let client = HttpMetricsClient::new(&self.config.endpoint, token).map_err(|e| {
            error!(error = %e, "Failed to create monitoring client");
            e
        })?;

        *guard = Some(Arc::new(client));
        info!(endpoint = %self.config.endpoint, "Monitoring client initialized");
        Ok(())
    }

    /// Signal shutdown; the receiver keeps no background state to tear down
    pub async fn shutdown(&self) {
        debug!("shutting down google cloud monitoring receiver");
    }

    /// Run one complete scrape cycle
    ///
    /// Per configured service: compute the window, build the filter, fetch
    /// every page, accumulate series and failures. After the loop the full
    /// accumulation converts once into a single OTLP batch. Only a missing
    /// client is fatal; per-service failures land in the outcome's errors.
    pub async fn scrape(&self, cancel: &CancellationToken) -> Result<ScrapeOutcome, GcmError> {
        let client = {
            let guard = self.client.lock().await;
            guard.clone().ok_or_else(|| {
                GcmError::Client(GcmClientError::Init(
                    "scrape called before start".to_string(),
                ))
            })?
        };

        let interval = Duration::from_secs(self.config.collection_interval_secs);
        let mut all_series: Vec<TimeSeries> = Vec::new();
        let mut errors = ScrapeErrors::new();

        for service in &self.config.services {
            if cancel.is_cancelled() {
                errors.push(GcmScrapeError::Cancelled {
                    service: service.service_name.clone(),
                });
                break;
            }

            let delay = Duration::from_secs(service.delay_secs);
            let window = ScrapeWindow::compute(interval, delay);

            let Some(filter) = build_filter(service) else {
                error!(
                    service = %service.service_name,
                    "Unrecognized service, no filter query built; skipping"
                );
                continue;
            };

            let request = ListTimeSeriesRequest::new(&self.config.project_id, filter, window);
            let outcome =
                fetch_all_pages(client.as_ref(), &request, &service.service_name, cancel).await;

            all_series.extend(outcome.series);
            if let Some(err) = outcome.error {
                errors.push(err);
            }
        }

        let metrics = convert_time_series(&all_series);

        info!(
            series = all_series.len(),
            resources = metrics.resource_metrics.len(),
            failed_services = errors.len(),
            "Scrape cycle complete"
        );

        Ok(ScrapeOutcome { metrics, errors })
    }
}
