//! Public API for embedded receiver usage
//!
//! Wires a `MonitoringReceiver` to a downstream consumer and drives it on
//! the configured collection interval.

use std::sync::Arc;

use async_trait::async_trait;
use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::GcmError;
use crate::monitoring::receiver::MonitoringReceiver;

/// Downstream consumer of converted metric batches
#[async_trait]
pub trait MetricsConsumer: Send + Sync {
    /// Accept one scrape's OTLP batch
    async fn consume(&self, batch: ExportMetricsServiceRequest) -> Result<(), GcmError>;
}

/// Periodic scrape driver
///
/// Runs one scrape per collection interval and hands each batch to the
/// consumer. Scrapes never overlap: the loop awaits each cycle before the
/// next tick is honored.
pub struct ScrapeController {
    receiver: Arc<MonitoringReceiver>,
    consumer: Arc<dyn MetricsConsumer>,
}

impl ScrapeController {
    /// Create a controller over a receiver and a downstream consumer
    pub fn new(receiver: Arc<MonitoringReceiver>, consumer: Arc<dyn MetricsConsumer>) -> Self {
        Self { receiver, consumer }
    }

    /// Initialize the receiver and scrape until `cancel` fires
    ///
    /// Per-service scrape failures are logged and do not stop the loop;
    /// partial batches still reach the consumer.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), GcmError> {
        self.receiver.start().await?;

        let period = Duration::from_secs(self.receiver.config().collection_interval_secs);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            collection_interval_secs = period.as_secs(),
            "Starting scrape loop"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = cancel.cancelled() => {
                    info!("Scrape loop cancelled");
                    self.receiver.shutdown().await;
                    return Ok(());
                }
            }

            let outcome = match self.receiver.scrape(&cancel).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "Scrape failed before any fetch started");
                    continue;
                }
            };

            if !outcome.errors.is_empty() {
                warn!(
                    errors = %outcome.errors,
                    "Scrape completed with per-service failures"
                );
            }

            if outcome.metrics.resource_metrics.is_empty() {
                continue;
            }

            if let Err(e) = self.consumer.consume(outcome.metrics).await {
                error!(error = %e, "Downstream consumer rejected batch");
            }
        }
    }
}
