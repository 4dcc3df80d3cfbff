//! Standalone Google Cloud Monitoring scraper
//!
//! Loads configuration, scrapes on the configured interval, and logs the
//! shape of each converted OTLP batch. Useful for smoke-testing a project's
//! scrape configuration before wiring a real downstream consumer.

use std::sync::Arc;

use async_trait::async_trait;
use gcm_otlp_receiver::{
    Config, ConfigLoader, GcmError, MetricsConsumer, MonitoringReceiver, ScrapeController,
};
use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Consumer that logs batch shape instead of exporting
struct LoggingConsumer;

#[async_trait]
impl MetricsConsumer for LoggingConsumer {
    async fn consume(&self, batch: ExportMetricsServiceRequest) -> Result<(), GcmError> {
        let metrics: usize = batch
            .resource_metrics
            .iter()
            .flat_map(|rm| rm.scope_metrics.iter())
            .map(|sm| sm.metrics.len())
            .sum();

        info!(
            resources = batch.resource_metrics.len(),
            metrics, "Received converted batch"
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    // Load configuration from the path given on the command line, falling
    // back to environment variables.
    let config: Config = match std::env::args().nth(1) {
        Some(path) => ConfigLoader::from_yaml(path)?,
        None => ConfigLoader::from_env()?,
    };

    let receiver = Arc::new(MonitoringReceiver::new(config));
    let controller = ScrapeController::new(receiver, Arc::new(LoggingConsumer));

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            signal_cancel.cancel();
        }
    });

    controller.run(cancel).await?;
    Ok(())
}
