//! Google Cloud Monitoring OTLP receiver
//!
//! A Rust library that periodically scrapes time series from the Google
//! Cloud Monitoring API and converts them into OTLP metric batches
//! (resource → scope → metric → data points) for downstream telemetry
//! pipelines.
//!
//! # Features
//!
//! - Per-service scrape windows compensating for ingestion delay
//! - Filter-query construction from a static service registry
//! - Paginated retrieval with partial-failure accumulation
//! - Metric-kind dispatch: gauge, cumulative sum, delta sum
//! - Configurable via YAML, environment variables, or programmatic API
//! - Mock client for testing
//!
//! # Example
//!
//! ```no_run
//! use gcm_otlp_receiver::{Config, MonitoringReceiver};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), gcm_otlp_receiver::GcmError> {
//! let config = Config::default();
//! let receiver = MonitoringReceiver::new(config);
//! receiver.start().await?;
//!
//! let outcome = receiver.scrape(&CancellationToken::new()).await?;
//! println!("{} resources", outcome.metrics.resource_metrics.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod error;
pub mod mock;
pub mod monitoring;

// Re-export public API
pub use api::public::{MetricsConsumer, ScrapeController};
pub use config::{Config, ConfigBuilder, ConfigLoader, ServiceConfig};
pub use error::{GcmClientError, GcmConfigError, GcmError, GcmScrapeError, ScrapeErrors};
pub use mock::client::MockMetricsClient;
pub use monitoring::receiver::{MonitoringReceiver, ScrapeOutcome};

// Initialize tracing subscriber for structured logging
use tracing_subscriber::EnvFilter;

/// Initialize structured logging
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
}
