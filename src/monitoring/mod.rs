//! Google Cloud Monitoring scrape pipeline
//!
//! Window computation, filter construction, paginated fetching, and
//! conversion of fetched series into OTLP metrics.

pub mod client;
pub mod converter;
pub mod fetcher;
pub mod filter;
pub mod receiver;
pub mod time_series;
pub mod window;

pub use client::{HttpMetricsClient, ListTimeSeriesRequest, MetricsClient, TimeSeriesPage};
pub use converter::convert_time_series;
pub use fetcher::{fetch_all_pages, FetchOutcome};
pub use filter::{build_filter, default_metric_type};
pub use receiver::{MonitoringReceiver, ScrapeOutcome};
pub use time_series::{MetricKind, TimeSeries, TypedValue};
pub use window::ScrapeWindow;
