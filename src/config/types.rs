//! Configuration type definitions
//!
//! Defines all configuration structures for the Google Cloud Monitoring receiver.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::GcmConfigError;

/// Minimum allowed collection interval in seconds
///
/// Cloud Monitoring samples most metrics at a 60 second granularity, so
/// scraping more often than that only re-reads the same points.
pub const MIN_COLLECTION_INTERVAL_SECS: u64 = 60;

/// Default Cloud Monitoring API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://monitoring.googleapis.com/";

/// Main configuration structure for the receiver
///
/// # Configuration Sources
///
/// Configuration can be loaded from:
/// - YAML files
/// - Environment variables (with `GCM_*` prefix)
/// - Programmatic API (using `ConfigBuilder`)
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = gcm_otlp_receiver::ConfigBuilder::new()
///     .project_id("my-project-id")
///     .service(gcm_otlp_receiver::ServiceConfig::new("compute"))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// How frequently to scrape, in seconds (default: 60, minimum: 60)
    #[serde(default = "default_collection_interval_secs")]
    pub collection_interval_secs: u64,

    /// Google Cloud project to query (required)
    #[serde(default)]
    pub project_id: String,

    /// Cloud Monitoring API endpoint (default: https://monitoring.googleapis.com/)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Pre-obtained OAuth access token for the Monitoring API
    ///
    /// Token acquisition (service account exchange, metadata server, gcloud)
    /// happens outside this library. The token is never serialized back out.
    #[serde(default, skip_serializing)]
    pub access_token: Option<SecretString>,

    /// Services to scrape (required, at least one)
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection_interval_secs: default_collection_interval_secs(),
            project_id: String::new(),
            endpoint: default_endpoint(),
            access_token: None,
            services: Vec::new(),
        }
    }
}

impl Config {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), GcmConfigError> {
        if self.collection_interval_secs < MIN_COLLECTION_INTERVAL_SECS {
            return Err(GcmConfigError::InvalidInterval(format!(
                "collection_interval_secs must be at least {} seconds, current value is {}",
                MIN_COLLECTION_INTERVAL_SECS, self.collection_interval_secs
            )));
        }

        if self.project_id.is_empty() {
            return Err(GcmConfigError::MissingRequiredField(
                "project_id is required and cannot be empty".to_string(),
            ));
        }

        let endpoint = url::Url::parse(&self.endpoint).map_err(|e| {
            GcmConfigError::InvalidUrl(format!("endpoint is not a valid URL: {}", e))
        })?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(GcmConfigError::InvalidUrl(
                "endpoint must use http:// or https:// scheme".to_string(),
            ));
        }

        if self.services.is_empty() {
            return Err(GcmConfigError::MissingRequiredField(
                "services is required and must list at least one service".to_string(),
            ));
        }

        for service in &self.services {
            service.validate()?;
        }

        Ok(())
    }
}

/// One logical scrape subject (e.g. compute instances, cloud functions)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Service category name (required, e.g. "compute")
    pub service_name: String,

    /// Ingestion delay to subtract from the scrape window, in seconds (default: 0)
    #[serde(default)]
    pub delay_secs: u64,

    /// Explicit metric type overriding the category default (optional)
    #[serde(default)]
    pub metric_name: Option<String>,
}

impl ServiceConfig {
    /// Create a service entry with the category default metric and no delay
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            delay_secs: 0,
            metric_name: None,
        }
    }

    /// Set the ingestion delay in seconds
    pub fn with_delay_secs(mut self, delay_secs: u64) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    /// Override the category default metric type
    pub fn with_metric_name(mut self, metric_name: impl Into<String>) -> Self {
        self.metric_name = Some(metric_name.into());
        self
    }

    /// Validate one service entry
    pub fn validate(&self) -> Result<(), GcmConfigError> {
        if self.service_name.is_empty() {
            return Err(GcmConfigError::MissingRequiredField(
                "service_name is required and cannot be empty for service configuration"
                    .to_string(),
            ));
        }

        if let Some(metric_name) = &self.metric_name {
            if metric_name.is_empty() {
                return Err(GcmConfigError::ValidationFailed(
                    "metric_name must be non-empty when set".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Builder for creating configurations programmatically
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the collection interval in seconds
    pub fn collection_interval_secs(mut self, secs: u64) -> Self {
        self.config.collection_interval_secs = secs;
        self
    }

    /// Set the Google Cloud project id
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.config.project_id = project_id.into();
        self
    }

    /// Set the Monitoring API endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set the OAuth access token
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = Some(SecretString::new(token.into()));
        self
    }

    /// Add one service to scrape
    pub fn service(mut self, service: ServiceConfig) -> Self {
        self.config.services.push(service);
        self
    }

    /// Replace the full service list
    pub fn services(mut self, services: Vec<ServiceConfig>) -> Self {
        self.config.services = services;
        self
    }

    /// Build the configuration with validation
    pub fn build(self) -> Result<Config, GcmConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// Default value functions
fn default_collection_interval_secs() -> u64 {
    MIN_COLLECTION_INTERVAL_SECS
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
