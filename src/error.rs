//! Error types for the Google Cloud Monitoring receiver
//!
//! Defines all error types used throughout the library with clear error messages
//! and context for debugging.

use thiserror::Error;

/// Main error type for the receiver library
#[derive(Error, Debug)]
pub enum GcmError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] GcmConfigError),

    /// Monitoring API client errors
    #[error("Client error: {0}")]
    Client(#[from] GcmClientError),

    /// Downstream consumer errors
    #[error("Consumer error: {0}")]
    Consumer(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum GcmConfigError {
    /// Invalid collection interval value
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// Missing required configuration field
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Invalid URL format
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Errors raised by the Cloud Monitoring API client
#[derive(Error, Debug)]
pub enum GcmClientError {
    /// Client could not be constructed
    #[error("Failed to initialize monitoring client: {0}")]
    Init(String),

    /// Transport-level failure while issuing a request
    #[error("Transport error: {0}")]
    Http(String),

    /// The API returned a non-success status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the API
        status: u16,
        /// Error body or status text
        message: String,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Per-service failure recorded during a scrape
#[derive(Error, Debug)]
pub enum GcmScrapeError {
    /// A page fetch failed for one configured service
    #[error("failed to retrieve time series for service {service}: {source}")]
    Service {
        /// Name of the configured service that failed
        service: String,
        /// Underlying client failure
        source: GcmClientError,
    },

    /// The scrape was cancelled while this service was in flight
    #[error("scrape cancelled while fetching service {service}")]
    Cancelled {
        /// Name of the configured service that was in flight
        service: String,
    },
}

impl GcmScrapeError {
    /// Name of the service this failure belongs to
    pub fn service(&self) -> &str {
        match self {
            GcmScrapeError::Service { service, .. } => service,
            GcmScrapeError::Cancelled { service } => service,
        }
    }
}

/// Accumulated per-service failures for one scrape invocation
///
/// A scrape can produce a non-empty metrics batch together with a non-empty
/// error set; callers must not treat "errors present" as "batch is empty".
#[derive(Debug, Default)]
pub struct ScrapeErrors(Vec<GcmScrapeError>);

impl ScrapeErrors {
    /// Create an empty error set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Record one per-service failure
    pub fn push(&mut self, err: GcmScrapeError) {
        self.0.push(err);
    }

    /// True when every service succeeded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded failures
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the recorded failures
    pub fn iter(&self) -> impl Iterator<Item = &GcmScrapeError> {
        self.0.iter()
    }
}

impl std::fmt::Display for ScrapeErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "no scrape errors");
        }
        let joined = self
            .0
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl std::error::Error for ScrapeErrors {}

impl From<anyhow::Error> for GcmError {
    fn from(err: anyhow::Error) -> Self {
        GcmError::Io(std::io::Error::other(err.to_string()))
    }
}
