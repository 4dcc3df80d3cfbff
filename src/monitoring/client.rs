//! Cloud Monitoring API client
//!
//! Defines the `MetricsClient` seam the receiver scrapes through, plus the
//! HTTP implementation over the Monitoring v3 REST surface. Authentication
//! is external: the client receives an already-obtained bearer token.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

use crate::error::GcmClientError;
use crate::monitoring::time_series::{ListTimeSeriesResponse, TimeSeries};
use crate::monitoring::window::ScrapeWindow;

/// Detail level requested for listed series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSeriesView {
    /// Headers plus all point data
    Full,
    /// Series identity only, no points
    Headers,
}

impl TimeSeriesView {
    fn as_query_value(self) -> &'static str {
        match self {
            TimeSeriesView::Full => "FULL",
            TimeSeriesView::Headers => "HEADERS",
        }
    }
}

/// One `ListTimeSeries` query, scoped to a project and filter
#[derive(Debug, Clone)]
pub struct ListTimeSeriesRequest {
    /// Resource name, `projects/{project_id}`
    pub name: String,
    /// Filter expression scoping the query to one metric type
    pub filter: String,
    /// Time range to read
    pub interval: ScrapeWindow,
    /// Requested detail level
    pub view: TimeSeriesView,
}

impl ListTimeSeriesRequest {
    /// Build a full-detail request for one project/filter/window
    pub fn new(project_id: &str, filter: impl Into<String>, interval: ScrapeWindow) -> Self {
        Self {
            name: format!("projects/{}", project_id),
            filter: filter.into(),
            interval,
            view: TimeSeriesView::Full,
        }
    }
}

/// One page of listed series
///
/// `next_page_token` is `None` exactly when the results are exhausted;
/// end-of-results and failure are never conflated.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesPage {
    /// Series on this page, in provider order
    pub series: Vec<TimeSeries>,
    /// Cursor for the next page, absent on the last page
    pub next_page_token: Option<String>,
}

/// Capability to list time series pages from the Monitoring API
#[async_trait]
pub trait MetricsClient: Send + Sync {
    /// Fetch one page of series for `request`, resuming from `page_token`
    async fn list_time_series(
        &self,
        request: &ListTimeSeriesRequest,
        page_token: Option<&str>,
    ) -> Result<TimeSeriesPage, GcmClientError>;
}

/// HTTP client for the Monitoring v3 REST API
pub struct HttpMetricsClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: SecretString,
}

impl HttpMetricsClient {
    /// Create a client against `endpoint` using a pre-obtained bearer token
    pub fn new(endpoint: &str, access_token: SecretString) -> Result<Self, GcmClientError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| GcmClientError::Init(format!("invalid endpoint {}: {}", endpoint, e)))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| GcmClientError::Init(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            access_token,
        })
    }

    fn time_series_url(&self, request: &ListTimeSeriesRequest) -> Result<Url, GcmClientError> {
        self.endpoint
            .join(&format!("v3/{}/timeSeries", request.name))
            .map_err(|e| GcmClientError::Http(format!("failed to build request URL: {}", e)))
    }
}

#[async_trait]
impl MetricsClient for HttpMetricsClient {
    async fn list_time_series(
        &self,
        request: &ListTimeSeriesRequest,
        page_token: Option<&str>,
    ) -> Result<TimeSeriesPage, GcmClientError> {
        let url = self.time_series_url(request)?;

        let mut query: Vec<(&str, String)> = vec![
            ("filter", request.filter.clone()),
            ("interval.startTime", request.interval.start.to_rfc3339()),
            ("interval.endTime", request.interval.end.to_rfc3339()),
            ("view", request.view.as_query_value().to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        debug!(
            name = %request.name,
            filter = %request.filter,
            page_token = page_token.unwrap_or(""),
            "Listing time series"
        );

        let response = self
            .http
            .get(url)
            .query(&query)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| GcmClientError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(GcmClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ListTimeSeriesResponse = response
            .json()
            .await
            .map_err(|e| GcmClientError::Decode(e.to_string()))?;

        if !body.execution_errors.is_empty() {
            warn!(
                filter = %request.filter,
                execution_errors = body.execution_errors.len(),
                "Monitoring API reported partial execution errors"
            );
        }

        // The API signals the last page with an absent or empty token.
        let next_page_token = body.next_page_token.filter(|t| !t.is_empty());

        Ok(TimeSeriesPage {
            series: body.time_series,
            next_page_token,
        })
    }
}
