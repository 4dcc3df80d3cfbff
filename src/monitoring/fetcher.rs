//! Paginated series retrieval
//!
//! Drives one service's `ListTimeSeries` cursor to exhaustion, keeping
//! whatever was gathered when a page fails or the scrape is cancelled.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::GcmScrapeError;
use crate::monitoring::client::{ListTimeSeriesRequest, MetricsClient};
use crate::monitoring::time_series::TimeSeries;

/// Result of fetching all pages for one service
///
/// `series` holds everything gathered before the first failure, so a
/// non-empty result can accompany a recorded error.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Series gathered across pages, in arrival order
    pub series: Vec<TimeSeries>,
    /// Failure that aborted this service's page loop, if any
    pub error: Option<GcmScrapeError>,
}

/// Fetch every page for one service's request
///
/// A page error aborts this service only; the caller continues with the
/// remaining services. Cancellation aborts the in-flight request and is
/// recorded like any other per-service failure.
pub async fn fetch_all_pages(
    client: &dyn MetricsClient,
    request: &ListTimeSeriesRequest,
    service_name: &str,
    cancel: &CancellationToken,
) -> FetchOutcome {
    let mut outcome = FetchOutcome::default();
    let mut page_token: Option<String> = None;
    let mut pages = 0u32;

    loop {
        if cancel.is_cancelled() {
            warn!(service = service_name, "Scrape cancelled during pagination");
            outcome.error = Some(GcmScrapeError::Cancelled {
                service: service_name.to_string(),
            });
            break;
        }

        let page = tokio::select! {
            result = client.list_time_series(request, page_token.as_deref()) => result,
            _ = cancel.cancelled() => {
                warn!(service = service_name, "Scrape cancelled mid-request");
                outcome.error = Some(GcmScrapeError::Cancelled {
                    service: service_name.to_string(),
                });
                break;
            }
        };

        match page {
            Ok(page) => {
                pages += 1;
                outcome.series.extend(page.series);
                match page.next_page_token {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }
            Err(e) => {
                warn!(
                    service = service_name,
                    error = %e,
                    "Failed to retrieve time series page"
                );
                outcome.error = Some(GcmScrapeError::Service {
                    service: service_name.to_string(),
                    source: e,
                });
                break;
            }
        }
    }

    debug!(
        service = service_name,
        pages,
        series = outcome.series.len(),
        failed = outcome.error.is_some(),
        "Finished fetching service"
    );

    outcome
}
