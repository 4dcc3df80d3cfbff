//! Scrape window calculation
//!
//! Derives the absolute half-open `[start, end)` range to query, shifted
//! into the past by the per-service ingestion delay so the provider has
//! finished ingesting the points we ask for.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Half-open time range for one service query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeWindow {
    /// Inclusive window start
    pub start: DateTime<Utc>,
    /// Exclusive window end
    pub end: DateTime<Utc>,
}

impl ScrapeWindow {
    /// Compute the window for the current wall-clock time
    pub fn compute(interval: Duration, delay: Duration) -> Self {
        Self::compute_at(Utc::now(), interval, delay)
    }

    /// Compute the window relative to an explicit `now`
    ///
    /// Pure function of its inputs; this is the clock seam tests use.
    pub fn compute_at(now: DateTime<Utc>, interval: Duration, delay: Duration) -> Self {
        let start = now - delay - interval;
        let end = start + interval;
        Self { start, end }
    }
}
