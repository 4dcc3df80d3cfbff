//! Mock client module
//!
//! Test doubles for the Monitoring API, usable from integration tests and
//! by downstream crates embedding the receiver.

pub mod client;

pub use client::{
    cumulative_series, delta_series, double_point, gauge_series, int_point, series_for_resource,
    MockMetricsClient,
};
