//! Configuration module
//!
//! Provides configuration loading from YAML files, environment variables,
//! and a programmatic builder API.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{Config, ConfigBuilder, ServiceConfig, MIN_COLLECTION_INTERVAL_SECS};
