//! Configuration loader
//!
//! Loads configuration from YAML files or environment variables.
//! Priority: provided config > environment variables > defaults

use std::env;

use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::config::types::Config;
use crate::error::GcmConfigError;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub fn from_yaml(path: impl AsRef<std::path::Path>) -> Result<Config, GcmConfigError> {
        let path = path.as_ref();
        info!(
            config_path = %path.display(),
            "Loading configuration from YAML file"
        );

        let content = std::fs::read_to_string(path).map_err(|e| {
            warn!(
                config_path = %path.display(),
                error = %e,
                "Failed to read configuration file"
            );
            GcmConfigError::ValidationFailed(format!("Failed to read config file: {}", e))
        })?;

        let mut config: Config = serde_yaml::from_str(&content).map_err(|e| {
            warn!(
                config_path = %path.display(),
                error = %e,
                "Failed to parse YAML configuration"
            );
            GcmConfigError::ValidationFailed(format!("Failed to parse YAML: {}", e))
        })?;

        debug!(
            config_path = %path.display(),
            "Parsed YAML configuration successfully"
        );

        Self::apply_env_overrides(&mut config);

        config.validate().map_err(|e| {
            warn!(
                config_path = %path.display(),
                error = %e,
                "Configuration validation failed"
            );
            e
        })?;

        info!(
            config_path = %path.display(),
            project_id = %config.project_id,
            collection_interval_secs = config.collection_interval_secs,
            services = config.services.len(),
            "Configuration loaded and validated successfully"
        );

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Config, GcmConfigError> {
        info!("Loading configuration from environment variables");

        let mut config = Config::default();
        Self::apply_env_overrides(&mut config);

        config.validate().map_err(|e| {
            warn!(error = %e, "Configuration validation failed");
            e
        })?;

        info!(
            project_id = %config.project_id,
            collection_interval_secs = config.collection_interval_secs,
            services = config.services.len(),
            "Configuration loaded from environment variables and validated successfully"
        );

        Ok(config)
    }

    /// Apply `GCM_*` environment variable overrides
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(project_id) = env::var("GCM_PROJECT_ID") {
            debug!("Overriding project_id from GCM_PROJECT_ID");
            config.project_id = project_id;
        }

        if let Ok(endpoint) = env::var("GCM_ENDPOINT") {
            debug!("Overriding endpoint from GCM_ENDPOINT");
            config.endpoint = endpoint;
        }

        if let Ok(token) = env::var("GCM_ACCESS_TOKEN") {
            debug!("Overriding access_token from GCM_ACCESS_TOKEN");
            config.access_token = Some(SecretString::new(token));
        }

        if let Ok(interval) = env::var("GCM_COLLECTION_INTERVAL_SECS") {
            match interval.parse::<u64>() {
                Ok(secs) => {
                    debug!(
                        collection_interval_secs = secs,
                        "Overriding collection interval from GCM_COLLECTION_INTERVAL_SECS"
                    );
                    config.collection_interval_secs = secs;
                }
                Err(e) => {
                    warn!(
                        value = %interval,
                        error = %e,
                        "Ignoring unparseable GCM_COLLECTION_INTERVAL_SECS"
                    );
                }
            }
        }
    }
}
