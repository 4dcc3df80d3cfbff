//! Unit tests for configuration validation

use gcm_otlp_receiver::error::GcmConfigError;
use gcm_otlp_receiver::{ConfigBuilder, ServiceConfig};

#[test]
fn test_valid_config_passes_validation() {
    let config = ConfigBuilder::new()
        .project_id("my-project-id")
        .collection_interval_secs(120)
        .service(ServiceConfig::new("compute").with_delay_secs(60))
        .build()
        .unwrap();

    assert!(config.validate().is_ok());
}

#[test]
fn test_interval_below_minimum_fails_validation() {
    let config = ConfigBuilder::new()
        .project_id("my-project-id")
        .collection_interval_secs(30)
        .service(ServiceConfig::new("compute"))
        .build();

    assert!(config.is_err());
    match config.unwrap_err() {
        GcmConfigError::InvalidInterval(_) => {}
        other => panic!("Expected InvalidInterval error, got {:?}", other),
    }
}

#[test]
fn test_missing_project_id_fails_validation() {
    let config = ConfigBuilder::new()
        .service(ServiceConfig::new("compute"))
        .build();

    assert!(config.is_err());
    match config.unwrap_err() {
        GcmConfigError::MissingRequiredField(msg) => assert!(msg.contains("project_id")),
        other => panic!("Expected MissingRequiredField error, got {:?}", other),
    }
}

#[test]
fn test_empty_services_fails_validation() {
    let config = ConfigBuilder::new().project_id("my-project-id").build();

    assert!(config.is_err());
    match config.unwrap_err() {
        GcmConfigError::MissingRequiredField(msg) => assert!(msg.contains("services")),
        other => panic!("Expected MissingRequiredField error, got {:?}", other),
    }
}

#[test]
fn test_empty_service_name_fails_validation() {
    let config = ConfigBuilder::new()
        .project_id("my-project-id")
        .service(ServiceConfig::new(""))
        .build();

    assert!(config.is_err());
    match config.unwrap_err() {
        GcmConfigError::MissingRequiredField(msg) => assert!(msg.contains("service_name")),
        other => panic!("Expected MissingRequiredField error, got {:?}", other),
    }
}

#[test]
fn test_invalid_endpoint_fails_validation() {
    let config = ConfigBuilder::new()
        .project_id("my-project-id")
        .endpoint("not a url")
        .service(ServiceConfig::new("compute"))
        .build();

    assert!(config.is_err());
    match config.unwrap_err() {
        GcmConfigError::InvalidUrl(_) => {}
        other => panic!("Expected InvalidUrl error, got {:?}", other),
    }
}

#[test]
fn test_empty_metric_name_override_fails_validation() {
    let config = ConfigBuilder::new()
        .project_id("my-project-id")
        .service(ServiceConfig::new("compute").with_metric_name(""))
        .build();

    assert!(config.is_err());
    match config.unwrap_err() {
        GcmConfigError::ValidationFailed(msg) => assert!(msg.contains("metric_name")),
        other => panic!("Expected ValidationFailed error, got {:?}", other),
    }
}

#[test]
fn test_default_interval_is_minimum() {
    let config = ConfigBuilder::new()
        .project_id("my-project-id")
        .service(ServiceConfig::new("compute"))
        .build()
        .unwrap();

    assert_eq!(
        config.collection_interval_secs,
        gcm_otlp_receiver::config::MIN_COLLECTION_INTERVAL_SECS
    );
}
