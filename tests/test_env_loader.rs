//! Environment variable configuration tests
//!
//! Kept in their own test binary so env mutation cannot race other tests.

use gcm_otlp_receiver::ConfigLoader;

fn set_var(key: &str, value: &str) {
    // SAFETY: env mutation is isolated to this test binary.
    unsafe { std::env::set_var(key, value) };
}

fn remove_var(key: &str) {
    // SAFETY: env mutation is isolated to this test binary.
    unsafe { std::env::remove_var(key) };
}

#[test]
fn test_env_only_configuration_requires_services() {
    set_var("GCM_PROJECT_ID", "env-project");
    set_var("GCM_COLLECTION_INTERVAL_SECS", "180");

    // Services cannot come from the environment, so validation fails even
    // though the scalar fields were picked up.
    let result = ConfigLoader::from_env();
    assert!(result.is_err());

    remove_var("GCM_PROJECT_ID");
    remove_var("GCM_COLLECTION_INTERVAL_SECS");
}

#[test]
fn test_env_overrides_yaml_values() {
    use std::io::Write;

    set_var("GCM_ENDPOINT", "https://monitoring.example.com/");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"
project_id: my-project-id
endpoint: https://monitoring.googleapis.com/
services:
  - service_name: compute
"#,
    )
    .unwrap();
    file.flush().unwrap();

    let config = ConfigLoader::from_yaml(file.path()).unwrap();
    assert_eq!(config.endpoint, "https://monitoring.example.com/");

    remove_var("GCM_ENDPOINT");
}
