//! Integration tests for environment configuration.

use std::time::Duration;

use leafcare_app::AppConfig;
use leafcare_app::config::{BACKEND_URL_ENV, REQUEST_TIMEOUT_ENV, request_timeout_from_env};
use leafcare_upload::DEFAULT_REQUEST_TIMEOUT;

#[test]
fn config_env_tests_reads_and_validates_environment() {
    // Safety:
    // - Integration tests mutate process env in a single-threaded test body.
    // - We reset the variables before returning.
    unsafe { std::env::set_var(REQUEST_TIMEOUT_ENV, "12") };
    assert_eq!(request_timeout_from_env(), Duration::from_secs(12));

    // Safety: see rationale above.
    unsafe { std::env::set_var(REQUEST_TIMEOUT_ENV, "0") };
    assert_eq!(request_timeout_from_env(), DEFAULT_REQUEST_TIMEOUT);

    // Safety: see rationale above.
    unsafe { std::env::set_var(REQUEST_TIMEOUT_ENV, "soon") };
    assert_eq!(request_timeout_from_env(), DEFAULT_REQUEST_TIMEOUT);

    // Safety: see rationale above.
    unsafe { std::env::set_var(BACKEND_URL_ENV, "https://leaf.example.test/api") };
    let config = AppConfig::from_env().expect("config should load");
    assert_eq!(
        config.endpoints.upload().as_str(),
        "https://leaf.example.test/api/upload"
    );

    let overridden = AppConfig::with_overrides(Some("http://localhost:8080"), Some(3))
        .expect("overrides should load");
    assert_eq!(
        overridden.endpoints.history().as_str(),
        "http://localhost:8080/history"
    );
    assert_eq!(overridden.request_timeout, Duration::from_secs(3));

    // Safety: see rationale above.
    unsafe { std::env::set_var(BACKEND_URL_ENV, "file:///tmp/socket") };
    assert!(AppConfig::from_env().is_err());

    // Safety: see rationale above.
    unsafe { std::env::remove_var(BACKEND_URL_ENV) };
    // Safety: see rationale above.
    unsafe { std::env::remove_var(REQUEST_TIMEOUT_ENV) };
}
