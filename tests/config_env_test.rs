//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use casestudy_bootstrap::config::{Config, LogFormat};
use casestudy_bootstrap::AppError;
use serial_test::serial;
use std::env;

fn set_required_keys() {
    env::set_var("KERNEL_API_KEY", "kernel-test-key");
    env::set_var("OPENAI_API_KEY", "sk-test");
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    set_required_keys();

    let config = Config::from_env().unwrap();
    assert_eq!(config.kernel.api_key, "kernel-test-key");
    assert_eq!(config.kernel.base_url, "http://localhost:8000");
    assert_eq!(config.openai.base_url, "https://api.openai.com");
    assert_eq!(config.openai.model, "gpt-4o");
    assert_eq!(config.metadata.leading_wrapper_lines, 3);
    assert_eq!(config.metadata.trailing_wrapper_lines, 2);
    assert_eq!(config.metadata.signed_url_ttl_secs, 3600);
}

#[test]
#[serial]
fn test_config_missing_kernel_key() {
    set_required_keys();
    env::remove_var("KERNEL_API_KEY");

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, AppError::Config { .. }));
    assert!(err.to_string().contains("KERNEL_API_KEY"));

    set_required_keys();
}

#[test]
#[serial]
fn test_config_missing_openai_key() {
    set_required_keys();
    env::remove_var("OPENAI_API_KEY");

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("OPENAI_API_KEY"));

    set_required_keys();
}

#[test]
#[serial]
fn test_config_from_env_custom_base_urls() {
    set_required_keys();
    env::set_var("KERNEL_BASE_URL", "https://kernel.example.com");
    env::set_var("OPENAI_BASE_URL", "https://proxy.example.com");
    env::set_var("OPENAI_MODEL", "gpt-4o-mini");

    let config = Config::from_env().unwrap();
    assert_eq!(config.kernel.base_url, "https://kernel.example.com");
    assert_eq!(config.openai.base_url, "https://proxy.example.com");
    assert_eq!(config.openai.model, "gpt-4o-mini");

    env::remove_var("KERNEL_BASE_URL");
    env::remove_var("OPENAI_BASE_URL");
    env::remove_var("OPENAI_MODEL");
}

#[test]
#[serial]
fn test_config_from_env_wrapper_lines() {
    set_required_keys();
    env::set_var("METADATA_LEADING_WRAPPER_LINES", "0");
    env::set_var("METADATA_TRAILING_WRAPPER_LINES", "1");
    env::set_var("SIGNED_URL_TTL_SECS", "600");

    let config = Config::from_env().unwrap();
    assert_eq!(config.metadata.leading_wrapper_lines, 0);
    assert_eq!(config.metadata.trailing_wrapper_lines, 1);
    assert_eq!(config.metadata.signed_url_ttl_secs, 600);

    env::remove_var("METADATA_LEADING_WRAPPER_LINES");
    env::remove_var("METADATA_TRAILING_WRAPPER_LINES");
    env::remove_var("SIGNED_URL_TTL_SECS");
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    set_required_keys();
    env::set_var("LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    env::set_var("LOG_FORMAT", "pretty");
}

#[test]
#[serial]
fn test_config_from_env_custom_request() {
    set_required_keys();
    env::set_var("REQUEST_TIMEOUT_MS", "60000");
    env::set_var("MAX_RETRIES", "5");
    env::set_var("RETRY_DELAY_MS", "2000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 60000);
    assert_eq!(config.request.max_retries, 5);
    assert_eq!(config.request.retry_delay_ms, 2000);

    env::remove_var("REQUEST_TIMEOUT_MS");
    env::remove_var("MAX_RETRIES");
    env::remove_var("RETRY_DELAY_MS");
}

#[test]
#[serial]
fn test_config_invalid_number_uses_default() {
    set_required_keys();
    env::set_var("METADATA_LEADING_WRAPPER_LINES", "three");

    let config = Config::from_env().unwrap();
    assert_eq!(config.metadata.leading_wrapper_lines, 3);

    env::remove_var("METADATA_LEADING_WRAPPER_LINES");
}

#[test]
#[serial]
fn test_config_from_env_log_level() {
    set_required_keys();
    env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.level, "debug");

    env::remove_var("LOG_LEVEL");
}
