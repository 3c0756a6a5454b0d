//! Tests for [`ServerConfig`]. Env vars are process-global, so every test
//! that touches them runs `#[serial]` to avoid racing its siblings.

use super::*;
use serial_test::serial;

fn clear_env() {
    std::env::remove_var("GHILLIE_HOST");
    std::env::remove_var("GHILLIE_PORT");
}

#[test]
#[serial]
fn from_env_uses_defaults_when_unset() {
    clear_env();
    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8080);
}

#[test]
#[serial]
fn from_env_reads_host_and_port() {
    clear_env();
    std::env::set_var("GHILLIE_HOST", "127.0.0.1");
    std::env::set_var("GHILLIE_PORT", "9090");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 9090);

    clear_env();
}

#[test]
#[serial]
fn from_env_rejects_a_non_numeric_port() {
    clear_env();
    std::env::set_var("GHILLIE_PORT", "not-a-port");

    let result = ServerConfig::from_env();
    assert!(result.is_err());

    clear_env();
}

#[test]
#[serial]
fn blank_host_falls_back_to_default() {
    clear_env();
    std::env::set_var("GHILLIE_HOST", "   ");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.host, "0.0.0.0");

    clear_env();
}

#[test]
fn validate_rejects_port_zero() {
    let config = ServerConfig {
        host: "0.0.0.0".to_string(),
        port: 0,
        shutdown_timeout_seconds: 30,
    };
    assert!(config.validate().is_err());
}

#[test]
fn validate_accepts_a_valid_port() {
    let config = ServerConfig::default();
    assert!(config.validate().is_ok());
}
