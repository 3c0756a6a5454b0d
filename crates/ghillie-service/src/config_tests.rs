use super::*;

#[test]
fn resolve_log_level_passes_through_accepted_values() {
    let (level, fallback) = resolve_log_level(Some("debug".to_string()));
    assert_eq!(level, "DEBUG");
    assert!(fallback.is_none());
}

#[test]
fn resolve_log_level_maps_warning_and_critical() {
    assert_eq!(resolve_log_level(Some("WARNING".to_string())).0, "WARN");
    assert_eq!(resolve_log_level(Some("CRITICAL".to_string())).0, "ERROR");
}

#[test]
fn resolve_log_level_falls_back_to_info_on_garbage() {
    let (level, fallback) = resolve_log_level(Some("LOUD".to_string()));
    assert_eq!(level, "INFO");
    assert_eq!(fallback.as_deref(), Some("LOUD"));
}

#[test]
fn resolve_log_level_defaults_to_info_when_unset() {
    let (level, fallback) = resolve_log_level(None);
    assert_eq!(level, "INFO");
    assert!(fallback.is_none());
}

#[test]
fn status_model_backend_parses_known_values_case_insensitively() {
    assert_eq!(StatusModelBackend::parse("Mock").unwrap(), StatusModelBackend::Mock);
    assert_eq!(StatusModelBackend::parse("OPENAI").unwrap(), StatusModelBackend::OpenAi);
}

#[test]
fn status_model_backend_rejects_unknown_values() {
    assert!(StatusModelBackend::parse("anthropic").is_err());
}

fn base_config() -> ServiceConfig {
    ServiceConfig {
        database_url: None,
        server: ServerConfig::default(),
        log_level: "INFO".to_string(),
        log_level_fallback_from: None,
        github_token: None,
        status_model_backend: None,
        openai: OpenAiStatusModelConfig::default(),
        reporting_window_days: 7,
        report_sink_path: None,
    }
}

#[test]
fn validate_accepts_health_only_configuration() {
    assert!(base_config().validate().is_ok());
}

#[test]
fn validate_requires_a_status_model_backend_when_database_is_configured() {
    let mut config = base_config();
    config.database_url = Some("postgres://localhost/ghillie".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn validate_accepts_database_plus_mock_backend() {
    let mut config = base_config();
    config.database_url = Some("postgres://localhost/ghillie".to_string());
    config.status_model_backend = Some(StatusModelBackend::Mock);
    assert!(config.validate().is_ok());
}

#[test]
fn validate_rejects_openai_backend_without_an_api_key() {
    let mut config = base_config();
    config.status_model_backend = Some(StatusModelBackend::OpenAi);
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_a_non_positive_reporting_window() {
    let mut config = base_config();
    config.reporting_window_days = 0;
    assert!(config.validate().is_err());
}
