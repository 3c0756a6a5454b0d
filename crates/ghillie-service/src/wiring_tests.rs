use super::*;
use crate::config::ServiceConfig;
use ghillie_api::config::ServerConfig;
use ghillie_core::status::OpenAiStatusModelConfig;

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
fn build_status_model_defaults_to_mock_when_backend_is_unset() {
    let model = build_status_model(&base_config()).unwrap();
    assert_eq!(model.model_name(), "mock");
}

#[test]
fn build_status_model_rejects_openai_without_an_api_key() {
    let mut config = base_config();
    config.status_model_backend = Some(StatusModelBackend::OpenAi);
    assert!(build_status_model(&config).is_err());
}

#[tokio::test]
async fn run_ingest_without_a_database_url_is_a_configuration_error() {
    let result = run_ingest(&base_config(), None).await;
    assert!(matches!(result, Err(ServiceError::Configuration(_))));
}

#[tokio::test]
async fn run_report_without_a_database_url_is_a_configuration_error() {
    let result = run_report(&base_config(), "acme/widgets").await;
    assert!(matches!(result, Err(ServiceError::Configuration(_))));
}

#[tokio::test]
async fn run_report_rejects_a_malformed_repository_slug() {
    let mut config = base_config();
    config.database_url = Some("postgres://localhost/ghillie".to_string());
    let result = run_report(&config, "not-a-slug").await;
    assert!(matches!(
        result,
        Err(ServiceError::MalformedRepositorySlug { .. })
    ));
}
