//! Status model backed by an OpenAI-compatible chat completions
//! endpoint. The network transport itself is out of scope for testing
//! (no live calls are exercised here); the adapter exists to the
//! documented protocol so a deployment can swap in a real credential.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::evidence::RepositoryEvidenceBundle;

use super::protocol::{
    ModelInvocationMetrics, RepositoryStatusResult, StatusModel, StatusModelError,
};

pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct OpenAiStatusModelConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl OpenAiStatusModelConfig {
    pub fn validate(&self) -> Result<(), StatusModelError> {
        if self.api_key.trim().is_empty() {
            return Err(StatusModelError::Config {
                message: "api_key must not be empty".into(),
            });
        }
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(StatusModelError::Config {
                message: format!(
                    "temperature {} must be between {MIN_TEMPERATURE} and {MAX_TEMPERATURE}",
                    self.temperature
                ),
            });
        }
        if self.max_tokens == 0 {
            return Err(StatusModelError::Config {
                message: "max_tokens must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl Default for OpenAiStatusModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
            timeout: Duration::from_secs(120),
            temperature: 0.2,
            max_tokens: 800,
        }
    }
}

pub struct OpenAiStatusModel {
    config: OpenAiStatusModelConfig,
    client: reqwest::Client,
    last_metrics: Mutex<Option<ModelInvocationMetrics>>,
}

impl OpenAiStatusModel {
    pub fn new(config: OpenAiStatusModelConfig) -> Result<Self, StatusModelError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StatusModelError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            config,
            client,
            last_metrics: Mutex::new(None),
        })
    }

    fn build_prompt(evidence: &RepositoryEvidenceBundle) -> String {
        format!(
            "Summarise recent activity for {} between {} and {}. \
             {} commits, {} pull requests, {} issues, {} documentation changes. \
             Respond with a JSON object: status, summary, highlights, risks, next_steps.",
            evidence.repository.slug(),
            evidence.window_start.to_rfc3339(),
            evidence.window_end.to_rfc3339(),
            evidence.commits.len(),
            evidence.pull_requests.len(),
            evidence.issues.len(),
            evidence.documentation_changes.len(),
        )
    }
}

#[async_trait]
impl StatusModel for OpenAiStatusModel {
    async fn summarize_repository(
        &self,
        evidence: &RepositoryEvidenceBundle,
    ) -> Result<RepositoryStatusResult, StatusModelError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: Self::build_prompt(evidence),
            }],
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StatusModelError::Timeout
                } else {
                    StatusModelError::Http { status: 0 }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            return Err(StatusModelError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(StatusModelError::Http {
                status: status.as_u16(),
            });
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            StatusModelError::SchemaDrift {
                message: format!("response body did not parse: {e}"),
            }
        })?;

        let content = body
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| StatusModelError::SchemaDrift {
                message: "no choices in chat completion response".into(),
            })?;

        let result: RepositoryStatusResult =
            serde_json::from_str(&content).map_err(|e| StatusModelError::SchemaDrift {
                message: format!("model content was not the expected JSON shape: {e}"),
            })?;

        let mut metrics = self.last_metrics.lock().await;
        *metrics = Some(ModelInvocationMetrics {
            prompt_tokens: body.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: body.usage.as_ref().map(|u| u.completion_tokens),
            latency_ms: Some(started.elapsed().as_millis() as u64),
        });

        Ok(result)
    }

    fn last_invocation_metrics(&self) -> Option<ModelInvocationMetrics> {
        self.last_metrics.try_lock().ok().and_then(|g| g.clone())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f64,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
