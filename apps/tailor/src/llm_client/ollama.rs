//! Local backend: Ollama's `/api/generate` endpoint, non-streaming.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::{
    error_excerpt, BackendConfig, LlmBackend, LlmError, Prompt, TEMPERATURE,
};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Clone, Default)]
pub struct OllamaBackend {
    client: Client,
}

impl OllamaBackend {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate(&self, prompt: &Prompt, config: &BackendConfig) -> Result<String, LlmError> {
        config.check()?;

        let url = format!("{}/api/generate", config.base_url());
        let body = GenerateRequest {
            model: &config.model,
            system: &prompt.system,
            prompt: &prompt.user,
            stream: false,
            options: GenerateOptions {
                temperature: TEMPERATURE,
            },
        };

        debug!(url = %url, model = %config.model, prompt_chars = prompt.len(), "Calling Ollama");

        let response = self
            .client
            .post(&url)
            .timeout(config.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_excerpt(response).await;
            warn!(status = status.as_u16(), message = %message, "Ollama returned an error");
            return Err(LlmError::BackendUnavailable(format!(
                "Ollama returned {status}: {message}"
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        debug!(
            response_chars = parsed.response.len(),
            eval_count = ?parsed.eval_count,
            "Ollama call succeeded"
        );
        Ok(parsed.response)
    }
}
