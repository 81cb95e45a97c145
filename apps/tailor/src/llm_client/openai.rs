//! Remote backend: any OpenAI-compatible `/chat/completions` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::{
    error_excerpt, BackendConfig, LlmBackend, LlmError, Prompt, TEMPERATURE,
};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Clone, Default)]
pub struct OpenAiBackend {
    client: Client,
}

impl OpenAiBackend {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, prompt: &Prompt, config: &BackendConfig) -> Result<String, LlmError> {
        config.check()?;
        let api_key = config.api_key.as_deref().unwrap_or_default();

        let url = format!("{}/chat/completions", config.base_url());
        let body = ChatRequest {
            model: &config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: TEMPERATURE,
        };

        debug!(url = %url, model = %config.model, prompt_chars = prompt.len(), "Calling chat completions");

        let response = self
            .client
            .post(&url)
            .timeout(config.timeout)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_excerpt(response).await;
            warn!(status = status.as_u16(), message = %message, "Chat completions returned an error");
            return Err(LlmError::BackendUnavailable(format!(
                "chat completions returned {status}: {message}"
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completions call succeeded"
            );
        }

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            LlmError::BackendUnavailable("chat completions returned no choices".to_string())
        })?;
        Ok(choice.message.content.unwrap_or_default())
    }
}
