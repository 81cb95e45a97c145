//! LLM Client: the only place that talks to a model host.
//!
//! Two hosts are supported behind one trait: a local Ollama server and a remote
//! OpenAI-compatible chat completions API. The host is picked once from
//! `BackendConfig::kind`; callers never branch on it.
//!
//! One request per call, no retries. The timeout comes from the config and a
//! timeout is reported exactly like a connection failure.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod ollama;
pub mod openai;
pub mod prompts;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LOCAL_MODEL: &str = "llama3.2";
pub const DEFAULT_REMOTE_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Sampling temperature for rewriting. Low: the model should rephrase, not invent.
pub(crate) const TEMPERATURE: f32 = 0.3;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection error, timeout, non-success status or an undecodable body.
    #[error("LLM backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The selected backend is missing a credential, a model or an endpoint.
    #[error("LLM configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::BackendUnavailable(format!("request timed out: {e}"))
        } else {
            LlmError::BackendUnavailable(e.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Ollama on the local machine or network.
    Local,
    /// OpenAI-compatible hosted API. Requires an API key.
    Remote,
}

impl FromStr for BackendKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "ollama" => Ok(BackendKind::Local),
            "remote" | "openai" => Ok(BackendKind::Remote),
            other => Err(LlmError::Config(format!(
                "unknown backend '{other}' (expected 'local' or 'remote')"
            ))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => f.write_str("local"),
            BackendKind::Remote => f.write_str("remote"),
        }
    }
}

/// Immutable settings for one backend. Built at the process boundary and
/// passed down; nothing below `main` reads the environment.
#[derive(Clone, PartialEq)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn local(model: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            kind: BackendKind::Local,
            model: model.into(),
            endpoint: endpoint.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn remote(
        model: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            kind: BackendKind::Remote,
            model: model.into(),
            endpoint: endpoint.into(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    /// Checks that the selected backend has what it needs to send a request.
    pub fn check(&self) -> Result<(), LlmError> {
        if self.model.trim().is_empty() {
            return Err(LlmError::Config(format!(
                "no model selected for the {} backend",
                self.kind
            )));
        }
        if self.endpoint.trim().is_empty() {
            return Err(LlmError::Config(format!(
                "no endpoint configured for the {} backend",
                self.kind
            )));
        }
        if self.kind == BackendKind::Remote
            && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(LlmError::Config(
                "the remote backend requires an API key (OPENAI_API_KEY)".to_string(),
            ));
        }
        Ok(())
    }
}

// The key must never reach a log line.
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A rendered prompt: system instructions plus the user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }
}

/// A model host. Implementations send exactly one request per call.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &Prompt, config: &BackendConfig) -> Result<String, LlmError>;
}

/// The backend implementation for a configured kind.
pub fn backend_for(kind: BackendKind) -> Arc<dyn LlmBackend> {
    match kind {
        BackendKind::Local => Arc::new(OllamaBackend::new()),
        BackendKind::Remote => Arc::new(OpenAiBackend::new()),
    }
}

/// Reads an error body, keeping it short enough for a log line.
pub(crate) async fn error_excerpt(response: reqwest::Response) -> String {
    const MAX_CHARS: usize = 300;
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message())
        .unwrap_or(body);
    message.chars().take(MAX_CHARS).collect()
}

/// `{"error": "..."}` (Ollama) or `{"error": {"message": "..."}}` (OpenAI).
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Text(String),
    Object { message: String },
}

impl ApiErrorBody {
    fn message(self) -> String {
        match self {
            ApiErrorBody::Text(message) | ApiErrorBody::Object { message } => message,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// A local port with nothing listening on it.
    pub async fn closed_port_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }
}
