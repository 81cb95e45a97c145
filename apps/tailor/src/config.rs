use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{
    BackendConfig, BackendKind, DEFAULT_LOCAL_MODEL, DEFAULT_OLLAMA_HOST, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_REMOTE_MODEL, DEFAULT_TIMEOUT,
};

/// Application configuration loaded from environment variables.
///
/// Nothing is required at startup: a missing API key only matters once the
/// remote backend is asked to generate, and then it surfaces as a fallback.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub backend: BackendKind,
    /// `None` means the default model for `backend`.
    pub model: Option<String>,
    pub ollama_host: String,
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub llm_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("RESUME_LLM_BACKEND") {
            Some(value) => value
                .parse::<BackendKind>()
                .context("RESUME_LLM_BACKEND must be 'local' or 'remote'")?,
            None => BackendKind::Local,
        };
        let llm_timeout = match get("RESUME_LLM_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(
                value
                    .trim()
                    .parse::<u64>()
                    .context("RESUME_LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Config {
            backend,
            model: get("RESUME_LLM_MODEL"),
            ollama_host: get("OLLAMA_HOST").unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string()),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_api_key: get("OPENAI_API_KEY"),
            llm_timeout,
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(mut self, backend: Option<BackendKind>, model: Option<String>) -> Self {
        if let Some(backend) = backend {
            if backend != self.backend {
                // A model named for one host rarely exists on the other.
                self.model = None;
            }
            self.backend = backend;
        }
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.model = Some(model);
        }
        self
    }

    pub fn model_name(&self) -> &str {
        match (&self.model, self.backend) {
            (Some(model), _) => model.as_str(),
            (None, BackendKind::Local) => DEFAULT_LOCAL_MODEL,
            (None, BackendKind::Remote) => DEFAULT_REMOTE_MODEL,
        }
    }

    pub fn backend_config(&self) -> BackendConfig {
        let config = match self.backend {
            BackendKind::Local => BackendConfig::local(self.model_name(), &self.ollama_host),
            BackendKind::Remote => BackendConfig::remote(
                self.model_name(),
                &self.openai_base_url,
                self.openai_api_key.clone(),
            ),
        };
        config.with_timeout(self.llm_timeout)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("backend", &self.backend)
            .field("model", &self.model_name())
            .field("ollama_host", &self.ollama_host)
            .field("openai_base_url", &self.openai_base_url)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("llm_timeout", &self.llm_timeout)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.model_name(), DEFAULT_LOCAL_MODEL);
        assert_eq!(config.ollama_host, DEFAULT_OLLAMA_HOST);
        assert_eq!(config.llm_timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.openai_api_key, None);
    }

    #[test]
    fn test_remote_backend_from_env() {
        let config = config_from(&[
            ("RESUME_LLM_BACKEND", "remote"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "https://llm.internal/v1"),
            ("RESUME_LLM_TIMEOUT_SECS", "30"),
        ])
        .unwrap();

        let backend = config.backend_config();
        assert_eq!(backend.kind, BackendKind::Remote);
        assert_eq!(backend.model, DEFAULT_REMOTE_MODEL);
        assert_eq!(backend.endpoint, "https://llm.internal/v1");
        assert_eq!(backend.api_key.as_deref(), Some("sk-test"));
        assert_eq!(backend.timeout, Duration::from_secs(30));
        assert!(backend.check().is_ok());
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = config_from(&[("RESUME_LLM_MODEL", "  "), ("OPENAI_API_KEY", "")]).unwrap();
        assert_eq!(config.model, None);
        assert_eq!(config.openai_api_key, None);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config_from(&[("RESUME_LLM_BACKEND", "cloud")]).is_err());
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("RESUME_LLM_TIMEOUT_SECS", "-1")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[("RESUME_LLM_MODEL", "mistral")]).unwrap();
        assert_eq!(config.model_name(), "mistral");

        let same_backend = config
            .clone()
            .with_overrides(Some(BackendKind::Local), None);
        assert_eq!(same_backend.model_name(), "mistral");

        let switched = config.clone().with_overrides(Some(BackendKind::Remote), None);
        assert_eq!(switched.model_name(), DEFAULT_REMOTE_MODEL);

        let explicit = config.with_overrides(None, Some("qwen2.5".to_string()));
        assert_eq!(explicit.model_name(), "qwen2.5");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
