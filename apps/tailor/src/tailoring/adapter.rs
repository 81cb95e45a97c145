//! Generation Adapter: builds the tailoring prompt and makes one model call.

use tracing::debug;

use crate::llm_client::prompts::{CONTENT_SCHEMA_INSTRUCTION, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::{BackendConfig, LlmBackend, LlmError, Prompt};
use crate::tailoring::prompts::{
    POLISH_PROMPT_TEMPLATE, TAILOR_PROMPT_TEMPLATE, TAILOR_SYSTEM_TEMPLATE,
};

/// System instructions shared by both tracks.
pub fn system_instructions() -> String {
    TAILOR_SYSTEM_TEMPLATE
        .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
        .replace("{schema}", CONTENT_SCHEMA_INSTRUCTION)
}

/// Embeds the trusted content and the job description verbatim.
///
/// A blank job description selects the polish-only template. The trusted
/// content is substituted last so nothing inside it is ever expanded.
pub fn build_prompt(
    system: &str,
    trusted_label: &str,
    trusted_content: &str,
    job_description: &str,
) -> Prompt {
    let user = if job_description.trim().is_empty() {
        POLISH_PROMPT_TEMPLATE
            .replace("{trusted_label}", trusted_label)
            .replace("{trusted_content}", trusted_content)
    } else {
        TAILOR_PROMPT_TEMPLATE
            .replace("{trusted_label}", trusted_label)
            .replace("{job_description}", job_description.trim())
            .replace("{trusted_content}", trusted_content)
    };
    Prompt {
        system: system.to_string(),
        user,
    }
}

/// Sends one tailoring request. No retry; the caller decides what a failure means.
pub async fn generate(
    system: &str,
    trusted_label: &str,
    trusted_content: &str,
    job_description: &str,
    backend: &dyn LlmBackend,
    config: &BackendConfig,
) -> Result<String, LlmError> {
    config.check()?;
    let prompt = build_prompt(system, trusted_label, trusted_content, job_description);
    debug!(
        backend = backend.name(),
        model = %config.model,
        system_chars = prompt.system.len(),
        user_chars = prompt.user.len(),
        "Sending tailoring prompt"
    );
    backend.generate(&prompt, config).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::tailoring::prompts::BASE_CONTENT_LABEL;

    #[test]
    fn test_system_instructions_forbid_invention_and_name_schema() {
        let system = system_instructions();
        assert!(system.contains("Do NOT invent job titles, companies, dates, technologies"));
        assert!(system.contains("summary, skills, experience, projects"));
        assert!(!system.contains("{no_fabrication}"));
        assert!(!system.contains("{schema}"));
    }

    #[test]
    fn test_build_prompt_embeds_content_and_job_verbatim() {
        let trusted = "experience:\n  - position: Engineer\n    organization: Acme\n";
        let jd = "We need a Rust engineer.\nRemote OK.";
        let prompt = build_prompt("sys", BASE_CONTENT_LABEL, trusted, jd);
        assert_eq!(prompt.system, "sys");
        assert!(prompt.user.contains(trusted));
        assert!(prompt.user.contains(jd));
        assert!(prompt.user.starts_with(BASE_CONTENT_LABEL));
        assert!(prompt.user.contains("Job description:"));
    }

    #[test]
    fn test_build_prompt_without_job_uses_polish_template() {
        let prompt = build_prompt("sys", BASE_CONTENT_LABEL, "summary: hi", "   ");
        assert!(prompt.user.contains("polished version"));
        assert!(!prompt.user.contains("Job description:"));
    }

    #[test]
    fn test_placeholders_inside_trusted_content_are_not_expanded() {
        let trusted = "summary: literally {job_description}";
        let prompt = build_prompt("sys", BASE_CONTENT_LABEL, trusted, "Rust role");
        assert!(prompt.user.contains(trusted));
    }

    struct RecordingBackend {
        seen: Mutex<Vec<Prompt>>,
    }

    #[async_trait]
    impl LlmBackend for RecordingBackend {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn generate(
            &self,
            prompt: &Prompt,
            _config: &BackendConfig,
        ) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(prompt.clone());
            Ok("summary: done".to_string())
        }
    }

    #[tokio::test]
    async fn test_generate_sends_one_prompt() {
        let backend = RecordingBackend {
            seen: Mutex::new(Vec::new()),
        };
        let config = BackendConfig::local("llama3.2", "http://localhost:11434");
        let text = generate("sys", BASE_CONTENT_LABEL, "summary: hi", "jd", &backend, &config)
            .await
            .unwrap();
        assert_eq!(text, "summary: done");
        assert_eq!(backend.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_rejects_bad_config_before_calling_backend() {
        let backend = RecordingBackend {
            seen: Mutex::new(Vec::new()),
        };
        let config = BackendConfig::remote("gpt-4o-mini", "https://api.openai.com/v1", None);
        let err = generate("sys", BASE_CONTENT_LABEL, "summary: hi", "jd", &backend, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Config(_)));
        assert!(backend.seen.lock().unwrap().is_empty());
    }
}
