//! Tailoring Orchestrator: generate → parse → validate, with two-tier fallback.
//!
//! Flow, profile track first when a profile is present:
//!   profile: generate from profile text → parse → validate against the profile
//!            any failure degrades to the base track (never straight to fallback)
//!   base:    generate from the base record → parse → validate against its facts
//!            any failure returns the base record untouched
//!
//! Every invocation ends in exactly one of `ModelFromProfile`, `ModelFromBase`,
//! `BaseFallback`. Errors never reach the caller; `warnings` records why a
//! track was abandoned.
//!
//! Dropping the future while it awaits the model abandons the invocation.
//! Parsing and validation are synchronous and always run to completion.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::{backend_for, BackendConfig, LlmBackend};
use crate::models::content::{ContentRecord, TrustedInput};
use crate::tailoring::adapter::{generate, system_instructions};
use crate::tailoring::facts::{FactSource, FactStore};
use crate::tailoring::parser::parse;
use crate::tailoring::prompts::{BASE_CONTENT_LABEL, PROFILE_CONTENT_LABEL};
use crate::tailoring::validator::{validate, ValidationResult};

pub const WARN_LLM_UNAVAILABLE: &str = "llm_unavailable";
pub const WARN_PARSE_ERROR: &str = "parse_error";
pub const WARN_VALIDATION_FAILED: &str = "validation_failed";
pub const WARN_EMPTY_BASE: &str = "empty_base";
pub const WARN_SERIALIZE_ERROR: &str = "serialize_error";
pub const WARN_EMPTY_OUTPUT: &str = "empty_output";

/// Which content the final record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TailoringSource {
    ModelFromProfile,
    ModelFromBase,
    BaseFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoringResult {
    pub record: ContentRecord,
    pub source: TailoringSource,
    /// Empty when the model output was accepted on the first track tried.
    pub warnings: Vec<String>,
}

impl TailoringResult {
    fn fallback(base: &ContentRecord, warnings: Vec<String>) -> Self {
        Self {
            record: base.clone(),
            source: TailoringSource::BaseFallback,
            warnings,
        }
    }
}

/// Outcome of one generate → parse → validate pass.
enum Attempt {
    Accepted(ContentRecord),
    Unavailable,
    Unparseable,
    /// Parsed and valid, but carries nothing that would render.
    Empty,
    Rejected(ValidationResult),
}

/// Tailors trusted content with one configured backend.
///
/// Holds no per-invocation state: one instance may serve many concurrent
/// invocations.
#[derive(Clone)]
pub struct Tailor {
    backend: Arc<dyn LlmBackend>,
    config: BackendConfig,
    system: String,
}

impl Tailor {
    /// Picks the backend implementation from `config.kind`.
    pub fn from_config(config: BackendConfig) -> Self {
        Self::with_backend(backend_for(config.kind), config)
    }

    pub fn with_backend(backend: Arc<dyn LlmBackend>, config: BackendConfig) -> Self {
        Self {
            backend,
            config,
            system: system_instructions(),
        }
    }

    /// Tailors `input` to `job_description`. A blank job description asks for
    /// a polish of the trusted content instead.
    pub async fn tailor(&self, input: &TrustedInput, job_description: &str) -> TailoringResult {
        let mut warnings = Vec::new();

        if let Some(profile) = input.usable_profile() {
            let store = FactStore::build(FactSource::Profile(profile));
            match self
                .attempt(PROFILE_CONTENT_LABEL, profile.as_str(), &store, job_description)
                .await
            {
                Attempt::Accepted(record) => {
                    info!(backend = self.backend.name(), "Tailored from profile");
                    return TailoringResult {
                        record,
                        source: TailoringSource::ModelFromProfile,
                        warnings,
                    };
                }
                Attempt::Unavailable => warnings.push(WARN_LLM_UNAVAILABLE.to_string()),
                Attempt::Unparseable => warnings.push(WARN_PARSE_ERROR.to_string()),
                Attempt::Empty => warnings.push(WARN_EMPTY_OUTPUT.to_string()),
                Attempt::Rejected(result) => {
                    warnings.push(format!("{WARN_VALIDATION_FAILED}:{}", result.describe()))
                }
            }
            warn!(warnings = ?warnings, "Profile track failed; degrading to base content");
        }

        self.tailor_base(&input.base, job_description, warnings).await
    }

    async fn tailor_base(
        &self,
        base: &ContentRecord,
        job_description: &str,
        mut warnings: Vec<String>,
    ) -> TailoringResult {
        if base.is_empty() {
            warn!("Base content is empty; returning it as-is");
            warnings.push(WARN_EMPTY_BASE.to_string());
            return TailoringResult::fallback(base, warnings);
        }

        let base_yaml = match base.to_yaml() {
            Ok(yaml) => yaml,
            Err(e) => {
                warn!(error = %e, "Could not serialize base content; using it untailored");
                warnings.push(WARN_SERIALIZE_ERROR.to_string());
                return TailoringResult::fallback(base, warnings);
            }
        };

        let store = FactStore::build(FactSource::Record(base));
        match self
            .attempt(BASE_CONTENT_LABEL, &base_yaml, &store, job_description)
            .await
        {
            Attempt::Accepted(record) => {
                info!(backend = self.backend.name(), "Tailored from base content");
                TailoringResult {
                    record,
                    source: TailoringSource::ModelFromBase,
                    warnings,
                }
            }
            Attempt::Unavailable => {
                warnings.push(WARN_LLM_UNAVAILABLE.to_string());
                TailoringResult::fallback(base, warnings)
            }
            Attempt::Unparseable => {
                warnings.push(WARN_PARSE_ERROR.to_string());
                TailoringResult::fallback(base, warnings)
            }
            Attempt::Empty => {
                warnings.push(WARN_EMPTY_OUTPUT.to_string());
                TailoringResult::fallback(base, warnings)
            }
            Attempt::Rejected(_) => {
                warnings.push(WARN_VALIDATION_FAILED.to_string());
                TailoringResult::fallback(base, warnings)
            }
        }
    }

    async fn attempt(
        &self,
        label: &str,
        trusted_content: &str,
        store: &FactStore,
        job_description: &str,
    ) -> Attempt {
        let raw = match generate(
            &self.system,
            label,
            trusted_content,
            job_description,
            self.backend.as_ref(),
            &self.config,
        )
        .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "LLM call failed; using fallback");
                return Attempt::Unavailable;
            }
        };

        let candidate = match parse(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, raw_chars = e.raw.len(), "Could not parse LLM output; using fallback");
                return Attempt::Unparseable;
            }
        };

        // Both tracks only run on non-empty trusted content, so an empty
        // record always means the model dropped everything.
        if candidate.is_empty() {
            warn!(raw_chars = raw.len(), "LLM returned empty content; using fallback");
            return Attempt::Empty;
        }

        let result = validate(&candidate, store);
        if result.ok {
            Attempt::Accepted(candidate)
        } else {
            warn!(
                violations = %result.describe(),
                "Tailored content introduced new facts; using fallback"
            );
            Attempt::Rejected(result)
        }
    }
}

/// One-shot tailoring with the backend selected by `config`.
pub async fn tailor(
    input: &TrustedInput,
    job_description: &str,
    config: &BackendConfig,
) -> TailoringResult {
    Tailor::from_config(config.clone())
        .tailor(input, job_description)
        .await
}
