//! Axum route handlers for the Tailoring API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::content::{ContentRecord, ProfileText, TrustedInput};
use crate::render::render_sections;
use crate::state::AppState;
use crate::tailoring::facts::{FactSource, FactStore};
use crate::tailoring::orchestrator::TailoringResult;
use crate::tailoring::validator::{validate, ValidationResult};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TailorRequest {
    pub content: ContentRecord,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct TailorResponse {
    #[serde(flatten)]
    pub result: TailoringResult,
    pub latex: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateRequest {
    pub candidate: ContentRecord,
    #[serde(default)]
    pub content: Option<ContentRecord>,
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderRequest {
    pub content: ContentRecord,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub latex: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tailor
///
/// Tailors the posted content to the job description and renders the result.
/// Always answers 200 for a well-formed request: model failures show up as
/// `BASE_FALLBACK` with warnings, not as errors.
pub async fn handle_tailor(
    State(state): State<AppState>,
    payload: Result<Json<TailorRequest>, JsonRejection>,
) -> Result<Json<TailorResponse>, AppError> {
    let Json(request) = payload?;

    let mut input = TrustedInput::from_base(request.content);
    if let Some(profile) = request.profile {
        input = input.with_profile(ProfileText::new(profile));
    }

    let span = info_span!("tailor_request", request_id = %Uuid::new_v4());
    let result = state
        .tailor
        .tailor(&input, &request.job_description)
        .instrument(span)
        .await;
    info!(source = ?result.source, warnings = result.warnings.len(), "Tailor request served");

    let latex = render_sections(&result.record);
    Ok(Json(TailorResponse { result, latex }))
}

/// POST /api/v1/validate
///
/// Checks a candidate against exactly one trusted source: a base record
/// (`content`) or profile text (`profile`).
pub async fn handle_validate(
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidationResult>, AppError> {
    let Json(request) = payload?;

    let store = match (&request.content, &request.profile) {
        (Some(content), None) => FactStore::build(FactSource::Record(content)),
        (None, Some(profile)) => {
            let profile = ProfileText::new(profile.as_str());
            FactStore::build(FactSource::Profile(&profile))
        }
        _ => {
            return Err(AppError::Validation(
                "exactly one of content or profile is required".to_string(),
            ))
        }
    };

    Ok(Json(validate(&request.candidate, &store)))
}

/// POST /api/v1/render
///
/// Renders content to LaTeX section markup without calling a model.
pub async fn handle_render(
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<RenderResponse>, AppError> {
    let Json(request) = payload?;
    Ok(Json(RenderResponse {
        latex: render_sections(&request.content),
    }))
}
