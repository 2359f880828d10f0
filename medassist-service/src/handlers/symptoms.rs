use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::{
    dtos::{
        assistant::{SymptomRequest, SymptomResponse},
        non_empty, MessageResponse,
    },
    services::{Assistant, GatewayError},
    utils::JsonBody,
    AppState,
};

/// Analyze free-text symptoms.
///
/// Fails closed: without a configured provider every call answers 503, even one with an
/// empty body. A provider failure is a 500 with a generic message.
#[utoipa::path(
    post,
    path = "/api/symptoms/analyze",
    request_body = SymptomRequest,
    responses(
        (status = 200, description = "Model reply", body = SymptomResponse),
        (status = 400, description = "Symptom text is required", body = MessageResponse),
        (status = 500, description = "Provider failure", body = MessageResponse),
        (status = 503, description = "AI not configured", body = MessageResponse)
    ),
    tag = "Assistant"
)]
pub async fn analyze(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SymptomRequest>,
) -> Result<Json<SymptomResponse>, AppError> {
    if !state.assistant.is_configured() {
        return Err(AppError::ServiceUnavailable(
            "Gemini service not available".to_string(),
        ));
    }

    let symptoms = non_empty(req.symptoms).ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("Symptom text is required"))
    })?;

    let reply = state
        .assistant
        .generate(Assistant::Symptoms, &symptoms)
        .await
        .map_err(|e| match e {
            GatewayError::NotConfigured => {
                AppError::ServiceUnavailable("Gemini service not available".to_string())
            }
            GatewayError::Provider(_) => AppError::Internal(
                "An internal error occurred while analyzing symptoms".to_string(),
            ),
        })?;

    Ok(Json(SymptomResponse { reply }))
}
