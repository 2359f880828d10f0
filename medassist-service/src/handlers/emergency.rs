use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::{
    dtos::{
        assistant::{EmergencyRequest, EmergencyResponse},
        non_empty, MessageResponse,
    },
    utils::JsonBody,
    AppState,
};

/// Emergency chat.
///
/// Always answers 200 with some guidance text and the full hospital list, even when
/// the AI provider is missing or failing.
#[utoipa::path(
    post,
    path = "/api/emergency/chat",
    request_body = EmergencyRequest,
    responses(
        (status = 200, description = "Guidance and nearby hospitals", body = EmergencyResponse),
        (status = 400, description = "Message required", body = MessageResponse)
    ),
    tag = "Assistant"
)]
pub async fn chat(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<EmergencyRequest>,
) -> Result<Json<EmergencyResponse>, AppError> {
    let message = non_empty(req.message)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Message required")))?;

    let text = state.assistant.emergency_reply(&message).await;
    let hospitals = state.hospitals.list_all().await?;

    Ok(Json(EmergencyResponse { text, hospitals }))
}
