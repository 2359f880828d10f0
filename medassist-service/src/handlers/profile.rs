//! Profile endpoints. All of them sit behind `auth_middleware`.

use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::{
        profile::{ChangePasswordRequest, UpdateHealthRequest, UpdateProfileRequest},
        MessageResponse,
    },
    middleware::AuthUser,
    models::UserView,
    utils::JsonBody,
    AppState,
};

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Current profile", body = UserView),
        (status = 401, description = "Missing or expired token", body = MessageResponse),
        (status = 422, description = "Invalid token", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    tag = "Profile",
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserView>, AppError> {
    Ok(Json(state.profiles.get_profile(user.user_id).await?))
}

/// Update personal details
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserView),
        (status = 400, description = "Invalid age", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    tag = "Profile",
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<UserView>, AppError> {
    Ok(Json(state.profiles.update_profile(user.user_id, req).await?))
}

/// Update blood group and blood pressure
#[utoipa::path(
    put,
    path = "/api/profile/health",
    request_body = UpdateHealthRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserView),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    tag = "Profile",
    security(("bearer_auth" = []))
)]
pub async fn update_health(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<UpdateHealthRequest>,
) -> Result<Json<UserView>, AppError> {
    Ok(Json(state.profiles.update_health(user.user_id, req).await?))
}

/// Change password
#[utoipa::path(
    put,
    path = "/api/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Missing fields", body = MessageResponse),
        (status = 401, description = "Old password incorrect", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    tag = "Profile",
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.profiles.change_password(user.user_id, req).await?;

    Ok(Json(MessageResponse::new("Password changed")))
}
