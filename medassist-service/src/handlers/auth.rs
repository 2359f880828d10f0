//! Registration and login.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        non_empty, MessageResponse,
    },
    utils::{JsonBody, Password},
    AppState,
};

fn credentials_required() -> AppError {
    AppError::BadRequest(anyhow::anyhow!("Email and password required"))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Missing fields or user already exists", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(email), Some(password)) = (non_empty(req.email), non_empty(req.password)) else {
        return Err(credentials_required());
    };

    state
        .profiles
        .register(email, Password::new(password), req.name, req.contact)
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("User registered"))))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(email), Some(password)) = (non_empty(req.email), non_empty(req.password)) else {
        return Err(credentials_required());
    };

    let access_token = state
        .profiles
        .login(&email, Password::new(password))
        .await?;

    Ok((StatusCode::OK, Json(LoginResponse { access_token })))
}
