use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::{services::TokenError, AppState};

/// Identity resolved from a valid bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Middleware to require a valid access token.
///
/// Missing header: 401. Expired token: 401. Anything else wrong with the token: 422.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Authorization token is missing")))?;

    let claims = state.jwt.validate_access_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected access token");
        match e {
            TokenError::Expired => AppError::Unauthorized(anyhow::anyhow!("Token has expired")),
            TokenError::Invalid(detail) => {
                AppError::Unprocessable(anyhow::anyhow!("Invalid token: {}", detail))
            }
        }
    })?;

    let user_id = claims.user_id().map_err(|e| AppError::Unprocessable(anyhow::anyhow!(e)))?;

    req.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(req).await)
}

/// Extractor to get the authenticated user in handlers behind `auth_middleware`.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().copied().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Auth user missing from request extensions"))
        })
    }
}
