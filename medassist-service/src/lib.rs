pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::config::MedAssistConfig;
use crate::services::{
    AiGateway, HospitalDirectory, HospitalStore, JwtService, ProfileService, UserStore,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::profile::get_profile,
        handlers::profile::update_profile,
        handlers::profile::update_health,
        handlers::profile::change_password,
        handlers::symptoms::analyze,
        handlers::emergency::chat,
        handlers::metrics::metrics,
        health_check,
    ),
    components(
        schemas(
            dtos::MessageResponse,
            dtos::auth::RegisterRequest,
            dtos::auth::LoginRequest,
            dtos::auth::LoginResponse,
            dtos::profile::UpdateProfileRequest,
            dtos::profile::UpdateHealthRequest,
            dtos::profile::ChangePasswordRequest,
            dtos::assistant::SymptomRequest,
            dtos::assistant::SymptomResponse,
            dtos::assistant::EmergencyRequest,
            dtos::assistant::EmergencyResponse,
            models::UserView,
            models::HospitalView,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Profile", description = "The caller's own profile"),
        (name = "Assistant", description = "Symptom checker and emergency chat"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: MedAssistConfig,
    pub jwt: JwtService,
    pub users: Arc<dyn UserStore>,
    pub profiles: ProfileService,
    pub hospitals: HospitalDirectory,
    pub assistant: AiGateway,
}

impl AppState {
    pub fn new(
        config: MedAssistConfig,
        users: Arc<dyn UserStore>,
        hospitals: Arc<dyn HospitalStore>,
        assistant: AiGateway,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt);

        Self {
            profiles: ProfileService::new(users.clone(), jwt.clone()),
            hospitals: HospitalDirectory::new(hospitals),
            config,
            jwt,
            users,
            assistant,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route("/api/profile/health", put(handlers::profile::update_health))
        .route(
            "/api/change-password",
            put(handlers::profile::change_password),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route("/api/register", post(handlers::auth::register))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/symptoms/analyze", post(handlers::symptoms::analyze))
        .route("/api/emergency/chat", post(handlers::emergency::chat))
        .merge(protected)
        .with_state(state.clone())
        .layer(from_fn(middleware::request_log_middleware))
        // Add metrics middleware
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config.security.allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed_origins.iter().filter_map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| tracing::error!("Invalid CORS origin '{}': {}", o, e))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Service health check
///
/// Always 200; `db` reports whether the store answered and `gemini` whether an AI
/// provider is configured.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status")
    ),
    tag = "Observability"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db = match state.users.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            "unavailable"
        }
    };

    Json(serde_json::json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "db": db,
        "gemini": state.assistant.is_configured(),
    }))
}
