//! Shared setup for medassist-service integration tests.
//!
//! The router runs over `MemoryStore` and an optional `MockTextProvider`, so no
//! database or network access is needed.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use medassist_service::{
    build_router,
    config::{
        DatabaseConfig, Environment, GeminiSettings, JwtConfig, MedAssistConfig, SecurityConfig,
        SessionConfig,
    },
    services::{
        providers::{MockTextProvider, TextProvider},
        AiGateway, MemoryStore,
    },
    AppState,
};
use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

pub fn test_config() -> MedAssistConfig {
    MedAssistConfig {
        common: Config { port: 5000 },
        environment: Environment::Dev,
        service_name: "medassist-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: Secret::new("postgres://unused".to_string()),
            max_connections: 1,
            min_connections: 0,
        },
        jwt: JwtConfig {
            secret: Secret::new(TEST_JWT_SECRET.to_string()),
            access_token_expiry_days: 30,
        },
        session: SessionConfig {
            secret: Secret::new("test-session-secret".to_string()),
        },
        gemini: GeminiSettings {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["*".to_string()],
        },
    }
}

/// Test application: the router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub provider: Option<Arc<MockTextProvider>>,
}

impl TestApp {
    /// App without an AI provider.
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// App whose AI provider answers every prompt with `reply`.
    pub async fn with_reply(reply: &str) -> Self {
        Self::build(Some(Arc::new(MockTextProvider::replying(reply)))).await
    }

    /// App whose AI provider fails every call.
    pub async fn with_failing_provider() -> Self {
        Self::build(Some(Arc::new(MockTextProvider::failing()))).await
    }

    async fn build(provider: Option<Arc<MockTextProvider>>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = match &provider {
            Some(p) => {
                let p: Arc<dyn TextProvider> = p.clone();
                AiGateway::new(Some(p))
            }
            None => AiGateway::disabled(),
        };

        let state = AppState::new(test_config(), store.clone(), store, gateway);
        state
            .hospitals
            .seed_if_empty()
            .await
            .expect("seed hospitals");

        Self {
            router: build_router(state.clone()),
            state,
            provider,
        }
    }

    /// Send a request and return status plus parsed JSON body (`Null` when empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).expect("request")).await
    }

    /// Send a prepared request.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Register `email`/`password` and return an access token.
    pub async fn register_and_login(&self, email: &str, password: &str) -> String {
        let credentials = serde_json::json!({ "email": email, "password": password });

        let (status, _) = self
            .request(Method::POST, "/api/register", Some(credentials.clone()), None)
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .request(Method::POST, "/api/login", Some(credentials), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"]
            .as_str()
            .expect("access_token")
            .to_string()
    }
}
