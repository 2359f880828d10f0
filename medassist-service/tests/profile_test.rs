mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new().await;
    let (status, json) = app.request(Method::GET, "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["msg"], "Authorization token is missing");
}

#[tokio::test]
async fn test_non_bearer_header_counts_as_missing() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/api/profile")
        .header(header::AUTHORIZATION, "Basic YTpi")
        .body(Body::empty())
        .expect("request");

    let (status, json) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["msg"], "Authorization token is missing");
}

#[tokio::test]
async fn test_malformed_token_is_unprocessable() {
    let app = TestApp::new().await;
    let (status, json) = app
        .request(Method::GET, "/api/profile", None, Some("not.a.jwt"))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["msg"]
        .as_str()
        .expect("msg")
        .starts_with("Invalid token: "));
}

#[tokio::test]
async fn test_expired_token_is_reported_as_expired() {
    let app = TestApp::new().await;
    app.register_and_login("a@b.com", "pw123").await;

    let expired = app
        .state
        .jwt
        .generate_access_token_at(1, Utc::now() - Duration::days(31))
        .expect("token");

    let (status, json) = app
        .request(Method::GET, "/api/profile", None, Some(&expired))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["msg"], "Token has expired");
}

#[tokio::test]
async fn test_token_for_unknown_user_is_not_found() {
    let app = TestApp::new().await;
    let token = app
        .state
        .jwt
        .generate_access_token(999)
        .expect("token");

    let (status, json) = app
        .request(Method::GET, "/api/profile", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["msg"], "User not found");
}

#[tokio::test]
async fn test_partial_update_touches_only_supplied_fields() {
    let app = TestApp::new().await;
    let token = app.register_and_login("a@b.com", "pw123").await;

    let (_, before) = app
        .request(
            Method::PUT,
            "/api/profile",
            Some(json!({ "age": 40, "gender": "F" })),
            Some(&token),
        )
        .await;

    let (status, first) = app
        .request(
            Method::PUT,
            "/api/profile",
            Some(json!({ "address": "X" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["address"], "X");

    let mut expected = before.clone();
    expected["address"] = json!("X");
    assert_eq!(first, expected);

    let (_, second) = app
        .request(
            Method::PUT,
            "/api/profile",
            Some(json!({ "address": "X" })),
            Some(&token),
        )
        .await;
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_empty_age_clears_and_bad_age_is_rejected() {
    let app = TestApp::new().await;
    let token = app.register_and_login("a@b.com", "pw123").await;

    let (_, profile) = app
        .request(
            Method::PUT,
            "/api/profile",
            Some(json!({ "age": "35" })),
            Some(&token),
        )
        .await;
    assert_eq!(profile["age"], 35);

    let (status, json) = app
        .request(
            Method::PUT,
            "/api/profile",
            Some(json!({ "age": "abc", "name": "Changed" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["msg"], "Invalid age");

    let (_, profile) = app
        .request(Method::GET, "/api/profile", None, Some(&token))
        .await;
    assert_eq!(profile["age"], 35);
    assert_eq!(profile["name"], "Guest");

    let (status, profile) = app
        .request(
            Method::PUT,
            "/api/profile",
            Some(json!({ "age": "" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(profile["age"].is_null());
}

#[tokio::test]
async fn test_present_keys_overwrite_even_when_empty() {
    let app = TestApp::new().await;
    let token = app.register_and_login("a@b.com", "pw123").await;

    let (status, profile) = app
        .request(
            Method::PUT,
            "/api/profile",
            Some(json!({ "name": "", "language": null })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "");
    assert!(profile["language"].is_null());
}

#[tokio::test]
async fn test_health_update() {
    let app = TestApp::new().await;
    let token = app.register_and_login("a@b.com", "pw123").await;

    let (status, profile) = app
        .request(
            Method::PUT,
            "/api/profile/health",
            Some(json!({ "blood_group": "O+" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["blood_group"], "O+");
    assert!(profile["blood_pressure"].is_null());

    let (_, profile) = app
        .request(
            Method::PUT,
            "/api/profile/health",
            Some(json!({ "blood_pressure": "120/80", "name": "ignored" })),
            Some(&token),
        )
        .await;
    assert_eq!(profile["blood_group"], "O+");
    assert_eq!(profile["blood_pressure"], "120/80");
    assert_eq!(profile["name"], "Guest");
}

#[tokio::test]
async fn test_change_password_flow() {
    let app = TestApp::new().await;
    let token = app.register_and_login("a@b.com", "pw123").await;

    let (status, json) = app
        .request(
            Method::PUT,
            "/api/change-password",
            Some(json!({ "old_password": "pw123", "new_password": "new456" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["msg"], "Password changed");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/login",
            Some(json!({ "email": "a@b.com", "password": "pw123" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/login",
            Some(json!({ "email": "a@b.com", "password": "new456" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_errors() {
    let app = TestApp::new().await;
    let token = app.register_and_login("a@b.com", "pw123").await;

    let (status, json) = app
        .request(
            Method::PUT,
            "/api/change-password",
            Some(json!({ "old_password": "pw123" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["msg"], "old_password and new_password required");

    let (status, json) = app
        .request(
            Method::PUT,
            "/api/change-password",
            Some(json!({ "old_password": "wrong", "new_password": "new456" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["msg"], "Old password incorrect");
}
