use axum::{extract::Request, http::header, middleware::Next, response::Response};

/// Log every `/api/` request with whether it carried credentials. The token itself is
/// never logged.
pub async fn request_log_middleware(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if path.starts_with("/api/") {
        tracing::info!(
            method = %req.method(),
            path = %path,
            has_authorization = req.headers().contains_key(header::AUTHORIZATION),
            "API request"
        );
    }

    next.run(req).await
}
