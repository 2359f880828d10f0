//! Lenient JSON body handling.
//!
//! Clients of this API are loose with headers and bodies: a missing Content-Type is
//! accepted, and an empty or `null` body reads as `{}`.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use service_core::error::AppError;

/// JSON extractor that tolerates a missing Content-Type and an empty body.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| invalid_body())?;

        parse_body(&bytes).map(JsonBody)
    }
}

fn invalid_body() -> AppError {
    AppError::BadRequest(anyhow::anyhow!("Invalid request body"))
}

/// Parse a request body, treating blank input and `null` as an empty object.
pub fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    let value: serde_json::Value = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(bytes).map_err(|e| {
            tracing::debug!(error = %e, "Request body is not JSON");
            invalid_body()
        })?
    };

    let value = match value {
        serde_json::Value::Null => serde_json::json!({}),
        other => other,
    };

    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(error = %e, "Request body does not match the expected shape");
        invalid_body()
    })
}

/// Distinguish an absent key (`None`) from an explicit `null` (`Some(None)`).
///
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        name: Option<Option<String>>,
        email: Option<String>,
    }

    #[test]
    fn empty_body_reads_as_empty_object() {
        let patch: Patch = parse_body(b"").expect("empty body");
        assert!(patch.name.is_none());
        assert!(patch.email.is_none());

        let patch: Patch = parse_body(b"  null ").expect("null body");
        assert!(patch.name.is_none());
    }

    #[test]
    fn explicit_null_differs_from_absent() {
        let patch: Patch = parse_body(br#"{"name": null}"#).expect("null name");
        assert_eq!(patch.name, Some(None));

        let patch: Patch = parse_body(br#"{"name": "Ann"}"#).expect("name");
        assert_eq!(patch.name, Some(Some("Ann".to_string())));
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = parse_body::<Patch>(b"{not json").unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Invalid request body");

        let err = parse_body::<Patch>(br#"{"email": 5}"#).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
