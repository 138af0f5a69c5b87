//! Submission and redemption endpoints.
//!
//! These are the only callers of the secret store. They validate input,
//! apply the TTL policy, and turn store results into HTTP responses.

use crate::error::{AppError, AppResult};
use crate::web::routes::AppState;
use axum::{
    extract::{
        rejection::{BytesRejection, JsonRejection},
        Path, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

/// JSON submission body.
#[derive(Debug, Deserialize)]
pub struct CreateSecretRequest {
    pub secret: String,
    /// Requested lifetime; clamped to the configured maximum.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

/// JSON submission response.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSecretResponse {
    pub key: String,
    pub url: String,
    pub expires_in_secs: u64,
}

fn host(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::HOST).and_then(|v| v.to_str().ok())
}

/// Handler: POST /store
///
/// The raw request body is the secret. Responds with the retrieval URL.
pub async fn store_secret(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<String> {
    let body = body?;
    if body.is_empty() {
        return Err(AppError::invalid_input("Secret cannot be empty"));
    }

    let ttl = state.config.secrets.default_ttl();
    let key = state.store.store(body.to_vec(), ttl)?;
    info!(key = %key.redacted(), bytes = body.len(), "Secret submitted");

    let url = state.config.web.secret_url(host(&headers), key.as_str());
    Ok(format!("{}\n", url))
}

/// Handler: POST /api/secrets
pub async fn create_secret(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Result<Json<CreateSecretRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CreateSecretResponse>)> {
    let Json(request) = request?;
    if request.secret.is_empty() {
        return Err(AppError::invalid_input("Secret cannot be empty"));
    }

    let ttl = state.config.secrets.resolve_ttl(request.ttl_secs);
    let bytes = request.secret.len();
    let key = state.store.store(request.secret, ttl)?;
    info!(key = %key.redacted(), bytes, ttl_secs = ttl.as_secs(), "Secret submitted");

    let url = state.config.web.secret_url(host(&headers), key.as_str());
    Ok((
        StatusCode::CREATED,
        Json(CreateSecretResponse {
            key: key.into(),
            url,
            expires_in_secs: ttl.as_secs(),
        }),
    ))
}

/// Handler: GET /secret/{key}
///
/// Hands out the secret and burns it. Every failure is a plain 404.
pub async fn get_secret(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Response> {
    let payload = state.store.take(&key).ok_or(AppError::NotFound)?;

    let content_type = if std::str::from_utf8(&payload).is_ok() {
        "text/plain; charset=utf-8"
    } else {
        "application/octet-stream"
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "no-store"),
        ],
        payload,
    )
        .into_response())
}

/// Handler: GET /secret/
pub async fn missing_key() -> AppError {
    AppError::invalid_input("Secret key is required")
}
