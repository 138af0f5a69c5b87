use crate::config::AppConfig;
use crate::store::{SharedSecretStore, StoreStats};
use crate::web::handlers::{create_secret, get_secret, missing_key, store_secret};
use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application state for web handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedSecretStore,
    pub config: Arc<AppConfig>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Secret store occupancy
pub async fn stats(State(state): State<AppState>) -> Json<StoreStats> {
    Json(state.store.stats())
}

/// Create the web router
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.web.static_dir);
    let body_limit = state.config.secrets.max_payload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/store", post(store_secret))
        .route("/api/secrets", post(create_secret))
        .route("/api/stats", get(stats))
        .route("/secret/", get(missing_key))
        .route("/secret/{key}", get(get_secret))
        .with_state(state)
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecretsConfig;
    use crate::store::create_secret_store;
    use crate::web::handlers::CreateSecretResponse;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let mut config = AppConfig::default();
        config.secrets = SecretsConfig {
            max_payload_bytes: 1024,
            ..Default::default()
        };
        AppState {
            store: create_secret_store(),
            config: Arc::new(config),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_bytes(resp: Response) -> Vec<u8> {
        to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    async fn error_body(resp: Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    fn post_json(body: &'static str, content_type: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/secrets")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    fn post_store(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/store")
            .header(header::HOST, "localhost:8080")
            .body(body.into())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_store_and_redeem_once() {
        let state = test_state();
        let app = create_router(state.clone());

        let resp = send(&app, post_store("hello")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let url = String::from_utf8(body_bytes(resp).await).unwrap();
        assert!(url.starts_with("http://localhost:8080/secret/"));
        assert!(url.ends_with('\n'));

        let path = url.trim().trim_start_matches("http://localhost:8080");
        let resp = send(&app, get(path)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(body_bytes(resp).await, b"hello");

        let resp = send(&app, get(path)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_empty_secret_rejected() {
        let state = test_state();
        let app = create_router(state.clone());

        let resp = send(&app, post_store(Body::empty())).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_secret_rejected() {
        let state = test_state();
        let app = create_router(state.clone());

        let resp = send(&app, post_store(vec![b'a'; 2048])).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = error_body(resp).await;
        assert_eq!(json["code"], 413);
        assert!(json["error"].as_str().unwrap().contains("length limit"));
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_store_requires_post() {
        let app = create_router(test_state());
        let resp = send(&app, get("/store")).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_and_missing_key() {
        let app = create_router(test_state());

        let resp = send(&app, get("/secret/does-not-exist")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = send(&app, get("/secret/")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_binary_secret_served_as_octet_stream() {
        let state = test_state();
        let app = create_router(state.clone());
        let key = state
            .store
            .store(vec![0xff, 0xfe, 0x00], state.config.secrets.default_ttl())
            .unwrap();

        let resp = send(&app, get(&format!("/secret/{}", key))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
        assert_eq!(body_bytes(resp).await, vec![0xff, 0xfe, 0x00]);
    }

    #[tokio::test]
    async fn test_json_create() {
        let state = test_state();
        let app = create_router(state.clone());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/secrets")
            .header(header::HOST, "localhost:8080")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"secret":"s3cr3t","ttl_secs":999999}"#))
            .unwrap();
        let resp = send(&app, request).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created: CreateSecretResponse =
            serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(created.expires_in_secs, 86_400);
        assert_eq!(
            created.url,
            format!("http://localhost:8080/secret/{}", created.key)
        );
        assert_eq!(state.store.take(&created.key), Some(b"s3cr3t".to_vec()));
    }

    #[tokio::test]
    async fn test_json_create_rejects_empty() {
        let app = create_router(test_state());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/secrets")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"secret":""}"#))
            .unwrap();
        let resp = send(&app, request).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_json_create_oversized_is_json_error() {
        let state = test_state();
        let app = create_router(state.clone());
        let body = format!(r#"{{"secret":"{}"}}"#, "a".repeat(2048));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/secrets")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let resp = send(&app, request).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_body(resp).await["code"], 413);
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_json_create_malformed_body() {
        let app = create_router(test_state());

        let resp = send(&app, post_json(r#"{"secret": "#, "application/json")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = error_body(resp).await;
        assert_eq!(json["code"], 400);
        assert!(json["error"].is_string());

        let resp = send(&app, post_json(r#"{"ttl_secs": 5}"#, "application/json")).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_body(resp).await["code"], 422);
    }

    #[tokio::test]
    async fn test_json_create_requires_json_content_type() {
        let app = create_router(test_state());

        let resp = send(&app, post_json(r#"{"secret":"x"}"#, "text/plain")).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(error_body(resp).await["code"], 415);
    }

    #[tokio::test]
    async fn test_health_and_stats() {
        let state = test_state();
        let app = create_router(state.clone());
        state
            .store
            .store("pending", state.config.secrets.default_ttl())
            .unwrap();

        let resp = send(&app, get("/health")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = send(&app, get("/api/stats")).await;
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(json["live_entries"], 1);
        assert_eq!(json["expired_entries"], 0);
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let app = create_router(test_state());
        let resp = send(&app, get("/")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(resp).await).unwrap();
        assert!(html.contains("burnlink"));
    }
}
