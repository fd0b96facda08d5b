// EstateHub Notifications API Library
// Decision: Shared library for the server binary and router tests

// API routes and types (shared for OpenAPI generation)
pub mod api;

// Session resolution
pub mod auth;

pub mod config;
pub mod openapi;
pub mod telemetry;

use axum::{
    http::{header, Method},
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::api::{health::HealthState, notifications::AppState};
use crate::openapi::ApiDoc;

/// Assemble the full application router.
///
/// `/health` and `/api-doc/openapi.json` are served at the root; the
/// notification routes are nested under `api_prefix`. Cross-origin reads
/// are allowed from any origin.
pub fn build_app(state: AppState, health: HealthState, api_prefix: &str) -> Router {
    let api_routes = api::notifications::routes(state);

    Router::new()
        .merge(api::health::routes(health))
        .merge(build_router_with_prefix(api_routes, api_prefix))
        .route(
            "/api-doc/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::ACCEPT, header::CACHE_CONTROL]),
        )
}

/// Build router with optional API prefix
pub fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthConfig, JwtSessionResolver};
    use axum::{body::Body, http::Request};
    use estatehub_core::{NotificationStreamService, StreamConfig};
    use estatehub_storage::StorageBackend;
    use http_body_util::BodyExt;
    use std::{sync::Arc, time::Duration};
    use tower::ServiceExt;

    fn test_routes() -> Router {
        Router::new().route("/v1/test", get(|| async { "ok" }))
    }

    fn test_app(prefix: &str) -> (Router, Arc<JwtSessionResolver>) {
        let backend = StorageBackend::in_memory();
        let streams = Arc::new(NotificationStreamService::new(
            Arc::new(backend.clone()),
            StreamConfig::default(),
        ));
        let resolver = Arc::new(JwtSessionResolver::new(&AuthConfig::with_secret("secret")));
        let state = AppState::new(streams.clone(), resolver.clone(), Duration::from_secs(15));
        let health = HealthState {
            storage: backend.kind(),
            streams,
        };
        (build_app(state, health, prefix), resolver)
    }

    #[tokio::test]
    async fn test_api_prefix_empty() {
        let app = build_router_with_prefix(test_routes(), "");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_api_prefix_set() {
        let app = build_router_with_prefix(test_routes(), "/api");

        // Route should work with prefix
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);

        // Route should NOT work without prefix
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_stream_is_served_under_prefix() {
        let (app, resolver) = test_app("/api");
        let token = resolver
            .jwt()
            .issue_session_token("b@example.com", None)
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/stream")
                    .header("Origin", "https://app.estatehub.example")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        assert_eq!(response.headers()[header::CONNECTION], "keep-alive");
        drop(response);

        // Health and the OpenAPI document stay at the root
        for uri in ["/health", "/api-doc/openapi.json"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), 200, "{uri}");
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/notifications/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
