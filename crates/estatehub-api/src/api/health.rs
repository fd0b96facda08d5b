// Health endpoint (not prefixed)

use axum::{extract::State, routing::get, Json, Router};
use estatehub_core::NotificationStreamService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// State for health endpoint
#[derive(Clone)]
pub struct HealthState {
    pub storage: &'static str,
    pub streams: Arc<NotificationStreamService>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Storage backend kind ("postgres" or "in-memory")
    pub storage: String,
    /// Notification streams currently open
    pub active_streams: usize,
}

pub fn routes(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// GET /health - Service liveness and open stream count
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage.to_string(),
        active_streams: state.streams.active_subscriptions(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use estatehub_core::StreamConfig;
    use estatehub_storage::StorageBackend;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_storage_and_streams() {
        let backend = StorageBackend::in_memory();
        let streams = Arc::new(NotificationStreamService::new(
            Arc::new(backend.clone()),
            StreamConfig::default(),
        ));
        let _sub = streams.open("b@example.com").unwrap();

        let app = routes(HealthState {
            storage: backend.kind(),
            streams: streams.clone(),
        });

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.storage, "in-memory");
        assert_eq!(health.active_streams, 1);
    }
}
