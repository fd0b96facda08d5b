// Notification stream HTTP route (SSE)
// Events are pushed from the poll loop; nothing here is persisted
//
// Wire format per event: `event: <tag>\ndata: <json>\n\n`
// The subscription lives inside the response body, so a client disconnect
// drops the body, which drops the subscription and cancels its poll task.

use axum::{
    extract::{FromRef, State},
    http::header,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse,
    },
    routing::get,
    Router,
};
use estatehub_core::{NotificationStreamService, StreamEvent};
use futures::StreamExt;
use std::{convert::Infallible, sync::Arc, time::Duration};

use super::common::{ApiError, ErrorResponse};
use crate::auth::{Principal, SessionResolver};

// ============================================
// App State and Routes
// ============================================

/// App state for notification routes
#[derive(Clone)]
pub struct AppState {
    pub streams: Arc<NotificationStreamService>,
    pub sessions: Arc<dyn SessionResolver>,
    pub keep_alive: Duration,
}

impl AppState {
    pub fn new(
        streams: Arc<NotificationStreamService>,
        sessions: Arc<dyn SessionResolver>,
        keep_alive: Duration,
    ) -> Self {
        Self {
            streams,
            sessions,
            keep_alive,
        }
    }
}

impl FromRef<AppState> for Arc<dyn SessionResolver> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

/// Create notification routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/notifications/stream", get(stream_notifications))
        .with_state(state)
}

// ============================================
// HTTP Handlers
// ============================================

/// GET /notifications/stream - Stream notifications and offer updates (SSE)
#[utoipa::path(
    get,
    path = "/notifications/stream",
    responses(
        (status = 200, description = "Event stream of connected, notifications and offer_updates events", content_type = "text/event-stream"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Stream could not be opened", body = ErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn stream_notifications(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = state.streams.open(&principal.email)?;

    tracing::info!(
        principal = %principal.email,
        active = state.streams.active_subscriptions(),
        "Starting notification stream"
    );

    let stream = subscription.map(|event| Ok::<_, Infallible>(to_sse_event(&event)));

    let sse = Sse::new(stream).keep_alive(KeepAlive::new().interval(state.keep_alive));

    Ok((
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            // Disable proxy buffering (nginx) so events are delivered as they are written
            (header::HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        sse,
    ))
}

fn to_sse_event(event: &StreamEvent) -> SseEvent {
    let json = event.payload().unwrap_or_else(|e| {
        tracing::error!(event = event.name(), error = %e, "Failed to serialize stream event");
        "{}".to_string()
    });

    SseEvent::default().event(event.name()).data(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthConfig, JwtSessionResolver};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{HeaderMap, Request, StatusCode},
    };
    use estatehub_core::StreamConfig;
    use estatehub_storage::{CreateNotificationRow, StorageBackend};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    struct Fixture {
        app: Router,
        streams: Arc<NotificationStreamService>,
        backend: StorageBackend,
        resolver: Arc<JwtSessionResolver>,
    }

    fn fixture() -> Fixture {
        let backend = StorageBackend::in_memory();
        let streams = Arc::new(NotificationStreamService::new(
            Arc::new(backend.clone()),
            StreamConfig::default(),
        ));
        let resolver = Arc::new(JwtSessionResolver::new(&AuthConfig::with_secret(SECRET)));
        let state = AppState::new(streams.clone(), resolver.clone(), Duration::from_secs(15));

        Fixture {
            app: routes(state),
            streams,
            backend,
            resolver,
        }
    }

    async fn seed_unread(backend: &StorageBackend, email: &str, count: usize) {
        let db = backend.memory().unwrap();
        for i in 0..count {
            db.create_notification(CreateNotificationRow {
                user_email: email.to_string(),
                title: format!("Showing request {i}"),
                message: "A buyer wants to tour your listing".to_string(),
                kind: "showing".to_string(),
                priority: "normal".to_string(),
            })
            .await
            .unwrap();
        }
    }

    async fn next_frame(body: &mut Body) -> String {
        loop {
            let frame = body.frame().await.unwrap().unwrap();
            if let Ok(data) = frame.into_data() {
                return String::from_utf8(data.to_vec()).unwrap();
            }
        }
    }

    fn parse_frame(frame: &str) -> (String, serde_json::Value) {
        let mut lines = frame.lines();
        let event = lines.next().unwrap().strip_prefix("event: ").unwrap();
        let data = lines.next().unwrap().strip_prefix("data: ").unwrap();
        (event.to_string(), serde_json::from_str(data).unwrap())
    }

    #[tokio::test]
    async fn test_unauthenticated_returns_401() {
        let fx = fixture();

        let response = fx
            .app
            .oneshot(
                Request::builder()
                    .uri("/notifications/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Authentication required");
        assert_eq!(fx.streams.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_stream_emits_connected_then_notifications() {
        let fx = fixture();
        seed_unread(&fx.backend, "b@example.com", 2).await;
        let token = fx
            .resolver
            .jwt()
            .issue_session_token("b@example.com", None)
            .unwrap();

        let response = fx
            .app
            .oneshot(
                Request::builder()
                    .uri("/notifications/stream")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        assert_eq!(fx.streams.active_subscriptions(), 1);

        let mut body = response.into_body();

        let frame = next_frame(&mut body).await;
        assert!(frame.starts_with("event: connected\ndata: "));
        assert!(frame.ends_with("\n\n"));
        let (_, payload) = parse_frame(&frame);
        assert_eq!(payload["type"], "connected");

        let (event, payload) = parse_frame(&next_frame(&mut body).await);
        assert_eq!(event, "notifications");
        assert_eq!(payload["count"], 2);
        assert_eq!(payload["notifications"].as_array().unwrap().len(), 2);
        assert_eq!(payload["notifications"][0]["user_email"], "b@example.com");

        // Client disconnect
        drop(body);
        assert_eq!(fx.streams.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_session_cookie_opens_stream() {
        let fx = fixture();
        let token = fx
            .resolver
            .jwt()
            .issue_session_token("s@example.com", None)
            .unwrap();

        let response = fx
            .app
            .oneshot(
                Request::builder()
                    .uri("/notifications/stream")
                    .header("Cookie", format!("session_token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let mut body = response.into_body();
        let (event, _) = parse_frame(&next_frame(&mut body).await);
        assert_eq!(event, "connected");
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let fx = fixture();

        let response = fx
            .app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/notifications/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    struct FailingResolver;

    #[async_trait]
    impl SessionResolver for FailingResolver {
        async fn resolve(&self, _headers: &HeaderMap) -> anyhow::Result<Option<Principal>> {
            anyhow::bail!("session store unreachable")
        }
    }

    #[tokio::test]
    async fn test_resolver_failure_returns_500() {
        let fx = fixture();
        let state = AppState::new(
            fx.streams.clone(),
            Arc::new(FailingResolver),
            Duration::from_secs(15),
        );

        let response = routes(state)
            .oneshot(
                Request::builder()
                    .uri("/notifications/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Failed to open notification stream");
        assert_eq!(fx.streams.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_refuses_new_streams() {
        let fx = fixture();
        fx.streams.shutdown();
        let token = fx
            .resolver
            .jwt()
            .issue_session_token("b@example.com", None)
            .unwrap();

        let response = fx
            .app
            .oneshot(
                Request::builder()
                    .uri("/notifications/stream")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
