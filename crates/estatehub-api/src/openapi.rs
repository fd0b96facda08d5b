// OpenAPI document generation
//
// Served as JSON at /api-doc/openapi.json. Paths are relative to API_PREFIX.

use crate::api;
use estatehub_core::{NotificationRecord, OfferUpdateRecord, StreamEvent};
use utoipa::OpenApi;

/// OpenAPI documentation for the EstateHub notification stream
#[derive(OpenApi)]
#[openapi(
    paths(
        api::notifications::stream_notifications,
        api::health::health,
    ),
    components(
        schemas(
            StreamEvent,
            NotificationRecord,
            OfferUpdateRecord,
            api::ErrorResponse,
            api::health::HealthResponse,
        )
    ),
    tags(
        (name = "notifications", description = "Notification streaming endpoints (SSE)"),
        (name = "health", description = "Service health")
    ),
    info(
        title = "EstateHub Notifications API",
        version = "0.1.0",
        description = "Server-sent event stream of unread notifications and offer updates",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_stream_route() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/notifications/stream"));
        assert!(doc.paths.paths.contains_key("/health"));

        let schemas = doc.components.expect("components").schemas;
        assert!(schemas.contains_key("StreamEvent"));
        assert!(schemas.contains_key("NotificationRecord"));
    }
}
