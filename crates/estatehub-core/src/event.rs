// Stream events
//
// Events are ephemeral: they are pushed to the connected client and never
// persisted. Each event carries its tag twice, once as the SSE `event:`
// field and once as the `type` field of the JSON payload.

use serde::{Deserialize, Serialize};

use crate::records::{NotificationRecord, OfferUpdateRecord};

pub const CONNECTED: &str = "connected";
pub const NOTIFICATIONS: &str = "notifications";
pub const OFFER_UPDATES: &str = "offer_updates";

/// A typed event pushed to one subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Greeting sent exactly once when the stream opens.
    Connected { message: String },
    /// Current unread notifications, newest first.
    Notifications {
        count: usize,
        notifications: Vec<NotificationRecord>,
    },
    /// Offers touched inside the trailing window.
    OfferUpdates { updates: Vec<OfferUpdateRecord> },
}

impl StreamEvent {
    pub fn connected(message: impl Into<String>) -> Self {
        StreamEvent::Connected {
            message: message.into(),
        }
    }

    /// Build a notifications event. `count` is always derived from the rows.
    pub fn notifications(notifications: Vec<NotificationRecord>) -> Self {
        StreamEvent::Notifications {
            count: notifications.len(),
            notifications,
        }
    }

    pub fn offer_updates(updates: Vec<OfferUpdateRecord>) -> Self {
        StreamEvent::OfferUpdates { updates }
    }

    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Connected { .. } => CONNECTED,
            StreamEvent::Notifications { .. } => NOTIFICATIONS,
            StreamEvent::OfferUpdates { .. } => OFFER_UPDATES,
        }
    }

    /// JSON payload for the SSE `data:` field
    pub fn payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Full text/event-stream frame: `event: <tag>\ndata: <json>\n\n`
    pub fn to_frame(&self) -> serde_json::Result<String> {
        Ok(format!("event: {}\ndata: {}\n\n", self.name(), self.payload()?))
    }
}
