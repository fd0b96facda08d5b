// NotificationFeed - read side of the notification stream
//
// Implementations can:
// - Query PostgreSQL through a shared pool (production)
// - Read from in-memory tables (dev mode)
// - Return scripted rows or errors (tests)
//
// Each call borrows a connection for the duration of one query only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::records::{NotificationRecord, OfferUpdateRecord};

#[async_trait]
pub trait NotificationFeed: Send + Sync {
    /// Unread notifications owned by `email`, newest first, at most `limit` rows.
    async fn unread_notifications(
        &self,
        email: &str,
        limit: i64,
    ) -> anyhow::Result<Vec<NotificationRecord>>;

    /// Offers where `email` is buyer or seller, updated at or after `since`.
    async fn recent_offer_updates(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<OfferUpdateRecord>>;
}
