// Database models (internal, may differ from the records the stream emits)

use chrono::{DateTime, Utc};
use estatehub_core::{NotificationRecord, OfferUpdateRecord};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Notifications
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_email: String,
    pub title: String,
    pub message: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateNotificationRow {
    pub user_email: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub priority: String,
}

impl From<NotificationRow> for NotificationRecord {
    fn from(row: NotificationRow) -> Self {
        NotificationRecord {
            id: row.id,
            user_email: row.user_email,
            title: row.title,
            message: row.message,
            kind: row.kind,
            priority: row.priority,
            created_at: row.created_at,
            read_at: row.read_at,
        }
    }
}

// ============================================
// Properties and offers
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct PropertyRow {
    pub id: Uuid,
    pub title: String,
    pub seller_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreatePropertyRow {
    pub title: String,
    pub seller_email: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct OfferRow {
    pub id: Uuid,
    pub property_id: Uuid,
    pub buyer_email: String,
    pub seller_email: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateOfferRow {
    pub property_id: Uuid,
    pub buyer_email: String,
    pub status: String,
}

/// Offer joined with its property title, as read by the stream
#[derive(Debug, Clone, FromRow)]
pub struct OfferUpdateRow {
    pub id: Uuid,
    pub status: String,
    pub updated_at: DateTime<Utc>,
    pub property_title: String,
    pub buyer_email: String,
    pub seller_email: String,
}

impl From<OfferUpdateRow> for OfferUpdateRecord {
    fn from(row: OfferUpdateRow) -> Self {
        OfferUpdateRecord {
            id: row.id,
            status: row.status,
            updated_at: row.updated_at,
            property_title: row.property_title,
            buyer_email: row.buyer_email,
            seller_email: row.seller_email,
        }
    }
}
