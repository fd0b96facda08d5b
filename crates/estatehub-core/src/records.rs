// Read-only records delivered by the notification stream
//
// These rows are owned by the main marketplace app. The stream never
// writes them; it only reads the unread/recent slices for one principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// An in-app notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NotificationRecord {
    /// Unique identifier for the notification.
    pub id: Uuid,
    /// Email of the user the notification belongs to.
    pub user_email: String,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Category tag (e.g. "showing", "offer", "listing").
    #[serde(rename = "type")]
    pub kind: String,
    /// Priority tag (e.g. "low", "normal", "high").
    pub priority: String,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the notification was read. Always null for rows the stream emits.
    pub read_at: Option<DateTime<Utc>>,
}

impl NotificationRecord {
    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }
}

/// A recent status change on an offer the user is party to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct OfferUpdateRecord {
    /// Unique identifier for the offer.
    pub id: Uuid,
    /// Offer status tag (e.g. "pending", "accepted", "rejected", "countered").
    pub status: String,
    /// When the offer was last changed.
    pub updated_at: DateTime<Utc>,
    /// Title of the property the offer was made on.
    pub property_title: String,
    /// Email of the buyer.
    pub buyer_email: String,
    /// Email of the seller.
    pub seller_email: String,
}

impl OfferUpdateRecord {
    /// Whether the given principal is the buyer or the seller on this offer.
    pub fn involves(&self, email: &str) -> bool {
        self.buyer_email == email || self.seller_email == email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_serializes_kind_as_type() {
        let record = NotificationRecord {
            id: Uuid::now_v7(),
            user_email: "b@example.com".to_string(),
            title: "Showing confirmed".to_string(),
            message: "Saturday 10:00".to_string(),
            kind: "showing".to_string(),
            priority: "high".to_string(),
            created_at: Utc::now(),
            read_at: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "showing");
        assert!(json.get("kind").is_none());
        assert!(json["read_at"].is_null());
        assert!(record.is_unread());
    }

    #[test]
    fn test_offer_involves_buyer_and_seller() {
        let offer = OfferUpdateRecord {
            id: Uuid::now_v7(),
            status: "accepted".to_string(),
            updated_at: Utc::now(),
            property_title: "12 Elm St".to_string(),
            buyer_email: "b@example.com".to_string(),
            seller_email: "s@example.com".to_string(),
        };

        assert!(offer.involves("b@example.com"));
        assert!(offer.involves("s@example.com"));
        assert!(!offer.involves("x@example.com"));
    }
}
