// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// Mirrors the PostgreSQL queries so the server and its tests can run
// without a database. Writes exist only to seed data.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::models::*;

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    notifications: RwLock<HashMap<Uuid, NotificationRow>>,
    properties: RwLock<HashMap<Uuid, PropertyRow>>,
    offers: RwLock<HashMap<Uuid, OfferRow>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ============================================
    // Notifications
    // ============================================

    pub async fn create_notification(&self, input: CreateNotificationRow) -> Result<NotificationRow> {
        let row = NotificationRow {
            id: Uuid::now_v7(),
            user_email: input.user_email,
            title: input.title,
            message: input.message,
            kind: input.kind,
            priority: input.priority,
            created_at: Self::now(),
            read_at: None,
        };
        self.notifications.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn mark_notification_read(&self, id: Uuid) -> Result<bool> {
        let mut notifications = self.notifications.write();
        match notifications.get_mut(&id) {
            Some(row) if row.read_at.is_none() => {
                row.read_at = Some(Self::now());
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(anyhow!("Notification not found: {}", id)),
        }
    }

    pub async fn list_unread_notifications(
        &self,
        user_email: &str,
        limit: i64,
    ) -> Result<Vec<NotificationRow>> {
        let mut rows: Vec<NotificationRow> = self
            .notifications
            .read()
            .values()
            .filter(|n| n.user_email == user_email && n.read_at.is_none())
            .cloned()
            .collect();
        // Newest first; v7 ids break ties between rows created in the same instant
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    // ============================================
    // Properties and offers
    // ============================================

    pub async fn create_property(&self, input: CreatePropertyRow) -> Result<PropertyRow> {
        let now = Self::now();
        let row = PropertyRow {
            id: Uuid::now_v7(),
            title: input.title,
            seller_email: input.seller_email,
            created_at: now,
            updated_at: now,
        };
        self.properties.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn create_offer(&self, input: CreateOfferRow) -> Result<OfferRow> {
        let seller_email = self
            .properties
            .read()
            .get(&input.property_id)
            .map(|p| p.seller_email.clone())
            .ok_or_else(|| anyhow!("Property not found: {}", input.property_id))?;

        let now = Self::now();
        let row = OfferRow {
            id: Uuid::now_v7(),
            property_id: input.property_id,
            buyer_email: input.buyer_email,
            seller_email,
            status: input.status,
            created_at: now,
            updated_at: now,
        };
        self.offers.write().insert(row.id, row.clone());
        Ok(row)
    }

    /// Change an offer's status, stamping `updated_at` with `at`
    pub async fn set_offer_status(
        &self,
        id: Uuid,
        status: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<OfferRow>> {
        let mut offers = self.offers.write();
        Ok(offers.get_mut(&id).map(|offer| {
            offer.status = status.to_string();
            offer.updated_at = at;
            offer.clone()
        }))
    }

    pub async fn list_offer_updates_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<OfferUpdateRow>> {
        let properties = self.properties.read();
        let mut rows: Vec<OfferUpdateRow> = self
            .offers
            .read()
            .values()
            .filter(|o| (o.buyer_email == email || o.seller_email == email) && o.updated_at >= since)
            .filter_map(|o| {
                // Inner join: offers whose property is gone are not returned
                properties.get(&o.property_id).map(|p| OfferUpdateRow {
                    id: o.id,
                    status: o.status.clone(),
                    updated_at: o.updated_at,
                    property_title: p.title.clone(),
                    buyer_email: o.buyer_email.clone(),
                    seller_email: o.seller_email.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }
}
