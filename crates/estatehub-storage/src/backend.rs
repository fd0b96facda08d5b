// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// This module provides a unified StorageBackend enum that can work with
// either PostgreSQL (production) or in-memory (dev mode) storage, and
// exposes it to the stream through the NotificationFeed trait.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use estatehub_core::{NotificationFeed, NotificationRecord, OfferUpdateRecord};
use std::sync::Arc;

use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL
    pub async fn postgres(database_url: &str, max_connections: u32) -> Result<Self> {
        let db = Database::connect(database_url, max_connections).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Short name for health reporting
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::InMemory(_) => "in-memory",
        }
    }

    /// Get the in-memory database for seeding, if in dev mode
    pub fn memory(&self) -> Option<&Arc<InMemoryDatabase>> {
        match self {
            Self::Postgres(_) => None,
            Self::InMemory(db) => Some(db),
        }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        match self {
            Self::Postgres(db) => db.run_migrations().await,
            Self::InMemory(_) => Ok(()),
        }
    }

    // ============================================
    // Notifications
    // ============================================

    pub async fn list_unread_notifications(
        &self,
        user_email: &str,
        limit: i64,
    ) -> Result<Vec<NotificationRow>> {
        match self {
            Self::Postgres(db) => db.list_unread_notifications(user_email, limit).await,
            Self::InMemory(db) => db.list_unread_notifications(user_email, limit).await,
        }
    }

    // ============================================
    // Offers
    // ============================================

    pub async fn list_offer_updates_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<OfferUpdateRow>> {
        match self {
            Self::Postgres(db) => db.list_offer_updates_since(email, since).await,
            Self::InMemory(db) => db.list_offer_updates_since(email, since).await,
        }
    }
}

#[async_trait]
impl NotificationFeed for StorageBackend {
    async fn unread_notifications(
        &self,
        email: &str,
        limit: i64,
    ) -> Result<Vec<NotificationRecord>> {
        let rows = self.list_unread_notifications(email, limit).await?;
        Ok(rows.into_iter().map(NotificationRecord::from).collect())
    }

    async fn recent_offer_updates(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<OfferUpdateRecord>> {
        let rows = self.list_offer_updates_since(email, since).await?;
        Ok(rows.into_iter().map(OfferUpdateRecord::from).collect())
    }
}
