// Repository layer for database operations
// Decision: Read-only queries; the marketplace app owns all writes

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a pool with an explicit size. Acquisition queues once the pool is exhausted.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;
        Ok(Self { pool })
    }

    /// Apply the bundled reference schema
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;
        Ok(())
    }

    // ============================================
    // Notifications
    // ============================================

    pub async fn list_unread_notifications(
        &self,
        user_email: &str,
        limit: i64,
    ) -> Result<Vec<NotificationRow>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_email, title, message, type, priority, created_at, read_at
            FROM notifications
            WHERE user_email = $1 AND read_at IS NULL
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_email)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Offers
    // ============================================

    pub async fn list_offer_updates_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<OfferUpdateRow>> {
        let rows = sqlx::query_as::<_, OfferUpdateRow>(
            r#"
            SELECT o.id, o.status, o.updated_at, p.title AS property_title,
                   o.buyer_email, o.seller_email
            FROM offer o
            JOIN property p ON p.id = o.property_id
            WHERE (o.buyer_email = $1 OR o.seller_email = $1)
              AND o.updated_at >= $2
            ORDER BY o.updated_at DESC
            "#,
        )
        .bind(email)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
