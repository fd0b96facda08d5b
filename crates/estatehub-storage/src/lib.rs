// Storage layer for the notification stream
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// This crate provides the read side the stream polls:
// - Database: sqlx/Postgres queries over the marketplace tables
// - InMemoryDatabase: HashMap-backed tables with the same query semantics
// - StorageBackend: enum dispatch over both, implements NotificationFeed

pub mod backend;
pub mod memory;
pub mod models;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::*;
