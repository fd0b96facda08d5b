// Notification Stream Core
//
// This crate provides a DB-agnostic implementation of the notification
// delivery loop (poll unread notifications + recent offer updates → push
// typed events to one subscriber).
//
// Key design decisions:
// - Uses the NotificationFeed trait for pluggable backends (Postgres, in-memory, test doubles)
// - One cancellable background task per subscription, bound to a Subscription handle
// - At-least-once delivery: every tick re-reads current state, no per-subscription cursor
// - Query failures are isolated per tick and never close the stream

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod records;
pub mod stream;

// Re-exports for convenience
pub use clock::{Clock, SystemClock};
pub use config::StreamConfig;
pub use error::{Result, StreamError};
pub use event::StreamEvent;
pub use feed::NotificationFeed;
pub use records::{NotificationRecord, OfferUpdateRecord};
pub use stream::{CloseReason, NotificationStreamService, Subscription};
