// Stream configuration
// Decision: Defaults match the marketplace UI contract (30s cadence, 10 unread, 5 minute offer window)

use std::time::Duration;

use chrono::{DateTime, Utc};

const DEFAULT_OFFER_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Upper bound for the offer window (30 days)
pub const MAX_OFFER_WINDOW: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Poll loop configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Time between poll ticks. The first tick runs immediately after `connected`.
    pub poll_interval: Duration,

    /// Maximum unread notifications per `notifications` event
    pub notification_limit: i64,

    /// Trailing window for offer updates, measured back from each tick
    pub offer_window: Duration,

    /// Buffered events per subscription before the poll loop waits on the client
    pub channel_capacity: usize,

    /// Greeting carried by the `connected` event
    pub connected_message: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            notification_limit: 10,
            offer_window: DEFAULT_OFFER_WINDOW,
            channel_capacity: 16,
            connected_message: "Connected to notification stream".to_string(),
        }
    }
}

impl StreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        defaults
            .clone()
            .with_poll_interval(Duration::from_secs(env_parse(
                "STREAM_POLL_INTERVAL_SECS",
                defaults.poll_interval.as_secs(),
            )))
            .with_notification_limit(env_parse(
                "STREAM_NOTIFICATION_LIMIT",
                defaults.notification_limit,
            ))
            .with_offer_window(Duration::from_secs(env_parse(
                "STREAM_OFFER_WINDOW_SECS",
                defaults.offer_window.as_secs(),
            )))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        // A zero period would make tokio's interval panic
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_notification_limit(mut self, limit: i64) -> Self {
        self.notification_limit = limit.max(1);
        self
    }

    pub fn with_offer_window(mut self, window: Duration) -> Self {
        self.offer_window = window.min(MAX_OFFER_WINDOW);
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Offer window as a chrono duration, capped at MAX_OFFER_WINDOW
    pub fn offer_window_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.offer_window.min(MAX_OFFER_WINDOW))
            .unwrap_or(chrono::Duration::minutes(5))
    }

    /// Start of the offer window for a tick at `now`. Never panics.
    pub fn offer_window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.offer_window_chrono())
            .or_else(|| now.checked_sub_signed(chrono::Duration::minutes(5)))
            .unwrap_or(now)
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, default = %default, "Invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
