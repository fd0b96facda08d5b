// Notification stream service
//
// One subscription per open connection. Each subscription owns a background
// poll task bound to a CancellationToken:
//
//   Idle -> Connected -> Polling (every tick) -> Closed
//
// - `connected` is queued before the task starts, so it is always first
// - the first tick runs immediately, later ticks every `poll_interval`
// - both queries of a tick run concurrently; their events are emitted in a
//   fixed order (notifications, offer_updates) before the next tick starts
// - a failed query is logged and skipped; the stream stays open
// - closing is a single compare-and-swap: whichever of {explicit cancel,
//   transport close, service shutdown, task exit} wins runs the cleanup,
//   the rest no-op

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::StreamConfig;
use crate::error::{Result, StreamError};
use crate::event::StreamEvent;
use crate::feed::NotificationFeed;

/// Lifecycle state of one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Connected,
    Polling,
    Closed,
}

/// Why a subscription was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// `Subscription::cancel` was called
    Cancelled,
    /// The receiving side went away (client disconnect, handler teardown)
    Disconnected,
    /// The service was shut down
    Shutdown,
    /// The poll task ended abnormally
    Failed,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::Cancelled => write!(f, "cancelled"),
            CloseReason::Disconnected => write!(f, "disconnected"),
            CloseReason::Shutdown => write!(f, "shutdown"),
            CloseReason::Failed => write!(f, "failed"),
        }
    }
}

// ============================================
// Service
// ============================================

/// Opens notification streams and tracks how many are live.
pub struct NotificationStreamService {
    feed: Arc<dyn NotificationFeed>,
    config: Arc<StreamConfig>,
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
    active: Arc<AtomicUsize>,
}

impl NotificationStreamService {
    pub fn new(feed: Arc<dyn NotificationFeed>, config: StreamConfig) -> Self {
        Self {
            feed,
            config: Arc::new(config),
            clock: Arc::new(SystemClock),
            shutdown: CancellationToken::new(),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the time source that anchors each tick's offer window
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Number of subscriptions that are open and not yet closed
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Close every open subscription. New subscriptions are refused afterwards.
    pub fn shutdown(&self) {
        info!(
            active = self.active_subscriptions(),
            "Shutting down notification streams"
        );
        self.shutdown.cancel();
    }

    /// Open a stream for an authenticated principal.
    ///
    /// Must be called from within a tokio runtime. The returned subscription
    /// yields `connected` first, then the events of every tick.
    pub fn open(&self, principal: &str) -> Result<Subscription> {
        let principal = principal.trim();
        if principal.is_empty() {
            return Err(StreamError::Unauthenticated);
        }
        if self.shutdown.is_cancelled() {
            return Err(StreamError::setup("notification streams are shutting down"));
        }

        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        tx.try_send(StreamEvent::connected(self.config.connected_message.clone()))
            .map_err(|e| StreamError::setup(format!("failed to queue greeting: {e}")))?;

        let cancel = self.shutdown.child_token();
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let lifecycle = Arc::new(Lifecycle {
            principal: principal.to_string(),
            state: Mutex::new(StreamState::Connected),
            closed: AtomicBool::new(false),
            cancel: cancel.clone(),
            active: self.active.clone(),
        });

        info!(principal = %principal, active, "Notification stream opened");

        let task = tokio::spawn(poll_loop(
            self.feed.clone(),
            self.config.clone(),
            self.clock.clone(),
            lifecycle.clone(),
            self.shutdown.clone(),
            tx,
        ));

        Ok(Subscription {
            created_at: self.clock.now(),
            events: rx,
            lifecycle,
            task: Some(task),
        })
    }

    /// Run a single poll cycle for `principal` without opening a stream
    pub async fn poll_once(&self, principal: &str) -> Vec<StreamEvent> {
        run_tick(self.feed.as_ref(), &self.config, principal, self.clock.now()).await
    }
}

// ============================================
// Subscription
// ============================================

/// Handle to one open stream. Dropping it closes the stream.
pub struct Subscription {
    created_at: DateTime<Utc>,
    events: mpsc::Receiver<StreamEvent>,
    lifecycle: Arc<Lifecycle>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn principal(&self) -> &str {
        &self.lifecycle.principal
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> StreamState {
        *self.lifecycle.state.lock()
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle.closed.load(Ordering::SeqCst)
    }

    /// Stop polling. Returns false if the subscription was already closed.
    ///
    /// Events already queued can still be received; the stream then ends.
    pub fn cancel(&self) -> bool {
        self.lifecycle.close(CloseReason::Cancelled)
    }

    /// Receive the next event, or None once the stream has ended
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    /// Wait until the poll task has exited
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(principal = %self.lifecycle.principal, error = %e, "Poll task ended abnormally");
            }
        }
    }
}

impl Stream for Subscription {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.lifecycle.close(CloseReason::Disconnected);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("principal", &self.lifecycle.principal)
            .field("created_at", &self.created_at)
            .field("state", &self.state())
            .finish()
    }
}

/// State shared between a Subscription handle and its poll task
struct Lifecycle {
    principal: String,
    state: Mutex<StreamState>,
    closed: AtomicBool,
    cancel: CancellationToken,
    active: Arc<AtomicUsize>,
}

impl Lifecycle {
    /// Close exactly once. Returns true for the caller that performed the close.
    fn close(&self, reason: CloseReason) -> bool {
        if self
            .closed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        *self.state.lock() = StreamState::Closed;
        self.cancel.cancel();
        let remaining = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        info!(
            principal = %self.principal,
            reason = %reason,
            active = remaining,
            "Notification stream closed"
        );
        true
    }

    fn enter_polling(&self) {
        let mut state = self.state.lock();
        if *state != StreamState::Closed {
            *state = StreamState::Polling;
        }
    }
}

// ============================================
// Poll loop
// ============================================

/// Closes the lifecycle on every exit of the poll task, unwinding included
struct CloseOnExit {
    lifecycle: Arc<Lifecycle>,
    shutdown: CancellationToken,
}

impl Drop for CloseOnExit {
    fn drop(&mut self) {
        let reason = if std::thread::panicking() {
            CloseReason::Failed
        } else if self.shutdown.is_cancelled() {
            CloseReason::Shutdown
        } else {
            CloseReason::Disconnected
        };
        self.lifecycle.close(reason);
    }
}

async fn poll_loop(
    feed: Arc<dyn NotificationFeed>,
    config: Arc<StreamConfig>,
    clock: Arc<dyn Clock>,
    lifecycle: Arc<Lifecycle>,
    shutdown: CancellationToken,
    tx: mpsc::Sender<StreamEvent>,
) {
    let _guard = CloseOnExit {
        lifecycle: lifecycle.clone(),
        shutdown,
    };
    let cancel = lifecycle.cancel.clone();
    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick: u64 = 0;

    'ticks: loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tx.closed() => {
                lifecycle.close(CloseReason::Disconnected);
                break;
            }
            _ = ticker.tick() => {}
        }

        lifecycle.enter_polling();
        tick += 1;

        // In-flight queries are dropped on cancel so nothing runs after close
        let events = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            events = run_tick(feed.as_ref(), &config, &lifecycle.principal, clock.now()) => events,
        };

        debug!(
            principal = %lifecycle.principal,
            tick,
            events = events.len(),
            "Poll tick completed"
        );

        for event in events {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break 'ticks,
                sent = tx.send(event) => {
                    if sent.is_err() {
                        lifecycle.close(CloseReason::Disconnected);
                        break 'ticks;
                    }
                }
            }
        }
    }

    debug!(principal = %lifecycle.principal, ticks = tick, "Poll loop exited");
}

/// One poll cycle. Each query is isolated: a failure is logged and only
/// suppresses that query's event.
async fn run_tick(
    feed: &dyn NotificationFeed,
    config: &StreamConfig,
    principal: &str,
    now: DateTime<Utc>,
) -> Vec<StreamEvent> {
    // Window slides with every tick
    let since = config.offer_window_start(now);

    let (notifications, offers) = tokio::join!(
        feed.unread_notifications(principal, config.notification_limit),
        feed.recent_offer_updates(principal, since),
    );

    let mut events = Vec::with_capacity(2);

    match notifications.map_err(|e| StreamError::query("unread_notifications", e)) {
        Ok(mut rows) => {
            // Rows for other principals, or already read, are never emitted
            rows.retain(|row| row.user_email == principal && row.is_unread());
            if !rows.is_empty() {
                events.push(StreamEvent::notifications(rows));
            }
        }
        Err(e) => warn!(principal = %principal, error = %e, "Skipping notifications for this tick"),
    }

    match offers.map_err(|e| StreamError::query("recent_offer_updates", e)) {
        Ok(mut rows) => {
            rows.retain(|row| row.involves(principal));
            if !rows.is_empty() {
                events.push(StreamEvent::offer_updates(rows));
            }
        }
        Err(e) => warn!(principal = %principal, error = %e, "Skipping offer updates for this tick"),
    }

    events
}
