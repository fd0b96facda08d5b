// Time source for the poll loop
// Decision: The offer window is measured from Clock::now so it can be driven in tests

use chrono::{DateTime, Utc};

/// Wall-clock source used to anchor each tick's offer window
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
