use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::EpochMillis;

/// Source of "now" for token expiry decisions.
pub trait Clock: Send + Sync + 'static {
    fn now_millis(&self) -> EpochMillis;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> EpochMillis {
        let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
        EpochMillis::try_from(nanos / 1_000_000).unwrap_or(EpochMillis::MAX)
    }
}

/// Clock that only moves when told to. For tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    #[must_use]
    pub fn new(now: EpochMillis) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: EpochMillis) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> EpochMillis {
        self.now.load(Ordering::SeqCst)
    }
}
