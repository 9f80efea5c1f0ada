// ── Fallback polling ──
//
// Once the live channel fails, the board is refreshed by pulling a full
// snapshot on a fixed period. At most one schedule ever runs per dashboard,
// and there is no way back to push mode.

use std::future;
use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Shortest accepted polling period.
pub const MIN_PERIOD: Duration = Duration::from_millis(100);

/// Idempotent periodic refresh schedule.
#[derive(Debug)]
pub struct FallbackScheduler {
    period: Duration,
    interval: Option<Interval>,
}

impl FallbackScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start the schedule. The first tick fires one full period from now.
    ///
    /// Returns `false` (and changes nothing) if it was already running.
    pub fn activate(&mut self) -> bool {
        if self.interval.is_some() {
            return false;
        }
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        true
    }

    /// Wait for the next tick. Pends forever while inactive, so it can sit
    /// in a `select!` from the start. Cancel-safe.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }
}
