//! Minute ticker for scheduled reports.
//!
//! [`ReportScheduler`] runs as a background task and calls the dispatcher in
//! scheduled mode once per wall-clock minute. The first tick is aligned just
//! past the next minute boundary so each tick lands inside the minute it
//! reports for.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Timelike, Utc};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::dispatcher::ReportDispatcher;

/// Period between scheduled dispatches.
const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Offset past the minute boundary at which each tick fires.
const TICK_OFFSET: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// ReportScheduler
// ---------------------------------------------------------------------------

/// Background service that triggers scheduled report dispatches.
pub struct ReportScheduler {
    dispatcher: Arc<ReportDispatcher>,
}

impl ReportScheduler {
    pub fn new(dispatcher: Arc<ReportDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Run the scheduler loop until `cancel` fires.
    ///
    /// Missed ticks are skipped rather than replayed, and a failed dispatch
    /// is logged without stopping the loop.
    pub async fn run(&self, cancel: CancellationToken) {
        let start = Instant::now() + until_next_minute();
        let mut interval = tokio::time::interval_at(start, TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!("Report scheduler started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Report scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    async fn tick(&self) {
        match self.dispatcher.run_scheduled(Utc::now()).await {
            Ok(outcome) if outcome.sent() > 0 => {
                tracing::info!(sent = outcome.sent(), "{}", outcome.message());
            }
            Ok(outcome) => {
                tracing::debug!("{}", outcome.message());
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduled report dispatch failed");
            }
        }
    }
}

/// Time from now until [`TICK_OFFSET`] past the next minute boundary.
fn until_next_minute() -> Duration {
    let now = Utc::now();
    // Leap-second nanos can exceed one second; clamp them away.
    let nanos = now.nanosecond() % 1_000_000_000;
    let into_minute =
        Duration::from_secs(u64::from(now.second())) + Duration::from_nanos(u64::from(nanos));
    Duration::from_secs(60).saturating_sub(into_minute) + TICK_OFFSET
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_minute_delay_is_bounded() {
        let delay = until_next_minute();
        assert!(delay > TICK_OFFSET);
        assert!(delay <= Duration::from_secs(60) + TICK_OFFSET);
    }
}
