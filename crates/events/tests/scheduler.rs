//! The scheduler loop exits promptly once cancelled.

use std::sync::Arc;
use std::time::Duration;

use sentry_core::clock::ReportClock;
use sentry_db::MemoryStore;
use sentry_events::{RecordingSender, ReportDispatcher, ReportScheduler, SendFailurePolicy};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn stops_when_cancelled() {
    let dispatcher = Arc::new(ReportDispatcher::new(
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingSender::new()),
        ReportClock::default(),
        SendFailurePolicy::Abort,
    ));
    let scheduler = ReportScheduler::new(dispatcher);
    let cancel = CancellationToken::new();

    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { scheduler.run(cancel).await })
    };
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();
}
