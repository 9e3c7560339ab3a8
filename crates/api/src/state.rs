use std::sync::Arc;

use sentry_assistant::Assistant;
use sentry_db::Store;
use sentry_events::{NotificationSender, ReportDispatcher};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything is behind an `Arc` and immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sender: Arc<dyn NotificationSender>,
    pub dispatcher: Arc<ReportDispatcher>,
    /// `None` when no model API key is configured.
    pub assistant: Option<Arc<Assistant>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire the dispatcher and optional assistant around a store and sender.
    pub fn new(
        store: Arc<dyn Store>,
        sender: Arc<dyn NotificationSender>,
        assistant: Option<Arc<Assistant>>,
        config: ServerConfig,
    ) -> Self {
        let dispatcher = Arc::new(ReportDispatcher::new(
            Arc::clone(&store),
            Arc::clone(&sender),
            config.report_clock,
            config.send_failure_policy,
        ));
        Self {
            store,
            sender,
            dispatcher,
            assistant,
            config: Arc::new(config),
        }
    }
}
