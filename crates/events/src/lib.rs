//! Notification delivery and the open-issues report pipeline.
//!
//! - [`delivery`]: the [`NotificationSender`] seam and the HTTP client for
//!   the notification service.
//! - [`report`]: report formatting, the dispatcher that decides which teams
//!   get a report, and the minute scheduler that drives it.

pub mod delivery;
pub mod report;

pub use delivery::notify_api::NotifyApiClient;
pub use delivery::recording::RecordingSender;
pub use delivery::{DeliveryError, NotificationPayload, NotificationSender};
pub use report::dispatcher::{
    DispatchError, DispatchMode, DispatchOutcome, ReportDispatcher, SendFailurePolicy,
};
pub use report::scheduler::ReportScheduler;
