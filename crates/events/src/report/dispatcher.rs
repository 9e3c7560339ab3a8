//! Open-issues report dispatcher.
//!
//! One run fetches issues, branches and report configurations concurrently,
//! groups unresolved issues by responsible team, decides which teams get a
//! report, and sends them through the [`NotificationSender`].
//!
//! - Scheduled mode: a team is reported when its own configuration is
//!   enabled and its `time` equals the current `HH:mm` in the report time
//!   zone.
//! - Manual mode: every team with open issues is reported, regardless of
//!   schedule or enabled flag.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use sentry_core::clock::ReportClock;
use sentry_core::error::CoreError;
use sentry_core::notify::MessageFormat;
use sentry_core::party::{ResponsibleParty, DEFAULT_REPORT_CONFIG_ID};
use sentry_core::types::{DbId, Timestamp};
use sentry_db::models::issue::Issue;
use sentry_db::models::report_configuration::ReportConfiguration;
use sentry_db::{Store, StoreError};

use super::config::EffectiveReportConfig;
use super::format::format_report;
use crate::delivery::{DeliveryError, NotificationPayload, NotificationSender};

// ---------------------------------------------------------------------------
// Modes, policy and outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Scheduled,
    Manual,
}

/// What to do when sending one team's report fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendFailurePolicy {
    /// Stop at the first failed send.
    #[default]
    Abort,
    /// Try every team, then report the failures together.
    Continue,
}

impl FromStr for SendFailurePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(SendFailurePolicy::Abort),
            "continue" => Ok(SendFailurePolicy::Continue),
            other => Err(CoreError::Validation(format!(
                "Unknown send failure policy '{other}'. Expected one of: abort, continue"
            ))),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing was open, so nothing was sent.
    NoOpenIssues(DispatchMode),
    Sent { mode: DispatchMode, count: usize },
}

impl DispatchOutcome {
    pub fn sent(&self) -> usize {
        match self {
            DispatchOutcome::NoOpenIssues(_) => 0,
            DispatchOutcome::Sent { count, .. } => *count,
        }
    }

    /// Human-readable summary returned to the caller of the cron endpoint.
    pub fn message(&self) -> String {
        match self {
            DispatchOutcome::NoOpenIssues(DispatchMode::Scheduled) => {
                "Cron job ran. No open issues.".to_string()
            }
            DispatchOutcome::NoOpenIssues(DispatchMode::Manual) => {
                "No teams had open issues to report.".to_string()
            }
            DispatchOutcome::Sent {
                mode: DispatchMode::Scheduled,
                count,
            } => format!("Cron job finished. Sent {count} reports."),
            DispatchOutcome::Sent {
                mode: DispatchMode::Manual,
                count,
            } => format!("Manually triggered {count} report(s) successfully."),
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to send report for {party}: {source}")]
    Send {
        party: ResponsibleParty,
        #[source]
        source: DeliveryError,
    },

    #[error("Failed to send {} report(s) ({}); {sent} sent", .failed.len(), party_list(.failed))]
    PartialFailure {
        failed: Vec<ResponsibleParty>,
        sent: usize,
    },
}

fn party_list(parties: &[ResponsibleParty]) -> String {
    parties
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// One report ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedReport {
    pub party: ResponsibleParty,
    pub payload: NotificationPayload,
}

/// Decide and render the reports for one run. Pure over its inputs.
///
/// Returns `None` when there are no unresolved issues at all.
pub fn plan_reports(
    mode: DispatchMode,
    issues: &[Issue],
    branch_names: &HashMap<DbId, String>,
    configs: &[ReportConfiguration],
    now: Timestamp,
    clock: &ReportClock,
) -> Option<Vec<PlannedReport>> {
    let mut by_party: HashMap<ResponsibleParty, Vec<Issue>> = HashMap::new();
    for issue in issues.iter().filter(|i| i.status.is_unresolved()) {
        by_party
            .entry(issue.responsibility)
            .or_default()
            .push(issue.clone());
    }
    if by_party.is_empty() {
        return None;
    }

    let default_config = configs.iter().find(|c| c.id == DEFAULT_REPORT_CONFIG_ID);
    let team_configs: HashMap<ResponsibleParty, &ReportConfiguration> = configs
        .iter()
        .filter(|c| c.id != DEFAULT_REPORT_CONFIG_ID)
        .filter_map(|c| match c.id.parse::<ResponsibleParty>() {
            Ok(party) => Some((party, c)),
            Err(_) => {
                tracing::warn!(config_id = %c.id, "Ignoring report configuration for unknown team");
                None
            }
        })
        .collect();

    let due: Vec<ResponsibleParty> = match mode {
        DispatchMode::Manual => ResponsibleParty::ALL
            .into_iter()
            .filter(|p| by_party.contains_key(p))
            .collect(),
        DispatchMode::Scheduled => {
            let current = clock.schedule_time(now);
            ResponsibleParty::ALL
                .into_iter()
                .filter(|p| {
                    team_configs
                        .get(p)
                        .is_some_and(|c| c.enabled && c.time == current)
                })
                .filter(|p| by_party.contains_key(p))
                .collect()
        }
    };

    Some(
        due.into_iter()
            .map(|party| {
                let config = EffectiveReportConfig::merge(
                    team_configs.get(&party).copied(),
                    default_config,
                );
                let party_issues = by_party.get(&party).map(Vec::as_slice).unwrap_or_default();
                let content = format_report(
                    party.as_str(),
                    party_issues,
                    branch_names,
                    &config,
                    now,
                    clock,
                );
                let payload = NotificationPayload {
                    channel: config.channel.clone(),
                    title: content.title,
                    body: content.body,
                    format: MessageFormat::Markdown,
                    notify_type: config.notify_type,
                    silent: config.silent,
                    attach: None,
                }
                .with_attachment(config.attach.as_deref());
                PlannedReport { party, payload }
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// ReportDispatcher
// ---------------------------------------------------------------------------

/// Runs report dispatches against a store and a sender.
pub struct ReportDispatcher {
    store: Arc<dyn Store>,
    sender: Arc<dyn NotificationSender>,
    clock: ReportClock,
    policy: SendFailurePolicy,
}

impl ReportDispatcher {
    pub fn new(
        store: Arc<dyn Store>,
        sender: Arc<dyn NotificationSender>,
        clock: ReportClock,
        policy: SendFailurePolicy,
    ) -> Self {
        Self {
            store,
            sender,
            clock,
            policy,
        }
    }

    pub fn clock(&self) -> &ReportClock {
        &self.clock
    }

    pub async fn run_scheduled(&self, now: Timestamp) -> Result<DispatchOutcome, DispatchError> {
        self.run(DispatchMode::Scheduled, now).await
    }

    pub async fn run_manual(&self, now: Timestamp) -> Result<DispatchOutcome, DispatchError> {
        self.run(DispatchMode::Manual, now).await
    }

    /// Fetch, plan and send one round of reports.
    pub async fn run(
        &self,
        mode: DispatchMode,
        now: Timestamp,
    ) -> Result<DispatchOutcome, DispatchError> {
        let (issues, branches, configs) = tokio::try_join!(
            self.store.list_issues(),
            self.store.list_branches(),
            self.store.list_report_configurations(),
        )?;

        let branch_names: HashMap<DbId, String> =
            branches.into_iter().map(|b| (b.id, b.name)).collect();

        let Some(planned) = plan_reports(mode, &issues, &branch_names, &configs, now, &self.clock)
        else {
            tracing::info!(?mode, "No open issues to report");
            return Ok(DispatchOutcome::NoOpenIssues(mode));
        };

        let mut sent = 0;
        let mut failed = Vec::new();
        for report in planned {
            match self.sender.send(&report.payload).await {
                Ok(()) => {
                    sent += 1;
                    tracing::info!(party = %report.party, ?mode, "Open issues report sent");
                }
                Err(e) => {
                    tracing::error!(party = %report.party, error = %e, "Failed to send open issues report");
                    match self.policy {
                        SendFailurePolicy::Abort => {
                            return Err(DispatchError::Send {
                                party: report.party,
                                source: e,
                            });
                        }
                        SendFailurePolicy::Continue => failed.push(report.party),
                    }
                }
            }
        }

        if !failed.is_empty() {
            return Err(DispatchError::PartialFailure { failed, sent });
        }
        Ok(DispatchOutcome::Sent { mode, count: sent })
    }
}
