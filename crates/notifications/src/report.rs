//! Per-wake and per-rule outcome reporting.
//!
//! Per-user failures are collected into a [`BatchReport`] instead of
//! aborting the batch; a [`WakeReport`] holds one [`RuleOutcome`] per rule.

use skilltrack_core::notification_rules::{RULE_INACTIVITY_REMINDER, RULE_WEEKLY_SUMMARY};
use skilltrack_core::types::Timestamp;

use crate::error::NotificationError;

/// What happened for a single user within a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The dispatcher accepted the notification.
    Sent,
    /// Nothing to send (e.g. a summary with zero skills).
    Skipped,
    /// The dispatcher reported a transport failure.
    Rejected,
}

/// Counters for one execution of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub rule: &'static str,
    /// Users that matched the rule's selection predicate.
    pub eligible: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchReport {
    pub fn new(rule: &'static str) -> Self {
        Self {
            rule,
            eligible: 0,
            sent: 0,
            failed: 0,
            skipped: 0,
        }
    }

    /// Tally one user's result, logging failures with the recipient address.
    pub fn record(&mut self, recipient: &str, result: Result<Delivery, NotificationError>) {
        match result {
            Ok(Delivery::Sent) => self.sent += 1,
            Ok(Delivery::Skipped) => self.skipped += 1,
            Ok(Delivery::Rejected) => {
                self.failed += 1;
                tracing::error!(
                    rule = self.rule,
                    to = recipient,
                    "Notification send failed"
                );
            }
            Err(e) => {
                self.failed += 1;
                tracing::error!(
                    rule = self.rule,
                    to = recipient,
                    error = %e,
                    "Failed to prepare notification"
                );
            }
        }
    }
}

/// Result of evaluating one rule during a wake.
#[derive(Debug)]
pub enum RuleOutcome {
    /// The rule's time condition did not hold.
    NotDue,
    /// The rule ran; per-user results are in the report.
    Completed(BatchReport),
    /// The rule could not run at all (e.g. listing users failed).
    Failed(NotificationError),
}

impl From<Result<BatchReport, NotificationError>> for RuleOutcome {
    fn from(result: Result<BatchReport, NotificationError>) -> Self {
        match result {
            Ok(report) => Self::Completed(report),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Everything that happened during one scheduler wake.
#[derive(Debug)]
pub struct WakeReport {
    pub evaluated_at: Timestamp,
    pub weekly_summary: RuleOutcome,
    pub inactivity_reminder: RuleOutcome,
}

impl WakeReport {
    /// Emit one log line per rule.
    pub fn log(&self) {
        for (rule, outcome) in [
            (RULE_WEEKLY_SUMMARY, &self.weekly_summary),
            (RULE_INACTIVITY_REMINDER, &self.inactivity_reminder),
        ] {
            match outcome {
                RuleOutcome::NotDue => tracing::debug!(rule, "Rule not due"),
                RuleOutcome::Completed(report) => tracing::info!(
                    rule,
                    eligible = report.eligible,
                    sent = report.sent,
                    failed = report.failed,
                    skipped = report.skipped,
                    "Notification batch finished"
                ),
                RuleOutcome::Failed(e) => {
                    tracing::error!(rule, error = %e, "Notification rule failed")
                }
            }
        }
    }
}
