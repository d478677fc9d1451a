//! Periodic notification scheduler.
//!
//! [`NotificationScheduler`] runs as a single background task. Every wake it
//! evaluates the weekly summary and inactivity reminder rules against the
//! current UTC time, sends what is due, and goes back to sleep. Failures
//! (including panics) are contained to the wake that raised them; only the
//! [`CancellationToken`] ends the loop.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use skilltrack_core::notification_rules::{
    days_since, is_inactive, is_weekly_summary_due, RULE_INACTIVITY_REMINDER,
    RULE_WEEKLY_SUMMARY,
};
use skilltrack_core::summary::summarize;
use skilltrack_core::types::Timestamp;
use skilltrack_db::models::user::User;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::NotificationDispatcher;
use crate::error::NotificationError;
use crate::report::{BatchReport, Delivery, RuleOutcome, WakeReport};
use crate::store::SkillStore;

/// Default wake cadence.
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;

// ---------------------------------------------------------------------------
// SchedulerConfig
// ---------------------------------------------------------------------------

/// Scheduler tuning.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between wakes.
    pub check_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
        }
    }
}

impl SchedulerConfig {
    /// Load from `NOTIFICATION_CHECK_INTERVAL_SECS` (default `3600`).
    pub fn from_env() -> Self {
        let raw = std::env::var("NOTIFICATION_CHECK_INTERVAL_SECS").ok();
        Self {
            check_interval: parse_interval(raw.as_deref()),
        }
    }
}

/// Parse an interval in seconds, falling back to the default for missing,
/// malformed, or zero values.
fn parse_interval(raw: Option<&str>) -> Duration {
    let secs = match raw.map(str::parse::<u64>) {
        None => DEFAULT_CHECK_INTERVAL_SECS,
        Some(Ok(0)) | Some(Err(_)) => {
            tracing::warn!(
                value = raw.unwrap_or_default(),
                default = DEFAULT_CHECK_INTERVAL_SECS,
                "Invalid NOTIFICATION_CHECK_INTERVAL_SECS, using default"
            );
            DEFAULT_CHECK_INTERVAL_SECS
        }
        Some(Ok(secs)) => secs,
    };

    if secs < DEFAULT_CHECK_INTERVAL_SECS {
        tracing::warn!(
            interval_secs = secs,
            "Check interval is shorter than one hour; weekly summaries may be sent more than once"
        );
    }
    Duration::from_secs(secs)
}

/// `tokio::time::interval` panics on a zero period; fall back to the default.
fn effective_interval(configured: Duration) -> Duration {
    if configured.is_zero() {
        tracing::warn!(
            default = DEFAULT_CHECK_INTERVAL_SECS,
            "Zero check interval configured, using default"
        );
        Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS)
    } else {
        configured
    }
}

// ---------------------------------------------------------------------------
// NotificationScheduler
// ---------------------------------------------------------------------------

/// Background service that evaluates notification rules on a fixed cadence.
pub struct NotificationScheduler {
    store: Arc<dyn SkillStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    config: SchedulerConfig,
}

impl NotificationScheduler {
    pub fn new(
        store: Arc<dyn SkillStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            config,
        }
    }

    /// Run the scheduler loop until `cancel` is triggered.
    ///
    /// The first wake happens immediately. Cancellation is observed before
    /// each wake and while sleeping, never in the middle of a batch.
    pub async fn run(&self, cancel: CancellationToken) {
        let period = effective_interval(self.config.check_interval);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = period.as_secs(),
            "Notification scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Notification scheduler stopping");
                    break;
                }
                _ = interval.tick() => self.wake().await,
            }
        }
    }

    /// One guarded wake: a panic inside the rules is logged and swallowed.
    async fn wake(&self) {
        let now = Utc::now();
        match AssertUnwindSafe(self.run_once(now)).catch_unwind().await {
            Ok(report) => report.log(),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(%now, panic = %message, "Notification wake panicked");
            }
        }
    }

    /// Evaluate both rules as of `now`.
    ///
    /// The rules are independent: if one cannot run, the other still does.
    pub async fn run_once(&self, now: Timestamp) -> WakeReport {
        let weekly_summary = if is_weekly_summary_due(now) {
            self.send_weekly_summaries().await.into()
        } else {
            RuleOutcome::NotDue
        };
        let inactivity_reminder = self.send_inactivity_reminders(now).await.into();

        WakeReport {
            evaluated_at: now,
            weekly_summary,
            inactivity_reminder,
        }
    }

    /// Send a skill summary to every opted-in user who has at least one skill.
    ///
    /// Only a failure to list users aborts the batch.
    pub async fn send_weekly_summaries(&self) -> Result<BatchReport, NotificationError> {
        let users = self.store.list_users_with_notifications_enabled().await?;

        let mut report = BatchReport::new(RULE_WEEKLY_SUMMARY);
        report.eligible = users.len();
        for user in &users {
            let result = self.deliver_summary(user).await;
            report.record(&user.email, result);
        }
        Ok(report)
    }

    async fn deliver_summary(&self, user: &User) -> Result<Delivery, NotificationError> {
        let skills = self.store.list_skills_for_user(user.id).await?;
        let summary = summarize(&skills);
        if summary.is_empty() {
            return Ok(Delivery::Skipped);
        }

        let sent = self
            .dispatcher
            .send_summary(&user.email, &user.display_name(), &summary)
            .await;
        Ok(delivered(sent))
    }

    /// Remind opted-in users whose newest skill update is older than the
    /// inactivity window.
    ///
    /// Users whose eligibility cannot be determined are counted as failed,
    /// not eligible.
    pub async fn send_inactivity_reminders(
        &self,
        now: Timestamp,
    ) -> Result<BatchReport, NotificationError> {
        let users = self.store.list_users_with_notifications_enabled().await?;

        let mut report = BatchReport::new(RULE_INACTIVITY_REMINDER);
        for user in &users {
            let last_updated = match self.store.max_last_updated_for_user(user.id).await {
                Ok(Some(last)) if is_inactive(last, now) => last,
                Ok(_) => continue,
                Err(e) => {
                    report.record(&user.email, Err(e));
                    continue;
                }
            };

            report.eligible += 1;
            let sent = self
                .dispatcher
                .send_reminder(
                    &user.email,
                    &user.display_name(),
                    days_since(last_updated, now),
                )
                .await;
            report.record(&user.email, Ok(delivered(sent)));
        }
        Ok(report)
    }
}

fn delivered(sent: bool) -> Delivery {
    if sent {
        Delivery::Sent
    } else {
        Delivery::Rejected
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use skilltrack_core::skill::{SkillInfo, SkillLevel};
    use skilltrack_core::summary::SkillSummary;
    use skilltrack_core::types::DbId;

    use super::*;

    // -- fixtures -----------------------------------------------------------

    /// 2025-03-10 is a Monday.
    fn monday_nine() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 15, 0).unwrap()
    }

    fn tuesday_noon() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 11, 12, 0, 0).unwrap()
    }

    fn user(id: DbId, email: &str, enabled: bool) -> User {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        User {
            id,
            email: email.to_string(),
            password_hash: String::new(),
            first_name: "User".to_string(),
            last_name: id.to_string(),
            email_notifications_enabled: enabled,
            last_login_at: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn skill(id: DbId, user_id: DbId, category: &str, last_updated: Timestamp) -> SkillInfo {
        SkillInfo {
            id,
            user_id,
            name: format!("skill-{id}"),
            category: category.to_string(),
            description: None,
            level: SkillLevel::Beginner,
            created_at: last_updated - ChronoDuration::days(1),
            last_updated,
        }
    }

    #[derive(Default)]
    struct InMemoryStore {
        users: Vec<User>,
        skills: Vec<SkillInfo>,
        /// Users whose per-user queries fail.
        broken_users: HashSet<DbId>,
        /// Number of upcoming user listings that fail.
        failing_listings: AtomicUsize,
    }

    fn store_error() -> NotificationError {
        NotificationError::Store(sqlx::Error::PoolTimedOut)
    }

    #[async_trait]
    impl SkillStore for InMemoryStore {
        async fn list_users_with_notifications_enabled(
            &self,
        ) -> Result<Vec<User>, NotificationError> {
            let failing = self
                .failing_listings
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(store_error());
            }
            Ok(self
                .users
                .iter()
                .filter(|u| u.email_notifications_enabled)
                .cloned()
                .collect())
        }

        async fn list_skills_for_user(
            &self,
            user_id: DbId,
        ) -> Result<Vec<SkillInfo>, NotificationError> {
            if self.broken_users.contains(&user_id) {
                return Err(store_error());
            }
            Ok(self
                .skills
                .iter()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn max_last_updated_for_user(
            &self,
            user_id: DbId,
        ) -> Result<Option<Timestamp>, NotificationError> {
            if self.broken_users.contains(&user_id) {
                return Err(store_error());
            }
            Ok(self
                .skills
                .iter()
                .filter(|s| s.user_id == user_id)
                .map(|s| s.last_updated)
                .max())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Summary { to: String, total: usize },
        Reminder { to: String, days: i64 },
    }

    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Mutex<Vec<Sent>>,
        /// Recipients whose sends report a transport failure.
        rejecting: HashSet<String>,
    }

    impl RecordingDispatcher {
        fn rejecting(addresses: &[&str]) -> Self {
            Self {
                rejecting: addresses.iter().map(|a| a.to_string()).collect(),
                ..Default::default()
            }
        }

        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn send_summary(
            &self,
            recipient: &str,
            _display_name: &str,
            summary: &SkillSummary,
        ) -> bool {
            self.sent.lock().unwrap().push(Sent::Summary {
                to: recipient.to_string(),
                total: summary.total_skills,
            });
            !self.rejecting.contains(recipient)
        }

        async fn send_reminder(
            &self,
            recipient: &str,
            _display_name: &str,
            days_since_last_update: i64,
        ) -> bool {
            self.sent.lock().unwrap().push(Sent::Reminder {
                to: recipient.to_string(),
                days: days_since_last_update,
            });
            !self.rejecting.contains(recipient)
        }
    }

    fn scheduler(
        store: InMemoryStore,
        dispatcher: RecordingDispatcher,
    ) -> (NotificationScheduler, Arc<RecordingDispatcher>) {
        let dispatcher = Arc::new(dispatcher);
        let scheduler = NotificationScheduler::new(
            Arc::new(store),
            dispatcher.clone(),
            SchedulerConfig::default(),
        );
        (scheduler, dispatcher)
    }

    // -- weekly summary -----------------------------------------------------

    #[tokio::test]
    async fn weekly_summary_skips_users_without_skills() {
        let now = monday_nine();
        let store = InMemoryStore {
            users: vec![
                user(1, "a@example.com", true),
                user(2, "b@example.com", true),
                user(3, "c@example.com", false),
            ],
            skills: vec![
                skill(1, 1, "Web", now),
                skill(2, 1, "Data", now),
                skill(3, 3, "Web", now),
            ],
            ..Default::default()
        };
        let (scheduler, dispatcher) = scheduler(store, RecordingDispatcher::default());

        let report = scheduler.send_weekly_summaries().await.unwrap();

        assert_eq!(report.eligible, 2);
        assert_eq!(report.sent, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(
            dispatcher.sent(),
            vec![Sent::Summary {
                to: "a@example.com".into(),
                total: 2
            }]
        );
    }

    #[tokio::test]
    async fn weekly_transport_failure_does_not_stop_other_users() {
        let now = monday_nine();
        let store = InMemoryStore {
            users: vec![
                user(1, "a@example.com", true),
                user(2, "b@example.com", true),
            ],
            skills: vec![skill(1, 1, "Web", now), skill(2, 2, "Web", now)],
            ..Default::default()
        };
        let (scheduler, dispatcher) =
            scheduler(store, RecordingDispatcher::rejecting(&["a@example.com"]));

        let report = scheduler.send_weekly_summaries().await.unwrap();

        assert_eq!(report.sent, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(dispatcher.sent().len(), 2);
    }

    #[tokio::test]
    async fn weekly_store_error_for_one_user_is_isolated() {
        let now = monday_nine();
        let store = InMemoryStore {
            users: vec![
                user(1, "a@example.com", true),
                user(2, "b@example.com", true),
            ],
            skills: vec![skill(1, 1, "Web", now), skill(2, 2, "Web", now)],
            broken_users: HashSet::from([1]),
            ..Default::default()
        };
        let (scheduler, dispatcher) = scheduler(store, RecordingDispatcher::default());

        let report = scheduler.send_weekly_summaries().await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(
            dispatcher.sent(),
            vec![Sent::Summary {
                to: "b@example.com".into(),
                total: 1
            }]
        );
    }

    // -- inactivity reminder ------------------------------------------------

    #[tokio::test]
    async fn inactivity_selects_only_users_past_the_window() {
        let now = tuesday_noon();
        let store = InMemoryStore {
            users: vec![
                user(1, "stale@example.com", true),
                user(2, "fresh@example.com", true),
                user(3, "boundary@example.com", true),
                user(4, "empty@example.com", true),
                user(5, "optout@example.com", false),
            ],
            skills: vec![
                skill(1, 1, "Web", now - ChronoDuration::days(40)),
                skill(2, 1, "Web", now - ChronoDuration::days(31)),
                skill(3, 2, "Web", now - ChronoDuration::days(29)),
                skill(4, 3, "Web", now - ChronoDuration::days(30)),
                skill(5, 5, "Web", now - ChronoDuration::days(90)),
            ],
            ..Default::default()
        };
        let (scheduler, dispatcher) = scheduler(store, RecordingDispatcher::default());

        let report = scheduler.send_inactivity_reminders(now).await.unwrap();

        assert_eq!(report.eligible, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(
            dispatcher.sent(),
            vec![Sent::Reminder {
                to: "stale@example.com".into(),
                days: 31
            }]
        );
    }

    #[tokio::test]
    async fn inactivity_store_error_counts_as_failed() {
        let now = tuesday_noon();
        let store = InMemoryStore {
            users: vec![
                user(1, "a@example.com", true),
                user(2, "b@example.com", true),
            ],
            skills: vec![
                skill(1, 1, "Web", now - ChronoDuration::days(60)),
                skill(2, 2, "Web", now - ChronoDuration::days(60)),
            ],
            broken_users: HashSet::from([1]),
            ..Default::default()
        };
        let (scheduler, dispatcher) = scheduler(store, RecordingDispatcher::default());

        let report = scheduler.send_inactivity_reminders(now).await.unwrap();

        assert_eq!(report.eligible, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(
            dispatcher.sent(),
            vec![Sent::Reminder {
                to: "b@example.com".into(),
                days: 60
            }]
        );
    }

    // -- wakes --------------------------------------------------------------

    #[tokio::test]
    async fn weekly_rule_is_not_due_outside_the_window() {
        let store = InMemoryStore {
            users: vec![user(1, "a@example.com", true)],
            skills: vec![skill(1, 1, "Web", tuesday_noon())],
            ..Default::default()
        };
        let (scheduler, dispatcher) = scheduler(store, RecordingDispatcher::default());

        let report = scheduler.run_once(tuesday_noon()).await;

        assert_matches!(report.weekly_summary, RuleOutcome::NotDue);
        assert_matches!(
            report.inactivity_reminder,
            RuleOutcome::Completed(ref r) if r.eligible == 0
        );
        assert!(dispatcher.sent().is_empty());
    }

    #[tokio::test]
    async fn both_rules_run_in_the_weekly_window() {
        let now = monday_nine();
        let store = InMemoryStore {
            users: vec![user(1, "a@example.com", true)],
            skills: vec![skill(1, 1, "Web", now - ChronoDuration::days(45))],
            ..Default::default()
        };
        let (scheduler, dispatcher) = scheduler(store, RecordingDispatcher::default());

        let report = scheduler.run_once(now).await;

        assert_matches!(report.weekly_summary, RuleOutcome::Completed(ref r) if r.sent == 1);
        assert_matches!(report.inactivity_reminder, RuleOutcome::Completed(ref r) if r.sent == 1);
        assert_eq!(dispatcher.sent().len(), 2);
    }

    #[tokio::test]
    async fn listing_failure_in_one_rule_does_not_block_the_other() {
        let now = monday_nine();
        let store = InMemoryStore {
            users: vec![user(1, "a@example.com", true)],
            skills: vec![skill(1, 1, "Web", now - ChronoDuration::days(45))],
            failing_listings: AtomicUsize::new(1),
            ..Default::default()
        };
        let (scheduler, dispatcher) = scheduler(store, RecordingDispatcher::default());

        let report = scheduler.run_once(now).await;

        assert_matches!(report.weekly_summary, RuleOutcome::Failed(NotificationError::Store(_)));
        assert_matches!(report.inactivity_reminder, RuleOutcome::Completed(ref r) if r.sent == 1);
        assert_eq!(
            dispatcher.sent(),
            vec![Sent::Reminder {
                to: "a@example.com".into(),
                days: 45
            }]
        );
    }

    #[tokio::test]
    async fn hourly_wakes_send_one_summary_per_week() {
        let sunday = Utc.with_ymd_and_hms(2025, 3, 9, 0, 30, 0).unwrap();
        let store = InMemoryStore {
            users: vec![user(1, "a@example.com", true)],
            skills: vec![skill(1, 1, "Web", sunday)],
            ..Default::default()
        };
        let (scheduler, dispatcher) = scheduler(store, RecordingDispatcher::default());

        for hour in 0..(24 * 7) {
            scheduler.run_once(sunday + ChronoDuration::hours(hour)).await;
        }

        let summaries = dispatcher
            .sent()
            .into_iter()
            .filter(|s| matches!(s, Sent::Summary { .. }))
            .count();
        assert_eq!(summaries, 1);
    }

    // -- run loop -----------------------------------------------------------

    /// Store whose every call panics, counting how often it was reached.
    #[derive(Default)]
    struct PanickingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SkillStore for PanickingStore {
        async fn list_users_with_notifications_enabled(
            &self,
        ) -> Result<Vec<User>, NotificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            panic!("store exploded");
        }

        async fn list_skills_for_user(&self, _: DbId) -> Result<Vec<SkillInfo>, NotificationError> {
            panic!("store exploded");
        }

        async fn max_last_updated_for_user(
            &self,
            _: DbId,
        ) -> Result<Option<Timestamp>, NotificationError> {
            panic!("store exploded");
        }
    }

    fn fast_config() -> SchedulerConfig {
        SchedulerConfig {
            check_interval: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn run_survives_panicking_wakes_and_stops_on_cancel() {
        let store = Arc::new(PanickingStore::default());
        let scheduler = NotificationScheduler::new(
            store.clone(),
            Arc::new(RecordingDispatcher::default()),
            fast_config(),
        );
        let cancel = CancellationToken::new();
        let handle = tokio::spawn({
            let cancel = cancel.clone();
            async move { scheduler.run(cancel).await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler should stop after cancellation")
            .expect("scheduler task should not panic");
        assert!(store.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn run_exits_without_waking_when_already_cancelled() {
        let store = Arc::new(PanickingStore::default());
        let scheduler = NotificationScheduler::new(
            store.clone(),
            Arc::new(RecordingDispatcher::default()),
            fast_config(),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(5), scheduler.run(cancel))
            .await
            .expect("scheduler should return immediately");
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn run_with_zero_interval_wakes_once_and_stops_on_cancel() {
        let store = Arc::new(PanickingStore::default());
        let scheduler = NotificationScheduler::new(
            store.clone(),
            Arc::new(RecordingDispatcher::default()),
            SchedulerConfig {
                check_interval: Duration::ZERO,
            },
        );
        let cancel = CancellationToken::new();
        let handle = tokio::spawn({
            let cancel = cancel.clone();
            async move { scheduler.run(cancel).await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler should stop after cancellation")
            .expect("scheduler task should not panic");
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    // -- config -------------------------------------------------------------

    #[test]
    fn interval_defaults_to_one_hour() {
        assert_eq!(SchedulerConfig::default().check_interval, Duration::from_secs(3600));
        assert_eq!(parse_interval(None), Duration::from_secs(3600));
    }

    #[test]
    fn interval_rejects_zero_and_garbage() {
        assert_eq!(parse_interval(Some("0")), Duration::from_secs(3600));
        assert_eq!(parse_interval(Some("hourly")), Duration::from_secs(3600));
        assert_eq!(parse_interval(Some("7200")), Duration::from_secs(7200));
        assert_eq!(parse_interval(Some("60")), Duration::from_secs(60));
    }

    #[test]
    fn zero_interval_falls_back_to_default() {
        assert_eq!(effective_interval(Duration::ZERO), Duration::from_secs(3600));
        assert_eq!(effective_interval(Duration::from_secs(5)), Duration::from_secs(5));
    }
}
