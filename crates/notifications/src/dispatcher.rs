//! Best-effort notification sends.
//!
//! A dispatcher never surfaces transport errors to its caller. Each send
//! returns `true` on success; failures are logged here with the recipient
//! and turned into `false`. There is no retry.

use async_trait::async_trait;
use chrono::Utc;
use skilltrack_core::summary::SkillSummary;

use crate::delivery::email::{EmailConfig, EmailDelivery};
use crate::templates;

/// Capability consumed by the scheduler to deliver notifications.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Send a weekly skill summary. Returns whether transmission succeeded.
    async fn send_summary(
        &self,
        recipient: &str,
        display_name: &str,
        summary: &SkillSummary,
    ) -> bool;

    /// Send an inactivity reminder. Returns whether transmission succeeded.
    async fn send_reminder(
        &self,
        recipient: &str,
        display_name: &str,
        days_since_last_update: i64,
    ) -> bool;
}

// ---------------------------------------------------------------------------
// EmailDispatcher
// ---------------------------------------------------------------------------

/// SMTP-backed dispatcher.
///
/// Without an [`EmailDelivery`] every send logs a warning and returns
/// `false`, so an unconfigured deployment keeps running without mail.
pub struct EmailDispatcher {
    delivery: Option<EmailDelivery>,
}

impl EmailDispatcher {
    pub fn new(delivery: Option<EmailDelivery>) -> Self {
        Self { delivery }
    }

    /// Build from [`EmailConfig::from_env`].
    ///
    /// A present-but-invalid configuration is logged and treated as absent.
    pub fn from_env() -> Self {
        let delivery = match EmailConfig::from_env() {
            Some(config) => match EmailDelivery::new(config) {
                Ok(delivery) => {
                    tracing::info!(
                        smtp_host = %delivery.config().smtp_host,
                        smtp_port = delivery.config().smtp_port,
                        "Email delivery configured"
                    );
                    Some(delivery)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Invalid SMTP configuration, email disabled");
                    None
                }
            },
            None => {
                tracing::warn!("SMTP_HOST not set, email delivery disabled");
                None
            }
        };
        Self::new(delivery)
    }

    pub fn is_configured(&self) -> bool {
        self.delivery.is_some()
    }

    /// Send a diagnostic email to confirm the SMTP settings work.
    pub async fn send_test_email(&self, recipient: &str) -> bool {
        self.send(recipient, templates::TEST_SUBJECT, |_| {
            templates::test_body(Utc::now())
        })
        .await
    }

    /// Render with the configured dashboard URL and send, converting any
    /// failure into `false`.
    async fn send<F>(&self, recipient: &str, subject: &str, render: F) -> bool
    where
        F: FnOnce(&str) -> String + Send,
    {
        let Some(delivery) = &self.delivery else {
            tracing::warn!(
                to = recipient,
                subject,
                "Email configuration is missing. Email not sent"
            );
            return false;
        };

        let body = render(&delivery.config().dashboard_url);
        match delivery.send(recipient, subject, body).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(to = recipient, subject, error = %e, "Failed to send email");
                false
            }
        }
    }
}

#[async_trait]
impl NotificationDispatcher for EmailDispatcher {
    async fn send_summary(
        &self,
        recipient: &str,
        display_name: &str,
        summary: &SkillSummary,
    ) -> bool {
        self.send(recipient, templates::SUMMARY_SUBJECT, |url| {
            templates::summary_body(display_name, summary, url)
        })
        .await
    }

    async fn send_reminder(
        &self,
        recipient: &str,
        display_name: &str,
        days_since_last_update: i64,
    ) -> bool {
        self.send(recipient, templates::REMINDER_SUBJECT, |url| {
            templates::reminder_body(display_name, days_since_last_update, url)
        })
        .await
    }
}
