//! Email notifications for SkillTrack.
//!
//! This crate owns the background notification subsystem:
//!
//! - [`SkillStore`] -- read-only view of users and skills, backed by Postgres
//!   in production ([`PgSkillStore`]).
//! - [`NotificationDispatcher`] -- best-effort summary/reminder sends, backed
//!   by SMTP in production ([`EmailDispatcher`]).
//! - [`delivery`] -- the `lettre` SMTP transport wrapper.
//! - [`NotificationScheduler`] -- the hourly loop that evaluates the weekly
//!   summary and inactivity reminder rules.

pub mod delivery;
pub mod dispatcher;
pub mod error;
pub mod report;
pub mod scheduler;
pub mod store;
pub mod templates;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use dispatcher::{EmailDispatcher, NotificationDispatcher};
pub use error::NotificationError;
pub use report::{BatchReport, Delivery, RuleOutcome, WakeReport};
pub use scheduler::{NotificationScheduler, SchedulerConfig};
pub use store::{PgSkillStore, SkillStore};
