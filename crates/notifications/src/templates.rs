//! Subjects and HTML bodies for outgoing emails.
//!
//! Bodies are assembled with `format!`; every user-supplied string passes
//! through [`escape_html`] first.

use std::fmt::Write;

use skilltrack_core::summary::SkillSummary;
use skilltrack_core::types::Timestamp;

pub const SUMMARY_SUBJECT: &str = "Your Skills Summary - Skill Tracking App";
pub const REMINDER_SUBJECT: &str = "Time to Update Your Skills! - Skill Tracking App";
pub const TEST_SUBJECT: &str = "Test Email - Skill Tracking App";

const FOOTER: &str = "<p style=\"color:#666;font-size:12px\">You're receiving this email because \
    you have notifications enabled in Skill Tracking App. To stop receiving these emails, \
    update your preferences in your profile settings.</p>";

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Weekly summary body: totals, per-category and per-level counts, and the
/// recently updated list.
pub fn summary_body(display_name: &str, summary: &SkillSummary, dashboard_url: &str) -> String {
    let mut categories = String::new();
    for (category, count) in &summary.by_category {
        let _ = write!(
            categories,
            "<li><strong>{}</strong>: {count} skills</li>",
            escape_html(category)
        );
    }

    let mut levels = String::new();
    for (level, count) in &summary.by_level {
        let _ = write!(levels, "<li><strong>{level}</strong>: {count} skills</li>");
    }

    let mut recent = String::new();
    for skill in &summary.recently_updated {
        let _ = write!(
            recent,
            "<div style=\"border-left:3px solid #4CAF50;padding:10px;margin:10px 0\">\
             <strong>{}</strong> ({}) - {}<br><small>Updated: {}</small></div>",
            escape_html(&skill.name),
            escape_html(&skill.category),
            skill.level,
            skill.last_updated.format("%Y-%m-%d"),
        );
    }

    format!(
        "<html><body style=\"font-family:Arial,sans-serif;color:#333\">\
         <h1>Skills Summary</h1>\
         <p>Hi {name},</p>\
         <p>Here's your current skills summary:</p>\
         <p><strong>{total}</strong> Total Skills</p>\
         <h3>Skills by Category:</h3><ul>{categories}</ul>\
         <h3>Skills by Level:</h3><ul>{levels}</ul>\
         <h3>Recently Updated:</h3>{recent}\
         <p><a href=\"{url}\">View Your Dashboard</a></p>\
         {FOOTER}</body></html>",
        name = escape_html(display_name),
        total = summary.total_skills,
        url = escape_html(dashboard_url),
    )
}

/// Inactivity reminder body carrying the elapsed-days count.
pub fn reminder_body(
    display_name: &str,
    days_since_last_update: i64,
    dashboard_url: &str,
) -> String {
    format!(
        "<html><body style=\"font-family:Arial,sans-serif;color:#333\">\
         <h1>Skill Update Reminder</h1>\
         <p>Hi {name},</p>\
         <p>It's been <strong>{days_since_last_update} days</strong> since you last updated \
         your skills!</p>\
         <p>Keeping your skills up-to-date helps you:</p>\
         <ul><li>Track your learning progress</li>\
         <li>Stay motivated on your development journey</li>\
         <li>Identify areas for growth</li></ul>\
         <p><a href=\"{url}\">Update My Skills</a></p>\
         {FOOTER}</body></html>",
        name = escape_html(display_name),
        url = escape_html(dashboard_url),
    )
}

/// Diagnostic body used to verify SMTP configuration.
pub fn test_body(sent_at: Timestamp) -> String {
    format!(
        "<html><body style=\"font-family:Arial,sans-serif;color:#333\">\
         <h1>Test Email</h1>\
         <p>This is a <strong>test email</strong> from the Skill Tracking Application.</p>\
         <p>If you're reading this, your email service is configured correctly.</p>\
         <p style=\"color:#718096;font-size:12px\">Sent on: {}</p>\
         </body></html>",
        sent_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
