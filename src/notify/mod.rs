//! Notification routing and delivery.
//!
//! - **Routing**: map an extracted verdict to a [`NotificationEvent`], or to
//!   nothing for statuses that should stay quiet
//! - **Links**: rewrite analysis-file paths to public URLs
//! - **Delivery**: invoke the host notify command, best-effort

mod deliver;
mod link;

pub use deliver::Notifier;
pub use link::rewrite_link;

use crate::config::NotifySettings;
use crate::status::{Status, Verdict};
use clap::ValueEnum;
use std::fmt;

/// Maximum description length, in characters.
pub const DESCRIPTION_LIMIT: usize = 200;

/// Notification importance understood by the host notify command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Importance {
    Normal,
    Warning,
    Alert,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Normal => "normal",
            Importance::Warning => "warning",
            Importance::Alert => "alert",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One notification to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub event_tag: String,
    pub subject: String,
    /// At most [`DESCRIPTION_LIMIT`] characters.
    pub description: String,
    pub importance: Importance,
    pub message: String,
    pub link: Option<String>,
}

/// Map a verdict to a notification.
///
/// `FAILURE` alerts and `AUTH_REQUIRED` warns; every other status is
/// suppressed so routine successes do not generate noise.
pub fn route(
    verdict: &Verdict,
    settings: &NotifySettings,
    link: Option<&str>,
) -> Option<NotificationEvent> {
    let importance = match verdict.status {
        Status::Failure => Importance::Alert,
        Status::AuthRequired => Importance::Warning,
        Status::Success | Status::Unknown | Status::Other(_) => return None,
    };

    let status = verdict.status.as_str();
    let description = if verdict.diagnosis.is_empty() {
        format!("Status: {}", status)
    } else {
        truncate_chars(&verdict.diagnosis, DESCRIPTION_LIMIT)
    };

    Some(NotificationEvent {
        event_tag: settings.event.clone(),
        subject: format!("{}: {}", settings.subject_prefix, status),
        description,
        importance,
        message: format!(
            "The monitored script reported: {}\n\n{}",
            status, verdict.diagnosis
        ),
        link: link.map(str::to_string),
    })
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::extract;

    fn verdict(status: Status, diagnosis: &str) -> Verdict {
        Verdict {
            status,
            diagnosis: diagnosis.to_string(),
        }
    }

    #[test]
    fn test_failure_routes_to_alert() {
        let settings = NotifySettings::default();
        let v = extract("STATUS: FAILURE\nDIAGNOSIS: element not found\nFAILED_ELEMENT: button\n");

        let event = route(&v, &settings, None).unwrap();

        assert_eq!(event.importance, Importance::Alert);
        assert_eq!(event.description, "element not found");
        assert_eq!(event.subject, "Takeout Script: FAILURE");
        assert_eq!(event.event_tag, "copilot-system-monitor");
        assert!(event.message.starts_with("The monitored script reported: FAILURE\n\n"));
        assert!(event.message.ends_with("element not found"));
    }

    #[test]
    fn test_auth_required_routes_to_warning() {
        let event = route(
            &verdict(Status::AuthRequired, "Google asked for 2FA"),
            &NotifySettings::default(),
            Some("/state/analysis/output.txt"),
        )
        .unwrap();

        assert_eq!(event.importance, Importance::Warning);
        assert_eq!(event.link.as_deref(), Some("/state/analysis/output.txt"));
    }

    #[test]
    fn test_quiet_statuses_emit_nothing() {
        let settings = NotifySettings::default();
        for status in [
            Status::Success,
            Status::Unknown,
            Status::Other("PARTIAL".to_string()),
        ] {
            assert!(route(&verdict(status, "whatever"), &settings, None).is_none());
        }
    }

    #[test]
    fn test_empty_diagnosis_uses_fallback_description() {
        let event = route(&verdict(Status::Failure, ""), &NotifySettings::default(), None).unwrap();
        assert_eq!(event.description, "Status: FAILURE");
    }

    #[test]
    fn test_description_truncated_message_is_full() {
        let long = "x".repeat(450);
        let event = route(&verdict(Status::Failure, &long), &NotifySettings::default(), None).unwrap();

        assert_eq!(event.description.chars().count(), DESCRIPTION_LIMIT);
        assert!(event.message.contains(&long));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(truncate_chars(&long, 200).chars().count(), 200);
    }
}
