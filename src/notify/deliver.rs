//! Delivery through the host notify command.

use super::{NotificationEvent, rewrite_link};
use crate::config::NotifySettings;
use crate::error::{MedicError, Result};
use crate::process::run_bounded;
use std::time::Duration;

/// Best-effort notification sender.
pub struct Notifier<'a> {
    settings: &'a NotifySettings,
}

impl<'a> Notifier<'a> {
    pub fn new(settings: &'a NotifySettings) -> Self {
        Self { settings }
    }

    /// Deliver `event`. Failures are logged and reported as `false`, never raised.
    pub fn deliver(&self, event: &NotificationEvent) -> bool {
        match self.try_deliver(event) {
            Ok(()) => {
                tracing::info!(subject = %event.subject, importance = %event.importance, "notification sent");
                true
            }
            Err(e) => {
                tracing::error!(subject = %event.subject, error = %e, "failed to send notification");
                false
            }
        }
    }

    fn try_deliver(&self, event: &NotificationEvent) -> Result<()> {
        let mut argv = shell_words::split(&self.settings.command).map_err(|e| {
            MedicError::Notify(format!(
                "failed to parse notify command '{}': {}",
                self.settings.command, e
            ))
        })?;
        if argv.is_empty() {
            return Err(MedicError::Notify("notify.command is empty".to_string()));
        }
        let program = argv.remove(0);
        argv.extend(self.event_args(event));

        let out = run_bounded(
            &program,
            &argv,
            Duration::from_secs(self.settings.timeout_seconds),
        )
        .map_err(|e| MedicError::Notify(e.to_string()))?;

        if out.is_success() {
            Ok(())
        } else if out.timed_out {
            Err(MedicError::Notify(format!(
                "'{}' timed out after {}s",
                program, self.settings.timeout_seconds
            )))
        } else {
            Err(MedicError::Notify(format!(
                "'{}' exited with {:?}: {}",
                program,
                out.exit_code,
                out.stderr.trim()
            )))
        }
    }

    fn event_args(&self, event: &NotificationEvent) -> Vec<String> {
        let mut args = vec![
            "-e".to_string(),
            event.event_tag.clone(),
            "-s".to_string(),
            event.subject.clone(),
            "-d".to_string(),
            event.description.clone(),
            "-i".to_string(),
            event.importance.as_str().to_string(),
        ];
        if !event.message.is_empty() {
            args.push("-m".to_string());
            args.push(event.message.clone());
        }
        if let Some(link) = event.link.as_deref().filter(|l| !l.is_empty()) {
            args.push("-l".to_string());
            args.push(rewrite_link(link, self.settings));
        }
        args
    }
}
