//! Implementation of the `medic notify` command.

use crate::cli::NotifyArgs;
use crate::config::Config;
use crate::error::{MedicError, Result};
use crate::exit_codes;
use crate::notify::{NotificationEvent, Notifier};

pub fn cmd_notify(args: NotifyArgs, config: &Config) -> Result<i32> {
    if args.subject.trim().is_empty() {
        return Err(MedicError::UserError("notification subject must not be empty".to_string()));
    }

    let event = NotificationEvent {
        event_tag: args.event,
        subject: args.subject,
        description: args.description,
        importance: args.importance,
        message: args.message.unwrap_or_default(),
        link: args.link,
    };

    if Notifier::new(&config.notify).deliver(&event) {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::FAILURE)
    }
}
