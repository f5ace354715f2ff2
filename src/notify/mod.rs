// Admin notifications — trait-based so the delivery channel can be swapped.
//
// LogNotifier just emits a tracing event. OutboxNotifier appends mail to a
// spool file for a local mail agent to pick up.

pub mod outbox;
pub mod traits;

pub use traits::{LogNotifier, Notice, Notifier};

use std::sync::Arc;

use crate::config::Config;
use crate::logs::AppendLog;

/// Pick the notifier the configuration asks for.
pub fn from_config(config: &Config) -> Arc<dyn Notifier> {
    match &config.outbox_path {
        Some(path) => Arc::new(outbox::OutboxNotifier::new(
            config.admin_email.clone(),
            AppendLog::new(path),
        )),
        None => Arc::new(LogNotifier {
            recipient: config.admin_email.clone(),
        }),
    }
}
