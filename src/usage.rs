// Classifier usage accounting.
//
// Every successful classifier reply is written to the usage log, and a
// single call that burns more tokens than the alert threshold pages the
// admin. There's no deduplication: ten expensive calls send ten alerts.

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, warn};

use crate::logs::{self, AppendLog};
use crate::notify::{Notice, Notifier};

/// Default per-call token count above which the admin is alerted.
pub const DEFAULT_TOKEN_ALERT_THRESHOLD: u64 = 1000;

pub struct UsageAccountant {
    log: AppendLog,
    alert_threshold: u64,
    notifier: Arc<dyn Notifier>,
}

impl UsageAccountant {
    pub fn new(log: AppendLog, alert_threshold: u64, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            log,
            alert_threshold,
            notifier,
        }
    }

    /// Usage strictly above the threshold triggers an alert.
    pub fn threshold_exceeded(&self, tokens_used: u64) -> bool {
        tokens_used > self.alert_threshold
    }

    /// Append a usage line and alert if the call was too expensive.
    ///
    /// Both steps are best-effort: failures are logged, never returned.
    pub async fn record(&self, tokens_used: u64, input: &str) {
        let entry = logs::format_usage_entry(Local::now(), tokens_used, input);
        if let Err(e) = self.log.append(&entry).await {
            warn!(error = %e, path = %self.log.path().display(), "Failed to write usage log");
        }

        debug!(tokens_used, "Recorded classifier usage");

        if self.threshold_exceeded(tokens_used) {
            warn!(
                tokens_used,
                threshold = self.alert_threshold,
                "Classifier token usage above alert threshold"
            );
            let notice = Notice::TokenUsageAlert {
                tokens_used,
                input: input.to_string(),
            };
            if let Err(e) = self.notifier.notify(&notice).await {
                warn!(error = %e, "Failed to send token usage alert");
            }
        }
    }
}
