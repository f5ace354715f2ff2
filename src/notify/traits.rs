// Admin notifications — what gets sent, and the trait for sending it.

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::moderation::decider::ModerationOutcome;

/// A message for the site administrator.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A registration scored at or above the threshold and was acted on.
    SpamBlocked {
        username: String,
        email: String,
        score: f64,
        outcome: ModerationOutcome,
    },
    /// A single classifier call used more tokens than the alert threshold.
    TokenUsageAlert { tokens_used: u64, input: String },
}

impl Notice {
    pub fn subject(&self) -> &'static str {
        match self {
            Notice::SpamBlocked { .. } => "[regguard] Spam Registration Blocked",
            Notice::TokenUsageAlert { .. } => "[regguard] High Classifier Token Usage Alert",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notice::SpamBlocked {
                username,
                email,
                score,
                outcome,
            } => format!(
                "A spam registration attempt was blocked.\n\n\
                 Username: {username}\nEmail: {email}\nSpam Score: {score:.2}\n\
                 Action: account {}",
                outcome.past_tense()
            ),
            Notice::TokenUsageAlert { tokens_used, input } => format!(
                "A classifier request used {tokens_used} tokens which exceeded the alert threshold.\n\n\
                 Input text: {input}"
            ),
        }
    }
}

/// Delivery channel for admin notices.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &Notice) -> Result<()>;
}

/// Notifier that only emits a tracing event. Used when no outbox is configured.
pub struct LogNotifier {
    pub recipient: String,
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &Notice) -> Result<()> {
        warn!(
            to = %self.recipient,
            subject = notice.subject(),
            body = %notice.body(),
            "Admin notice"
        );
        Ok(())
    }
}
