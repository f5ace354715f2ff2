// Registration guard — the account-created hook.
//
// For each new account this:
// 1. Resolves the account id to a username and email
// 2. Scores it (heuristics, plus the classifier when configured)
// 3. Decides allow / delete / quarantine from the threshold and mode
// 4. For a block: appends to the spam log and notifies the admin
// 5. Carries out the account action
//
// Steps 4 and 5 aren't transactional. Log and notification failures are
// warnings; the account action always runs and its failure is the only
// error surfaced to the caller.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, warn};

use crate::accounts::models::counter_keys;
use crate::accounts::{Account, AccountStore};
use crate::classifier::openai::ChatCompletionClassifier;
use crate::classifier::rate_limiter::RateLimiter;
use crate::classifier::traits::SpamClassifier;
use crate::config::Config;
use crate::logs::{self, AppendLog};
use crate::moderation::capabilities::{
    self, KNOWN_CAPABILITIES, QUARANTINE_FLAG, QUARANTINE_ROLE, QUARANTINE_ROLE_LABEL,
};
use crate::moderation::{decide, Disposition, ModerationOutcome, ModerationPolicy};
use crate::notify::{self, Notice, Notifier};
use crate::scoring::{RegistrationCandidate, ScoreBreakdown, ScoringEngine};
use crate::usage::UsageAccountant;

/// What happened to one account.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub account_id: i64,
    pub candidate: RegistrationCandidate,
    pub score: ScoreBreakdown,
    pub outcome: ModerationOutcome,
    pub disposition: Disposition,
}

pub struct RegistrationGuard {
    engine: ScoringEngine,
    policy: ModerationPolicy,
    quarantine_caps: BTreeSet<String>,
    accounts: Arc<dyn AccountStore>,
    notifier: Arc<dyn Notifier>,
    spam_log: AppendLog,
}

impl RegistrationGuard {
    pub fn new(
        engine: ScoringEngine,
        policy: ModerationPolicy,
        quarantine_caps: BTreeSet<String>,
        accounts: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
        spam_log: AppendLog,
    ) -> Self {
        Self {
            engine,
            policy,
            quarantine_caps,
            accounts,
            notifier,
            spam_log,
        }
    }

    /// Wire up a guard from configuration.
    pub fn from_config(config: &Config, accounts: Arc<dyn AccountStore>) -> Result<Self> {
        let notifier = notify::from_config(config);
        let engine = build_engine(config, notifier.clone())?;

        Ok(Self::new(
            engine,
            config.policy(),
            config.quarantine_capabilities.clone(),
            accounts,
            notifier,
            AppendLog::new(&config.spam_log_path),
        ))
    }

    pub fn policy(&self) -> &ModerationPolicy {
        &self.policy
    }

    pub fn classifier_enabled(&self) -> bool {
        self.engine.has_classifier()
    }

    /// Create the quarantine role if needed and reset its capabilities to
    /// the configured set. Returns the role's resulting capabilities.
    pub async fn ensure_quarantine_role(&self) -> Result<BTreeSet<String>> {
        if self
            .accounts
            .ensure_role(QUARANTINE_ROLE, QUARANTINE_ROLE_LABEL)
            .await?
        {
            info!(role = QUARANTINE_ROLE, "Created quarantine role");
        }

        let current = self.accounts.role_capabilities(QUARANTINE_ROLE).await?;
        let caps = capabilities::reconcile(&current, &self.quarantine_caps, KNOWN_CAPABILITIES);
        if caps != current {
            self.accounts
                .set_role_capabilities(QUARANTINE_ROLE, &caps)
                .await
                .context("Failed to update quarantine role capabilities")?;
        }
        Ok(caps)
    }

    /// Score and decide, without touching the account.
    pub async fn evaluate(
        &self,
        candidate: &RegistrationCandidate,
    ) -> (ScoreBreakdown, ModerationOutcome) {
        let score = self.engine.score(candidate).await;
        let outcome = decide(score.score, &self.policy);
        (score, outcome)
    }

    /// Screen a freshly created account and act on it.
    ///
    /// Returns `None` when the id doesn't resolve to an account.
    pub async fn on_account_created(&self, account_id: i64) -> Result<Option<Verdict>> {
        let Some(account) = self.accounts.lookup(account_id).await? else {
            warn!(account_id, "Account not found, skipping screening");
            return Ok(None);
        };

        let candidate = account.candidate();
        let (score, outcome) = self.evaluate(&candidate).await;

        if outcome.is_block() {
            self.report_block(&candidate, score.score, outcome).await;
        }

        let disposition = self.execute(&account, outcome).await?;

        info!(
            account_id,
            username = %candidate.username,
            score = format!("{:.2}", score.score),
            outcome = outcome.as_str(),
            "Screened registration"
        );

        Ok(Some(Verdict {
            account_id,
            candidate,
            score,
            outcome,
            disposition,
        }))
    }

    /// Spam log entry and admin notice. Best-effort.
    async fn report_block(
        &self,
        candidate: &RegistrationCandidate,
        score: f64,
        outcome: ModerationOutcome,
    ) {
        let entry = logs::format_spam_entry(Local::now(), &candidate.username, &candidate.email, score);
        if let Err(e) = self.spam_log.append(&entry).await {
            warn!(error = %e, "Failed to write spam log");
        }

        let notice = Notice::SpamBlocked {
            username: candidate.username.clone(),
            email: candidate.email.clone(),
            score,
            outcome,
        };
        if let Err(e) = self.notifier.notify(&notice).await {
            warn!(error = %e, "Failed to notify admin of blocked registration");
        }
    }

    async fn execute(&self, account: &Account, outcome: ModerationOutcome) -> Result<Disposition> {
        let counter = match outcome {
            ModerationOutcome::Allow => counter_keys::ALLOWED,
            ModerationOutcome::Delete => {
                self.accounts
                    .delete_account(account.id)
                    .await
                    .with_context(|| format!("Failed to delete account {}", account.id))?;
                counter_keys::BLOCKED
            }
            ModerationOutcome::Quarantine => {
                self.accounts
                    .set_role(account.id, QUARANTINE_ROLE)
                    .await
                    .with_context(|| format!("Failed to quarantine account {}", account.id))?;
                self.accounts
                    .set_flag(account.id, QUARANTINE_FLAG, true)
                    .await
                    .with_context(|| format!("Failed to flag account {}", account.id))?;
                counter_keys::QUARANTINED
            }
        };

        if let Err(e) = self.accounts.increment_counter(counter).await {
            warn!(error = %e, counter, "Failed to bump moderation counter");
        }

        Ok(Disposition::Evaluated.apply(outcome))
    }
}

/// Build the scoring engine the configuration asks for.
///
/// The classifier is only built when an API key is present. Its rate limiter
/// and usage accountant are created here and owned by the classifier.
pub fn build_engine(config: &Config, notifier: Arc<dyn Notifier>) -> Result<ScoringEngine> {
    let Some(key) = &config.api_key else {
        return Ok(ScoringEngine::local_only());
    };

    let usage = Arc::new(UsageAccountant::new(
        AppendLog::new(&config.usage_log_path),
        config.token_alert_threshold,
        notifier,
    ));
    let classifier = ChatCompletionClassifier::new(
        key.clone(),
        config.classifier_url.clone(),
        config.classifier_model.clone(),
        RateLimiter::default(),
        usage,
    )?;
    Ok(ScoringEngine::new(Some(
        Arc::new(classifier) as Arc<dyn SpamClassifier>
    )))
}
