use std::collections::BTreeSet;
use std::env;

use anyhow::Result;

use crate::classifier::openai::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::moderation::capabilities::{filter_known, KNOWN_CAPABILITIES};
use crate::moderation::ModerationPolicy;
use crate::usage::DEFAULT_TOKEN_ALERT_THRESHOLD;

pub const DEFAULT_SPAM_THRESHOLD: f64 = 0.9;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file is loaded
/// at startup via dotenvy. Every value is sanitized here, so the rest of the
/// crate never sees an out-of-range threshold or an unknown capability.
#[derive(Debug, Clone)]
pub struct Config {
    /// Scores at or above this are acted on, clamped to [0, 1]
    pub spam_threshold: f64,
    /// Quarantine suspected spam instead of deleting it
    pub quarantine_mode: bool,
    /// Classifier API key. `None` disables the classifier check.
    pub api_key: Option<String>,
    /// Per-call token count that triggers an admin alert (always > 0)
    pub token_alert_threshold: u64,
    /// Capabilities granted to the quarantine role (subset of the known set)
    pub quarantine_capabilities: BTreeSet<String>,
    /// Chat-completion endpoint
    pub classifier_url: String,
    pub classifier_model: String,
    pub db_path: String,
    pub spam_log_path: String,
    pub usage_log_path: String,
    /// Where admin notices go
    pub admin_email: String,
    /// Mail spool file. When unset, notices are only logged.
    pub outbox_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Ok(Self {
            spam_threshold: sanitize_threshold(env::var("REGGUARD_SPAM_THRESHOLD").ok().as_deref()),
            quarantine_mode: parse_bool(env::var("REGGUARD_QUARANTINE_MODE").ok().as_deref()),
            api_key: non_empty(env::var("REGGUARD_API_KEY").ok()),
            token_alert_threshold: sanitize_token_threshold(
                env::var("REGGUARD_TOKEN_ALERT_THRESHOLD").ok().as_deref(),
            ),
            quarantine_capabilities: sanitize_capabilities(
                env::var("REGGUARD_QUARANTINE_CAPS").ok().as_deref(),
            ),
            classifier_url: non_empty(env::var("REGGUARD_CLASSIFIER_URL").ok())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            classifier_model: non_empty(env::var("REGGUARD_CLASSIFIER_MODEL").ok())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            db_path: env::var("REGGUARD_DB_PATH").unwrap_or_else(|_| "./regguard.db".to_string()),
            spam_log_path: env::var("REGGUARD_SPAM_LOG")
                .unwrap_or_else(|_| "./regguard_spam_log.txt".to_string()),
            usage_log_path: env::var("REGGUARD_USAGE_LOG")
                .unwrap_or_else(|_| "./regguard_token_usage.log".to_string()),
            admin_email: env::var("REGGUARD_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@localhost".to_string()),
            outbox_path: non_empty(env::var("REGGUARD_OUTBOX_PATH").ok()),
        })
    }

    pub fn policy(&self) -> ModerationPolicy {
        ModerationPolicy {
            spam_threshold: self.spam_threshold,
            quarantine_mode: self.quarantine_mode,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse and clamp the spam threshold. Unparseable or missing → default.
pub fn sanitize_threshold(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| !v.is_nan())
        .map(|v| v.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_SPAM_THRESHOLD)
}

/// Parse the token alert threshold. Non-positive or unparseable → default.
pub fn sanitize_token_threshold(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .map(|v| v as u64)
        .unwrap_or(DEFAULT_TOKEN_ALERT_THRESHOLD)
}

/// Comma-separated capability list, filtered to the known set.
pub fn sanitize_capabilities(raw: Option<&str>) -> BTreeSet<String> {
    let Some(raw) = raw else {
        return BTreeSet::new();
    };
    let requested: Vec<String> = raw
        .split(',')
        .map(|cap| cap.trim().to_lowercase())
        .filter(|cap| !cap.is_empty())
        .collect();
    filter_known(requested.iter().map(String::as_str), KNOWN_CAPABILITIES)
}

pub fn parse_bool(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}
