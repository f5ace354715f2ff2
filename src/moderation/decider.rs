// Moderation decision — maps a spam score to what happens to the account.
//
// Every evaluated account starts in `Evaluated` and lands in exactly one
// terminal state. Anything under the threshold is left alone; anything at
// or above it is either deleted or quarantined depending on the mode.

use std::fmt;

use serde::Serialize;

/// The knobs that drive the decision. Sanitized by `Config::load`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModerationPolicy {
    /// Scores at or above this are acted on (0.0 to 1.0)
    pub spam_threshold: f64,
    /// Quarantine instead of deleting
    pub quarantine_mode: bool,
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self {
            spam_threshold: 0.9,
            quarantine_mode: false,
        }
    }
}

/// The action to take on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModerationOutcome {
    Allow,
    Delete,
    Quarantine,
}

impl ModerationOutcome {
    /// Whether the outcome gets logged and reported to the admin.
    pub fn is_block(&self) -> bool {
        !matches!(self, ModerationOutcome::Allow)
    }

    /// What happened to the account, for admin-facing text.
    pub fn past_tense(&self) -> &'static str {
        match self {
            ModerationOutcome::Allow => "allowed",
            ModerationOutcome::Delete => "deleted",
            ModerationOutcome::Quarantine => "quarantined",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationOutcome::Allow => "allow",
            ModerationOutcome::Delete => "delete",
            ModerationOutcome::Quarantine => "quarantine",
        }
    }
}

impl fmt::Display for ModerationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account disposition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Disposition {
    /// Scored, no action taken yet
    Evaluated,
    /// Removed from the directory
    Blocked,
    /// Kept but restricted to the quarantine role
    Quarantined,
    /// Left alone
    Allowed,
}

impl Disposition {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Disposition::Evaluated)
    }

    /// Take the transition for `outcome`. Terminal states never move.
    pub fn apply(self, outcome: ModerationOutcome) -> Self {
        if self.is_terminal() {
            return self;
        }
        match outcome {
            ModerationOutcome::Allow => Disposition::Allowed,
            ModerationOutcome::Delete => Disposition::Blocked,
            ModerationOutcome::Quarantine => Disposition::Quarantined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Evaluated => "Evaluated",
            Disposition::Blocked => "Blocked",
            Disposition::Quarantined => "Quarantined",
            Disposition::Allowed => "Allowed",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decide what to do with an account that scored `score`.
pub fn decide(score: f64, policy: &ModerationPolicy) -> ModerationOutcome {
    if score < policy.spam_threshold {
        ModerationOutcome::Allow
    } else if policy.quarantine_mode {
        ModerationOutcome::Quarantine
    } else {
        ModerationOutcome::Delete
    }
}
