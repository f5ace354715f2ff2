// Scoring engine — combines the local heuristics with the optional
// classifier signal into one spam score for a registration.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::heuristics::{self, Signal};
use crate::classifier::traits::SpamClassifier;

/// Classifier likelihood at or above this adds the classifier signal.
pub const CLASSIFIER_FLAG_THRESHOLD: f64 = 0.6;

/// The identity being screened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationCandidate {
    pub username: String,
    pub email: String,
}

impl RegistrationCandidate {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }
}

/// A spam score together with what produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Final score, 0.0 to 1.0
    pub score: f64,
    /// Signals that fired, in check order
    pub signals: Vec<Signal>,
    /// Whether a classifier was configured and asked
    pub classifier_consulted: bool,
    /// Classifier likelihood, if the classifier was consulted and answered
    pub classifier_likelihood: Option<f64>,
    /// Tokens used by the classifier call (0 when it wasn't consulted)
    pub classifier_tokens: u64,
}

pub struct ScoringEngine {
    classifier: Option<Arc<dyn SpamClassifier>>,
}

impl ScoringEngine {
    /// Build an engine. Pass `None` when no API key is configured.
    pub fn new(classifier: Option<Arc<dyn SpamClassifier>>) -> Self {
        Self { classifier }
    }

    /// Heuristics only, no external calls.
    pub fn local_only() -> Self {
        Self { classifier: None }
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Score a candidate. Never fails: classifier trouble reads as "no signal".
    pub async fn score(&self, candidate: &RegistrationCandidate) -> ScoreBreakdown {
        let mut signals = heuristics::evaluate(&candidate.username, &candidate.email);

        let result = match &self.classifier {
            Some(classifier) => {
                let username = candidate.username.to_lowercase();
                Some(classifier.classify(&username).await)
            }
            None => None,
        };

        if let Some(r) = result {
            if r.likelihood_or_zero() >= CLASSIFIER_FLAG_THRESHOLD {
                signals.push(Signal::ClassifierFlagged);
            }
        }

        let score = heuristics::total(&signals);

        debug!(
            username = %candidate.username,
            score,
            signals = signals.len(),
            "Scored registration"
        );

        ScoreBreakdown {
            score,
            signals,
            classifier_consulted: result.is_some(),
            classifier_likelihood: result.and_then(|r| r.likelihood),
            classifier_tokens: result.map_or(0, |r| r.tokens_used),
        }
    }
}
