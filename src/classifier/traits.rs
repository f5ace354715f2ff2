// Spam classifier trait — the seam between scoring and any external model.
//
// The default implementation calls an OpenAI-compatible chat-completion
// endpoint. Anything else (a local model, a different vendor) only has to
// produce a likelihood and a usage count.

use async_trait::async_trait;

/// The result of one classifier call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierResult {
    /// Spam likelihood from 0.0 to 1.0. `None` when the call failed.
    pub likelihood: Option<f64>,
    /// Tokens (or whatever the provider bills in) consumed by the call
    pub tokens_used: u64,
}

impl ClassifierResult {
    /// The result reported when the provider can't be reached.
    pub fn neutral() -> Self {
        Self {
            likelihood: None,
            tokens_used: 0,
        }
    }

    /// Likelihood with failures read as 0.0.
    pub fn likelihood_or_zero(&self) -> f64 {
        self.likelihood.unwrap_or(0.0)
    }
}

/// Trait for classifying a short text as spammy.
///
/// Implementations must not return errors: a classifier that can't answer
/// reports `ClassifierResult::neutral()` so registration processing is
/// never held up by the provider.
#[async_trait]
pub trait SpamClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> ClassifierResult;
}

/// Classifier with a fixed answer. Useful for dry runs and tests.
pub struct FixedClassifier {
    pub result: ClassifierResult,
}

#[async_trait]
impl SpamClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> ClassifierResult {
        self.result
    }
}
