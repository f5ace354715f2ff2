// OpenAI-compatible chat-completion classifier.
//
// Asks the model for a bare number between 0 and 1 describing how spammy a
// username looks. The reply is free text, so parsing is lenient: we take
// whatever number the reply starts with and treat everything else as 0.
//
// Any failure (timeout, connection error, non-2xx status) degrades to a
// neutral result. A flaky provider must never hold up a registration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::rate_limiter::RateLimiter;
use super::traits::{ClassifierResult, SpamClassifier};
use crate::output::truncate_chars;
use crate::usage::UsageAccountant;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const TEMPERATURE: f64 = 0.2;

/// Leading numeric prefix of a reply like "0.85" or "0.7 - looks automated".
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("leading number pattern is valid")
});

/// Build the single-turn prompt sent to the model.
pub fn build_prompt(text: &str) -> String {
    format!(
        "Is the following username spammy? Answer only with a number from 0 (not spam) \
         to 1 (definitely spam):\n\nUsername: {text}"
    )
}

/// Parse the model's reply into a likelihood in [0, 1].
///
/// Unparseable replies read as 0.0.
pub fn parse_likelihood(reply: &str) -> f64 {
    LEADING_NUMBER
        .find(reply.trim())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

/// Pull the reply text and token count out of a chat-completion body.
///
/// Missing fields default to "0" and 0 respectively.
pub fn extract_reply(body: &Value) -> (String, u64) {
    let reply = body["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or("0")
        .trim()
        .to_string();
    let tokens = body["usage"]["total_tokens"].as_u64().unwrap_or(0);
    (reply, tokens)
}

/// Chat-completion backed spam classifier.
pub struct ChatCompletionClassifier {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    rate_limiter: RateLimiter,
    usage: Arc<UsageAccountant>,
}

impl ChatCompletionClassifier {
    pub fn new(
        api_key: String,
        endpoint: String,
        model: String,
        rate_limiter: RateLimiter,
        usage: Arc<UsageAccountant>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("regguard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            model,
            api_key,
            rate_limiter,
            usage,
        })
    }

    /// Send the request and return the raw JSON body.
    ///
    /// Errors here are transport failures or error statuses. A 2xx body that
    /// isn't valid JSON comes back as `Value::Null` so the defaults apply.
    async fn request(&self, text: &str) -> Result<Value> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(text),
            }],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call classifier endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Classifier endpoint returned {}: {}",
                status,
                truncate_chars(&body, 200)
            );
        }

        let body = response
            .text()
            .await
            .context("Failed to read classifier response")?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}

#[async_trait]
impl SpamClassifier for ChatCompletionClassifier {
    async fn classify(&self, text: &str) -> ClassifierResult {
        let waited = self.rate_limiter.acquire().await;
        debug!(?waited, "Classifier rate limit acquired");

        let body = match self.request(text).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Classifier call failed, treating as neutral");
                return ClassifierResult::neutral();
            }
        };

        let (reply, tokens_used) = extract_reply(&body);
        let likelihood = parse_likelihood(&reply);

        self.usage.record(tokens_used, text).await;

        debug!(
            likelihood,
            tokens_used,
            reply = %truncate_chars(&reply, 50),
            "Classified text"
        );

        ClassifierResult {
            likelihood: Some(likelihood),
            tokens_used,
        }
    }
}

// --- Chat-completion request types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}
