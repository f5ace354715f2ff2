// Integration tests for the chat-completion classifier.
//
// A wiremock server stands in for the provider. These cover the request
// shape, lenient reply parsing, usage accounting, and the fail-open
// behavior on errors.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use regguard::classifier::openai::ChatCompletionClassifier;
use regguard::classifier::rate_limiter::RateLimiter;
use regguard::classifier::traits::{ClassifierResult, SpamClassifier};
use regguard::logs::AppendLog;
use regguard::notify::{Notice, Notifier};
use regguard::usage::UsageAccountant;

#[derive(Default)]
struct Recorder {
    notices: Mutex<Vec<Notice>>,
}

#[async_trait]
impl Notifier for Recorder {
    async fn notify(&self, notice: &Notice) -> Result<()> {
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

struct Harness {
    _dir: TempDir,
    usage_log: AppendLog,
    recorder: Arc<Recorder>,
    classifier: ChatCompletionClassifier,
}

fn harness(endpoint: String, limiter: RateLimiter) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let usage_log = AppendLog::new(dir.path().join("usage.log"));
    let recorder = Arc::new(Recorder::default());
    let usage = Arc::new(UsageAccountant::new(usage_log.clone(), 1000, recorder.clone()));
    let classifier = ChatCompletionClassifier::new(
        "sk-test".to_string(),
        endpoint,
        "gpt-4o".to_string(),
        limiter,
        usage,
    )
    .unwrap();
    Harness {
        _dir: dir,
        usage_log,
        recorder,
        classifier,
    }
}

fn completion(content: &str, total_tokens: u64) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": total_tokens - 1, "completion_tokens": 1, "total_tokens": total_tokens}
    })
}

fn endpoint(server: &MockServer) -> String {
    format!("{}/v1/chat/completions", server.uri())
}

#[tokio::test]
async fn sends_single_turn_request_and_parses_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "gpt-4o", "temperature": 0.2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("0.85", 37)))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(endpoint(&server), RateLimiter::default());
    let result = h.classifier.classify("cheap_pills_4u").await;

    assert_eq!(
        result,
        ClassifierResult {
            likelihood: Some(0.85),
            tokens_used: 37
        }
    );

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
    assert!(messages[0]["content"]
        .as_str()
        .unwrap()
        .ends_with("Username: cheap_pills_4u"));
}

#[tokio::test]
async fn usage_is_logged_for_each_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("0.1", 20)))
        .mount(&server)
        .await;

    let h = harness(endpoint(&server), RateLimiter::default());
    h.classifier.classify("jane").await;

    let lines = h.usage_log.recent(10).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("| Used 20 tokens for input: jane"));
    assert!(h.recorder.notices.lock().unwrap().is_empty());
}

#[tokio::test]
async fn expensive_call_alerts_admin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("0.2", 1001)))
        .mount(&server)
        .await;

    let h = harness(endpoint(&server), RateLimiter::default());
    h.classifier.classify("verbose").await;

    let notices = h.recorder.notices.lock().unwrap();
    assert_eq!(
        *notices,
        vec![Notice::TokenUsageAlert {
            tokens_used: 1001,
            input: "verbose".to_string()
        }]
    );
}

#[tokio::test]
async fn missing_fields_default_to_zero_but_still_log_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let h = harness(endpoint(&server), RateLimiter::default());
    let result = h.classifier.classify("quiet").await;

    assert_eq!(result.likelihood, Some(0.0));
    assert_eq!(result.tokens_used, 0);
    let lines = h.usage_log.recent(10).await.unwrap();
    assert!(lines[0].ends_with("| Used 0 tokens for input: quiet"));
}

#[tokio::test]
async fn non_json_body_reads_as_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let h = harness(endpoint(&server), RateLimiter::default());
    let result = h.classifier.classify("odd").await;
    assert_eq!(result.likelihood, Some(0.0));
    assert_eq!(result.tokens_used, 0);
}

#[tokio::test]
async fn chatty_reply_uses_leading_number() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("0.7\n\nThe username resembles a bot pattern.", 50)),
        )
        .mount(&server)
        .await;

    let h = harness(endpoint(&server), RateLimiter::default());
    assert_eq!(h.classifier.classify("x").await.likelihood, Some(0.7));
}

#[tokio::test]
async fn error_status_is_neutral_and_unlogged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"error": {"message": "rate limited"}})),
        )
        .mount(&server)
        .await;

    let h = harness(endpoint(&server), RateLimiter::default());
    let result = h.classifier.classify("anyone").await;

    assert_eq!(result, ClassifierResult::neutral());
    assert!(h.usage_log.recent(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_endpoint_is_neutral() {
    // Bind then drop a listener to get a port nothing is serving
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let h = harness(
        format!("http://{addr}/v1/chat/completions"),
        RateLimiter::default(),
    );
    assert_eq!(h.classifier.classify("anyone").await, ClassifierResult::neutral());
}

#[tokio::test]
async fn back_to_back_calls_are_spaced_by_the_limiter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("0.1", 5)))
        .expect(2)
        .mount(&server)
        .await;

    let interval = Duration::from_millis(300);
    let h = harness(
        endpoint(&server),
        RateLimiter::new(interval, Duration::from_secs(10)),
    );

    h.classifier.classify("first").await;
    let start = Instant::now();
    h.classifier.classify("second").await;
    assert!(
        start.elapsed() >= interval,
        "second call should wait a full interval, waited {:?}",
        start.elapsed()
    );
}
