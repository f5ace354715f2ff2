// Unit tests for spam scoring.
//
// Covers the pure heuristics (each rule on its own, clamping when several
// fire), the worked examples, and the classifier signal through the engine
// using a fixed-answer classifier — no network access.

use std::sync::Arc;

use regguard::classifier::traits::{ClassifierResult, FixedClassifier, SpamClassifier};
use regguard::moderation::{decide, ModerationOutcome, ModerationPolicy};
use regguard::scoring::heuristics::{self, Signal};
use regguard::scoring::{RegistrationCandidate, ScoringEngine};

fn engine_with(likelihood: Option<f64>) -> ScoringEngine {
    let classifier: Arc<dyn SpamClassifier> = Arc::new(FixedClassifier {
        result: ClassifierResult {
            likelihood,
            tokens_used: 12,
        },
    });
    ScoringEngine::new(Some(classifier))
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ============================================================
// Worked examples
// ============================================================

#[tokio::test]
async fn crypto_spammer_on_disposable_domain_is_capped_at_one() {
    let candidate = RegistrationCandidate::new("btc_millionaire_2024!!!!!!!!!!!!!!!", "x@mailinator.com");
    let score = ScoringEngine::local_only().score(&candidate).await;

    assert_eq!(
        score.signals,
        vec![
            Signal::DisposableDomain,
            Signal::BadKeyword,
            Signal::NonAlphanumeric,
            Signal::LongUsername,
        ]
    );
    // 0.5 + 0.4 + 0.2 + 0.2 = 1.3, clamped
    assert_close(score.score, 1.0);

    let strict = ModerationPolicy {
        spam_threshold: 0.9,
        quarantine_mode: false,
    };
    assert_eq!(decide(score.score, &strict), ModerationOutcome::Delete);
    let lenient = ModerationPolicy {
        quarantine_mode: true,
        ..strict
    };
    assert_eq!(decide(score.score, &lenient), ModerationOutcome::Quarantine);
}

#[tokio::test]
async fn ordinary_registration_is_allowed() {
    let candidate = RegistrationCandidate::new("jane_doe", "jane@gmail.com");
    let score = ScoringEngine::local_only().score(&candidate).await;

    // The underscore is outside [a-z0-9]; nothing else fires
    assert_eq!(score.signals, vec![Signal::NonAlphanumeric]);
    assert_close(score.score, 0.2);
    assert_eq!(
        decide(score.score, &ModerationPolicy::default()),
        ModerationOutcome::Allow
    );
}

#[tokio::test]
async fn plain_alphanumeric_registration_scores_zero() {
    let candidate = RegistrationCandidate::new("janedoe", "jane@gmail.com");
    let score = ScoringEngine::local_only().score(&candidate).await;
    assert!(score.signals.is_empty());
    assert_close(score.score, 0.0);
    assert!(!score.classifier_consulted);
    assert_eq!(score.classifier_likelihood, None);
    assert_eq!(score.classifier_tokens, 0);
}

#[tokio::test]
async fn three_small_signals_reach_the_default_threshold() {
    // 0.5 + 0.2 + 0.2 must land on 0.9 exactly, not 0.8999999999999999
    let candidate = RegistrationCandidate::new("a_very_long_username_for_signup_x", "x@mailinator.com");
    let score = ScoringEngine::local_only().score(&candidate).await;

    assert_eq!(
        score.signals,
        vec![
            Signal::DisposableDomain,
            Signal::NonAlphanumeric,
            Signal::LongUsername,
        ]
    );
    assert_eq!(score.score, 0.9);
    assert_eq!(
        decide(score.score, &ModerationPolicy::default()),
        ModerationOutcome::Delete
    );
}

// ============================================================
// Heuristics — individual rules
// ============================================================

#[test]
fn disposable_domain_alone() {
    assert_eq!(
        heuristics::evaluate("alice", "alice@10minutemail.com"),
        vec![Signal::DisposableDomain]
    );
}

#[test]
fn disposable_domain_needs_exact_match() {
    assert!(heuristics::evaluate("alice", "alice@notmailinator.com").is_empty());
    assert!(heuristics::evaluate("alice", "alice-at-tempmail.com").is_empty());
}

#[test]
fn url_like_username_also_trips_non_alphanumeric() {
    assert_eq!(
        heuristics::evaluate("www.cheapdeals", "a@b.io"),
        vec![Signal::UrlLikeUsername, Signal::NonAlphanumeric]
    );
}

#[test]
fn keyword_is_case_insensitive() {
    assert_eq!(
        heuristics::evaluate("PayPalSupport", "a@b.io"),
        vec![Signal::BadKeyword]
    );
}

#[test]
fn long_username_boundary() {
    let thirty = "a".repeat(30);
    let thirty_one = "a".repeat(31);
    assert!(heuristics::evaluate(&thirty, "a@b.io").is_empty());
    assert_eq!(
        heuristics::evaluate(&thirty_one, "a@b.io"),
        vec![Signal::LongUsername]
    );
}

// ============================================================
// Clamping and determinism
// ============================================================

#[tokio::test]
async fn everything_firing_stays_in_range() {
    let candidate = RegistrationCandidate::new(
        "https://www.crypto-forex-binance-deals.xyz/signup",
        "bot@tempmail.com",
    );
    let score = engine_with(Some(0.99)).score(&candidate).await;
    assert_eq!(score.signals.len(), 6);
    assert_close(score.score, 1.0);
}

#[tokio::test]
async fn local_checks_are_deterministic() {
    let candidate = RegistrationCandidate::new("nft_drop.com", "z@mailinator.com");
    let first = ScoringEngine::local_only().score(&candidate).await;
    let second = ScoringEngine::local_only().score(&candidate).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn scores_always_within_unit_interval() {
    let cases = [
        ("", ""),
        ("a", "a@b"),
        ("!!!!", "@"),
        ("btc.com", "x@mailinator.com"),
        ("ünïcødé_user_with_a_really_long_name", "u@tempmail.com"),
    ];
    for (username, email) in cases {
        let score = engine_with(Some(1.0))
            .score(&RegistrationCandidate::new(username, email))
            .await;
        assert!(
            (0.0..=1.0).contains(&score.score),
            "{username}/{email} scored {}",
            score.score
        );
    }
}

// ============================================================
// Classifier signal
// ============================================================

#[tokio::test]
async fn classifier_at_cutoff_adds_weight() {
    let score = engine_with(Some(0.6))
        .score(&RegistrationCandidate::new("janedoe", "jane@gmail.com"))
        .await;
    assert_eq!(score.signals, vec![Signal::ClassifierFlagged]);
    assert_close(score.score, 0.3);
    assert_eq!(score.classifier_likelihood, Some(0.6));
    assert_eq!(score.classifier_tokens, 12);
}

#[tokio::test]
async fn classifier_below_cutoff_adds_nothing() {
    let score = engine_with(Some(0.59))
        .score(&RegistrationCandidate::new("janedoe", "jane@gmail.com"))
        .await;
    assert!(score.signals.is_empty());
    assert_close(score.score, 0.0);
}

#[tokio::test]
async fn classifier_failure_reads_as_no_signal() {
    let classifier: Arc<dyn SpamClassifier> = Arc::new(FixedClassifier {
        result: ClassifierResult::neutral(),
    });
    let score = ScoringEngine::new(Some(classifier))
        .score(&RegistrationCandidate::new("crypto", "c@gmail.com"))
        .await;
    assert_eq!(score.signals, vec![Signal::BadKeyword]);
    assert!(score.classifier_consulted);
    assert_eq!(score.classifier_likelihood, None);
    assert_close(score.score, 0.4);
}

#[tokio::test]
async fn classifier_does_not_change_local_signals() {
    let candidate = RegistrationCandidate::new("btc_fan", "f@mailinator.com");
    let without = ScoringEngine::local_only().score(&candidate).await;
    let with = engine_with(Some(0.0)).score(&candidate).await;
    assert_eq!(without.signals, with.signals);
    assert_close(without.score, with.score);
}
