// Local heuristics — cheap, pure checks on username and email.
//
// Each check is independent and contributes a fixed weight when it fires.
// The contributions are summed and capped at 1.0 by the engine. All
// comparisons are case-insensitive.

use std::fmt;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Serialize;

/// Email domains that hand out throwaway inboxes.
pub const DISPOSABLE_DOMAINS: &[&str] = &["tempmail.com", "10minutemail.com", "mailinator.com"];

/// Substrings associated with financial / crypto spam.
pub const BAD_KEYWORDS: &[&str] = &[
    "btc", "binance", "crypto", "forex", "nft", "paypal", "carding",
];

/// Usernames longer than this are suspicious.
pub const MAX_USERNAME_LEN: usize = 30;

static URL_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://|www\.|\.com|\.net|\.org|\.cl|\.xyz").expect("URL pattern is valid")
});

/// A heuristic that fired, with the weight it contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    DisposableDomain,
    UrlLikeUsername,
    BadKeyword,
    NonAlphanumeric,
    LongUsername,
    ClassifierFlagged,
}

impl Signal {
    /// Weight in tenths, so sums are exact.
    pub fn weight_tenths(&self) -> u32 {
        match self {
            Signal::DisposableDomain => 5,
            Signal::UrlLikeUsername => 5,
            Signal::BadKeyword => 4,
            Signal::NonAlphanumeric => 2,
            Signal::LongUsername => 2,
            Signal::ClassifierFlagged => 3,
        }
    }

    pub fn weight(&self) -> f64 {
        f64::from(self.weight_tenths()) / 10.0
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::DisposableDomain => "disposable email domain",
            Signal::UrlLikeUsername => "URL-like username",
            Signal::BadKeyword => "spam keyword",
            Signal::NonAlphanumeric => "non-alphanumeric characters",
            Signal::LongUsername => "username over 30 characters",
            Signal::ClassifierFlagged => "classifier flagged",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The domain part of an email: everything after the last `@`.
pub fn email_domain(email: &str) -> Option<&str> {
    email.rfind('@').map(|i| &email[i + 1..])
}

pub fn is_disposable_domain(email: &str) -> bool {
    let email = email.to_lowercase();
    email_domain(&email).is_some_and(|domain| DISPOSABLE_DOMAINS.contains(&domain))
}

pub fn is_url_like(username: &str) -> bool {
    URL_LIKE.is_match(&username.to_lowercase())
}

pub fn has_bad_keyword(username: &str) -> bool {
    let username = username.to_lowercase();
    BAD_KEYWORDS.iter().any(|kw| username.contains(kw))
}

pub fn has_non_alphanumeric(username: &str) -> bool {
    username.chars().any(|c| !c.is_ascii_alphanumeric())
}

/// Byte length, matching how the rule was originally tuned.
pub fn is_too_long(username: &str) -> bool {
    username.len() > MAX_USERNAME_LEN
}

/// Run every local check and return the ones that fired, in check order.
pub fn evaluate(username: &str, email: &str) -> Vec<Signal> {
    let checks: [(bool, Signal); 5] = [
        (is_disposable_domain(email), Signal::DisposableDomain),
        (is_url_like(username), Signal::UrlLikeUsername),
        (has_bad_keyword(username), Signal::BadKeyword),
        (has_non_alphanumeric(username), Signal::NonAlphanumeric),
        (is_too_long(username), Signal::LongUsername),
    ];

    checks
        .into_iter()
        .filter_map(|(fired, signal)| fired.then_some(signal))
        .collect()
}

/// Sum signal weights and cap at 1.0.
///
/// Summed in tenths, so 0.5 + 0.2 + 0.2 is exactly 0.9.
pub fn total(signals: &[Signal]) -> f64 {
    let tenths: u32 = signals.iter().map(Signal::weight_tenths).sum();
    f64::from(tenths.min(10)) / 10.0
}
