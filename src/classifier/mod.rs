// Spam classification — trait-based abstraction over an external model.
//
// The SpamClassifier trait defines the interface. ChatCompletionClassifier
// implements it against an OpenAI-compatible endpoint, throttled by the
// shared RateLimiter.

pub mod openai;
pub mod rate_limiter;
pub mod traits;
