// Spam scoring — local heuristics plus an optional classifier signal.

pub mod engine;
pub mod heuristics;

pub use engine::{RegistrationCandidate, ScoreBreakdown, ScoringEngine};
