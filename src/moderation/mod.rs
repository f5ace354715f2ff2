// Moderation — the decision for a scored account and the quarantine role
// it may be moved into.

pub mod capabilities;
pub mod decider;

pub use decider::{decide, Disposition, ModerationOutcome, ModerationPolicy};
