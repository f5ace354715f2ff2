// regguard: spam registration screening
//
// This is the library root. Each module corresponds to one stage of
// screening a new account: scoring, classification, accounting, the
// moderation decision, and the collaborators those stages act through.

pub mod accounts;
pub mod classifier;
pub mod config;
pub mod guard;
pub mod logs;
pub mod moderation;
pub mod notify;
pub mod output;
pub mod scoring;
pub mod status;
pub mod usage;
