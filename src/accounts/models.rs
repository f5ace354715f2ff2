// Account store models.

use serde::Serialize;

use crate::scoring::RegistrationCandidate;

/// An account as stored by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl Account {
    pub fn candidate(&self) -> RegistrationCandidate {
        RegistrationCandidate::new(self.username.clone(), self.email.clone())
    }
}

/// Counter keys bumped after each moderation action.
pub mod counter_keys {
    pub const ALLOWED: &str = "allowed";
    pub const BLOCKED: &str = "blocked";
    pub const QUARANTINED: &str = "quarantined";
}
