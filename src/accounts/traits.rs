// AccountStore trait — the host application's account management surface.
//
// regguard never owns accounts; it only looks them up and acts on them. The
// trait keeps the guard independent of where accounts live. SqliteAccounts
// is the bundled implementation.

use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;

use super::models::Account;

#[async_trait]
pub trait AccountStore: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables.
    async fn table_count(&self) -> Result<i64>;

    // --- Accounts ---

    /// Register a new account and return its id.
    async fn create_account(&self, username: &str, email: &str) -> Result<i64>;

    /// Resolve an account id. `None` if it doesn't exist (or was deleted).
    async fn lookup(&self, id: i64) -> Result<Option<Account>>;

    /// Permanently remove an account.
    async fn delete_account(&self, id: i64) -> Result<()>;

    /// Replace the account's role.
    async fn set_role(&self, id: i64, role: &str) -> Result<()>;

    /// Set a boolean metadata flag on the account.
    async fn set_flag(&self, id: i64, name: &str, value: bool) -> Result<()>;

    /// Read a flag; unset flags read as false.
    async fn get_flag(&self, id: i64, name: &str) -> Result<bool>;

    // --- Roles ---

    /// Create the role if missing. Returns true if it was created.
    async fn ensure_role(&self, name: &str, label: &str) -> Result<bool>;

    async fn role_capabilities(&self, role: &str) -> Result<BTreeSet<String>>;

    async fn set_role_capabilities(&self, role: &str, caps: &BTreeSet<String>) -> Result<()>;

    // --- Counters ---

    async fn increment_counter(&self, key: &str) -> Result<()>;

    async fn counters(&self) -> Result<Vec<(String, i64)>>;
}
