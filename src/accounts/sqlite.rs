// SqliteAccounts — rusqlite backend implementing AccountStore.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.

use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::Account;
use super::queries;
use super::traits::AccountStore;

pub struct SqliteAccounts {
    conn: Mutex<Connection>,
}

impl SqliteAccounts {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl AccountStore for SqliteAccounts {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn create_account(&self, username: &str, email: &str) -> Result<i64> {
        let conn = self.conn.lock().await;
        queries::insert_account(&conn, username, email)
    }

    async fn lookup(&self, id: i64) -> Result<Option<Account>> {
        let conn = self.conn.lock().await;
        queries::get_account(&conn, id)
    }

    async fn delete_account(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        if !queries::delete_account(&conn, id)? {
            anyhow::bail!("No account with id {id}");
        }
        Ok(())
    }

    async fn set_role(&self, id: i64, role: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        queries::set_account_role(&conn, id, role)
    }

    async fn set_flag(&self, id: i64, name: &str, value: bool) -> Result<()> {
        let conn = self.conn.lock().await;
        queries::set_flag(&conn, id, name, value)
    }

    async fn get_flag(&self, id: i64, name: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        queries::get_flag(&conn, id, name)
    }

    async fn ensure_role(&self, name: &str, label: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        queries::ensure_role(&conn, name, label)
    }

    async fn role_capabilities(&self, role: &str) -> Result<BTreeSet<String>> {
        let conn = self.conn.lock().await;
        queries::get_role_capabilities(&conn, role)
    }

    async fn set_role_capabilities(&self, role: &str, caps: &BTreeSet<String>) -> Result<()> {
        let mut conn = self.conn.lock().await;
        queries::set_role_capabilities(&mut conn, role, caps)
    }

    async fn increment_counter(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        queries::increment_counter(&conn, key)
    }

    async fn counters(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.conn.lock().await;
        queries::get_counters(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::schema::create_tables;

    async fn test_store() -> SqliteAccounts {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        SqliteAccounts::new(conn)
    }

    #[tokio::test]
    async fn test_trait_account_lifecycle() {
        let store = test_store().await;
        let id = store.create_account("someone", "s@example.org").await.unwrap();
        assert_eq!(store.lookup(id).await.unwrap().unwrap().username, "someone");

        store.set_role(id, "regguard_quarantined").await.unwrap();
        store.set_flag(id, "_regguard_quarantined", true).await.unwrap();
        let account = store.lookup(id).await.unwrap().unwrap();
        assert_eq!(account.role, "regguard_quarantined");
        assert!(store.get_flag(id, "_regguard_quarantined").await.unwrap());

        store.delete_account(id).await.unwrap();
        assert!(store.lookup(id).await.unwrap().is_none());
        assert!(store.delete_account(id).await.is_err());
    }

    #[tokio::test]
    async fn test_trait_table_count() {
        let store = test_store().await;
        assert_eq!(store.table_count().await.unwrap(), 6);
    }
}
