// Account store queries — every SQL statement lives here.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::Account;

/// Role new accounts get.
pub const DEFAULT_ROLE: &str = "subscriber";

// --- Accounts ---

pub fn insert_account(conn: &Connection, username: &str, email: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO accounts (username, email, role) VALUES (?1, ?2, ?3)",
        params![username, email, DEFAULT_ROLE],
    )
    .with_context(|| format!("Failed to create account {username}"))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_account(conn: &Connection, id: i64) -> Result<Option<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, email, role, created_at FROM accounts WHERE id = ?1",
    )?;
    let account = stmt
        .query_row(params![id], |row| {
            Ok(Account {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                role: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;
    Ok(account)
}

/// Delete an account and its flags. Returns whether a row was removed.
pub fn delete_account(conn: &Connection, id: i64) -> Result<bool> {
    conn.execute("DELETE FROM account_flags WHERE account_id = ?1", params![id])?;
    let removed = conn.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
    Ok(removed > 0)
}

pub fn set_account_role(conn: &Connection, id: i64, role: &str) -> Result<()> {
    let updated = conn.execute(
        "UPDATE accounts SET role = ?2 WHERE id = ?1",
        params![id, role],
    )?;
    if updated == 0 {
        anyhow::bail!("No account with id {id}");
    }
    Ok(())
}

pub fn set_flag(conn: &Connection, id: i64, name: &str, value: bool) -> Result<()> {
    conn.execute(
        "INSERT INTO account_flags (account_id, name, value) VALUES (?1, ?2, ?3)
         ON CONFLICT(account_id, name) DO UPDATE SET value = ?3",
        params![id, name, value],
    )
    .with_context(|| format!("Failed to set flag {name} on account {id}"))?;
    Ok(())
}

pub fn get_flag(conn: &Connection, id: i64, name: &str) -> Result<bool> {
    let value: Option<bool> = conn
        .query_row(
            "SELECT value FROM account_flags WHERE account_id = ?1 AND name = ?2",
            params![id, name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.unwrap_or(false))
}

// --- Roles ---

/// Create a role if it doesn't exist. Returns true if it was created.
pub fn ensure_role(conn: &Connection, name: &str, label: &str) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO roles (name, label) VALUES (?1, ?2)",
        params![name, label],
    )?;
    Ok(inserted > 0)
}

pub fn get_role_capabilities(conn: &Connection, role: &str) -> Result<BTreeSet<String>> {
    let mut stmt =
        conn.prepare("SELECT capability FROM role_capabilities WHERE role = ?1")?;
    let caps = stmt
        .query_map(params![role], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<BTreeSet<String>>>()?;
    Ok(caps)
}

/// Replace a role's capability set.
pub fn set_role_capabilities(
    conn: &mut Connection,
    role: &str,
    caps: &BTreeSet<String>,
) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM role_capabilities WHERE role = ?1", params![role])?;
    for cap in caps {
        tx.execute(
            "INSERT INTO role_capabilities (role, capability) VALUES (?1, ?2)",
            params![role, cap],
        )?;
    }
    tx.commit()
        .with_context(|| format!("Failed to update capabilities for role {role}"))?;
    Ok(())
}

// --- Counters ---

pub fn increment_counter(conn: &Connection, key: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO counters (key, value, updated_at) VALUES (?1, 1, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = value + 1, updated_at = datetime('now')",
        params![key],
    )?;
    Ok(())
}

pub fn get_counters(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM counters ORDER BY key")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<(String, i64)>>>()?;
    Ok(rows)
}
