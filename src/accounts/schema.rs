// Account store schema — table creation.
//
// A `schema_version` table is kept so future migrations have somewhere to
// record themselves. Everything else is created idempotently.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// Safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Registered accounts as the host application sees them
        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'subscriber',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Boolean metadata flags on accounts (e.g. _regguard_quarantined)
        CREATE TABLE IF NOT EXISTS account_flags (
            account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            value INTEGER NOT NULL,
            PRIMARY KEY (account_id, name)
        );

        CREATE TABLE IF NOT EXISTS roles (
            name TEXT PRIMARY KEY,
            label TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS role_capabilities (
            role TEXT NOT NULL REFERENCES roles(name) ON DELETE CASCADE,
            capability TEXT NOT NULL,
            PRIMARY KEY (role, capability)
        );

        -- Moderation tallies (allowed / blocked / quarantined)
        CREATE TABLE IF NOT EXISTS counters (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        ",
    )
    .context("Failed to create account store tables")?;

    Ok(())
}

/// Count the user-created tables (used by `regguard init` for a sanity line).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
