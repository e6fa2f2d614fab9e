use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 2;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS accounts (
            user_id      TEXT PRIMARY KEY,
            full_name    TEXT NOT NULL DEFAULT '',
            english_name TEXT NOT NULL DEFAULT '',
            birth_date   TEXT,
            updated_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS profiles (
            id           TEXT PRIMARY KEY,
            owner        TEXT NOT NULL,
            name         TEXT NOT NULL,
            english_name TEXT NOT NULL DEFAULT '',
            birth_date   TEXT NOT NULL,
            category     TEXT NOT NULL DEFAULT 'Uncategorized',
            created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_profiles_owner ON profiles(owner);

        CREATE TABLE IF NOT EXISTS journal_entries (
            id         TEXT PRIMARY KEY,
            owner      TEXT NOT NULL,
            content    TEXT NOT NULL,
            mood       TEXT NOT NULL DEFAULT 'good',
            emoji      TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_journal_owner ON journal_entries(owner);

        -- One draw per owner per local calendar day.
        CREATE TABLE IF NOT EXISTS daily_draws (
            id         TEXT PRIMARY KEY,
            owner      TEXT NOT NULL,
            draw_date  TEXT NOT NULL,
            title      TEXT NOT NULL,
            poem       TEXT NOT NULL,
            guidance   TEXT NOT NULL,
            image_url  TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
            UNIQUE (owner, draw_date)
        );
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    tracing::debug!("schema initialized (version {SCHEMA_VERSION})");
    Ok(())
}
