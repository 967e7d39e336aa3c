use rusqlite::Connection;

use crate::error::Result;

/// Initialise the reminder schema in `conn`.
///
/// Creates the `reminders` table (idempotent) and an index covering the
/// delivery poll so `find_due` stays cheap as history accumulates;
/// rows are never deleted, only flipped to `sent`.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reminders (
            id           TEXT    NOT NULL PRIMARY KEY,
            recipient    TEXT    NOT NULL,
            body         TEXT    NOT NULL,
            scheduled_at TEXT    NOT NULL,   -- RFC 3339 UTC
            sent         INTEGER NOT NULL DEFAULT 0,
            attempts     INTEGER NOT NULL DEFAULT 0,
            last_error   TEXT,
            created_at   TEXT    NOT NULL
        ) STRICT;

        -- Delivery poll: SELECT … WHERE sent = 0 AND scheduled_at <= ?
        CREATE INDEX IF NOT EXISTS idx_reminders_due ON reminders (sent, scheduled_at);
        ",
    )?;
    Ok(())
}
