use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::types::Reminder;

/// Thread-safe store for reminder records.
///
/// Wraps a single SQLite connection in a `Mutex`. The gateway and the
/// delivery engine each hold their own `ReminderStore` over separate
/// connections to the same file, so form submissions never contend
/// with the polling query.
pub struct ReminderStore {
    db: Mutex<Connection>,
}

impl ReminderStore {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Insert a new reminder with `sent = false`.
    ///
    /// Rejects an empty recipient or body. `scheduled_at` may already
    /// be in the past, in which case the record is due on the next
    /// delivery cycle.
    #[instrument(skip(self, body))]
    pub fn create(
        &self,
        recipient: &str,
        body: &str,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Reminder> {
        let recipient = recipient.trim();
        let body = body.trim();
        if recipient.is_empty() {
            return Err(StoreError::InvalidInput("recipient cannot be empty".into()));
        }
        if body.is_empty() {
            return Err(StoreError::InvalidInput("body cannot be empty".into()));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO reminders (id, recipient, body, scheduled_at, sent, attempts, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, 0, ?5)",
            rusqlite::params![id, recipient, body, scheduled_at.to_rfc3339(), now.to_rfc3339()],
        )?;

        info!(reminder_id = %id, scheduled_at = %scheduled_at, "reminder created");

        Ok(Reminder {
            id,
            recipient: recipient.to_string(),
            body: body.to_string(),
            scheduled_at,
            sent: false,
            attempts: 0,
            last_error: None,
            created_at: now,
        })
    }

    /// Return every reminder ascending by schedule time.
    ///
    /// Ties on `scheduled_at` break by `id` so the listing order is
    /// stable across calls.
    pub fn list_ordered(&self) -> Result<Vec<Reminder>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, recipient, body, scheduled_at, sent, attempts, last_error, created_at
             FROM reminders ORDER BY scheduled_at, id",
        )?;
        let rows = stmt.query_map([], row_to_reminder)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Return unsent reminders whose schedule time has arrived.
    ///
    /// There is deliberately no lower bound on lateness: a reminder due
    /// yesterday is still returned today, so a stalled loop never loses
    /// work. `limit` caps per-cycle batch size when set.
    #[instrument(skip(self))]
    pub fn find_due(&self, now: DateTime<Utc>, limit: Option<u32>) -> Result<Vec<Reminder>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare_cached(
            "SELECT id, recipient, body, scheduled_at, sent, attempts, last_error, created_at
             FROM reminders
             WHERE sent = 0 AND scheduled_at <= ?1
             ORDER BY scheduled_at, id
             LIMIT ?2",
        )?;
        // LIMIT -1 means unlimited in SQLite.
        let cap = limit.map(|n| n as i64).unwrap_or(-1);
        let rows = stmt.query_map(rusqlite::params![now.to_rfc3339(), cap], row_to_reminder)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Atomically flip `sent` from false to true.
    ///
    /// The `sent = 0` predicate guarantees at most one caller observes
    /// the transition; an already-sent or unknown ID is `NotFound`.
    #[instrument(skip(self))]
    pub fn mark_sent(&self, id: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "UPDATE reminders SET sent = 1 WHERE id = ?1 AND sent = 0",
            [id],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    /// Record a failed delivery attempt without changing eligibility.
    #[instrument(skip(self, error))]
    pub fn record_failure(&self, id: &str, error: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "UPDATE reminders SET attempts = attempts + 1, last_error = ?2 WHERE id = ?1",
            rusqlite::params![id, error],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}

/// Map a SQLite row to a `Reminder`.
fn row_to_reminder(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reminder> {
    Ok(Reminder {
        id: row.get(0)?,
        recipient: row.get(1)?,
        body: row.get(2)?,
        scheduled_at: parse_utc(row, 3)?,
        sent: row.get(4)?,
        attempts: row.get(5)?,
        last_error: row.get(6)?,
        created_at: parse_utc(row, 7)?,
    })
}

/// Parse an RFC 3339 TEXT column back into a UTC instant.
fn parse_utc(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
