use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted reminder record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    /// UUID v4 string — primary key, assigned by the store at creation.
    pub id: String,
    /// Destination address. Not validated for RFC conformance here;
    /// the mail transport rejects unparseable mailboxes at send time.
    pub recipient: String,
    /// Message content, delivered as the mail body.
    pub body: String,
    /// UTC instant at which the record becomes eligible for delivery.
    pub scheduled_at: DateTime<Utc>,
    /// Flipped to true exactly once, after a confirmed successful send.
    pub sent: bool,
    /// Number of failed delivery attempts so far.
    pub attempts: u32,
    /// Error message from the most recent failed attempt, if any.
    pub last_error: Option<String>,
    /// When the record was inserted.
    pub created_at: DateTime<Utc>,
}
