//! `remindd-store` — reminder records persisted in SQLite.
//!
//! One row per reminder. The store is the single source of truth for
//! the `sent` flag: the delivery loop requests transitions through
//! [`ReminderStore::mark_sent`] and never mutates rows any other way,
//! so a reminder can be marked sent at most once no matter how many
//! writers share the database file.

pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::ReminderStore;
pub use types::Reminder;
