use thiserror::Error;

/// Errors that can occur during reminder store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The supplied reminder fields are unusable (empty recipient or body).
    #[error("invalid reminder: {0}")]
    InvalidInput(String),

    /// No unsent reminder with the given ID exists in the store.
    #[error("reminder not found: {id}")]
    NotFound { id: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
