use thiserror::Error;

/// Errors that abort a single delivery cycle.
///
/// Send failures never appear here: they are isolated per record
/// inside the cycle. Only store-level failures bubble up, and
/// `DeliveryEngine::run` swallows them at the cycle boundary so the
/// loop keeps ticking.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("store error: {0}")]
    Store(#[from] remindd_store::StoreError),
}

pub type Result<T> = std::result::Result<T, DeliveryError>;
