use thiserror::Error;

/// Errors that can occur while persisting the schedule slot or the ledger.
///
/// Read paths never surface these; loads fail soft to an empty value.
/// Writes do, so callers can decide whether to retry on a later cycle.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
