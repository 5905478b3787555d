use thiserror::Error;

/// Errors shared across the recado crates.
#[derive(Debug, Error)]
pub enum RecadoError {
    /// The config file or an env override could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stored schedule entry violates the data-model invariants.
    #[error("Invalid schedule entry: {0}")]
    InvalidEntry(String),
}

pub type Result<T> = std::result::Result<T, RecadoError>;
