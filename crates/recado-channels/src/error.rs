use thiserror::Error;

/// Errors that can occur while delivering a message.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The gateway refused or never received the message. The string is what
    /// the history ledger records as the failure reason.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The sender configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
