use async_trait::async_trait;

use crate::error::ChannelError;

/// The collaborator that actually transmits a message over the network.
///
/// Implementations must be `Send + Sync` so the engine can hold one behind an
/// `Arc` and call it from its tick loop. The call is synchronous from the
/// engine's perspective: the loop blocks until the outcome is known.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver `body` to `recipient`.
    ///
    /// `hour`/`minute` echo the wall-clock slot the send was scheduled for;
    /// gateways that stamp delivery receipts use them verbatim.
    async fn send(
        &self,
        recipient: &str,
        body: &str,
        hour: u32,
        minute: u32,
    ) -> Result<(), ChannelError>;
}
