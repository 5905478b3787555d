//! `recado-channels` — delivery collaborators consumed by the scheduler.
//!
//! [`MessageSender`] is the seam the daemon fires through; [`GatewaySender`]
//! is its production implementation, a reqwest client for an HTTP message
//! gateway. [`NotificationSink`] is the fire-and-forget desktop notification
//! hook whose failures never propagate into scheduler control flow.

pub mod error;
pub mod gateway;
pub mod notify;
pub mod sender;

pub use error::ChannelError;
pub use gateway::GatewaySender;
pub use notify::{CommandNotifier, NotificationSink, NullNotifier};
pub use sender::MessageSender;
