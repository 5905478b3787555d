//! `recado-core` — configuration and shared data types.
//!
//! Everything the interactive program and the daemon agree on lives here:
//! the persisted [`types::ScheduleEntry`] / [`types::HistoryRecord`] shapes,
//! the [`config::RecadoConfig`] loaded from `~/.recado/recado.toml` with
//! `RECADO_*` env overrides, and the shared error type.

pub mod config;
pub mod error;
pub mod types;

pub use config::RecadoConfig;
pub use error::{RecadoError, Result};
pub use types::{HistoryRecord, MissedWindowPolicy, ScheduleEntry, SendStatus};
