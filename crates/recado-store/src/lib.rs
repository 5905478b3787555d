//! `recado-store` — file-backed repositories shared by the CLI and the daemon.
//!
//! Two files under the storage directory are the only IPC channel between the
//! interactive program and the scheduler daemon:
//!
//! | File                | Repository        | Content                         |
//! |---------------------|-------------------|---------------------------------|
//! | `schedule.json`     | [`ScheduleStore`] | the single pending schedule slot |
//! | `send_history.json` | [`HistoryLedger`] | append-only send outcomes        |
//!
//! Every write goes through an atomic temp-then-rename replace, so a reader
//! never observes a half-written file. Reads fail soft: missing or malformed
//! content becomes an empty value plus a warning, never an error.

mod atomic;
pub mod error;
pub mod history;
pub mod schedule;

pub use error::{Result, StoreError};
pub use history::HistoryLedger;
pub use schedule::ScheduleStore;
