//! `recado-scheduler` — the detached execution daemon and its supervision.
//!
//! # Overview
//!
//! [`engine::SchedulerEngine`] owns the daemon's infinite loop: it polls
//! `schedule.json` every `poll_interval_secs`, arms a timer when the active
//! entry targets the current day, fires the [`MessageSender`] at the target
//! minute, appends the outcome to the history ledger and deactivates the
//! slot. A target whose minute already passed is deactivated without firing:
//! best-effort delivery, no retry.
//!
//! [`supervisor::DaemonSupervisor`] is the interactive side: it spawns the
//! daemon as a detached process (per-session handle, `try_wait` liveness).
//! [`lockfile::DaemonLock`] is the daemon side: a PID file that keeps the
//! daemon unique per host, not just per session.
//!
//! [`MessageSender`]: recado_channels::MessageSender

pub mod engine;
pub mod error;
pub mod lockfile;
pub mod supervisor;

pub use engine::SchedulerEngine;
pub use error::{Result, SchedulerError};
pub use lockfile::DaemonLock;
pub use supervisor::DaemonSupervisor;
