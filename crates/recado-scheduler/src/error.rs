use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
///
/// The engine loop itself never returns these; it logs and keeps polling.
/// They surface from the supervisor and the host lock, where the interactive
/// program must know that no background delivery will occur.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The daemon process could not be started.
    #[error("Could not spawn scheduler daemon: {0}")]
    Spawn(#[source] std::io::Error),

    /// Another daemon already owns the host lock.
    #[error("Another scheduler daemon is already running (pid {pid})")]
    AlreadyRunning { pid: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
