use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Result, SchedulerError};

/// Host-level single-daemon guard: a file holding the owner's PID.
///
/// Acquisition fails while the recorded PID is alive; a stale file (dead PID
/// or unparsable content) is replaced. The file is removed when the guard is
/// dropped on a clean exit. After a kill the stale file remains and is taken
/// over by the next acquisition.
#[derive(Debug)]
pub struct DaemonLock {
    path: PathBuf,
    pid: u32,
}

impl DaemonLock {
    /// Take ownership of `path` for the current process.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(owner) = read_owner(&path) {
            if pid_alive(owner) {
                return Err(SchedulerError::AlreadyRunning { pid: owner });
            }
            info!(pid = owner, "replacing stale daemon lock");
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let pid = std::process::id();
        fs::write(&path, pid.to_string())?;
        Ok(Self { path, pid })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DaemonLock {
    fn drop(&mut self) {
        // Only remove a file we still own.
        if read_owner(&self.path) == Some(self.pid) {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), "could not remove daemon lock: {e}");
            }
        }
    }
}

fn read_owner(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Signal-0 probe: true when a process with `pid` currently exists.
#[cfg(unix)]
fn pid_alive(pid: u32) -> bool {
    // SAFETY: signal 0 performs the existence check without delivering anything.
    let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
    if rc == 0 {
        return true;
    }
    // EPERM: the process exists but belongs to another user.
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn pid_alive(_pid: u32) -> bool {
    // No cheap probe available: treat any recorded owner as alive.
    true
}
