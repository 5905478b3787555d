use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tracing::{info, warn};

use crate::error::{Result, SchedulerError};

/// Spawns and tracks the detached daemon process for one interactive session.
///
/// The handle is in-memory only: repeated [`ensure_running`] calls while the
/// tracked child is alive are no-ops, but daemons spawned by other program
/// instances are invisible here. The host-level guard against those is
/// [`DaemonLock`](crate::lockfile::DaemonLock), which the daemon itself takes.
///
/// [`ensure_running`]: DaemonSupervisor::ensure_running
pub struct DaemonSupervisor {
    program: PathBuf,
    args: Vec<String>,
    log_path: PathBuf,
    child: Option<Child>,
}

impl DaemonSupervisor {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            log_path: log_path.into(),
            child: None,
        }
    }

    /// Supervisor for the conventional layout: re-exec the current binary
    /// with the `daemon` subcommand.
    pub fn for_current_exe(log_path: impl Into<PathBuf>) -> Result<Self> {
        let exe = std::env::current_exe().map_err(SchedulerError::Spawn)?;
        Ok(Self::new(exe, vec!["daemon".to_string()], log_path))
    }

    /// Make sure a daemon spawned by this supervisor is alive; spawn one when
    /// none is. Returns `true` when a new process was started.
    pub fn ensure_running(&mut self) -> Result<bool> {
        if self.is_alive() {
            return Ok(false);
        }
        let child = self.spawn()?;
        info!(
            pid = child.id(),
            program = %self.program.display(),
            "scheduler daemon spawned"
        );
        self.child = Some(child);
        Ok(true)
    }

    /// PID of the tracked daemon, when one is recorded.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    fn is_alive(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                info!(%status, "previous scheduler daemon exited");
                self.child = None;
                false
            }
            Err(e) => {
                warn!("could not query daemon liveness: {e}");
                false
            }
        }
    }

    fn spawn(&self) -> Result<Child> {
        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent).map_err(SchedulerError::Spawn)?;
        }
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(SchedulerError::Spawn)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log));

        // Own process group: the daemon must outlive the interactive session.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd.spawn().map_err(SchedulerError::Spawn)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn supervisor_for(dir: &tempfile::TempDir, program: &str, args: &[&str]) -> DaemonSupervisor {
        DaemonSupervisor::new(
            program,
            args.iter().map(|s| s.to_string()).collect(),
            dir.path().join("daemon.log"),
        )
    }

    #[test]
    fn ensure_running_twice_keeps_a_single_child() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut sup = supervisor_for(&dir, "sleep", &["5"]);

        assert!(sup.ensure_running().unwrap(), "first call spawns");
        let pid = sup.pid().expect("child recorded");

        assert!(!sup.ensure_running().unwrap(), "second call is a no-op");
        assert_eq!(sup.pid(), Some(pid));

        // SAFETY: pid belongs to the child this test just spawned.
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGKILL);
        }
    }

    #[test]
    fn dead_child_is_respawned() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut sup = supervisor_for(&dir, "true", &[]);

        assert!(sup.ensure_running().unwrap());

        // `true` exits immediately; within a few polls the supervisor must
        // notice and spawn a replacement.
        let mut respawned = false;
        for _ in 0..100 {
            std::thread::sleep(std::time::Duration::from_millis(10));
            if sup.ensure_running().unwrap() {
                respawned = true;
                break;
            }
        }
        assert!(respawned, "exited child was never replaced");
        assert!(sup.pid().is_some());
    }

    #[test]
    fn missing_program_surfaces_a_spawn_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut sup = supervisor_for(&dir, "recado-test-no-such-binary", &[]);

        let err = sup.ensure_running().unwrap_err();
        assert!(matches!(err, SchedulerError::Spawn(_)));
        assert!(sup.pid().is_none());
    }
}
