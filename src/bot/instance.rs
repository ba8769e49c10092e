//! Single-instance guard for the long-poll loop
//!
//! The lock file holds the owner's pid as plain text. A lock left behind by
//! a dead process is removed on the next acquire.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};
use crate::utils::errors::{LiraError, Result};

/// Exclusive ownership of the polling role, released on drop
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    pid: u32,
    released: bool,
}

impl InstanceLock {
    /// Take the lock at `path`, failing with `AlreadyRunning` if a live process holds it
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let pid = std::process::id();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Second attempt only after a stale lock was removed
        for _ in 0..2 {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    write!(file, "{}", pid)?;
                    file.sync_all()?;
                    info!(pid = pid, path = %path.display(), "Instance lock acquired");
                    return Ok(Self {
                        path,
                        pid,
                        released: false,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if let Some(holder) = read_pid(&path) {
                        if process_alive(holder) {
                            return Err(LiraError::AlreadyRunning { pid: holder });
                        }
                        warn!(pid = holder, path = %path.display(), "Removing stale instance lock");
                    } else {
                        warn!(path = %path.display(), "Removing unreadable instance lock");
                    }

                    match fs::remove_file(&path) {
                        Ok(()) => {}
                        Err(e) if e.kind() == ErrorKind::NotFound => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        // Another starter won the race between removal and creation
        let holder = read_pid(&path).unwrap_or_default();
        Err(LiraError::AlreadyRunning { pid: holder })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Delete the lock file; also runs on drop
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "Instance lock released"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove instance lock"),
        }
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.release();
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Whether the OS still knows a process with this pid
pub fn process_alive(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }

    let proc_root = Path::new("/proc");
    if proc_root.join("self").exists() {
        return proc_root.join(pid.to_string()).exists();
    }

    match Command::new("ps")
        .args(["-p", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => status.success(),
        Err(e) => {
            debug!(pid = pid, error = %e, "Process table query failed, assuming dead");
            false
        }
    }
}
