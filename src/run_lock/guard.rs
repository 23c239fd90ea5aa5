//! Run lock acquisition and RAII release.

use super::process::{Delivery, ProcessTable, StopSignal};
use super::record::LockRecord;
use crate::config::Config;
use crate::error::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What acquisition found in the lock record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preemption {
    /// No previous run was recorded.
    None,
    /// The recorded run no longer exists.
    Stale { pid: u32 },
    /// The recorded run was stopped; `forced` when SIGKILL was needed.
    Stopped { pid: u32, forced: bool },
    /// The recorded run could not be stopped; acquisition proceeded anyway.
    Abandoned { pid: u32 },
}

impl fmt::Display for Preemption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preemption::None => write!(f, "no previous lint run"),
            Preemption::Stale { pid } => write!(f, "ignored stale lint run record (pid {})", pid),
            Preemption::Stopped { pid, forced: false } => {
                write!(f, "stopped previous lint run (pid {})", pid)
            }
            Preemption::Stopped { pid, forced: true } => {
                write!(f, "killed previous lint run (pid {})", pid)
            }
            Preemption::Abandoned { pid } => {
                write!(f, "could not stop previous lint run (pid {}); continuing", pid)
            }
        }
    }
}

/// Single-instance lock over lint runs.
///
/// Unlike an exclusive-create lock, acquisition never fails because another
/// run holds the lock: the newer run wins, stopping the older one.
#[derive(Debug, Clone)]
pub struct RunLock {
    record: LockRecord,
    grace: Duration,
    poll_interval: Duration,
}

impl RunLock {
    pub fn new(path: impl Into<PathBuf>, grace: Duration, poll_interval: Duration) -> Self {
        Self {
            record: LockRecord::new(path),
            grace,
            poll_interval,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.lock_path(),
            config.termination_grace(),
            config.poll_interval(),
        )
    }

    pub fn path(&self) -> &Path {
        self.record.path()
    }

    /// Acquire the lock for the current process.
    pub fn acquire(&self, procs: &impl ProcessTable) -> Result<RunLockGuard> {
        self.acquire_as(std::process::id(), procs)
    }

    /// Acquire the lock on behalf of `owner`.
    ///
    /// Stops the recorded run if it is alive, then records `owner`.
    pub fn acquire_as(&self, owner: u32, procs: &impl ProcessTable) -> Result<RunLockGuard> {
        let preemption = match self.record.read()? {
            None => Preemption::None,
            Some(pid) if pid == owner => Preemption::None,
            Some(pid) if !procs.is_alive(pid) => {
                debug!(pid, "lock record is stale");
                Preemption::Stale { pid }
            }
            Some(pid) => self.stop(pid, procs),
        };

        self.record.write(owner)?;
        debug!(pid = owner, lock = %self.record.path().display(), "lock record written");

        Ok(RunLockGuard {
            record: self.record.clone(),
            owner,
            preemption,
            released: false,
        })
    }

    fn stop(&self, pid: u32, procs: &impl ProcessTable) -> Preemption {
        info!(pid, "stopping previous lint run");
        match procs.signal(pid, StopSignal::Terminate) {
            Ok(Delivery::Delivered) => {}
            Ok(Delivery::NoSuchProcess) => return Preemption::Stopped { pid, forced: false },
            Err(e) => {
                warn!(pid, error = %e, "failed to signal previous lint run");
                return Preemption::Abandoned { pid };
            }
        }
        if self.wait_until_gone(pid, procs) {
            return Preemption::Stopped { pid, forced: false };
        }

        warn!(
            pid,
            grace_ms = self.grace.as_millis() as u64,
            "previous lint run ignored SIGTERM; sending SIGKILL"
        );
        match procs.signal(pid, StopSignal::Kill) {
            Ok(Delivery::Delivered) => {}
            Ok(Delivery::NoSuchProcess) => return Preemption::Stopped { pid, forced: true },
            Err(e) => {
                warn!(pid, error = %e, "failed to kill previous lint run");
                return Preemption::Abandoned { pid };
            }
        }
        if self.wait_until_gone(pid, procs) {
            Preemption::Stopped { pid, forced: true }
        } else {
            warn!(pid, "previous lint run survived SIGKILL");
            Preemption::Abandoned { pid }
        }
    }

    /// Poll until `pid` is gone or the grace period runs out.
    fn wait_until_gone(&self, pid: u32, procs: &impl ProcessTable) -> bool {
        let deadline = Instant::now() + self.grace;
        loop {
            if !procs.is_alive(pid) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        }
    }
}

/// RAII guard for an acquired run lock.
///
/// When dropped, the lock record is removed if it still names this run.
/// If removal fails, a warning is logged but no panic occurs.
#[derive(Debug)]
pub struct RunLockGuard {
    record: LockRecord,
    owner: u32,
    preemption: Preemption,
    released: bool,
}

impl RunLockGuard {
    /// What acquisition found in the record.
    pub fn preemption(&self) -> Preemption {
        self.preemption
    }

    /// Release the lock now, returning whether the record was removed.
    pub fn release(mut self) -> std::io::Result<bool> {
        self.released = true;
        self.record.remove_if_owned(self.owner)
    }
}

impl Drop for RunLockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match self.record.remove_if_owned(self.owner) {
            Ok(true) => debug!(lock = %self.record.path().display(), "lock record removed"),
            Ok(false) => debug!("lock record already taken over by a newer run"),
            Err(e) => warn!(
                lock = %self.record.path().display(),
                error = %e,
                "failed to remove lock record"
            ),
        }
    }
}
