//! Cleanup when the run is terminated by a signal.
//!
//! The RAII lock guard covers normal and error exits; a termination signal
//! bypasses destructors, so a background thread listens for SIGTERM, SIGINT,
//! SIGHUP and SIGQUIT, stops the running Bazel build, removes the lock
//! record, and exits with `128 + signal`.

use crate::error::{LintError, Result};
use crate::exit_codes;
use crate::run_lock::{LockRecord, ProcessTable, StopSignal, SystemProcesses};
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{info, warn};

/// PID of the Bazel build currently running, shared with the signal thread.
#[derive(Debug, Clone, Default)]
pub struct ChildSlot(Arc<Mutex<Option<u32>>>);

impl ChildSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, pid: u32) {
        *self.lock() = Some(pid);
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn current(&self) -> Option<u32> {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<u32>> {
        // The slot holds plain data; a poisoned lock is still usable.
        self.0.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

/// Running signal listener; closing it stops the listener thread.
#[derive(Debug)]
pub struct SignalCleanup {
    handle: Handle,
}

impl Drop for SignalCleanup {
    fn drop(&mut self) {
        self.handle.close();
    }
}

/// Install the signal listener for a run owning `record` as `owner`.
pub fn install(record: LockRecord, owner: u32, child: ChildSlot) -> Result<SignalCleanup> {
    let mut signals = Signals::new([SIGTERM, SIGINT, SIGHUP, SIGQUIT]).map_err(|e| {
        LintError::LockError(format!("failed to install signal handlers: {}", e))
    })?;
    let handle = signals.handle();

    thread::Builder::new()
        .name("signal-cleanup".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                let code = on_termination(signal, &record, owner, &child, &SystemProcesses);
                std::process::exit(code);
            }
        })
        .map_err(|e| LintError::LockError(format!("failed to spawn signal thread: {}", e)))?;

    Ok(SignalCleanup { handle })
}

/// Stop the running build and release the lock record.
///
/// Returns the exit status the process should terminate with.
pub fn on_termination(
    signal: i32,
    record: &LockRecord,
    owner: u32,
    child: &ChildSlot,
    procs: &impl ProcessTable,
) -> i32 {
    info!(signal, "termination signal received");

    if let Some(pid) = child.current() {
        match procs.signal(pid, StopSignal::Terminate) {
            Ok(_) => info!(pid, "forwarded termination to bazel"),
            Err(e) => warn!(pid, error = %e, "failed to forward termination to bazel"),
        }
    }

    if let Err(e) = record.remove_if_owned(owner) {
        warn!(
            lock = %record.path().display(),
            error = %e,
            "failed to remove lock record"
        );
    }

    exit_codes::SIGNAL_BASE + signal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_lock::Delivery;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;
    use serial_test::serial;
    use std::cell::RefCell;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Stdio};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    /// Directory handed to the re-executed test binary.
    const HELPER_DIR_ENV: &str = "BAZEL_CLIPPY_SIGNAL_TEST_DIR";

    #[derive(Default)]
    struct RecordingProcesses {
        sent: RefCell<Vec<(u32, StopSignal)>>,
    }

    impl ProcessTable for RecordingProcesses {
        fn is_alive(&self, _pid: u32) -> bool {
            true
        }

        fn signal(&self, pid: u32, signal: StopSignal) -> io::Result<Delivery> {
            self.sent.borrow_mut().push((pid, signal));
            Ok(Delivery::Delivered)
        }
    }

    #[test]
    fn child_slot_tracks_current_build() {
        let slot = ChildSlot::new();
        assert_eq!(slot.current(), None);

        let shared = slot.clone();
        shared.set(77);
        assert_eq!(slot.current(), Some(77));

        slot.clear();
        assert_eq!(shared.current(), None);
    }

    #[test]
    fn termination_removes_own_record_and_stops_build() {
        let temp = TempDir::new().unwrap();
        let record = LockRecord::new(temp.path().join("bazel-clippy.pid"));
        record.write(900).unwrap();
        let child = ChildSlot::new();
        child.set(901);
        let procs = RecordingProcesses::default();

        let code = on_termination(SIGTERM, &record, 900, &child, &procs);

        assert_eq!(code, 128 + SIGTERM);
        assert!(!record.path().exists());
        assert_eq!(*procs.sent.borrow(), vec![(901, StopSignal::Terminate)]);
    }

    #[test]
    fn termination_keeps_newer_runs_record() {
        let temp = TempDir::new().unwrap();
        let record = LockRecord::new(temp.path().join("bazel-clippy.pid"));
        record.write(950).unwrap();
        let procs = RecordingProcesses::default();

        let code = on_termination(SIGINT, &record, 900, &ChildSlot::new(), &procs);

        assert_eq!(code, 128 + SIGINT);
        assert_eq!(record.read().unwrap(), Some(950));
        assert!(procs.sent.borrow().is_empty());
    }

    fn wait_for(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + deadline;
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        done()
    }

    fn read_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path).ok()?.trim().parse().ok()
    }

    /// Body of the re-executed process: a run with a build in flight.
    ///
    /// Only does anything when started by `sigterm_stops_build_and_releases_record`.
    #[test]
    #[ignore]
    fn signal_cleanup_helper() {
        let Some(dir) = std::env::var_os(HELPER_DIR_ENV).map(PathBuf::from) else {
            return;
        };
        let build = Command::new("sleep").arg("30").spawn().unwrap();
        let child = ChildSlot::new();
        child.set(build.id());
        std::fs::write(dir.join("build.pid"), build.id().to_string()).unwrap();

        let record = LockRecord::new(dir.join("bazel-clippy.pid"));
        let _cleanup = install(record.clone(), std::process::id(), child).unwrap();
        record.write(std::process::id()).unwrap();

        thread::sleep(Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn sigterm_stops_build_and_releases_record() {
        let temp = TempDir::new().unwrap();
        let record = LockRecord::new(temp.path().join("bazel-clippy.pid"));
        let mut run = Command::new(std::env::current_exe().unwrap())
            .args([
                "signals::tests::signal_cleanup_helper",
                "--exact",
                "--ignored",
                "--nocapture",
                "--test-threads=1",
            ])
            .env(HELPER_DIR_ENV, temp.path())
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let run_pid = run.id();

        let ready = wait_for(Duration::from_secs(10), || {
            record.read().ok().flatten() == Some(run_pid)
        });
        if !ready {
            run.kill().unwrap();
            run.wait().unwrap();
            panic!("signal cleanup helper never wrote its lock record");
        }
        let build_pid = read_pid(&temp.path().join("build.pid")).unwrap();

        kill(Pid::from_raw(run_pid as i32), Signal::SIGTERM).unwrap();
        let status = run.wait().unwrap();

        assert_eq!(status.code(), Some(128 + SIGTERM));
        assert!(!record.path().exists());
        assert!(wait_for(Duration::from_secs(5), || {
            !SystemProcesses.is_alive(build_pid)
        }));
    }
}
