//! Process liveness probing and signal delivery.

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::fs;
use std::io;
use tracing::warn;

/// Signal used to stop a previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// Polite termination request (SIGTERM).
    Terminate,
    /// Forced termination (SIGKILL).
    Kill,
}

impl StopSignal {
    fn as_nix(self) -> Signal {
        match self {
            StopSignal::Terminate => Signal::SIGTERM,
            StopSignal::Kill => Signal::SIGKILL,
        }
    }
}

/// Result of a signal delivery that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The process exited before the signal could be delivered.
    NoSuchProcess,
}

/// Operations the run lock needs from the OS process table.
pub trait ProcessTable {
    /// Whether a process with `pid` currently exists.
    fn is_alive(&self, pid: u32) -> bool;

    /// Send `signal` to `pid`.
    fn signal(&self, pid: u32, signal: StopSignal) -> io::Result<Delivery>;
}

/// The real process table, probed with `kill(2)`.
///
/// An exited process its parent has not reaped yet still answers `kill(2)`,
/// so `/proc/<pid>/stat` is consulted where available and a zombie counts as
/// gone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcesses;

impl ProcessTable for SystemProcesses {
    fn is_alive(&self, pid: u32) -> bool {
        let Some(pid) = to_pid(pid) else {
            return false;
        };
        match kill(pid, None) {
            Ok(()) => !has_exited(pid),
            // Exists but belongs to someone else.
            Err(Errno::EPERM) => !has_exited(pid),
            Err(Errno::ESRCH) => false,
            Err(errno) => {
                warn!(pid = pid.as_raw(), %errno, "unexpected error probing process; treating it as gone");
                false
            }
        }
    }

    fn signal(&self, pid: u32, signal: StopSignal) -> io::Result<Delivery> {
        let Some(pid) = to_pid(pid) else {
            return Ok(Delivery::NoSuchProcess);
        };
        match kill(pid, signal.as_nix()) {
            Ok(()) => Ok(Delivery::Delivered),
            Err(Errno::ESRCH) => Ok(Delivery::NoSuchProcess),
            Err(errno) => Err(io::Error::from(errno)),
        }
    }
}

/// Whether `/proc` reports `pid` as a zombie or dead task.
///
/// Without procfs nothing is known, and the `kill(2)` answer stands.
fn has_exited(pid: Pid) -> bool {
    matches!(proc_state(pid), Some('Z' | 'X' | 'x'))
}

/// The state letter from `/proc/<pid>/stat`.
fn proc_state(pid: Pid) -> Option<char> {
    let stat = fs::read_to_string(format!("/proc/{}/stat", pid.as_raw())).ok()?;
    // The command name is parenthesised and may itself contain ')'.
    let (_, rest) = stat.rsplit_once(')')?;
    rest.trim_start().chars().next()
}

/// Convert a recorded PID to a signalable one.
///
/// 0 and values that would be negative as `pid_t` address process groups,
/// never a single process, so they are rejected.
fn to_pid(pid: u32) -> Option<Pid> {
    i32::try_from(pid).ok().filter(|&raw| raw > 0).map(Pid::from_raw)
}
