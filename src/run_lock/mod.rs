//! Single-instance guard for lint runs.
//!
//! Each invocation records its PID in one lock file. A new run reads the
//! record first; if the recorded process is still alive it is asked to stop
//! (SIGTERM, then SIGKILL after the grace period) and the new run waits for
//! it to exit before overwriting the record with its own PID. A record whose
//! process is gone is stale and ignored.
//!
//! # Release
//!
//! The record is removed when the owning run exits: by the RAII guard on
//! normal and error paths, and by the signal handler (see `signals`) when the
//! run is terminated. Removal only happens while the record still names the
//! exiting run, so a run stopped by a newer one never deletes the newer
//! run's record.
//!
//! # Limitations
//!
//! PIDs are validated only by liveness; a recycled PID belonging to an
//! unrelated process is indistinguishable from a previous run.

mod guard;
mod process;
mod record;


pub use guard::{Preemption, RunLock};
pub use process::{ProcessTable, StopSignal, SystemProcesses};
#[cfg(test)]
pub use process::Delivery;
pub use record::LockRecord;
