//! The host scheduling seam
//!
//! The bridge never runs host work itself. It hands a [`HostTask`] to a
//! [`HostScheduler`], which the embedding environment implements on top of
//! its own dispatch mechanism (idle callback, event queue, message pump).
//! Implementations must run each accepted task exactly once, on the single
//! host thread, in FIFO order.
//!
//! Two reference environments are provided:
//! - [`HostThread`]: a dedicated named worker thread with a bounded queue
//! - [`ManualHost`]: tasks are queued until the embedding loop pumps them

mod manual;
mod thread;

pub use manual::ManualHost;
pub use thread::{HostThread, HostThreadStats, HOST_THREAD_NAME};

use std::sync::Arc;

use crate::error::ScheduleError;

/// A unit of work to run on the host thread.
pub type HostTask = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run tasks on the host thread.
pub trait HostScheduler: Send + Sync {
    /// Queue `task` for the host thread. Fire-and-forget: an `Ok` return
    /// means the task will eventually run, not that it has.
    fn schedule(&self, task: HostTask) -> Result<(), ScheduleError>;
}

impl<S: HostScheduler + ?Sized> HostScheduler for Arc<S> {
    fn schedule(&self, task: HostTask) -> Result<(), ScheduleError> {
        (**self).schedule(task)
    }
}

// Runs a task, containing any panic so the host loop survives it.
pub(crate) fn run_contained(task: HostTask) -> bool {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(task)) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                target: "hostbridge::host",
                "host task panicked: {}",
                crate::adapter::panic_message(e.as_ref())
            );
            false
        }
    }
}
