//! A host driven by the embedding loop.
//!
//! Tasks accumulate until the thread that owns the host calls
//! [`ManualHost::pump_one`] or [`ManualHost::pump_all`], the way a host idle
//! or external-event callback drains pending work. Whichever thread pumps is
//! the host thread.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::{run_contained, HostScheduler, HostTask};
use crate::error::ScheduleError;

/// Queue of host tasks run on demand.
pub struct ManualHost {
    queue: Mutex<VecDeque<HostTask>>,
    capacity: Option<usize>,
    closed: Mutex<bool>,
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualHost {
    /// An unbounded manual host.
    pub fn new() -> Self {
        ManualHost {
            queue: Mutex::new(VecDeque::new()),
            capacity: None,
            closed: Mutex::new(false),
        }
    }

    /// A manual host that refuses work beyond `capacity` pending tasks.
    pub fn with_capacity(capacity: usize) -> Self {
        ManualHost {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run the oldest pending task on the calling thread.
    ///
    /// Returns `false` if there was nothing to run.
    pub fn pump_one(&self) -> bool {
        // Pop under the lock, run outside it, so the task may schedule more.
        let task = self.queue.lock().pop_front();
        match task {
            Some(task) => {
                run_contained(task);
                true
            }
            None => false,
        }
    }

    /// Run pending tasks until the queue is empty. Returns how many ran.
    pub fn pump_all(&self) -> usize {
        let mut ran = 0;
        while self.pump_one() {
            ran += 1;
        }
        ran
    }

    /// Refuse further work. Already queued tasks can still be pumped.
    pub fn close(&self) {
        *self.closed.lock() = true;
    }
}

impl HostScheduler for ManualHost {
    fn schedule(&self, task: HostTask) -> Result<(), ScheduleError> {
        if *self.closed.lock() {
            return Err(ScheduleError::ShutDown);
        }
        let mut queue = self.queue.lock();
        if let Some(capacity) = self.capacity {
            if queue.len() >= capacity {
                return Err(ScheduleError::QueueFull { capacity });
            }
        }
        queue.push_back(task);
        Ok(())
    }
}

impl std::fmt::Debug for ManualHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualHost")
            .field("pending", &self.pending())
            .field("capacity", &self.capacity)
            .finish()
    }
}
