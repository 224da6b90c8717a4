//! A dedicated host thread.
//!
//! One named worker thread drains a bounded FIFO queue. Used when the
//! embedding application has no thread of its own to lend, and by tests.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{JoinHandle, ThreadId};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use super::{run_contained, HostScheduler, HostTask};
use crate::error::ScheduleError;

/// Name given to the worker thread.
pub const HOST_THREAD_NAME: &str = "hostbridge-host";

/// Host thread metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostThreadStats {
    /// Tasks waiting in the queue
    pub queue_depth: usize,
    /// Whether a task is running right now
    pub busy: bool,
    /// Tasks run since creation, including ones that panicked
    pub tasks_completed: u64,
    /// Tasks that panicked
    pub tasks_panicked: u64,
    /// Queue capacity
    pub capacity: usize,
}

struct HostInner {
    queue: Mutex<VecDeque<HostTask>>,
    work_ready: Condvar,
    drain_cond: Condvar,
    shutdown: AtomicBool,
    queue_depth: AtomicUsize,
    active: AtomicUsize,
    capacity: usize,
    tasks_completed: AtomicU64,
    tasks_panicked: AtomicU64,
}

/// A single FIFO worker thread acting as the host's privileged thread.
pub struct HostThread {
    inner: Arc<HostInner>,
    worker: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl HostThread {
    /// Spawn the host thread with a queue of `capacity` pending tasks.
    pub fn new(capacity: usize) -> io::Result<Self> {
        let inner = Arc::new(HostInner {
            queue: Mutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            drain_cond: Condvar::new(),
            shutdown: AtomicBool::new(false),
            queue_depth: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            capacity,
            tasks_completed: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
        });

        let worker_inner = Arc::clone(&inner);
        let handle = std::thread::Builder::new()
            .name(HOST_THREAD_NAME.to_string())
            .spawn(move || worker_loop(&worker_inner))?;
        let thread_id = handle.thread().id();
        debug!(target: "hostbridge::host", capacity, "Host thread started");

        Ok(HostThread {
            inner,
            worker: Mutex::new(Some(handle)),
            thread_id,
        })
    }

    /// Whether the calling thread is this host thread.
    pub fn is_host_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Block until every queued and running task has finished.
    ///
    /// The thread keeps running afterwards. Must not be called from the
    /// host thread itself.
    pub fn drain(&self) {
        if self.is_host_thread() {
            warn!(target: "hostbridge::host", "drain called from the host thread; ignoring");
            return;
        }
        let mut queue = self.inner.queue.lock();
        while !queue.is_empty() || self.inner.active.load(Ordering::Acquire) > 0 {
            self.inner.drain_cond.wait(&mut queue);
        }
    }

    /// Stop accepting work, run what is already queued, and join the thread.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        {
            // Notify under the lock so a worker between its shutdown check
            // and its wait cannot miss the wakeup.
            let _queue = self.inner.queue.lock();
            self.inner.work_ready.notify_all();
        }

        if self.is_host_thread() {
            return;
        }
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                warn!(target: "hostbridge::host", "Host thread exited abnormally");
            }
            debug!(target: "hostbridge::host", "Host thread stopped");
        }
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Return a snapshot of host thread metrics.
    pub fn stats(&self) -> HostThreadStats {
        HostThreadStats {
            queue_depth: self.inner.queue_depth.load(Ordering::Relaxed),
            busy: self.inner.active.load(Ordering::Relaxed) > 0,
            tasks_completed: self.inner.tasks_completed.load(Ordering::Relaxed),
            tasks_panicked: self.inner.tasks_panicked.load(Ordering::Relaxed),
            capacity: self.inner.capacity,
        }
    }
}

impl HostScheduler for HostThread {
    fn schedule(&self, task: HostTask) -> Result<(), ScheduleError> {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return Err(ScheduleError::ShutDown);
        }
        {
            let mut queue = self.inner.queue.lock();
            if queue.len() >= self.inner.capacity {
                return Err(ScheduleError::QueueFull {
                    capacity: self.inner.capacity,
                });
            }
            queue.push_back(task);
            self.inner.queue_depth.store(queue.len(), Ordering::Release);
        }
        self.inner.work_ready.notify_one();
        Ok(())
    }
}

impl Drop for HostThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for HostThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostThread")
            .field("thread_id", &self.thread_id)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Decrements `active` and wakes drain waiters on drop, so bookkeeping holds
/// even if a task unwinds past `run_contained`.
struct ActiveTaskGuard<'a> {
    inner: &'a HostInner,
}

impl Drop for ActiveTaskGuard<'_> {
    fn drop(&mut self) {
        let queue = self.inner.queue.lock();
        self.inner.active.fetch_sub(1, Ordering::Release);
        self.inner.tasks_completed.fetch_add(1, Ordering::Relaxed);
        if queue.is_empty() {
            self.inner.drain_cond.notify_all();
        }
    }
}

fn worker_loop(inner: &HostInner) {
    loop {
        let task = {
            let mut queue = inner.queue.lock();
            loop {
                if let Some(task) = queue.pop_front() {
                    inner.queue_depth.store(queue.len(), Ordering::Release);
                    inner.active.fetch_add(1, Ordering::Release);
                    break task;
                }
                if inner.shutdown.load(Ordering::Acquire) {
                    return;
                }
                inner.work_ready.wait(&mut queue);
            }
        };

        let _guard = ActiveTaskGuard { inner };
        if !run_contained(task) {
            inner.tasks_panicked.fetch_add(1, Ordering::Relaxed);
        }
    }
}
