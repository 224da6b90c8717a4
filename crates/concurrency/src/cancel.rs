//! Cooperative cancellation
//!
//! A timed-out caller cannot stop host-thread code that is already running.
//! It can only ask. The token is checked by the adapter before pickup (a
//! cancelled cycle is skipped outright) and by operations that poll
//! [`HostContext::checkpoint`](crate::HostContext::checkpoint).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag for one invocation cycle.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
