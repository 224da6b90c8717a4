//! Correlated result slot
//!
//! A single-assignment container handed from the host thread to a waiting
//! caller. Each cycle starts with [`ResultSlot::reset`], which returns a
//! [`Ticket`]; the host signals with that ticket and the caller waits and
//! reads with it. A signal carrying an older ticket is discarded, so a late
//! result from an earlier cycle can never be observed by a later caller.
//!
//! The value and the done flag are published under the slot's mutex and the
//! waiter re-checks them under the same mutex, which gives the
//! release/acquire ordering between "result written" and "caller woken".

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Identifies one cycle of a [`ResultSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Raw generation number.
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct SlotInner<T> {
    generation: u64,
    done: bool,
    value: Option<T>,
}

/// Thread-observable, single-assignment result container.
#[derive(Debug)]
pub struct ResultSlot<T> {
    inner: Mutex<SlotInner<T>>,
    signal: Condvar,
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultSlot<T> {
    /// An empty slot at generation 0.
    pub fn new() -> Self {
        ResultSlot {
            inner: Mutex::new(SlotInner {
                generation: 0,
                done: false,
                value: None,
            }),
            signal: Condvar::new(),
        }
    }

    /// Clear the done state and any unread value; start a new cycle.
    ///
    /// Called by the invoking side, before the request is submitted.
    pub fn reset(&self) -> Ticket {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.done = false;
        inner.value = None;
        Ticket(inner.generation)
    }

    /// Publish the cycle's result and wake every waiter.
    ///
    /// Returns `false`, dropping `value`, when `ticket` is not the current
    /// cycle or the cycle was already signaled.
    pub fn signal_done(&self, ticket: Ticket, value: T) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != ticket.0 || inner.done {
            return false;
        }
        inner.value = Some(value);
        inner.done = true;
        drop(inner);
        self.signal.notify_all();
        true
    }

    /// Block until the cycle identified by `ticket` is signaled or `timeout`
    /// elapses. Returns `true` if it was signaled.
    ///
    /// Returns `false` immediately if the slot has moved on to a newer cycle.
    /// A `timeout` too large to form a deadline does not wait at all: the
    /// current state is reported as is.
    pub fn await_done(&self, ticket: Ticket, timeout: Duration) -> bool {
        let mut inner = self.inner.lock();
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return inner.generation == ticket.0 && inner.done;
        };
        loop {
            if inner.generation != ticket.0 {
                return false;
            }
            if inner.done {
                return true;
            }
            if self.signal.wait_until(&mut inner, deadline).timed_out() {
                return inner.generation == ticket.0 && inner.done;
            }
        }
    }

    /// Take the value of a signaled cycle. Yields it at most once.
    pub fn take(&self, ticket: Ticket) -> Option<T> {
        let mut inner = self.inner.lock();
        if inner.generation != ticket.0 {
            return None;
        }
        inner.value.take()
    }

    /// Whether the current cycle has been signaled.
    pub fn is_done(&self) -> bool {
        self.inner.lock().done
    }

    /// Ticket of the current cycle.
    pub fn current(&self) -> Ticket {
        Ticket(self.inner.lock().generation)
    }
}
