//! Error types for the host-thread bridge
//!
//! Failures are split by where they are detected:
//! - [`BridgeError`]: raised synchronously to the invoking caller
//! - [`ExecutionFailure`]: captured on the host thread and carried back as data
//! - [`ScheduleError`] / [`TransactionError`]: reported by host collaborators

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cycle::CycleState;

/// Errors returned by [`RequestBridge::invoke`](crate::RequestBridge::invoke).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// A previous invocation on the same bridge has not finished its cycle.
    #[error("command '{command}' is busy ({state}){}", busy_detail(.abandoned))]
    Busy {
        /// Command kind
        command: String,
        /// Cycle state observed when the invocation was rejected
        state: CycleState,
        /// The in-flight cycle was abandoned by a timed-out caller
        abandoned: bool,
    },

    /// The caller's wait exceeded its budget. Execution may still happen later.
    #[error("command '{command}' timed out after {}ms", .waited.as_millis())]
    Timeout {
        /// Command kind
        command: String,
        /// Time spent waiting
        waited: Duration,
    },

    /// The operation ran on the host thread and failed.
    #[error("command '{command}' failed: {failure}")]
    Execution {
        /// Command kind
        command: String,
        /// Failure captured on the host thread
        failure: ExecutionFailure,
    },

    /// The host refused to schedule the request. Nothing was executed.
    #[error("command '{command}' could not be scheduled: {source}")]
    Schedule {
        /// Command kind
        command: String,
        /// Scheduler error
        #[source]
        source: ScheduleError,
    },

    /// Zero or otherwise unusable timeout.
    #[error("invalid timeout for '{command}': {reason}")]
    InvalidTimeout {
        /// Command kind
        command: String,
        /// Why the timeout was rejected
        reason: String,
    },

    /// Internal invariant violated. Indicates a bug.
    #[error("internal bridge error: {0}")]
    Internal(String),
}

fn busy_detail(abandoned: &bool) -> &'static str {
    if *abandoned {
        ", previous request timed out and is still pending on the host thread"
    } else {
        ""
    }
}

/// Reasons the host scheduler can refuse a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The host is no longer accepting work.
    #[error("host is shut down")]
    ShutDown,

    /// The host's queue is at capacity.
    #[error("host queue is full ({capacity} pending)")]
    QueueFull {
        /// Queue capacity
        capacity: usize,
    },
}

/// Errors from the transactional collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Could not open a transaction.
    #[error("failed to begin transaction '{name}': {reason}")]
    Begin {
        /// Transaction name
        name: String,
        /// Host-provided reason
        reason: String,
    },

    /// Could not commit; the host rolled the changes back.
    #[error("failed to commit transaction '{name}': {reason}")]
    Commit {
        /// Transaction name
        name: String,
        /// Host-provided reason
        reason: String,
    },
}

/// Category of a host-thread failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The operation returned an error
    Operation,
    /// The operation panicked; the panic was contained on the host thread
    Panicked,
    /// The operation observed a cancellation request and stopped
    Cancelled,
    /// Opening or committing the transaction failed
    Transaction,
}

/// A failure captured on the host thread, carried back as plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ExecutionFailure {
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable description
    pub message: String,
}

impl ExecutionFailure {
    /// The operation itself reported an error.
    pub fn operation(message: impl Into<String>) -> Self {
        ExecutionFailure {
            kind: FailureKind::Operation,
            message: message.into(),
        }
    }

    /// The operation stopped because cancellation was requested.
    pub fn cancelled() -> Self {
        ExecutionFailure {
            kind: FailureKind::Cancelled,
            message: "cancelled after caller stopped waiting".to_string(),
        }
    }

    pub(crate) fn panicked(message: impl Into<String>) -> Self {
        ExecutionFailure {
            kind: FailureKind::Panicked,
            message: message.into(),
        }
    }
}

impl From<TransactionError> for ExecutionFailure {
    fn from(e: TransactionError) -> Self {
        ExecutionFailure {
            kind: FailureKind::Transaction,
            message: e.to_string(),
        }
    }
}
