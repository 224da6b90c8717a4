//! Error types for command dispatch.
//!
//! All errors from dispatch are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON for the transport
//! - **Synchronous**: Validation, busy and unknown-command errors are raised
//!   before anything is scheduled on the host thread

use hostbridge_concurrency::FailureKind;
use serde::{Deserialize, Serialize};

/// Command dispatch errors.
///
/// # Categories
///
/// | Category | Variants | Scheduled? |
/// |----------|----------|------------|
/// | Lookup | `UnknownCommand` | no |
/// | Input | `Validation` | no |
/// | Concurrency | `Busy` | no |
/// | Wait | `Timeout` | yes, outcome unknown |
/// | Host | `Execution`, `Cancelled`, `Scheduler` | yes / refused |
/// | Setup | `Config`, `AlreadyInstalled`, `DuplicateCommand` | n/a |
/// | System | `Internal` | n/a |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Lookup ====================
    /// No command registered under this name
    #[error("unknown command: {command}")]
    UnknownCommand { command: String },

    // ==================== Input ====================
    /// Parameters could not be decoded or failed validation
    #[error("invalid request for '{command}': {reason}")]
    Validation { command: String, reason: String },

    // ==================== Concurrency ====================
    /// A previous request for the same command is still in flight
    #[error("command '{command}' is busy: {reason}")]
    Busy {
        command: String,
        reason: String,
        abandoned: bool,
    },

    /// The caller stopped waiting; the request may still execute
    #[error("command '{command}' timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    // ==================== Host ====================
    /// The operation ran on the host thread and failed
    #[error("command '{command}' failed: {reason}")]
    Execution {
        command: String,
        kind: FailureKind,
        reason: String,
    },

    /// The operation stopped because its caller gave up
    #[error("command '{command}' was cancelled: {reason}")]
    Cancelled { command: String, reason: String },

    /// The host refused to schedule the request
    #[error("command '{command}' could not be scheduled: {reason}")]
    Scheduler { command: String, reason: String },

    // ==================== Setup ====================
    /// Configuration could not be read or is invalid
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// A process-global dispatcher is already installed
    #[error("a dispatcher is already installed")]
    AlreadyInstalled,

    /// Two operations registered under one name
    #[error("command registered twice: {command}")]
    DuplicateCommand { command: String },

    // ==================== System ====================
    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl Error {
    /// Whether the request may have executed on the host thread.
    pub fn may_have_executed(&self) -> bool {
        matches!(self, Error::Timeout { .. } | Error::Execution { .. } | Error::Cancelled { .. })
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Error::Config {
            reason: reason.into(),
        }
    }
}
