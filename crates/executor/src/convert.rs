//! Error conversion from bridge error types.

use hostbridge_concurrency::{BridgeError, ExecutionFailure, FailureKind};

use crate::Error;

/// Convert a BridgeError to an executor Error, keeping the command name.
impl From<BridgeError> for Error {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Busy {
                command,
                state,
                abandoned,
            } => {
                let reason = if abandoned {
                    format!(
                        "previous request timed out and is still {} on the host thread",
                        state
                    )
                } else {
                    format!("previous request is {}", state)
                };
                Error::Busy {
                    command,
                    reason,
                    abandoned,
                }
            }

            BridgeError::Timeout { command, waited } => Error::Timeout {
                command,
                timeout_ms: waited.as_millis() as u64,
            },

            BridgeError::Execution { command, failure } => Error::from_failure(command, failure),

            BridgeError::Schedule { command, source } => Error::Scheduler {
                command,
                reason: source.to_string(),
            },

            BridgeError::InvalidTimeout { command, reason } => Error::Validation { command, reason },

            BridgeError::Internal(reason) => Error::Internal { reason },
        }
    }
}

impl Error {
    /// A host-thread failure for `command`.
    pub fn from_failure(command: String, failure: ExecutionFailure) -> Self {
        match failure.kind {
            FailureKind::Cancelled => Error::Cancelled {
                command,
                reason: failure.message,
            },
            kind => Error::Execution {
                command,
                kind,
                reason: failure.message,
            },
        }
    }
}
