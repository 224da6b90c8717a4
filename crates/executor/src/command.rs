//! Transport-facing request and response types.
//!
//! A [`CommandRequest`] is what the transport decodes from the wire; a
//! [`CommandResponse`] is what it encodes back. Both are plain serde data.

use hostbridge_concurrency::CorrelatedResult;
use hostbridge_core::Payload;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// A request to run one command.
///
/// # Example
///
/// ```json
/// {"command": "query_elements", "params": {"filterCategory": "OST_Walls"}, "timeoutMs": 5000}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Registered command name
    pub command: String,
    /// Command-specific parameters
    #[serde(default)]
    pub params: Payload,
    /// Caller's wait budget; the command's configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl CommandRequest {
    /// A request with the default timeout.
    pub fn new(command: impl Into<String>, params: Payload) -> Self {
        CommandRequest {
            command: command.into(),
            params,
            timeout_ms: None,
        }
    }

    /// Set the wait budget.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// The outcome of a [`CommandRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    /// Whether the command succeeded
    pub success: bool,
    /// Result payload on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    /// Structured error on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
    /// Id of the invocation cycle, when one was started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
    /// Time from submission to completion on the host thread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

impl CommandResponse {
    /// A failure response with no invocation cycle.
    pub fn rejected(error: Error) -> Self {
        CommandResponse {
            success: false,
            payload: None,
            error: Some(error),
            request_id: None,
            elapsed_ms: None,
        }
    }

    /// Build a response from a host-thread result for `command`.
    pub fn from_result(command: &str, result: CorrelatedResult) -> Self {
        let elapsed_ms = Some(result.elapsed.as_millis() as u64);
        let request_id = Some(result.request_id);
        match result.outcome {
            Ok(payload) => CommandResponse {
                success: true,
                payload: Some(payload),
                error: None,
                request_id,
                elapsed_ms,
            },
            Err(failure) => CommandResponse {
                success: false,
                payload: None,
                error: Some(Error::from_failure(command.to_string(), failure)),
                request_id,
                elapsed_ms,
            },
        }
    }

    /// Convert back into a `Result`.
    pub fn into_result(self) -> Result<Payload, Error> {
        match (self.success, self.error) {
            (true, _) => Ok(self.payload.unwrap_or(Payload::Null)),
            (false, Some(error)) => Err(error),
            (false, None) => Err(Error::Internal {
                reason: "failed response without an error".to_string(),
            }),
        }
    }
}
