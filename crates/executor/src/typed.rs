//! Typed command seam.
//!
//! The transport hands the dispatcher a loosely-typed [`Payload`]. Each
//! registered operation declares a concrete `Request` type; the payload is
//! decoded into it and validated before anything is scheduled, so host code
//! only ever sees well-formed requests.

use std::time::Duration;

use hostbridge_concurrency::{
    BridgeStats, CorrelatedResult, CycleState, HostOperation, RequestBridge,
};
use hostbridge_core::Payload;
use hostbridge_filter::FilterSpec;
use serde::de::DeserializeOwned;

use crate::Error;

/// Validation a request must pass before it is scheduled on the host thread.
///
/// Implementations return a human-readable reason on failure. The default
/// accepts everything.
pub trait RequestValidation {
    /// Check the decoded request.
    fn validate_request(&self) -> Result<(), String> {
        Ok(())
    }
}

impl RequestValidation for FilterSpec {
    fn validate_request(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())
    }
}

impl RequestValidation for Payload {}

impl RequestValidation for () {}

/// A registered command with its request type erased.
pub(crate) trait ErasedCommand: Send + Sync {
    fn name(&self) -> &str;

    /// Wait budget given at registration, if any.
    fn default_timeout(&self) -> Option<Duration>;

    /// Decode `params`, validate, and run through the bridge.
    fn invoke(&self, params: Payload, timeout: Duration) -> Result<CorrelatedResult, Error>;

    fn state(&self) -> CycleState;

    fn stats(&self) -> BridgeStats;
}

pub(crate) struct TypedCommand<O: HostOperation> {
    bridge: RequestBridge<O>,
    default_timeout: Option<Duration>,
}

impl<O: HostOperation> TypedCommand<O> {
    pub(crate) fn new(bridge: RequestBridge<O>, default_timeout: Option<Duration>) -> Self {
        TypedCommand {
            bridge,
            default_timeout,
        }
    }
}

impl<O> ErasedCommand for TypedCommand<O>
where
    O: HostOperation,
    O::Request: DeserializeOwned + RequestValidation,
{
    fn name(&self) -> &str {
        self.bridge.command()
    }

    fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    fn invoke(&self, params: Payload, timeout: Duration) -> Result<CorrelatedResult, Error> {
        let request: O::Request =
            serde_json::from_value(params).map_err(|e| Error::Validation {
                command: self.name().to_string(),
                reason: format!("invalid parameters: {}", e),
            })?;
        request
            .validate_request()
            .map_err(|reason| Error::Validation {
                command: self.name().to_string(),
                reason,
            })?;
        Ok(self.bridge.invoke_correlated(request, timeout)?)
    }

    fn state(&self) -> CycleState {
        self.bridge.state()
    }

    fn stats(&self) -> BridgeStats {
        self.bridge.stats()
    }
}
