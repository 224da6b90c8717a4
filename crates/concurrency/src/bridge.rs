//! Request bridge
//!
//! [`RequestBridge::invoke`] makes "run this on the host thread and wait"
//! look like a plain function call from any thread:
//!
//! 1. arm the adapter (fails fast with `Busy` if a cycle is in flight)
//! 2. reset the result slot and store the request
//! 3. schedule the adapter on the host thread
//! 4. wait on the slot with a bounded timeout
//! 5. return the result, or `Timeout`
//!
//! At most one execution is scheduled per `invoke`. A timeout only stops the
//! caller waiting; the scheduled execution is cancelled cooperatively and,
//! if it still runs, its result is discarded. Callers of mutating commands
//! must treat a timeout as "outcome unknown", not "did not happen".

use std::sync::Arc;
use std::time::{Duration, Instant};

use hostbridge_core::Payload;
use tracing::{debug, warn};

use crate::adapter::{BridgeStats, CorrelatedResult, Counters, ExecutorAdapter, HostOperation};
use crate::cycle::{CycleSnapshot, CycleState};
use crate::error::BridgeError;
use crate::host::HostScheduler;
use crate::transaction::TransactionProvider;

/// Synchronous façade over one command kind's executor adapter.
pub struct RequestBridge<O: HostOperation> {
    adapter: Arc<ExecutorAdapter<O>>,
    scheduler: Arc<dyn HostScheduler>,
}

impl<O: HostOperation> RequestBridge<O> {
    /// Create a bridge running `operation` through `scheduler`.
    pub fn new(
        operation: O,
        scheduler: Arc<dyn HostScheduler>,
        transactions: Arc<dyn TransactionProvider>,
    ) -> Self {
        RequestBridge {
            adapter: Arc::new(ExecutorAdapter::new(operation, transactions)),
            scheduler,
        }
    }

    /// Command name.
    pub fn command(&self) -> &str {
        self.adapter.name()
    }

    /// The underlying adapter.
    pub fn adapter(&self) -> &Arc<ExecutorAdapter<O>> {
        &self.adapter
    }

    /// Current cycle state.
    pub fn state(&self) -> CycleState {
        self.adapter.state()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> BridgeStats {
        self.adapter.stats()
    }

    /// Run `request` on the host thread and wait up to `timeout` for its
    /// payload. Execution failures are returned as
    /// [`BridgeError::Execution`].
    pub fn invoke(&self, request: O::Request, timeout: Duration) -> Result<Payload, BridgeError> {
        let result = self.invoke_correlated(request, timeout)?;
        result.outcome.map_err(|failure| BridgeError::Execution {
            command: self.command().to_string(),
            failure,
        })
    }

    /// Like [`invoke`](Self::invoke), but returns the full correlated result,
    /// including a failure outcome, instead of mapping it to an error.
    pub fn invoke_correlated(
        &self,
        request: O::Request,
        timeout: Duration,
    ) -> Result<CorrelatedResult, BridgeError> {
        let command = self.command();
        if timeout.is_zero() {
            return Err(BridgeError::InvalidTimeout {
                command: command.to_string(),
                reason: "timeout must be greater than zero".to_string(),
            });
        }
        if Instant::now().checked_add(timeout).is_none() {
            return Err(BridgeError::InvalidTimeout {
                command: command.to_string(),
                reason: format!("timeout of {:?} cannot be waited for", timeout),
            });
        }

        let cycle = match self.adapter.set_pending_request(request) {
            Ok(cycle) => cycle,
            Err(snapshot) => return Err(self.busy(snapshot)),
        };
        Counters::bump(&self.adapter.counters.invocations);
        let request_id = cycle.request_id();
        let timeout_ms = timeout.as_millis() as u64;
        debug!(target: "hostbridge::bridge", command, request_id = %request_id, timeout_ms, "Armed request");

        let adapter = Arc::clone(&self.adapter);
        if let Err(source) = self
            .scheduler
            .schedule(Box::new(move || adapter.run_on_host_thread()))
        {
            self.adapter.withdraw(&cycle);
            Counters::bump(&self.adapter.counters.schedule_failures);
            warn!(
                target: "hostbridge::bridge",
                command,
                request_id = %request_id,
                error = %source,
                "Host refused to schedule request"
            );
            return Err(BridgeError::Schedule {
                command: command.to_string(),
                source,
            });
        }

        let started = Instant::now();
        if !self.adapter.wait_for_completion(&cycle, timeout) {
            let waited = started.elapsed();
            self.adapter.abandon(&cycle);
            Counters::bump(&self.adapter.counters.timeouts);
            warn!(
                target: "hostbridge::bridge",
                command,
                request_id = %request_id,
                timeout_ms,
                "Timed out waiting for host thread; execution may still complete"
            );
            return Err(BridgeError::Timeout {
                command: command.to_string(),
                waited,
            });
        }

        let result = self.adapter.take_result(&cycle).ok_or_else(|| {
            BridgeError::Internal(format!(
                "command '{}' signaled without a result for request {}",
                command, request_id
            ))
        })?;
        Counters::bump(&self.adapter.counters.completions);
        if !result.is_success() {
            Counters::bump(&self.adapter.counters.failures);
        }
        debug!(
            target: "hostbridge::bridge",
            command,
            request_id = %request_id,
            elapsed_ms = result.elapsed.as_millis() as u64,
            success = result.is_success(),
            "Received result"
        );
        Ok(result)
    }

    fn busy(&self, snapshot: CycleSnapshot) -> BridgeError {
        Counters::bump(&self.adapter.counters.busy_rejections);
        debug!(
            target: "hostbridge::bridge",
            command = self.command(),
            state = %snapshot.state,
            abandoned = snapshot.is_abandoned(),
            "Rejected invocation: previous cycle in flight"
        );
        BridgeError::Busy {
            command: self.command().to_string(),
            state: snapshot.state,
            abandoned: snapshot.is_abandoned(),
        }
    }
}

impl<O: HostOperation> std::fmt::Debug for RequestBridge<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBridge")
            .field("adapter", &self.adapter)
            .finish()
    }
}
