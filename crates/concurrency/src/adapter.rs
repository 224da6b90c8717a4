//! Single-threaded executor adapter
//!
//! One [`ExecutorAdapter`] exists per command kind and is reused for every
//! invocation of that command. It holds the pending request, the cycle state
//! and the result slot. The invoking side arms it with
//! [`set_pending_request`](ExecutorAdapter::set_pending_request); the host
//! thread runs it with [`run_on_host_thread`](ExecutorAdapter::run_on_host_thread).
//!
//! The pending request is written only by the invoking side while the cycle
//! is `Armed`, and taken only by the host after it moves the cycle to
//! `Executing`. The result is written only by the host and read only by the
//! caller holding the matching ticket.
//!
//! `run_on_host_thread` is the trust boundary: operation errors, failed
//! transactions and panics all become failure-shaped results, and the slot
//! is signaled on every path.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hostbridge_core::Payload;
use parking_lot::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::cancel::CancellationToken;
use crate::cycle::{CycleCell, CycleSnapshot, CycleState, Release};
use crate::error::ExecutionFailure;
use crate::slot::{ResultSlot, Ticket};
use crate::transaction::{TransactionProvider, TransactionScope};

/// One command kind's unit of work on the host thread.
pub trait HostOperation: Send + Sync + 'static {
    /// Typed request decoded from the transport
    type Request: Send + 'static;

    /// Command name, used in logs and errors.
    fn name(&self) -> &str;

    /// Name of the transaction to wrap the operation in.
    ///
    /// Mutating operations return `Some`; read-only operations keep the
    /// default `None` and run without a transaction.
    fn transaction_name(&self) -> Option<&str> {
        None
    }

    /// Run the operation. Called only on the host thread.
    fn execute(
        &self,
        request: Self::Request,
        ctx: &mut HostContext,
    ) -> Result<Payload, ExecutionFailure>;
}

/// Per-invocation context handed to [`HostOperation::execute`].
#[derive(Debug, Clone)]
pub struct HostContext {
    request_id: Uuid,
    token: CancellationToken,
}

impl HostContext {
    /// Context for a request, observing `token`.
    pub fn new(request_id: Uuid, token: CancellationToken) -> Self {
        HostContext { request_id, token }
    }

    /// Id correlating this execution with its caller.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Whether the caller gave up waiting.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fails with a cancelled failure if the caller gave up waiting.
    ///
    /// Long-running operations call this between steps, before the
    /// transaction is committed, so an abandoned request is rolled back.
    pub fn checkpoint(&self) -> Result<(), ExecutionFailure> {
        if self.token.is_cancelled() {
            Err(ExecutionFailure::cancelled())
        } else {
            Ok(())
        }
    }
}

/// The outcome of one invocation cycle, written once by the host thread.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatedResult {
    /// Id of the invocation cycle that produced this result
    pub request_id: Uuid,
    /// Success payload or captured failure
    pub outcome: Result<Payload, ExecutionFailure>,
    /// Time from submission to completion on the host thread
    pub elapsed: Duration,
}

impl CorrelatedResult {
    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Handle to an armed cycle, held by the invoking side.
#[derive(Debug, Clone)]
pub struct ArmedCycle {
    request_id: Uuid,
    ticket: Ticket,
    token: CancellationToken,
}

impl ArmedCycle {
    /// Id allocated to this cycle.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Slot ticket for this cycle.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }
}

/// Counters for one adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Invocations that armed the adapter
    pub invocations: u64,
    /// Results handed back to a waiting caller
    pub completions: u64,
    /// Handed-back results that were failures
    pub failures: u64,
    /// Callers that stopped waiting
    pub timeouts: u64,
    /// Invocations rejected because a cycle was in flight
    pub busy_rejections: u64,
    /// Invocations the host refused to schedule
    pub schedule_failures: u64,
    /// Results produced after their caller stopped waiting
    pub discarded_results: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) invocations: AtomicU64,
    pub(crate) completions: AtomicU64,
    pub(crate) failures: AtomicU64,
    pub(crate) timeouts: AtomicU64,
    pub(crate) busy_rejections: AtomicU64,
    pub(crate) schedule_failures: AtomicU64,
    pub(crate) discarded_results: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> BridgeStats {
        BridgeStats {
            invocations: self.invocations.load(Ordering::Relaxed),
            completions: self.completions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            busy_rejections: self.busy_rejections.load(Ordering::Relaxed),
            schedule_failures: self.schedule_failures.load(Ordering::Relaxed),
            discarded_results: self.discarded_results.load(Ordering::Relaxed),
        }
    }
}

/// What became of a finished result on the host side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Delivered,
    Unread,
    Dropped,
}

struct PendingRequest<R> {
    request_id: Uuid,
    ticket: Ticket,
    request: R,
    token: CancellationToken,
    submitted: Instant,
}

/// Reusable host-thread executor for one command kind.
pub struct ExecutorAdapter<O: HostOperation> {
    operation: O,
    transactions: Arc<dyn TransactionProvider>,
    cycle: CycleCell,
    pending: Mutex<Option<PendingRequest<O::Request>>>,
    slot: ResultSlot<CorrelatedResult>,
    pub(crate) counters: Counters,
}

impl<O: HostOperation> ExecutorAdapter<O> {
    /// Create an idle adapter for `operation`.
    pub fn new(operation: O, transactions: Arc<dyn TransactionProvider>) -> Self {
        ExecutorAdapter {
            operation,
            transactions,
            cycle: CycleCell::new(),
            pending: Mutex::new(None),
            slot: ResultSlot::new(),
            counters: Counters::default(),
        }
    }

    /// The wrapped operation.
    pub fn operation(&self) -> &O {
        &self.operation
    }

    /// Command name.
    pub fn name(&self) -> &str {
        self.operation.name()
    }

    /// Current cycle state.
    pub fn state(&self) -> CycleState {
        self.cycle.state()
    }

    /// Current cycle state and release flag.
    pub fn snapshot(&self) -> CycleSnapshot {
        self.cycle.snapshot()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> BridgeStats {
        self.counters.snapshot()
    }

    /// Arm the adapter with `request`: `Idle → Armed`, reset the slot, store
    /// the request. Fails with the observed cycle when not idle; the request
    /// is dropped in that case.
    pub fn set_pending_request(&self, request: O::Request) -> Result<ArmedCycle, CycleSnapshot> {
        self.cycle.arm()?;
        let ticket = self.slot.reset();
        let cycle = ArmedCycle {
            request_id: Uuid::new_v4(),
            ticket,
            token: CancellationToken::new(),
        };
        *self.pending.lock() = Some(PendingRequest {
            request_id: cycle.request_id,
            ticket,
            request,
            token: cycle.token.clone(),
            submitted: Instant::now(),
        });
        Ok(cycle)
    }

    /// Undo [`set_pending_request`](Self::set_pending_request) after the host
    /// refused to schedule the cycle. Returns the request.
    pub fn withdraw(&self, cycle: &ArmedCycle) -> Option<O::Request> {
        let mut pending = self.pending.lock();
        let request = match pending.take() {
            Some(p) if p.ticket == cycle.ticket => Some(p.request),
            other => {
                *pending = other;
                None
            }
        };
        drop(pending);
        if self.cycle.disarm().is_err() {
            error!(
                target: "hostbridge::bridge",
                command = self.name(),
                request_id = %cycle.request_id,
                "Withdrawn cycle was no longer armed"
            );
        }
        request
    }

    /// Block until the host signals `cycle` or `timeout` elapses.
    pub fn wait_for_completion(&self, cycle: &ArmedCycle, timeout: Duration) -> bool {
        self.slot.await_done(cycle.ticket, timeout)
    }

    /// Read the signaled result and release the cycle back to `Idle`.
    pub fn take_result(&self, cycle: &ArmedCycle) -> Option<CorrelatedResult> {
        let result = self.slot.take(cycle.ticket);
        if let Err(snapshot) = self.cycle.release() {
            error!(
                target: "hostbridge::bridge",
                command = self.name(),
                request_id = %cycle.request_id,
                state = %snapshot.state,
                "Release after completion found unexpected cycle state"
            );
        }
        result
    }

    /// Stop waiting on `cycle`: request cancellation and release it.
    ///
    /// Returns `Retired` when the host had already finished (its result is
    /// dropped here), `Deferred` when the host still owns the cycle.
    pub fn abandon(&self, cycle: &ArmedCycle) -> Option<Release> {
        cycle.token.cancel();
        match self.cycle.release() {
            Ok(Release::Retired) => {
                Counters::bump(&self.counters.discarded_results);
                info!(
                    target: "hostbridge::bridge",
                    command = self.name(),
                    request_id = %cycle.request_id,
                    "Result arrived after caller stopped waiting; discarded"
                );
                Some(Release::Retired)
            }
            Ok(Release::Deferred) => Some(Release::Deferred),
            Err(snapshot) => {
                error!(
                    target: "hostbridge::bridge",
                    command = self.name(),
                    request_id = %cycle.request_id,
                    state = %snapshot.state,
                    "Abandoned cycle could not be released"
                );
                None
            }
        }
    }

    /// Run the pending request. Called by the host's scheduler, on the host
    /// thread, once per scheduled cycle.
    pub fn run_on_host_thread(&self) {
        let command = self.operation.name();
        if let Err(snapshot) = self.cycle.begin_execution() {
            error!(
                target: "hostbridge::host",
                command,
                state = %snapshot.state,
                "Spurious host trigger: adapter is not armed"
            );
            return;
        }

        let Some(pending) = self.pending.lock().take() else {
            error!(target: "hostbridge::host", command, "Armed adapter has no pending request");
            let _ = self.cycle.finish_execution();
            return;
        };
        let request_id = pending.request_id;
        debug!(target: "hostbridge::host", command, request_id = %request_id, "Host picked up request");

        let outcome = if pending.token.is_cancelled() {
            debug!(
                target: "hostbridge::host",
                command,
                request_id = %request_id,
                "Caller stopped waiting before pickup; skipping operation"
            );
            Err(ExecutionFailure::cancelled())
        } else {
            let mut ctx = HostContext::new(request_id, pending.token.clone());
            self.execute(pending.request, &mut ctx)
        };

        let result = CorrelatedResult {
            request_id,
            outcome,
            elapsed: pending.submitted.elapsed(),
        };
        let elapsed_ms = result.elapsed.as_millis() as u64;

        // Completed becomes visible before the signal, so a caller that
        // reads the result and invokes again finds the adapter idle.
        match self.cycle.finish_execution() {
            Ok(Release::Deferred) => match self.deliver(pending.ticket, &pending.token, result) {
                Delivery::Delivered => {
                    debug!(
                        target: "hostbridge::host",
                        command,
                        request_id = %request_id,
                        elapsed_ms,
                        "Request completed"
                    );
                }
                Delivery::Unread => {
                    debug!(
                        target: "hostbridge::host",
                        command,
                        request_id = %request_id,
                        elapsed_ms,
                        "Request completed after caller stopped waiting; result left unread"
                    );
                }
                Delivery::Dropped => {
                    debug!(
                        target: "hostbridge::host",
                        command,
                        request_id = %request_id,
                        "Caller released cycle before signal; result dropped"
                    );
                }
            },
            Ok(Release::Retired) => {
                Counters::bump(&self.counters.discarded_results);
                info!(
                    target: "hostbridge::host",
                    command,
                    request_id = %request_id,
                    elapsed_ms,
                    success = result.is_success(),
                    "Request finished after caller stopped waiting; result discarded"
                );
            }
            Err(snapshot) => {
                error!(
                    target: "hostbridge::host",
                    command,
                    request_id = %request_id,
                    state = %snapshot.state,
                    "Cycle left executing state unexpectedly"
                );
            }
        }
    }

    /// Signals the slot for a deferred cycle. A caller that gave up between
    /// `finish_execution` and the signal has already retired the cycle and
    /// counted the discard, so the stored result is never read.
    fn deliver(&self, ticket: Ticket, token: &CancellationToken, result: CorrelatedResult) -> Delivery {
        if !self.slot.signal_done(ticket, result) {
            Delivery::Dropped
        } else if token.is_cancelled() {
            Delivery::Unread
        } else {
            Delivery::Delivered
        }
    }

    fn execute(&self, request: O::Request, ctx: &mut HostContext) -> Result<Payload, ExecutionFailure> {
        let operation = &self.operation;
        let transactions = &*self.transactions;
        let run = move || -> Result<Payload, ExecutionFailure> {
            match operation.transaction_name() {
                Some(name) => {
                    let scope = TransactionScope::begin(transactions, name)?;
                    let payload = operation.execute(request, ctx)?;
                    scope.commit()?;
                    Ok(payload)
                }
                None => operation.execute(request, ctx),
            }
        };

        match catch_unwind(AssertUnwindSafe(run)) {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    target: "hostbridge::host",
                    command = operation.name(),
                    "Host operation panicked: {}",
                    message
                );
                Err(ExecutionFailure::panicked(format!(
                    "operation panicked: {}",
                    message
                )))
            }
        }
    }
}

impl<O: HostOperation> std::fmt::Debug for ExecutorAdapter<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorAdapter")
            .field("command", &self.name())
            .field("cycle", &self.cycle.snapshot())
            .finish()
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "(non-string panic)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::NoTransactions;
    use serde_json::json;

    struct Echo;

    impl HostOperation for Echo {
        type Request = Payload;

        fn name(&self) -> &str {
            "echo"
        }

        fn execute(&self, request: Payload, _ctx: &mut HostContext) -> Result<Payload, ExecutionFailure> {
            Ok(request)
        }
    }

    struct Explode;

    impl HostOperation for Explode {
        type Request = ();

        fn name(&self) -> &str {
            "explode"
        }

        fn execute(&self, _: (), _ctx: &mut HostContext) -> Result<Payload, ExecutionFailure> {
            panic!("kernel fault")
        }
    }

    fn adapter<O: HostOperation>(op: O) -> ExecutorAdapter<O> {
        ExecutorAdapter::new(op, Arc::new(NoTransactions))
    }

    #[test]
    fn test_full_cycle() {
        let adapter = adapter(Echo);
        let cycle = adapter.set_pending_request(json!({"n": 1})).unwrap();
        assert_eq!(adapter.state(), CycleState::Armed);
        adapter.run_on_host_thread();
        assert_eq!(adapter.state(), CycleState::Completed);
        assert!(adapter.wait_for_completion(&cycle, Duration::from_millis(1)));
        let result = adapter.take_result(&cycle).unwrap();
        assert_eq!(result.request_id, cycle.request_id());
        assert_eq!(result.outcome, Ok(json!({"n": 1})));
        assert_eq!(adapter.state(), CycleState::Idle);
    }

    #[test]
    fn test_second_arm_rejected() {
        let adapter = adapter(Echo);
        adapter.set_pending_request(json!(1)).unwrap();
        let snapshot = adapter.set_pending_request(json!(2)).unwrap_err();
        assert_eq!(snapshot.state, CycleState::Armed);
    }

    #[test]
    fn test_spurious_trigger_is_ignored() {
        let adapter = adapter(Echo);
        adapter.run_on_host_thread();
        assert_eq!(adapter.state(), CycleState::Idle);
    }

    #[test]
    fn test_panic_becomes_failure_and_signals() {
        let adapter = adapter(Explode);
        let cycle = adapter.set_pending_request(()).unwrap();
        adapter.run_on_host_thread();
        let result = adapter.take_result(&cycle).unwrap();
        let failure = result.outcome.unwrap_err();
        assert_eq!(failure.kind, crate::FailureKind::Panicked);
        assert!(failure.message.contains("kernel fault"));
        assert_eq!(adapter.state(), CycleState::Idle);
    }

    #[test]
    fn test_abandoned_before_pickup_is_skipped() {
        let adapter = adapter(Echo);
        let cycle = adapter.set_pending_request(json!("late")).unwrap();
        assert_eq!(adapter.abandon(&cycle), Some(Release::Deferred));
        adapter.run_on_host_thread();
        assert_eq!(adapter.state(), CycleState::Idle);
        assert_eq!(adapter.stats().discarded_results, 1);
        assert!(adapter.set_pending_request(json!("next")).is_ok());
    }

    #[test]
    fn test_caller_retires_between_finish_and_signal() {
        let adapter = adapter(Echo);
        let cycle = adapter.set_pending_request(json!("late")).unwrap();
        let result = |cycle: &ArmedCycle| CorrelatedResult {
            request_id: cycle.request_id(),
            outcome: Ok(json!("late")),
            elapsed: Duration::ZERO,
        };

        // Host finishes while the caller is still waiting.
        assert_eq!(adapter.cycle.begin_execution(), Ok(false));
        assert_eq!(adapter.cycle.finish_execution(), Ok(Release::Deferred));

        // Caller times out before the host signals.
        assert_eq!(adapter.abandon(&cycle), Some(Release::Retired));
        assert_eq!(adapter.state(), CycleState::Idle);
        assert_eq!(adapter.stats().discarded_results, 1);

        assert_eq!(adapter.deliver(cycle.ticket(), &cycle.token, result(&cycle)), Delivery::Unread);
        assert_eq!(adapter.stats().discarded_results, 1);

        // The next cycle never sees the unread result, and a stale signal
        // for the old ticket is dropped.
        let next = adapter.set_pending_request(json!("next")).unwrap();
        assert!(!adapter.wait_for_completion(&next, Duration::from_millis(1)));
        assert_eq!(adapter.deliver(cycle.ticket(), &cycle.token, result(&cycle)), Delivery::Dropped);
        assert!(!adapter.wait_for_completion(&next, Duration::from_millis(1)));

        adapter.run_on_host_thread();
        assert_eq!(adapter.take_result(&next).unwrap().outcome, Ok(json!("next")));
        assert_eq!(adapter.stats().discarded_results, 1);
    }

    #[test]
    fn test_withdraw_returns_request() {
        let adapter = adapter(Echo);
        let cycle = adapter.set_pending_request(json!("x")).unwrap();
        assert_eq!(adapter.withdraw(&cycle), Some(json!("x")));
        assert_eq!(adapter.state(), CycleState::Idle);
    }

    #[test]
    fn test_checkpoint() {
        let token = CancellationToken::new();
        let ctx = HostContext::new(Uuid::new_v4(), token.clone());
        assert!(ctx.checkpoint().is_ok());
        token.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.checkpoint().unwrap_err().kind, crate::FailureKind::Cancelled);
    }
}
