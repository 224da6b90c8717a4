//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from any suite's
//! main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub use hostbridge::bridge::{
    HostContext, HostOperation, HostThread, HostTransaction, ManualHost, TransactionError,
    TransactionProvider,
};
pub use hostbridge::geometry::{Line, Payload, Point3};
pub use hostbridge::{BridgeConfig, Dispatcher, Error, ExecutionFailure, Registry};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;

// ============================================================================
// Transactions
// ============================================================================

/// One entry in a [`Journal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxEvent {
    Begin(String),
    Commit(String),
    Rollback(String),
}

/// Transaction provider that records every begin, commit and rollback.
#[derive(Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<TxEvent>>>,
}

impl Journal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<TxEvent> {
        self.events.lock().clone()
    }

    pub fn commits(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, TxEvent::Commit(_)))
            .count()
    }
}

struct JournalTx {
    name: String,
    events: Arc<Mutex<Vec<TxEvent>>>,
}

impl HostTransaction for JournalTx {
    fn commit(self: Box<Self>) -> Result<(), TransactionError> {
        self.events.lock().push(TxEvent::Commit(self.name.clone()));
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        self.events.lock().push(TxEvent::Rollback(self.name.clone()));
    }
}

impl TransactionProvider for Journal {
    fn begin(&self, name: &str) -> Result<Box<dyn HostTransaction>, TransactionError> {
        self.events.lock().push(TxEvent::Begin(name.to_string()));
        Ok(Box::new(JournalTx {
            name: name.to_string(),
            events: Arc::clone(&self.events),
        }))
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Returns its params along with the executing thread's name.
pub struct Echo;

impl HostOperation for Echo {
    type Request = Payload;

    fn name(&self) -> &str {
        "echo"
    }

    fn execute(&self, request: Payload, ctx: &mut HostContext) -> Result<Payload, ExecutionFailure> {
        Ok(json!({
            "params": request,
            "thread": thread::current().name().unwrap_or_default(),
            "requestId": ctx.request_id().to_string(),
        }))
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaceWallRequest {
    pub line: Line,
    #[serde(default)]
    pub height_mm: Option<f64>,
}

impl hostbridge::RequestValidation for PlaceWallRequest {
    fn validate_request(&self) -> Result<(), String> {
        self.line.validate().map_err(|e| e.to_string())?;
        match self.height_mm {
            Some(h) if !(h.is_finite() && h > 0.0) => Err(format!("invalid height {}", h)),
            _ => Ok(()),
        }
    }
}

/// Mutating operation: "places" a wall inside a named transaction and
/// counts how many walls exist.
#[derive(Default)]
pub struct PlaceWall {
    pub placed: AtomicUsize,
}

impl HostOperation for PlaceWall {
    type Request = PlaceWallRequest;

    fn name(&self) -> &str {
        "place_wall"
    }

    fn transaction_name(&self) -> Option<&str> {
        Some("Place wall")
    }

    fn execute(
        &self,
        request: PlaceWallRequest,
        _ctx: &mut HostContext,
    ) -> Result<Payload, ExecutionFailure> {
        let length = request
            .line
            .length()
            .map_err(|e| ExecutionFailure::operation(e.to_string()))?;
        if length.value() > 100_000.0 {
            return Err(ExecutionFailure::operation("wall longer than 100 m"));
        }
        let (start, end) = request
            .line
            .to_internal()
            .map_err(|e| ExecutionFailure::operation(e.to_string()))?;
        let id = self.placed.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(json!({
            "wallId": id,
            "lengthMm": length.value(),
            "startFt": [start.x, start.y, start.z],
            "endFt": [end.x, end.y, end.z],
        }))
    }
}

/// Spins in checkpointed steps, so a timed-out caller can stop it.
pub struct LongEdit {
    pub steps: usize,
    pub step: Duration,
}

impl HostOperation for LongEdit {
    type Request = ();

    fn name(&self) -> &str {
        "long_edit"
    }

    fn transaction_name(&self) -> Option<&str> {
        Some("Long edit")
    }

    fn execute(&self, _request: (), ctx: &mut HostContext) -> Result<Payload, ExecutionFailure> {
        for _ in 0..self.steps {
            ctx.checkpoint()?;
            thread::sleep(self.step);
        }
        Ok(json!("done"))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Poll `condition` until it holds, failing the test after five seconds.
pub fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        thread::sleep(Duration::from_millis(2));
    }
}

/// Dispatcher with `echo`, `place_wall` and `long_edit` on a fresh host thread.
pub fn standard_dispatcher(
    journal: Arc<Journal>,
    config: BridgeConfig,
) -> (Dispatcher, Arc<HostThread>) {
    Registry::new()
        .register("echo", Echo)
        .and_then(|r| r.register("place_wall", PlaceWall::default()))
        .and_then(|r| {
            r.register(
                "long_edit",
                LongEdit {
                    steps: 200,
                    step: Duration::from_millis(5),
                },
            )
        })
        .and_then(|r| r.build_on_host_thread(journal, config))
        .expect("standard dispatcher")
}
