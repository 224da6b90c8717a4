//! Test modules for the executor crate.


use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use hostbridge_concurrency::{ExecutionFailure, HostContext, HostOperation, HostThread};
use hostbridge_core::Payload;
use hostbridge_filter::FilterSpec;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;

use crate::{BridgeConfig, Dispatcher, NoTransactions, Registry};

/// Returns its params unchanged.
pub struct Echo;

impl HostOperation for Echo {
    type Request = Payload;

    fn name(&self) -> &str {
        "echo"
    }

    fn execute(&self, request: Payload, _ctx: &mut HostContext) -> Result<Payload, ExecutionFailure> {
        Ok(request)
    }
}

#[derive(Deserialize)]
pub struct SumRequest {
    pub values: Vec<f64>,
}

impl crate::RequestValidation for SumRequest {
    fn validate_request(&self) -> Result<(), String> {
        if self.values.is_empty() {
            return Err("values must not be empty".to_string());
        }
        Ok(())
    }
}

/// Adds numbers; rejects an empty list before scheduling.
pub struct Sum;

impl HostOperation for Sum {
    type Request = SumRequest;

    fn name(&self) -> &str {
        "sum"
    }

    fn execute(&self, request: SumRequest, _ctx: &mut HostContext) -> Result<Payload, ExecutionFailure> {
        Ok(json!(request.values.iter().sum::<f64>()))
    }
}

/// Validates a filter and reports its canonical form.
pub struct QueryElements;

impl HostOperation for QueryElements {
    type Request = FilterSpec;

    fn name(&self) -> &str {
        "query_elements"
    }

    fn execute(&self, request: FilterSpec, _ctx: &mut HostContext) -> Result<Payload, ExecutionFailure> {
        let validated = request
            .into_validated()
            .map_err(|e| ExecutionFailure::operation(e.to_string()))?;
        serde_json::to_value(validated).map_err(|e| ExecutionFailure::operation(e.to_string()))
    }
}

/// Fails or panics on request.
pub struct Faulty;

impl HostOperation for Faulty {
    type Request = Payload;

    fn name(&self) -> &str {
        "faulty"
    }

    fn execute(&self, mode: Payload, _ctx: &mut HostContext) -> Result<Payload, ExecutionFailure> {
        match mode.as_str().unwrap_or_default() {
            "panic" => panic!("element was deleted underneath us"),
            "fail" => Err(ExecutionFailure::operation("element not found")),
            _ => Ok(Payload::Null),
        }
    }
}

/// Blocks on the host thread until the test opens the gate.
pub struct Gated {
    pub gate: Mutex<Receiver<()>>,
}

impl Gated {
    pub fn new() -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (Gated { gate: Mutex::new(rx) }, tx)
    }
}

impl HostOperation for Gated {
    type Request = ();

    fn name(&self) -> &str {
        "gated"
    }

    fn execute(&self, _request: (), _ctx: &mut HostContext) -> Result<Payload, ExecutionFailure> {
        let _ = self.gate.lock().recv_timeout(Duration::from_secs(10));
        Ok(json!("opened"))
    }
}

/// A dispatcher over every fixture operation, on its own host thread.
pub fn fixture() -> (Dispatcher, Arc<HostThread>, Sender<()>) {
    let (gated, gate) = Gated::new();
    let registry = Registry::new()
        .register("echo", Echo)
        .and_then(|r| r.register("sum", Sum))
        .and_then(|r| r.register("query_elements", QueryElements))
        .and_then(|r| r.register("faulty", Faulty))
        .and_then(|r| r.register("gated", gated))
        .unwrap();
    let (dispatcher, host) = registry
        .build_on_host_thread(Arc::new(NoTransactions), BridgeConfig::default())
        .unwrap();
    (dispatcher, host, gate)
}
