//! Timed-out callers: the late execution is cancelled or discarded, never
//! delivered to a later caller.

use std::sync::Arc;
use std::time::Duration;

use hostbridge::bridge::RequestBridge;
use hostbridge::CycleState;
use serde_json::json;

use crate::common::*;

#[test]
fn timed_out_edit_is_cancelled_and_rolled_back() {
    let journal = Journal::new();
    let (dispatcher, _host) = standard_dispatcher(journal.clone(), BridgeConfig::default());

    let err = dispatcher.dispatch("long_edit", json!(null), Some(40)).unwrap_err();
    match err {
        Error::Timeout { command, timeout_ms } => {
            assert_eq!(command, "long_edit");
            assert!(timeout_ms >= 40);
        }
        other => panic!("unexpected {:?}", other),
    }

    wait_until("long_edit to settle", || {
        dispatcher.state("long_edit") == Some(CycleState::Idle)
    });
    assert_eq!(dispatcher.stats("long_edit").unwrap().discarded_results, 1);
    assert_eq!(
        journal.events(),
        vec![
            TxEvent::Begin("Long edit".to_string()),
            TxEvent::Rollback("Long edit".to_string()),
        ]
    );
}

#[test]
fn abandoned_request_never_runs_if_host_is_late() {
    let host = Arc::new(ManualHost::new());
    let wall = RequestBridge::new(
        PlaceWall::default(),
        host.clone(),
        Journal::new(),
    );

    let request = serde_json::from_value(json!({
        "line": {"start": {"x": 0, "y": 0, "z": 0}, "end": {"x": 1000, "y": 0, "z": 0}}
    }))
    .unwrap();
    let err = wall.invoke(request, Duration::from_millis(20)).unwrap_err();
    assert!(matches!(err, hostbridge::bridge::BridgeError::Timeout { .. }));
    assert_eq!(wall.state(), CycleState::Armed);

    // The host gets round to it only now; the operation is skipped.
    assert_eq!(host.pump_all(), 1);
    assert_eq!(wall.adapter().operation().placed.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(wall.state(), CycleState::Idle);
    assert_eq!(wall.stats().discarded_results, 1);
}

#[test]
fn late_result_goes_to_nobody() {
    let host = Arc::new(ManualHost::new());
    let dispatcher = Registry::new()
        .register("echo", Echo)
        .unwrap()
        .build(host.clone(), Journal::new(), BridgeConfig::default())
        .unwrap();

    assert!(matches!(
        dispatcher.dispatch("echo", json!("first"), Some(10)),
        Err(Error::Timeout { .. })
    ));
    match dispatcher.dispatch("echo", json!("second"), Some(10)) {
        Err(Error::Busy { abandoned, .. }) => assert!(abandoned),
        other => panic!("expected busy, got {:?}", other),
    }

    host.pump_all();
    assert_eq!(dispatcher.state("echo"), Some(CycleState::Idle));

    // A fresh call is pumped from another thread and sees only its own params.
    let pump = {
        let host = Arc::clone(&host);
        std::thread::spawn(move || {
            wait_until("request to be queued", || host.pending() > 0);
            host.pump_all()
        })
    };
    let payload = dispatcher.dispatch("echo", json!("third"), None).unwrap();
    assert_eq!(payload["params"], "third");
    assert_eq!(pump.join().unwrap(), 1);
}
