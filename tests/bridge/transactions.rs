//! Mutating commands run inside a named host transaction.

use serde_json::json;

use crate::common::*;

fn wall(start: [f64; 3], end: Option<[f64; 3]>) -> Payload {
    json!({
        "line": {
            "start": {"x": start[0], "y": start[1], "z": start[2]},
            "end": end.map(|e| json!({"x": e[0], "y": e[1], "z": e[2]})),
        }
    })
}

#[test]
fn successful_edit_commits() {
    let journal = Journal::new();
    let (dispatcher, _host) = standard_dispatcher(journal.clone(), BridgeConfig::default());

    let payload = dispatcher
        .dispatch("place_wall", wall([0.0, 0.0, 0.0], Some([3048.0, 0.0, 0.0])), None)
        .unwrap();
    assert_eq!(payload["wallId"], 1);
    assert_eq!(payload["lengthMm"], 3048.0);
    let end_ft = payload["endFt"][0].as_f64().unwrap();
    assert!((end_ft - 10.0).abs() < 1e-9);

    assert_eq!(
        journal.events(),
        vec![
            TxEvent::Begin("Place wall".to_string()),
            TxEvent::Commit("Place wall".to_string()),
        ]
    );
}

#[test]
fn failed_edit_rolls_back() {
    let journal = Journal::new();
    let (dispatcher, _host) = standard_dispatcher(journal.clone(), BridgeConfig::default());

    let err = dispatcher
        .dispatch("place_wall", wall([0.0, 0.0, 0.0], Some([200_000.0, 0.0, 0.0])), None)
        .unwrap_err();
    assert!(matches!(err, Error::Execution { .. }));
    assert_eq!(
        journal.events(),
        vec![
            TxEvent::Begin("Place wall".to_string()),
            TxEvent::Rollback("Place wall".to_string()),
        ]
    );
}

#[test]
fn missing_endpoint_rejected_before_transaction() {
    let journal = Journal::new();
    let (dispatcher, _host) = standard_dispatcher(journal.clone(), BridgeConfig::default());

    let err = dispatcher
        .dispatch("place_wall", wall([0.0, 0.0, 0.0], None), None)
        .unwrap_err();
    match err {
        Error::Validation { command, reason } => {
            assert_eq!(command, "place_wall");
            assert!(reason.contains("missing its end endpoint"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(journal.events().is_empty());
}

#[test]
fn read_only_commands_open_no_transaction() {
    let journal = Journal::new();
    let (dispatcher, _host) = standard_dispatcher(journal.clone(), BridgeConfig::default());
    dispatcher.dispatch("echo", json!(1), None).unwrap();
    assert!(journal.events().is_empty());
}
