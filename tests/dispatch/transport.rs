//! Transport round trip: JSON in, JSON out.

use hostbridge::{CommandRequest, CommandResponse};
use serde_json::{json, Value};

use crate::common::*;

fn handle_line(dispatcher: &Dispatcher, line: &str) -> Value {
    let response = match serde_json::from_str::<CommandRequest>(line) {
        Ok(request) => dispatcher.dispatch_request(request),
        Err(e) => CommandResponse::rejected(Error::Validation {
            command: String::new(),
            reason: e.to_string(),
        }),
    };
    serde_json::to_value(response).unwrap()
}

#[test]
fn success_response_carries_payload_and_id() {
    let (dispatcher, _host) = standard_dispatcher(Journal::new(), BridgeConfig::default());
    let response = handle_line(
        &dispatcher,
        r#"{"command": "place_wall", "params": {"line": {"p0": {"x": 0, "y": 0, "z": 0}, "p1": {"x": 0, "y": 4000, "z": 0}}}}"#,
    );
    assert_eq!(response["success"], true);
    assert_eq!(response["payload"]["lengthMm"], 4000.0);
    assert!(response["requestId"].is_string());
    assert!(response.get("error").is_none());
}

#[test]
fn errors_are_structured() {
    let (dispatcher, _host) = standard_dispatcher(Journal::new(), BridgeConfig::default());

    let unknown = handle_line(&dispatcher, r#"{"command": "explode"}"#);
    assert_eq!(unknown["success"], false);
    assert_eq!(unknown["error"]["UnknownCommand"]["command"], "explode");

    let invalid = handle_line(
        &dispatcher,
        r#"{"command": "place_wall", "params": {"line": {"start": {"x": 1, "y": 1, "z": 1}, "end": {"x": 1, "y": 1, "z": 1}}}}"#,
    );
    assert!(invalid["error"]["Validation"]["reason"]
        .as_str()
        .unwrap()
        .contains("zero-length"));

    let timeout = handle_line(&dispatcher, r#"{"command": "long_edit", "timeoutMs": 20}"#);
    assert_eq!(timeout["error"]["Timeout"]["command"], "long_edit");

    let garbage = handle_line(&dispatcher, "not json");
    assert!(garbage["error"]["Validation"].is_object());
}

#[test]
fn response_decodes_back_to_result() {
    let (dispatcher, _host) = standard_dispatcher(Journal::new(), BridgeConfig::default());
    let encoded = handle_line(&dispatcher, &json!({"command": "echo", "params": [1, 2]}).to_string());
    let decoded: CommandResponse = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded.into_result().unwrap()["params"], json!([1, 2]));
}
