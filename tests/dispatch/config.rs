//! Configuration files drive dispatcher timeouts.

use std::time::Duration;

use hostbridge::CONFIG_FILE_NAME;
use serde_json::json;
use tempfile::TempDir;

use crate::common::*;

#[test]
fn default_file_is_written_and_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    BridgeConfig::write_default_if_missing(&path).unwrap();

    let config = BridgeConfig::from_file(&path).unwrap();
    assert_eq!(config, BridgeConfig::default());

    let (dispatcher, _host) = standard_dispatcher(Journal::new(), config);
    assert_eq!(dispatcher.config().default_timeout_ms, 15_000);
}

#[test]
fn per_command_timeout_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "default_timeout_ms = 5000\nhost_queue_capacity = 8\n\n[timeouts]\nlong_edit = 30\n",
    )
    .unwrap();
    let config = BridgeConfig::from_file(&path).unwrap();
    assert_eq!(
        config.resolve_timeout("long_edit", None, None).unwrap(),
        Duration::from_millis(30)
    );

    let (dispatcher, host) = standard_dispatcher(Journal::new(), config);
    assert_eq!(host.stats().capacity, 8);

    // No explicit timeout: the configured 30ms applies and the edit times out.
    let err = dispatcher.dispatch("long_edit", json!(null), None).unwrap_err();
    match err {
        Error::Timeout { timeout_ms, .. } => assert!((30..5000).contains(&timeout_ms)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn registered_timeout_overridden_by_file() {
    let mut config = BridgeConfig::default();
    config.timeouts.insert("slow".to_string(), 25);

    let host = std::sync::Arc::new(ManualHost::new());
    let dispatcher = Registry::new()
        .register_with_timeout("slow", Echo, Duration::from_secs(60))
        .unwrap()
        .build(host, Journal::new(), config)
        .unwrap();

    // The manual host is never pumped, so only the 25ms budget can end the wait.
    assert!(matches!(
        dispatcher.dispatch("slow", json!(null), None),
        Err(Error::Timeout { .. })
    ));
}

#[test]
fn invalid_file_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "default_timeout_ms = 20000\nmax_timeout_ms = 1000\n").unwrap();
    match BridgeConfig::from_file(&path).unwrap_err() {
        Error::Config { reason } => assert!(reason.contains("max_timeout_ms")),
        other => panic!("unexpected {:?}", other),
    }
}
