//! The process-global dispatcher. Only this test installs it.

use std::sync::{Arc, Barrier};
use std::thread;

use serde_json::json;

use crate::common::*;

#[test]
fn install_once_then_dispatch_from_any_thread() {
    let (dispatcher, host) = standard_dispatcher(Journal::new(), BridgeConfig::default());
    let installed = hostbridge::install(dispatcher).unwrap();
    assert!(installed.contains("place_wall"));

    let (again, _other_host) = standard_dispatcher(Journal::new(), BridgeConfig::default());
    assert_eq!(hostbridge::install(again).unwrap_err(), Error::AlreadyInstalled);

    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let dispatcher = hostbridge::global().expect("installed");
                let mut ok = 0u64;
                for _ in 0..25 {
                    match dispatcher.dispatch("echo", json!(i), None) {
                        Ok(payload) => {
                            assert_eq!(payload["params"], i);
                            ok += 1;
                        }
                        Err(Error::Busy { .. }) => {}
                        Err(other) => panic!("unexpected {:?}", other),
                    }
                }
                ok
            })
        })
        .collect();
    let ok: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    let stats = hostbridge::global().unwrap().stats("echo").unwrap();
    assert_eq!(stats.completions, ok);
    wait_until("host to finish its last task", || host.stats().tasks_completed == ok);
}
