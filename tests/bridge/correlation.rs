//! Every caller gets its own result, never a neighbour's or a stale one.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use hostbridge::bridge::HOST_THREAD_NAME;
use hostbridge::CycleState;
use serde_json::json;

use crate::common::*;

#[test]
fn executes_on_the_host_thread() {
    let (dispatcher, _host) = standard_dispatcher(Journal::new(), BridgeConfig::default());
    let caller = thread::current().name().map(str::to_string);

    let payload = dispatcher.dispatch("echo", json!({"n": 1}), None).unwrap();
    assert_eq!(payload["thread"], HOST_THREAD_NAME);
    assert_ne!(caller.as_deref(), Some(HOST_THREAD_NAME));
}

#[test]
fn sequential_calls_never_see_stale_results() {
    let (dispatcher, _host) = standard_dispatcher(Journal::new(), BridgeConfig::default());
    let mut ids = HashSet::new();
    for n in 0..200 {
        let payload = dispatcher.dispatch("echo", json!({"n": n}), None).unwrap();
        assert_eq!(payload["params"]["n"], n);
        assert!(ids.insert(payload["requestId"].as_str().unwrap().to_string()));
    }
    let stats = dispatcher.stats("echo").unwrap();
    assert_eq!(stats.invocations, 200);
    assert_eq!(stats.completions, 200);
}

#[test]
fn contended_callers_get_own_result_or_busy() {
    const THREADS: usize = 8;
    const CALLS: usize = 50;

    let (dispatcher, _host) = standard_dispatcher(Journal::new(), BridgeConfig::default());
    let dispatcher = Arc::new(dispatcher);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let dispatcher = Arc::clone(&dispatcher);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut completed = 0u64;
                for i in 0..CALLS {
                    let tag = format!("{}:{}", t, i);
                    match dispatcher.dispatch("echo", json!({"tag": tag}), None) {
                        Ok(payload) => {
                            assert_eq!(payload["params"]["tag"], tag);
                            completed += 1;
                        }
                        Err(Error::Busy { abandoned, .. }) => assert!(!abandoned),
                        Err(other) => panic!("unexpected error {:?}", other),
                    }
                }
                completed
            })
        })
        .collect();

    let completed: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    let stats = dispatcher.stats("echo").unwrap();
    assert_eq!(stats.completions, completed);
    assert_eq!(stats.invocations + stats.busy_rejections, (THREADS * CALLS) as u64);
    assert_eq!(stats.timeouts, 0);
    assert_eq!(dispatcher.state("echo"), Some(CycleState::Idle));
}

#[test]
fn commands_do_not_block_each_other_for_busy() {
    let (dispatcher, _host) = standard_dispatcher(Journal::new(), BridgeConfig::default());
    let dispatcher = Arc::new(dispatcher);

    let long = {
        let dispatcher = Arc::clone(&dispatcher);
        thread::spawn(move || dispatcher.dispatch("long_edit", json!(null), Some(50)))
    };
    wait_until("long_edit to start", || {
        dispatcher.state("long_edit") == Some(CycleState::Executing)
    });

    // A different command is never Busy because of another command's cycle;
    // it queues behind it on the single host thread.
    let echo = {
        let dispatcher = Arc::clone(&dispatcher);
        thread::spawn(move || dispatcher.dispatch("echo", json!("queued"), None))
    };

    assert!(matches!(long.join().unwrap(), Err(Error::Timeout { .. })));
    let payload = echo.join().unwrap().unwrap();
    assert_eq!(payload["params"], "queued");
}
