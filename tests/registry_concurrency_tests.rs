//! Host execution must be serialized across engine worker threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use chrbridge::{Argument, CallbackRegistry, HostFailure};

const CALLS_PER_THREAD: usize = 200;

/// Non-atomic read-modify-write: only correct if calls never overlap.
fn bump(counter: &AtomicUsize, active: &AtomicUsize, max_active: &AtomicUsize) {
    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
    max_active.fetch_max(now, Ordering::SeqCst);
    let seen = counter.load(Ordering::SeqCst);
    thread::yield_now();
    counter.store(seen + 1, Ordering::SeqCst);
    active.fetch_sub(1, Ordering::SeqCst);
}

#[test]
fn calls_on_different_names_never_interleave() {
    let registry = Arc::new(CallbackRegistry::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let active = Arc::new(AtomicUsize::new(0));
    let max_active = Arc::new(AtomicUsize::new(0));

    for name in ["left", "right"] {
        let (c, a, m) = (
            Arc::clone(&counter),
            Arc::clone(&active),
            Arc::clone(&max_active),
        );
        registry.register(name, move |_| {
            bump(&c, &a, &m);
            Ok(())
        });
    }

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = ["left", "right"]
        .into_iter()
        .map(|name| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..CALLS_PER_THREAD {
                    registry
                        .call(name, &[Argument::Integer(i as i64)])
                        .expect("registered callback");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread");
    }

    assert_eq!(counter.load(Ordering::SeqCst), 2 * CALLS_PER_THREAD);
    assert_eq!(max_active.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_callback_does_not_wedge_other_threads() {
    let registry = Arc::new(CallbackRegistry::new());
    let hits = Arc::new(AtomicUsize::new(0));
    registry.register("fail", |_| Err(HostFailure::from("always fails")));
    let h = Arc::clone(&hits);
    registry.register("count", move |_| {
        h.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let failing = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for _ in 0..50 {
                assert!(registry.call("fail", &[]).is_err());
            }
        })
    };
    let counting = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for _ in 0..50 {
                registry.call("count", &[]).unwrap();
            }
        })
    };
    failing.join().unwrap();
    counting.join().unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 50);
}

#[test]
fn registration_while_a_callback_runs() {
    let registry = Arc::new(CallbackRegistry::new());
    let reg = Arc::clone(&registry);
    registry.register("installer", move |_| {
        // The map lock is not held during invocation.
        reg.register("installed", |_| Ok(()));
        Ok(())
    });

    registry.call("installer", &[]).unwrap();
    registry.call("installed", &[]).unwrap();
    assert_eq!(registry.names(), ["installed", "installer"]);
}
