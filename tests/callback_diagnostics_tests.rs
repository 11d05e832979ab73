mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrbridge::{Argument, BridgeError, CallbackRegistry};
use tracing::Level;

#[test]
fn missing_callback_is_logged_and_raised() {
    let registry = CallbackRegistry::new();
    let (result, events) = common::capture_events(|| registry.call("missing", &[]));

    assert!(matches!(
        result,
        Err(BridgeError::UnregisteredCallback(ref name)) if name == "missing"
    ));
    let warning = events
        .iter()
        .find(|e| e.level == Level::WARN)
        .expect("a warning for the missing callback");
    assert_eq!(warning.callback.as_deref(), Some("missing"));
    assert!(warning.message.contains("not found"));
    assert_eq!(warning.code.as_deref(), Some("unregistered_callback"));
}

#[test]
fn host_failure_is_logged_with_code() {
    let registry = CallbackRegistry::new();
    registry.register("boom", |_| Err("host exploded".into()));
    let (result, events) = common::capture_events(|| registry.call("boom", &[]));

    let err = result.unwrap_err();
    assert_eq!(err.code(), "host_failure");
    let raised = events
        .iter()
        .find(|e| e.message.contains("raised"))
        .expect("a debug event for the failing callback");
    assert_eq!(raised.level, Level::DEBUG);
    assert_eq!(raised.callback.as_deref(), Some("boom"));
    assert_eq!(raised.code.as_deref(), Some("host_failure"));
}

#[test]
fn missing_callback_invokes_nothing() {
    let registry = CallbackRegistry::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    registry.register("present", move |_| {
        h.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    assert!(registry.call("absent", &[Argument::Integer(1)]).is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn successful_call_emits_no_warning() {
    let registry = CallbackRegistry::new();
    registry.register("ok", |_| Ok(()));
    let (result, events) = common::capture_events(|| registry.call("ok", &[]));

    assert!(result.is_ok());
    assert!(events.iter().all(|e| e.level != Level::WARN));
}
