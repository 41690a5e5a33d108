//! Rejection paths, diagnostics, and edge case tests.

use keystate::{
    Diagnostic, DiagnosticConfig, DiagnosticFilter, DropReason, Resolution, StateContainer,
    StateError, UpdateRequest, Version,
};
use serde_json::{json, Value};
use std::time::Duration;

fn try_init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// --- Default-Path Rejections ---

#[test]
fn test_unrecognized_key_is_rejected() {
    try_init_tracing();
    let container = StateContainer::new(json!({"name": "Banana", "cost": 2.5}));
    let diagnostics = container.subscribe_diagnostics();

    container.set("prop name not existing in the state", "something");

    assert_eq!(*container.read(), json!({"name": "Banana", "cost": 2.5}));

    let events = diagnostics.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        Diagnostic::UnrecognizedKey {
            key: "prop name not existing in the state".to_string(),
            version: Version(0),
        }
    );
}

#[test]
fn test_missing_value_is_rejected() {
    let container = StateContainer::new(json!({"name": "Banana", "cost": 2.5}));
    let diagnostics = container.subscribe_diagnostics();

    // "name" is a recognized key, but no value was provided.
    container.signal("name");

    assert_eq!(*container.read(), json!({"name": "Banana", "cost": 2.5}));

    let events = diagnostics.drain();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        Diagnostic::MissingValue { key, .. } if key == "name"
    ));
}

#[test]
fn test_rejection_never_panics_or_errors() {
    let container = StateContainer::new(json!({"name": "Banana"}));

    // None of these should disturb the caller.
    container.set("unknown", 1);
    container.signal("name");
    container.signal("unknown");
    container.request(UpdateRequest::bare(""));

    assert_eq!(*container.read(), json!({"name": "Banana"}));
    assert_eq!(container.stats().rejected, 4);
}

#[test]
fn test_error_messages_are_distinguishable() {
    let unrecognized = StateError::UnrecognizedKey("cost".to_string());
    let missing = StateError::MissingValue("cost".to_string());
    let invalid = StateError::InvalidInitialState;

    assert_eq!(
        unrecognized.to_string(),
        "Unrecognized property name: 'cost'. State was not modified."
    );
    assert_eq!(
        missing.to_string(),
        "Missing value for 'cost'. Provide the value or use a custom resolver."
    );
    assert_eq!(
        invalid.to_string(),
        "Initial state should be a non-array object."
    );
}

// --- Invalid Construction ---

#[test]
fn test_array_initial_state_yields_inert_container() {
    let container = StateContainer::new(json!([1, 2, 3]));
    let diagnostics = container.subscribe_diagnostics();

    assert!(container.is_inert());

    container.set("0", 99);
    container.signal("anything");

    // read() keeps returning the original array unchanged.
    assert_eq!(*container.read(), json!([1, 2, 3]));

    let events = diagnostics.drain();
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|e| matches!(e, Diagnostic::InertContainer { .. })));
}

#[test]
fn test_scalar_and_null_initial_states_are_inert() {
    for initial in [json!(null), json!(42), json!("text"), json!(true)] {
        let container = StateContainer::new(initial.clone());
        assert!(container.is_inert());

        container.set("key", 1);
        assert_eq!(*container.read(), initial);
        assert_eq!(container.stats().rejected, 1);
    }
}

#[test]
fn test_empty_object_is_valid_but_rejects_every_key() {
    let container = StateContainer::new(json!({}));
    assert!(!container.is_inert());

    container.set("name", "x");

    assert_eq!(*container.read(), json!({}));
    assert_eq!(container.stats().rejected, 1);
}

#[test]
fn test_inert_container_with_resolver_stays_inert() {
    // Fail-soft construction wins over the resolver; it is never invoked.
    let container = StateContainer::with_resolver(
        json!([1, 2]),
        |_: &Value, _: &UpdateRequest| -> Resolution {
            panic!("resolver must not run on an inert container")
        },
    );

    container.signal("reset");
    assert_eq!(*container.read(), json!([1, 2]));
}

// --- Resolver Fallback Validation ---

#[test]
fn test_deferred_fallback_requires_a_value() {
    let container = StateContainer::with_resolver(
        json!({"name": "Banana"}),
        |_: &Value, _: &UpdateRequest| Resolution::Deferred,
    );
    let diagnostics = container.subscribe_diagnostics();

    container.signal("name");

    assert_eq!(*container.read(), json!({"name": "Banana"}));
    assert!(matches!(
        diagnostics.drain().as_slice(),
        [Diagnostic::MissingValue { .. }]
    ));
}

#[test]
fn test_deferred_fallback_validates_keys() {
    let container = StateContainer::with_resolver(
        json!({"name": "Banana"}),
        |_: &Value, _: &UpdateRequest| Resolution::Deferred,
    );
    let diagnostics = container.subscribe_diagnostics();

    container.set("unknown", 1);

    assert_eq!(*container.read(), json!({"name": "Banana"}));
    assert!(matches!(
        diagnostics.drain().as_slice(),
        [Diagnostic::UnrecognizedKey { .. }]
    ));
}

#[test]
#[should_panic(expected = "resolver blew up")]
fn test_resolver_panics_propagate() {
    // The container guarantees soundness of its own logic only; failures in
    // caller-supplied resolvers reach the caller unmodified.
    let container = StateContainer::with_resolver(
        json!({"name": "Banana"}),
        |_: &Value, _: &UpdateRequest| -> Resolution { panic!("resolver blew up") },
    );

    container.set("name", "Orange");
}

// --- Diagnostic Subscriptions ---

#[test]
fn test_key_filtered_subscription() {
    let container = StateContainer::new(json!({"name": "Banana"}));
    let filtered = container.subscribe_diagnostics_with(DiagnosticConfig {
        filter: DiagnosticFilter::keys(vec!["watched".to_string()]),
        ..Default::default()
    });

    container.set("watched", 1);
    container.set("ignored", 2);

    let events = filtered.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].key(), Some("watched"));
}

#[test]
fn test_unsubscribe_sends_dropped_event() {
    let container = StateContainer::new(json!({"name": "Banana"}));
    let handle = container.subscribe_diagnostics();

    container.unsubscribe_diagnostics(handle.id);

    let event = handle.recv_timeout(Duration::from_millis(100)).unwrap();
    assert_eq!(
        event,
        Diagnostic::Dropped {
            reason: DropReason::Unsubscribed
        }
    );

    // Later rejections no longer reach the handle.
    container.set("unknown", 1);
    assert!(handle.recv_timeout(Duration::from_millis(50)).is_err());
}

#[test]
fn test_rejections_without_subscribers_are_harmless() {
    let container = StateContainer::new(json!({"name": "Banana"}));

    for _ in 0..100 {
        container.set("unknown", 1);
    }

    assert_eq!(container.stats().rejected, 100);
}

#[test]
fn test_diagnostics_serialize_for_routing() {
    let event = Diagnostic::UnrecognizedKey {
        key: "cost".to_string(),
        version: Version(3),
    };

    let encoded = serde_json::to_value(&event).unwrap();
    assert_eq!(encoded["type"], json!("unrecognized_key"));
    assert_eq!(encoded["key"], json!("cost"));

    let decoded: Diagnostic = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded, event);
}
