use super::*;
use chrono::{TimeZone, Utc};
use serde_json::json;

fn envelope(payload: serde_json::Value) -> RawEventEnvelope {
    RawEventEnvelope {
        source_system: "github".into(),
        event_type: "github.commit".into(),
        source_event_id: Some("abc123".into()),
        repo_external_id: Some("123".into()),
        occurred_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        payload,
    }
}

#[test]
fn dedupe_key_is_stable_under_object_key_reordering() {
    let a = envelope(json!({"a": 1, "b": 2}));
    let b = envelope(json!({"b": 2, "a": 1}));

    assert_eq!(make_dedupe_key(&a).unwrap(), make_dedupe_key(&b).unwrap());
}

#[test]
fn dedupe_key_changes_with_payload_content() {
    let a = envelope(json!({"a": 1}));
    let b = envelope(json!({"a": 2}));

    assert_ne!(make_dedupe_key(&a).unwrap(), make_dedupe_key(&b).unwrap());
}

#[test]
fn dedupe_key_changes_with_identity_fields() {
    let a = envelope(json!({"a": 1}));
    let mut b = envelope(json!({"a": 1}));
    b.source_event_id = Some("different".into());

    assert_ne!(make_dedupe_key(&a).unwrap(), make_dedupe_key(&b).unwrap());
}

#[test]
fn nested_object_keys_are_sorted_recursively() {
    let a = envelope(json!({"outer": {"z": 1, "a": 2}}));
    let b = envelope(json!({"outer": {"a": 2, "z": 1}}));

    assert_eq!(make_dedupe_key(&a).unwrap(), make_dedupe_key(&b).unwrap());
}

#[test]
fn serde_json_cannot_represent_non_finite_numbers_in_the_first_place() {
    // `serde_json::Value::from(f64)` maps NaN/Infinity to `Value::Null`
    // rather than a `Number`, so `DedupeError::NonFiniteNumber` guards a
    // case that is unreachable through the public `serde_json` API; it
    // exists for payloads assembled via other means that reach this
    // function directly.
    assert_eq!(serde_json::Value::from(f64::NAN), serde_json::Value::Null);
}
