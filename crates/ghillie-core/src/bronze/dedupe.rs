//! Canonicalisation and content-addressed dedupe key derivation.
//!
//! The payload is canonicalised to a stable JSON string (sorted object
//! keys, compact separators) before being folded into the dedupe key
//! alongside the event's identifying fields.

use sha2::{Digest, Sha256};
use thiserror::Error;

use super::types::RawEventEnvelope;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DedupeError {
    #[error("payload contains a non-finite number, which has no canonical JSON form")]
    NonFiniteNumber,
}

/// Recursively sort object keys so two semantically-equal payloads with
/// different key order hash identically. Rejects NaN/Infinity, which
/// `serde_json` can represent via `Number` but which have no canonical
/// JSON text form.
pub fn normalise_payload(value: &serde_json::Value) -> Result<serde_json::Value, DedupeError> {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(&String, &serde_json::Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = serde_json::Map::new();
            for (k, v) in entries {
                out.insert(k.clone(), normalise_payload(v)?);
            }
            Ok(serde_json::Value::Object(out))
        }
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(normalise_payload(item)?);
            }
            Ok(serde_json::Value::Array(out))
        }
        serde_json::Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                if !f.is_finite() {
                    return Err(DedupeError::NonFiniteNumber);
                }
            }
            Ok(value.clone())
        }
        _ => Ok(value.clone()),
    }
}

fn serialise_for_hash(value: &serde_json::Value) -> String {
    // serde_json's default Display already uses compact, deterministic
    // number/string formatting; key order is guaranteed by normalise_payload.
    serde_json::to_string(value).expect("canonicalised JSON value always serialises")
}

/// Compute the content-addressed dedupe key for an envelope.
///
/// Joins `source_system`, `event_type`, `source_event_id` (empty string if
/// absent), `repo_external_id` (empty string if absent), the RFC 3339
/// UTC timestamp of `occurred_at`, and the SHA-256 hex digest of the
/// canonicalised payload with `|`, then SHA-256-hashes the joined string.
pub fn make_dedupe_key(envelope: &RawEventEnvelope) -> Result<String, DedupeError> {
    let canonical_payload = normalise_payload(&envelope.payload)?;
    let payload_hash = {
        let mut hasher = Sha256::new();
        hasher.update(serialise_for_hash(&canonical_payload).as_bytes());
        hex::encode(hasher.finalize())
    };

    let joined = [
        envelope.source_system.as_str(),
        envelope.event_type.as_str(),
        envelope.source_event_id.as_deref().unwrap_or(""),
        envelope.repo_external_id.as_deref().unwrap_or(""),
        envelope.occurred_at.to_rfc3339().as_str(),
        payload_hash.as_str(),
    ]
    .join("|");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
