use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a Bronze row as it moves toward Silver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum TransformState {
    Pending = 0,
    Processed = 1,
    Failed = 2,
}

impl TransformState {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Pending),
            1 => Some(Self::Processed),
            2 => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A single Bronze row as persisted. Constructed by [`RawEventWriter`] and
/// read back by the Silver transformer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: i64,
    pub source_system: String,
    pub event_type: String,
    pub source_event_id: Option<String>,
    pub repo_external_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
    pub dedupe_key: String,
    pub transform_state: TransformState,
    pub transform_error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// The caller-supplied envelope handed to [`RawEventWriter::ingest`]. Not
/// yet persisted; carries everything needed to compute the dedupe key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEventEnvelope {
    pub source_system: String,
    pub event_type: String,
    pub source_event_id: Option<String>,
    pub repo_external_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}
