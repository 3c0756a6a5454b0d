//! Bronze layer: at-most-once ingestion of raw GitHub activity.

mod dedupe;
mod types;
mod writer;

pub use dedupe::{make_dedupe_key, normalise_payload, DedupeError};
pub use types::{RawEvent, RawEventEnvelope, TransformState};
pub use writer::{BronzeError, RawEventWriter};

#[path = "writer_tests.rs"]
#[cfg(test)]
mod writer_tests;

#[path = "dedupe_tests.rs"]
#[cfg(test)]
mod dedupe_tests;
