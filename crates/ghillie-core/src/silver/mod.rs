//! Silver layer: idempotent promotion of raw events into typed facts.

mod transformer;
mod types;

pub use transformer::{RawEventTransformError, RawEventTransformer};
pub use types::{
    CommitPayload, DocumentationChangePayload, EventFact, IssuePayload, PullRequestPayload,
};

#[path = "transformer_tests.rs"]
#[cfg(test)]
mod transformer_tests;
