//! Pluggable status-model abstraction: turns an evidence bundle into a
//! human-readable status summary. [`MockStatusModel`] is deterministic
//! and dependency-free; [`OpenAiStatusModel`] defers to an
//! OpenAI-compatible chat completions endpoint.

mod mock;
mod openai;
mod protocol;

pub use mock::MockStatusModel;
pub use openai::{OpenAiStatusModel, OpenAiStatusModelConfig};
pub use protocol::{
    ModelInvocationMetrics, RepositoryStatusResult, StatusModel, StatusModelError,
};

#[path = "mock_tests.rs"]
#[cfg(test)]
mod mock_tests;
