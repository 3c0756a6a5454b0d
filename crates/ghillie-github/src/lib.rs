//! GitHub-specific source client, noise compiler, and ingestion worker.
//!
//! This crate implements the concrete `GitHubActivityClient` used by
//! Ghillie's ingestion worker, plus the worker itself and the noise
//! compiler that filters events before they reach the Bronze writer.
//! Domain types that don't depend on GitHub specifics live in
//! `ghillie-core`.

pub mod client;
pub mod graphql;
pub mod ingestion;
pub mod noise;
pub mod observability;

pub use client::{GitHubActivityClient, GitHubClientError, GitHubIngestedEvent};
pub use graphql::{classify_documentation_path, GitHubGraphQlClient, GitHubGraphQlConfig};
pub use ingestion::{GitHubIngestionConfig, GitHubIngestionWorker, IngestionError, IngestionRunOutcome};
pub use noise::{compile_noise_filters, CompiledNoiseFilters, NoiseFilterConfig};
pub use observability::{categorize_client_error, categorize_database_error, categorize_ingestion_error};
