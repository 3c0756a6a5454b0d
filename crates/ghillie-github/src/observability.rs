//! Error categorisation shared by the ingestion worker's callers. Ghillie
//! logs structured fields directly via `tracing` macros at the call site
//! rather than through a dedicated logger type, matching the rest of
//! this crate's modules.

use ghillie_core::errors::{categorize_sqlx_error, ErrorCategory};

use crate::client::GitHubClientError;
use crate::ingestion::IngestionError;

/// Categorise any error the ingestion worker can surface, for alerting.
pub fn categorize_ingestion_error(err: &IngestionError) -> ErrorCategory {
    err.error_category()
}

/// Categorise a bare client error, for callers that talk to
/// [`crate::graphql::GitHubGraphQlClient`] directly (outside a full
/// ingestion run, e.g. a one-off CLI probe).
pub fn categorize_client_error(err: &GitHubClientError) -> ErrorCategory {
    err.error_category()
}

/// Categorise a database error using the same rules every adapter in
/// `ghillie-core` uses, re-exported here so callers in this crate don't
/// need to depend on `ghillie-core::errors` directly for this one call.
pub fn categorize_database_error(err: &sqlx::Error) -> ErrorCategory {
    categorize_sqlx_error(err)
}

#[path = "observability_tests.rs"]
#[cfg(test)]
mod observability_tests;
