//! Shared error taxonomy used to categorise failures for alerting.
//!
//! Every module-level error enum in this crate exposes an
//! [`ErrorCategory`] via an `error_category()` method and a transience
//! flag via `is_transient()`, following the pattern used throughout the
//! GitHub SDK this crate grew out of (`AuthError::is_transient`,
//! `ApiError::should_retry`).

use std::fmt;

/// Coarse-grained classification of a failure, used for alerting and
/// metrics rather than control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Likely to succeed if retried without intervention.
    Transient,
    /// The remote API rejected the request; retrying unchanged will not help.
    ClientError,
    /// A response no longer matches the shape this code expects.
    SchemaDrift,
    /// Misconfiguration: missing credentials, invalid settings.
    Configuration,
    /// The database is unreachable or the connection pool is exhausted.
    DatabaseConnectivity,
    /// A persisted invariant was violated (e.g. a unique row vanished).
    DataIntegrity,
    /// Any other database failure.
    DatabaseError,
    /// Doesn't fit any of the above.
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorCategory::Transient => "transient",
            ErrorCategory::ClientError => "client_error",
            ErrorCategory::SchemaDrift => "schema_drift",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::DatabaseConnectivity => "database_connectivity",
            ErrorCategory::DataIntegrity => "data_integrity",
            ErrorCategory::DatabaseError => "database_error",
            ErrorCategory::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Categorise a `sqlx::Error`, used by every adapter in this crate.
pub fn categorize_sqlx_error(err: &sqlx::Error) -> ErrorCategory {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => ErrorCategory::DatabaseConnectivity,
        sqlx::Error::Database(db_err) => {
            // Postgres unique_violation / foreign_key_violation / check_violation
            match db_err.code().as_deref() {
                Some("23505") | Some("23503") | Some("23514") => ErrorCategory::DataIntegrity,
                _ => ErrorCategory::DatabaseError,
            }
        }
        sqlx::Error::RowNotFound => ErrorCategory::DataIntegrity,
        _ => ErrorCategory::DatabaseError,
    }
}

/// Returns true for a `sqlx::Error` worth retrying without operator
/// intervention.
pub fn sqlx_error_is_transient(err: &sqlx::Error) -> bool {
    matches!(
        categorize_sqlx_error(err),
        ErrorCategory::DatabaseConnectivity
    )
}
