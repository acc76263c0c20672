//! Error types for leetcode-anki
//!
//! This module provides the error taxonomy for the fetch-cache-assemble pipeline:
//! - Transient transport failures (retried by [`crate::retry`])
//! - Upstream contract violations (data shape, malformed values)
//! - Caller errors (invalid ranges, cache misses)
//! - Per-slug submission failures (isolated by the submission fetcher)

use thiserror::Error;

/// Result type alias for leetcode-anki operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for leetcode-anki
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "catalog.page_size")
        key: Option<String>,
    },

    /// Invalid start/stop/page-size arguments
    #[error("range error: {0}")]
    Range(String),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// HTTP transport error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream answered with a non-success HTTP status
    #[error("upstream returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// Transient failure reported by a query executor that is not an HTTP error
    #[error("transient error: {0}")]
    Transient(String),

    /// Upstream response is missing an expected field or has the wrong type
    #[error("unexpected response shape for {context}: {message}")]
    DataShape {
        /// Which query or record was being decoded
        context: String,
        /// What was wrong with it
        message: String,
    },

    /// Slug requested that was never fetched into the problem cache
    #[error("problem {0} is not in cache")]
    CacheMiss(String),

    /// No accepted submission exists for the problem
    #[error("no accepted submissions found for {0}")]
    NoSubmission(String),

    /// Submission detail has no code attached
    #[error("no code found for submission {submission_id} of {slug}")]
    NoCode {
        /// Problem slug
        slug: String,
        /// Submission id that was queried
        submission_id: String,
    },

    /// Malformed field value in an otherwise well-shaped record
    #[error("{0}")]
    InvalidValue(String),

    /// Accept rate requested for a problem with zero submissions
    #[error("problem {0} has no submissions, cannot compute accept rate")]
    Division(String),

    /// Run was cancelled between pages or items
    #[error("operation cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Stored row could not be decoded back into a record
    #[error("corrupt cache entry {key}: {reason}")]
    CorruptEntry {
        /// Cache key of the broken row
        key: String,
        /// Decoding failure
        reason: String,
    },
}

impl Error {
    /// Build a [`Error::DataShape`] for the given query/record context
    pub fn data_shape(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::DataShape {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error kind, used as a structured logging field
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config",
            Error::Range(_) => "range",
            Error::Database(_) | Error::Sqlx(_) => "database",
            Error::Network(_) | Error::Http { .. } | Error::Transient(_) => "network",
            Error::DataShape { .. } => "data_shape",
            Error::CacheMiss(_) => "cache_miss",
            Error::NoSubmission(_) => "no_submission",
            Error::NoCode { .. } => "no_code",
            Error::InvalidValue(_) => "invalid_value",
            Error::Division(_) => "division",
            Error::Cancelled => "cancelled",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
        }
    }
}
