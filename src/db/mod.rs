//! Database layer for leetcode-anki
//!
//! SQLite persistence for the problem cache, catalog page markers and the
//! submission cache. The database survives process restarts, so a re-run only
//! fetches what an earlier run did not commit.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`]: Database lifecycle, schema migrations
//! - [`problems`]: Problem cache keyed by slug
//! - [`pages`]: Atomic catalog page commits and their markers
//! - [`submissions`]: Last accepted submission cache

use sqlx::{FromRow, sqlite::SqlitePool};

mod migrations;
mod pages;
mod problems;
mod submissions;

/// Problem row from the cache (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct ProblemRow {
    /// Problem slug (primary key)
    pub slug: String,
    /// JSON-encoded problem record
    pub payload: String,
    /// Unix timestamp of the last write
    pub fetched_at: i64,
}

/// Submission row from the cache (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    /// Problem slug (primary key)
    pub slug: String,
    /// Source code of the last accepted submission, empty for a sentinel
    pub code: String,
    /// 1 when code was found, 0 for a sentinel
    pub present: i32,
    /// Unix timestamp of the last write
    pub fetched_at: i64,
}

impl From<SubmissionRow> for crate::types::Submission {
    fn from(row: SubmissionRow) -> Self {
        crate::types::Submission {
            slug: row.slug,
            code: row.code,
            present: row.present != 0,
        }
    }
}

/// Identifies one catalog page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageKey<'a> {
    /// Digest of the filters and catalog size the page was fetched under
    pub filter_key: &'a str,
    /// Offset of the first problem
    pub skip: u64,
    /// Requested page size
    pub limit: u64,
}

/// Database handle for leetcode-anki
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
