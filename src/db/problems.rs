//! Problem cache: slug -> problem record.

use crate::error::DatabaseError;
use crate::types::Problem;
use crate::{Error, Result};
use sqlx::SqliteConnection;

use super::{Database, ProblemRow};

impl Database {
    /// Get a cached problem
    ///
    /// A miss is a caller error: problems are only ever added by catalog page
    /// ingestion, never fetched on demand.
    pub async fn get_problem(&self, slug: &str) -> Result<Problem> {
        let row = sqlx::query_as::<_, ProblemRow>(
            "SELECT slug, payload, fetched_at FROM problems WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get problem {}: {}",
                slug, e
            )))
        })?
        .ok_or_else(|| Error::CacheMiss(slug.to_string()))?;

        decode_problem(&row)
    }

    /// Check whether a problem is cached
    pub async fn has_problem(&self, slug: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM problems WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to check problem {}: {}",
                    slug, e
                )))
            })?;

        Ok(found.is_some())
    }

    /// Insert or refresh a single problem
    pub async fn put_problem(&self, problem: &Problem) -> Result<()> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            Error::Database(DatabaseError::ConnectionFailed(format!(
                "Failed to acquire connection: {}",
                e
            )))
        })?;
        upsert_problem(&mut conn, problem).await
    }

    /// Every cached slug, sorted
    pub async fn problem_slugs(&self) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT slug FROM problems ORDER BY slug")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to list problems: {}",
                    e
                )))
            })
    }

    /// Number of cached problems
    pub async fn count_problems(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM problems")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to count problems: {}",
                    e
                )))
            })
    }
}

/// Upsert on an existing connection so page commits can share a transaction
pub(super) async fn upsert_problem(conn: &mut SqliteConnection, problem: &Problem) -> Result<()> {
    let payload = serde_json::to_string(problem)?;

    sqlx::query(
        r#"
        INSERT INTO problems (slug, payload, fetched_at)
        VALUES (?, ?, ?)
        ON CONFLICT(slug) DO UPDATE SET payload = excluded.payload, fetched_at = excluded.fetched_at
        "#,
    )
    .bind(&problem.title_slug)
    .bind(payload)
    .bind(chrono::Utc::now().timestamp())
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        Error::Database(DatabaseError::QueryFailed(format!(
            "Failed to store problem {}: {}",
            problem.title_slug, e
        )))
    })?;

    Ok(())
}

fn decode_problem(row: &ProblemRow) -> Result<Problem> {
    serde_json::from_str(&row.payload).map_err(|e| {
        Error::Database(DatabaseError::CorruptEntry {
            key: row.slug.clone(),
            reason: e.to_string(),
        })
    })
}
