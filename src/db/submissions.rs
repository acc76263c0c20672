//! Last accepted submission cache.

use crate::error::DatabaseError;
use crate::types::Submission;
use crate::{Error, Result};

use super::{Database, SubmissionRow};

impl Database {
    /// Insert or replace the submission entry for a slug
    pub async fn put_submission(&self, submission: &Submission) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO submissions (slug, code, present, fetched_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(slug) DO UPDATE SET
                code = excluded.code,
                present = excluded.present,
                fetched_at = excluded.fetched_at
            "#,
        )
        .bind(&submission.slug)
        .bind(&submission.code)
        .bind(i32::from(submission.present))
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to store submission for {}: {}",
                submission.slug, e
            )))
        })?;

        Ok(())
    }

    /// Cached submission entry for a slug, sentinel entries included
    pub async fn get_submission(&self, slug: &str) -> Result<Option<Submission>> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            "SELECT slug, code, present, fetched_at FROM submissions WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get submission for {}: {}",
                slug, e
            )))
        })?;

        Ok(row.map(Submission::from))
    }
}
