//! Catalog page commits.
//!
//! A page's problems and its marker are written in one transaction, so an
//! interrupted run never leaves a marker for a page whose problems are missing.

use crate::error::DatabaseError;
use crate::types::Problem;
use crate::{Error, Result};

use super::problems::upsert_problem;
use super::{Database, PageKey};

impl Database {
    /// Store every problem of a page together with the page marker
    pub async fn commit_page(&self, key: PageKey<'_>, problems: &[Problem]) -> Result<()> {
        let slugs: Vec<&str> = problems.iter().map(|p| p.title_slug.as_str()).collect();
        let slugs_json = serde_json::to_string(&slugs)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to begin page transaction: {}",
                e
            )))
        })?;

        for problem in problems {
            upsert_problem(&mut *tx, problem).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO catalog_pages (filter_key, skip, page_limit, slugs, committed_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(filter_key, skip, page_limit)
            DO UPDATE SET slugs = excluded.slugs, committed_at = excluded.committed_at
            "#,
        )
        .bind(key.filter_key)
        .bind(to_i64(key.skip)?)
        .bind(to_i64(key.limit)?)
        .bind(slugs_json)
        .bind(chrono::Utc::now().timestamp())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to record page marker at skip {}: {}",
                key.skip, e
            )))
        })?;

        tx.commit().await.map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to commit page at skip {}: {}",
                key.skip, e
            )))
        })?;

        Ok(())
    }

    /// Slugs of a previously committed page, in catalog order
    pub async fn committed_page(&self, key: PageKey<'_>) -> Result<Option<Vec<String>>> {
        let slugs: Option<String> = sqlx::query_scalar(
            "SELECT slugs FROM catalog_pages WHERE filter_key = ? AND skip = ? AND page_limit = ?",
        )
        .bind(key.filter_key)
        .bind(to_i64(key.skip)?)
        .bind(to_i64(key.limit)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to read page marker at skip {}: {}",
                key.skip, e
            )))
        })?;

        slugs
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    Error::Database(DatabaseError::CorruptEntry {
                        key: format!("{}@{}", key.filter_key, key.skip),
                        reason: e.to_string(),
                    })
                })
            })
            .transpose()
    }
}

fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::Range(format!("offset {} is out of range", value)))
}
