//! Database lifecycle and schema migrations.

use crate::error::DatabaseError;
use crate::{Error, Result};
use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;
use std::path::Path;

use super::Database;

impl Database {
    /// Open (or create) the cache database at `path`
    ///
    /// Creates the parent directory if needed and runs migrations.
    pub async fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Database(DatabaseError::ConnectionFailed(format!(
                    "Failed to create cache directory: {}",
                    e
                )))
            })?;
        }

        use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(|e| {
                Error::Database(DatabaseError::ConnectionFailed(format!(
                    "Failed to parse database path: {}",
                    e
                )))
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            Error::Database(DatabaseError::ConnectionFailed(format!(
                "Failed to connect to database: {}",
                e
            )))
        })?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            Error::Database(DatabaseError::ConnectionFailed(format!(
                "Failed to acquire connection: {}",
                e
            )))
        })?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::MigrationFailed(format!(
                "Failed to create schema_version table: {}",
                e
            )))
        })?;

        let current_version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::QueryFailed(format!(
                        "Failed to query schema version: {}",
                        e
                    )))
                })?
                .flatten();

        if current_version.unwrap_or(0) < 1 {
            Self::migrate_v1(&mut conn).await?;
        }

        Ok(())
    }

    /// Migration v1: problem cache, page markers, submission cache
    async fn migrate_v1(conn: &mut SqliteConnection) -> Result<()> {
        tracing::info!("Applying database migration v1");

        // Partial failures must not leave a half-created schema behind
        sqlx::query("BEGIN")
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::MigrationFailed(format!(
                    "Failed to begin transaction: {}",
                    e
                )))
            })?;

        let result = async {
            Self::create_table(
                conn,
                "problems",
                r#"
                CREATE TABLE problems (
                    slug TEXT PRIMARY KEY,
                    payload TEXT NOT NULL,
                    fetched_at INTEGER NOT NULL
                )
                "#,
            )
            .await?;
            Self::create_table(
                conn,
                "catalog_pages",
                r#"
                CREATE TABLE catalog_pages (
                    filter_key TEXT NOT NULL,
                    skip INTEGER NOT NULL,
                    page_limit INTEGER NOT NULL,
                    slugs TEXT NOT NULL,
                    committed_at INTEGER NOT NULL,
                    PRIMARY KEY (filter_key, skip, page_limit)
                )
                "#,
            )
            .await?;
            Self::create_table(
                conn,
                "submissions",
                r#"
                CREATE TABLE submissions (
                    slug TEXT PRIMARY KEY,
                    code TEXT NOT NULL,
                    present INTEGER NOT NULL,
                    fetched_at INTEGER NOT NULL
                )
                "#,
            )
            .await?;
            Self::record_migration(conn, 1).await?;
            Ok::<(), Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                sqlx::query("COMMIT")
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| {
                        Error::Database(DatabaseError::MigrationFailed(format!(
                            "Failed to commit migration v1: {}",
                            e
                        )))
                    })?;
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                return Err(e);
            }
        }

        tracing::info!("Database migration v1 complete");
        Ok(())
    }

    async fn create_table(conn: &mut SqliteConnection, name: &str, ddl: &str) -> Result<()> {
        sqlx::query(ddl).execute(&mut *conn).await.map_err(|e| {
            Error::Database(DatabaseError::MigrationFailed(format!(
                "Failed to create {} table: {}",
                name, e
            )))
        })?;
        Ok(())
    }

    async fn record_migration(conn: &mut SqliteConnection, version: i32) -> Result<()> {
        sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES (?, ?)")
            .bind(version)
            .bind(chrono::Utc::now().timestamp())
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::MigrationFailed(format!(
                    "Failed to record migration v{}: {}",
                    version, e
                )))
            })?;
        Ok(())
    }

    /// Close the connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
