//! Configuration types for leetcode-anki
//!
//! Every field has a serde default so partial JSON/TOML documents are accepted.
//! Loading the document is left to the embedding application.

use crate::error::{Error, Result};
use crate::types::ProblemStatus;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Which slice of the remote catalog to fetch
///
/// `start` and `stop` are inclusive offsets into the catalog as ordered by
/// upstream under the given list/status filters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    /// First problem offset (default: 0)
    #[serde(default)]
    pub start: u64,

    /// Last problem offset, clamped to the catalog size (default: unbounded)
    #[serde(default = "default_stop")]
    pub stop: u64,

    /// Problems per catalog request; lower it if upstream times out (default: 500)
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Restrict to a problem list (`https://leetcode.com/list?selectedList=<id>`)
    #[serde(default)]
    pub list_id: Option<String>,

    /// Restrict to problems with this status for the authenticated user
    #[serde(default)]
    pub status: Option<ProblemStatus>,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self {
            start: 0,
            stop: default_stop(),
            page_size: default_page_size(),
            list_id: None,
            status: None,
        }
    }
}

impl CatalogFilter {
    /// Check the offsets before any request is issued
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Range(format!(
                "page size must be greater than 0: {}",
                self.page_size
            )));
        }
        if self.start > self.stop {
            return Err(Error::Range(format!(
                "start ({}) must be not greater than stop ({})",
                self.start, self.stop
            )));
        }
        Ok(())
    }

    /// List id as sent upstream (empty string when unset)
    pub fn list_id_or_empty(&self) -> &str {
        self.list_id.as_deref().unwrap_or("")
    }
}

/// Last accepted submission settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Fetch the last accepted submission for every problem (default: false)
    ///
    /// Adds two requests per problem.
    #[serde(default)]
    pub include_last_submission: bool,

    /// Maximum submissions listed per problem when looking for an accepted one (default: 500)
    #[serde(default = "default_submission_limit")]
    pub limit: u32,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            include_last_submission: false,
            limit: default_submission_limit(),
        }
    }
}

/// Upstream endpoint settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// GraphQL endpoint (default: "https://leetcode.com/graphql")
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Referer header sent with every request (default: "https://leetcode.com")
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Pause after every request, held under the rate-limit gate (default: 2 seconds)
    #[serde(default = "default_request_delay", with = "duration_serde")]
    pub request_delay: Duration,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            referer: default_referer(),
            request_delay: default_request_delay(),
            timeout: default_timeout(),
        }
    }
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one (default: 3)
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Fixed delay between attempts (default: 5 seconds)
    #[serde(default = "default_retry_delay", with = "duration_serde")]
    pub delay: Duration,

    /// Add random jitter to the delay (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay: default_retry_delay(),
            jitter: false,
        }
    }
}

/// On-disk cache settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the cache database (default: "./cache")
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Ignore committed catalog pages and fetch everything again (default: false)
    #[serde(default)]
    pub force_refresh: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            force_refresh: false,
        }
    }
}

impl CacheConfig {
    /// Path of the SQLite database inside the cache directory
    pub fn database_path(&self) -> PathBuf {
        self.cache_dir.join("leetcode-anki.db")
    }
}

/// Deck output settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Output file; its stem is used as the deck name (default: "leetcode.apkg")
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
        }
    }
}

impl DeckConfig {
    /// Deck name derived from the output file stem
    pub fn deck_name(&self) -> String {
        self.output_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "leetcode".to_string())
    }
}

/// Main configuration for the pipeline
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog window and filters
    #[serde(default)]
    pub catalog: CatalogFilter,

    /// Last accepted submission settings
    #[serde(default)]
    pub submissions: SubmissionConfig,

    /// Upstream endpoint settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry policy for catalog requests
    #[serde(default)]
    pub retry: RetryConfig,

    /// On-disk cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Deck output settings
    #[serde(default)]
    pub deck: DeckConfig,
}

impl Config {
    /// Validate settings that would otherwise fail deep inside a run
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        if self.retry.attempts == 0 {
            return Err(Error::Config {
                message: "retry attempts must be at least 1".to_string(),
                key: Some("retry.attempts".to_string()),
            });
        }
        if self.submissions.limit == 0 {
            return Err(Error::Config {
                message: "submission limit must be at least 1".to_string(),
                key: Some("submissions.limit".to_string()),
            });
        }
        url::Url::parse(&self.api.endpoint).map_err(|e| Error::Config {
            message: format!("invalid endpoint {}: {e}", self.api.endpoint),
            key: Some("api.endpoint".to_string()),
        })?;
        Ok(())
    }
}

fn default_stop() -> u64 {
    u64::MAX
}

fn default_page_size() -> u64 {
    500
}

fn default_submission_limit() -> u32 {
    500
}

fn default_endpoint() -> String {
    "https://leetcode.com/graphql".to_string()
}

fn default_referer() -> String {
    "https://leetcode.com".to_string()
}

fn default_request_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_attempts() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("leetcode.apkg")
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
