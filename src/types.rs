//! Core types: problem and submission records, filters, and pipeline events

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Problem slug, the primary key of every cache
pub type Slug = String;

/// Problem status filter understood by the catalog query
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemStatus {
    /// Solved problems
    #[serde(rename = "AC")]
    Accepted,
    /// Attempted but not solved
    #[serde(rename = "TRIED")]
    Tried,
    /// Never attempted
    #[serde(rename = "NOT_STARTED")]
    NotStarted,
}

impl ProblemStatus {
    /// Wire value used by the upstream filter input
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemStatus::Accepted => "AC",
            ProblemStatus::Tried => "TRIED",
            ProblemStatus::NotStarted => "NOT_STARTED",
        }
    }
}

impl FromStr for ProblemStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AC" => Ok(ProblemStatus::Accepted),
            "TRIED" => Ok(ProblemStatus::Tried),
            "NOT_STARTED" => Ok(ProblemStatus::NotStarted),
            other => Err(Error::Config {
                message: format!("unknown problem status: {other}"),
                key: Some("catalog.status".to_string()),
            }),
        }
    }
}

/// Problem difficulty
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Difficulty {
    /// Easy
    Easy,
    /// Medium
    Medium,
    /// Hard
    Hard,
}

impl Difficulty {
    /// Display name as used by upstream
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Font color used when rendering the difficulty
    pub fn color(&self) -> &'static str {
        match self {
            Difficulty::Easy => "green",
            Difficulty::Medium => "orange",
            Difficulty::Hard => "red",
        }
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            other => Err(Error::InvalidValue(format!("Incorrect difficulty: {other}"))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic tag attached to a problem
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTag {
    /// Human-readable tag name
    #[serde(default)]
    pub name: String,
    /// Tag slug, used as the flashcard tag
    pub slug: String,
}

/// One problem as returned by a catalog page
///
/// Field names follow the upstream GraphQL schema so the record can be decoded
/// straight from the response and stored verbatim in the cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// Unique key
    pub title_slug: Slug,
    /// Number shown on the website
    pub question_frontend_id: String,
    /// Problem title
    pub title: String,
    /// Category (Algorithms, Database, ...)
    pub category_title: String,
    /// Problem statement as HTML
    #[serde(default)]
    pub content: Option<String>,
    /// Raw difficulty, validated on extraction
    pub difficulty: String,
    /// Only available to subscribers
    pub is_paid_only: bool,
    /// Like count
    pub likes: u64,
    /// Dislike count
    pub dislikes: u64,
    /// Ordered topic tags
    #[serde(default)]
    pub topic_tags: Vec<TopicTag>,
    /// Popularity metric, absent for non-subscribers
    #[serde(default)]
    pub freq_bar: Option<f64>,
    /// JSON-encoded [`ProblemStats`]
    pub stats: String,
    /// Hints shown on the website
    #[serde(default)]
    pub hints: Vec<String>,
}

/// Submission counters embedded in [`Problem::stats`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemStats {
    /// Total number of submissions
    pub total_submission_raw: u64,
    /// Number of accepted submissions
    pub total_accepted_raw: u64,
}

/// Last accepted submission for a problem
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Problem slug
    pub slug: Slug,
    /// Source code, empty when `present` is false
    pub code: String,
    /// Whether a submission with code was found
    pub present: bool,
}

impl Submission {
    /// Submission with code
    pub fn found(slug: impl Into<Slug>, code: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            code: code.into(),
            present: true,
        }
    }

    /// Sentinel recorded when nothing could be fetched
    pub fn missing(slug: impl Into<Slug>) -> Self {
        Self {
            slug: slug.into(),
            code: String::new(),
            present: false,
        }
    }
}

/// Event emitted while the pipeline runs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Catalog size under the current filter is known
    CatalogCounted {
        /// Total reported by upstream
        total: u64,
        /// Number of pages that will be walked
        pages: u64,
        /// Effective page size
        page_size: u64,
    },

    /// A catalog page was fetched and committed to the cache
    PageCommitted {
        /// Zero-based page index
        page: u64,
        /// Number of pages
        pages: u64,
        /// Problems in the page
        problems: usize,
    },

    /// A catalog page was served from an earlier run's commit
    PageReused {
        /// Zero-based page index
        page: u64,
        /// Number of pages
        pages: u64,
    },

    /// Submission lookup finished for one problem
    SubmissionFetched {
        /// Problem slug
        slug: Slug,
        /// Whether code was found
        found: bool,
    },

    /// All notes were assembled
    NotesAssembled {
        /// Number of notes
        count: usize,
    },

    /// Deck artifact was handed to the writer
    DeckWritten {
        /// Number of notes written
        notes: usize,
    },
}
