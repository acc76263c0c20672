//! Last accepted submission fetcher
//!
//! Two requests per problem: list the accepted submissions, then fetch the code
//! of the newest one. A problem without an accepted submission (or without
//! code) gets an empty sentinel and the batch moves on.

use std::collections::HashMap;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::client::LeetcodeClient;
use crate::config::SubmissionConfig;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::types::{Event, Slug, Submission};

/// Builds the submission cache for a set of problems
#[derive(Clone, Debug)]
pub struct SubmissionFetcher {
    client: LeetcodeClient,
    db: Database,
    config: SubmissionConfig,
    expect_found: bool,
    event_tx: broadcast::Sender<Event>,
    cancel: CancellationToken,
}

impl SubmissionFetcher {
    /// Create a fetcher writing into `db`
    pub fn new(
        client: LeetcodeClient,
        db: Database,
        config: SubmissionConfig,
        event_tx: broadcast::Sender<Event>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            db,
            config,
            expect_found: false,
            event_tx,
            cancel,
        }
    }

    /// Log failed lookups as errors
    ///
    /// Set when the catalog was filtered by status, so every problem is
    /// expected to have a submission.
    #[must_use]
    pub fn expect_found(mut self, expect: bool) -> Self {
        self.expect_found = expect;
        self
    }

    /// Fetch the last accepted submission of every slug
    ///
    /// Submissions with code cached by an earlier run are reused. Per-slug
    /// failures become sentinels; only cache and cancellation errors abort.
    pub async fn fetch_all_submissions(&self, slugs: &[Slug]) -> Result<HashMap<Slug, Submission>> {
        let mut submissions = HashMap::with_capacity(slugs.len());

        for slug in slugs {
            if submissions.contains_key(slug) {
                continue;
            }
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    fetched = submissions.len(),
                    total = slugs.len(),
                    "Submission fetch cancelled"
                );
                return Err(Error::Cancelled);
            }

            if let Some(cached) = self.db.get_submission(slug).await?
                && cached.present
            {
                tracing::debug!(slug = %slug, "Reusing cached submission");
                submissions.insert(slug.clone(), cached);
                continue;
            }

            tracing::info!(slug = %slug, "Fetching submission");
            let submission = match self.fetch_one(slug).await {
                Ok(code) => Submission::found(slug.as_str(), code),
                Err(e) => {
                    if self.expect_found {
                        tracing::error!(slug = %slug, error = %e, "Error fetching submission");
                    } else {
                        tracing::debug!(slug = %slug, error = %e, "No submission recorded");
                    }
                    Submission::missing(slug.as_str())
                }
            };

            self.db.put_submission(&submission).await?;
            self.event_tx
                .send(Event::SubmissionFetched {
                    slug: slug.clone(),
                    found: submission.present,
                })
                .ok();
            submissions.insert(slug.clone(), submission);
        }

        let found = submissions.values().filter(|s| s.present).count();
        tracing::info!(found, total = submissions.len(), "Submission fetch complete");
        Ok(submissions)
    }

    /// Code of the newest accepted submission for `slug`
    pub async fn fetch_one(&self, slug: &str) -> Result<String> {
        let ids = self
            .client
            .accepted_submission_ids(slug, self.config.limit)
            .await?;
        let id = ids
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoSubmission(slug.to_string()))?;

        self.client
            .submission_code(&id)
            .await?
            .ok_or_else(|| Error::NoCode {
                slug: slug.to_string(),
                submission_id: id.to_string(),
            })
    }
}
