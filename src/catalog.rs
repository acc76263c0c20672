//! Catalog fetcher
//!
//! Walks the remote problem catalog page by page and commits every page to the
//! problem cache. Pages are fetched one after another through the client's
//! rate-limit gate.
//!
//! A committed page leaves a marker keyed by the filters, the catalog size and
//! the page window. Re-running with the same filters against an unchanged
//! catalog reuses those pages without touching the network.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::client::LeetcodeClient;
use crate::config::{CatalogFilter, RetryConfig};
use crate::db::{Database, PageKey};
use crate::error::{Error, Result};
use crate::retry::with_retry;
use crate::types::{Event, Slug};

/// Page layout for one catalog walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    /// Catalog size reported by upstream
    pub total: u64,
    /// First offset
    pub start: u64,
    /// Last offset, clamped to `total`
    pub stop: u64,
    /// Effective page size
    pub page_size: u64,
    /// Number of pages to fetch
    pub pages: u64,
}

impl PagePlan {
    /// Lay out the pages for `filter` over a catalog of `total` problems
    pub fn new(filter: &CatalogFilter, total: u64) -> Result<Self> {
        filter.validate()?;

        if filter.start > total {
            return Err(Error::Range(format!(
                "start ({}) is greater than problems count ({})",
                filter.start, total
            )));
        }

        let start = filter.start;
        let stop = filter.stop.min(total);
        let span = stop - start + 1;
        let page_size = filter.page_size.min(span);
        let pages = span.div_ceil(page_size);

        Ok(Self {
            total,
            start,
            stop,
            page_size,
            pages,
        })
    }

    /// Offset of the first problem of `page`
    pub fn skip(&self, page: u64) -> u64 {
        self.start + page * self.page_size
    }
}

/// Digest of everything that changes which problems land on which page
pub fn filter_key(filter: &CatalogFilter, total: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(filter.list_id_or_empty().as_bytes());
    hasher.update(b"\0");
    hasher.update(filter.status.map_or("", |s| s.as_str()).as_bytes());
    hasher.update(b"\0");
    hasher.update(total.to_le_bytes());
    hasher
        .finalize()
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Populates the problem cache from the remote catalog
#[derive(Clone, Debug)]
pub struct CatalogFetcher {
    client: LeetcodeClient,
    db: Database,
    retry: RetryConfig,
    event_tx: broadcast::Sender<Event>,
    cancel: CancellationToken,
    force_refresh: bool,
}

impl CatalogFetcher {
    /// Create a fetcher writing into `db`
    pub fn new(
        client: LeetcodeClient,
        db: Database,
        retry: RetryConfig,
        event_tx: broadcast::Sender<Event>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            db,
            retry,
            event_tx,
            cancel,
            force_refresh: false,
        }
    }

    /// Ignore page markers from earlier runs
    #[must_use]
    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    /// Fetch every page of the filtered window into the cache
    ///
    /// Returns the window's slugs in catalog order. Fails with
    /// [`Error::Range`] before any page request when `start` lies beyond the
    /// catalog.
    pub async fn fetch_all(&self, filter: &CatalogFilter) -> Result<Vec<Slug>> {
        filter.validate()?;

        let total = with_retry(&self.retry, || self.client.problems_count(filter)).await?;
        let plan = PagePlan::new(filter, total)?;
        let key = filter_key(filter, total);

        tracing::info!(
            problems = plan.stop - plan.start + 1,
            page_size = plan.page_size,
            pages = plan.pages,
            total,
            "Fetching problems"
        );
        self.event_tx
            .send(Event::CatalogCounted {
                total,
                pages: plan.pages,
                page_size: plan.page_size,
            })
            .ok();

        let mut slugs = Vec::new();
        let mut seen = HashSet::new();

        for page in 0..plan.pages {
            if self.cancel.is_cancelled() {
                tracing::warn!(page, pages = plan.pages, "Catalog fetch cancelled");
                return Err(Error::Cancelled);
            }

            let page_key = PageKey {
                filter_key: &key,
                skip: plan.skip(page),
                limit: plan.page_size,
            };

            let page_slugs = match self.reusable_page(page_key).await? {
                Some(cached) => {
                    tracing::debug!(page, skip = page_key.skip, "Reusing committed page");
                    self.event_tx
                        .send(Event::PageReused {
                            page,
                            pages: plan.pages,
                        })
                        .ok();
                    cached
                }
                None => self.fetch_page(filter, page_key, page, plan.pages).await?,
            };

            for slug in page_slugs {
                if seen.insert(slug.clone()) {
                    slugs.push(slug);
                }
            }
        }

        tracing::info!(problems = slugs.len(), "Catalog fetch complete");
        Ok(slugs)
    }

    /// Slugs of a page committed by an earlier run, if all of them are still cached
    async fn reusable_page(&self, key: PageKey<'_>) -> Result<Option<Vec<Slug>>> {
        if self.force_refresh {
            return Ok(None);
        }
        let Some(slugs) = self.db.committed_page(key).await? else {
            return Ok(None);
        };
        for slug in &slugs {
            if !self.db.has_problem(slug).await? {
                return Ok(None);
            }
        }
        Ok(Some(slugs))
    }

    async fn fetch_page(
        &self,
        filter: &CatalogFilter,
        key: PageKey<'_>,
        page: u64,
        pages: u64,
    ) -> Result<Vec<Slug>> {
        let fetch = with_retry(&self.retry, || {
            self.client.problems_page(filter, key.skip, key.limit)
        });

        // An abandoned page is never committed
        let list = tokio::select! {
            result = fetch => result?,
            _ = self.cancel.cancelled() => {
                tracing::warn!(page, pages, "Catalog fetch cancelled mid-page");
                return Err(Error::Cancelled);
            }
        };

        self.db.commit_page(key, &list.questions).await?;

        tracing::debug!(
            page,
            pages,
            skip = key.skip,
            problems = list.questions.len(),
            "Committed catalog page"
        );
        self.event_tx
            .send(Event::PageCommitted {
                page,
                pages,
                problems: list.questions.len(),
            })
            .ok();

        Ok(list.questions.into_iter().map(|p| p.title_slug).collect())
    }
}
