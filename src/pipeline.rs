//! Fetch-cache-assemble pipeline
//!
//! [`Pipeline`] owns the client, the cache database and the event channel for
//! one run. Loading happens in two explicit phases: the catalog first, then
//! (when enabled) the last accepted submissions. Both phases run at most once
//! per pipeline, even with concurrent callers.

use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, broadcast};
use tokio_util::sync::CancellationToken;

use crate::catalog::CatalogFetcher;
use crate::client::{Credentials, HttpExecutor, LeetcodeClient, QueryExecutor};
use crate::config::Config;
use crate::db::Database;
use crate::deck::{DeckModel, DeckWriter};
use crate::error::{Error, Result};
use crate::note::{self, Note};
use crate::rate_limit::RateGate;
use crate::submissions::SubmissionFetcher;
use crate::types::{Event, Slug, Submission};

/// Placeholder used when a problem has no submission entry at all
const NO_CODE_FOUND: &str = "No code found.";

/// One deck generation run
pub struct Pipeline {
    config: Config,
    client: LeetcodeClient,
    db: Database,
    event_tx: broadcast::Sender<Event>,
    cancel: CancellationToken,
    catalog: OnceCell<Vec<Slug>>,
    submissions: OnceCell<HashMap<Slug, Submission>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("catalog_loaded", &self.catalog.initialized())
            .field("submissions_loaded", &self.submissions.initialized())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a pipeline over `executor`, opening the cache database from `config`
    pub async fn new(config: Config, executor: Arc<dyn QueryExecutor>) -> Result<Self> {
        config.validate()?;
        let db = Database::new(&config.cache.database_path()).await?;
        Ok(Self::assemble(config, executor, db))
    }

    /// Create a pipeline talking HTTP to the configured endpoint
    pub async fn connect(config: Config, credentials: &Credentials) -> Result<Self> {
        let executor = Arc::new(HttpExecutor::new(&config.api, credentials)?);
        Self::new(config, executor).await
    }

    /// Create a pipeline over an already opened database
    pub fn with_database(
        config: Config,
        executor: Arc<dyn QueryExecutor>,
        db: Database,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, executor, db))
    }

    fn assemble(config: Config, executor: Arc<dyn QueryExecutor>, db: Database) -> Self {
        let client = LeetcodeClient::new(executor, RateGate::new(config.api.request_delay));
        let (event_tx, _rx) = broadcast::channel(1000);

        Self {
            config,
            client,
            db,
            event_tx,
            cancel: CancellationToken::new(),
            catalog: OnceCell::new(),
            submissions: OnceCell::new(),
        }
    }

    /// Subscribe to pipeline events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Token that aborts the run at the next page or problem boundary
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abort the run
    ///
    /// Pages and submissions committed so far stay cached; a page in flight is
    /// dropped without being written.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down pipeline");
        self.cancel.cancel();
    }

    /// Cache database
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Configuration the pipeline runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch the catalog window into the cache, once
    pub async fn ensure_catalog_loaded(&self) -> Result<&[Slug]> {
        let slugs = self
            .catalog
            .get_or_try_init(|| async {
                CatalogFetcher::new(
                    self.client.clone(),
                    self.db.clone(),
                    self.config.retry.clone(),
                    self.event_tx.clone(),
                    self.cancel.clone(),
                )
                .force_refresh(self.config.cache.force_refresh)
                .fetch_all(&self.config.catalog)
                .await
            })
            .await?;
        Ok(slugs.as_slice())
    }

    /// Fetch the last accepted submissions for the catalog window, once
    ///
    /// Empty when submissions are not included. Loads the catalog first.
    pub async fn ensure_submissions_loaded(&self) -> Result<&HashMap<Slug, Submission>> {
        self.submissions
            .get_or_try_init(|| async {
                let slugs = self.ensure_catalog_loaded().await?;
                if !self.config.submissions.include_last_submission {
                    return Ok(HashMap::new());
                }
                SubmissionFetcher::new(
                    self.client.clone(),
                    self.db.clone(),
                    self.config.submissions.clone(),
                    self.event_tx.clone(),
                    self.cancel.clone(),
                )
                .expect_found(self.config.catalog.status.is_some())
                .fetch_all_submissions(slugs)
                .await
            })
            .await
    }

    /// Slugs of every problem in the window, in catalog order
    ///
    /// Runs both loading phases.
    pub async fn problem_slugs(&self) -> Result<Vec<Slug>> {
        let slugs = self.ensure_catalog_loaded().await?.to_vec();
        self.ensure_submissions_loaded().await?;
        Ok(slugs)
    }

    /// Assemble the note of one cached problem
    ///
    /// A slug outside the fetched window is a [`crate::Error::CacheMiss`].
    pub async fn assemble_note(&self, slug: &str) -> Result<Note> {
        let problem = self.db.get_problem(slug).await?;

        if !self.config.submissions.include_last_submission {
            return note::assemble(&problem, None);
        }

        let submissions = self.ensure_submissions_loaded().await?;
        let code = submissions
            .get(slug)
            .map_or(NO_CODE_FOUND, |s| s.code.as_str());
        note::assemble(&problem, Some(code))
    }

    /// Assemble every note, failing on the first error
    pub async fn assemble_all(&self) -> Result<Vec<Note>> {
        let slugs = self.problem_slugs().await?;
        self.check_cancelled()?;
        let notes = try_join_all(slugs.iter().map(|slug| self.assemble_note(slug))).await?;

        tracing::info!(notes = notes.len(), "Notes assembled");
        self.event_tx
            .send(Event::NotesAssembled { count: notes.len() })
            .ok();
        Ok(notes)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            tracing::info!("Run cancelled before the deck was written");
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Model describing the notes and the target deck
    pub fn deck_model(&self) -> DeckModel {
        DeckModel::new(self.config.deck.deck_name())
    }

    /// Run the whole pipeline and hand the notes to `writer`
    ///
    /// The writer is only called once every note assembled, so a failed or
    /// cancelled run never produces a deck. Returns the number of notes written.
    pub async fn generate(&self, writer: &dyn DeckWriter) -> Result<usize> {
        tracing::info!("Generating flashcards");
        let notes = self.assemble_all().await?;
        self.check_cancelled()?;

        writer.write(&self.deck_model(), &notes).await?;

        self.event_tx
            .send(Event::DeckWritten { notes: notes.len() })
            .ok();
        Ok(notes.len())
    }
}
