//! # leetcode-anki
//!
//! Fetches the problem catalog of a GraphQL coding-problem site, caches it in
//! SQLite and assembles one flashcard note per problem.
//!
//! ## Design Philosophy
//!
//! leetcode-anki is designed to be:
//! - **Resumable** - Committed catalog pages and submissions survive restarts
//! - **Polite** - Every remote call is serialized through one rate-limit gate
//! - **Library-first** - Credentials, transport and deck packaging are injected
//! - **Event-driven** - Consumers subscribe to progress events
//!
//! ## Quick Start
//!
//! ```no_run
//! use leetcode_anki::{Config, Credentials, JsonDeckWriter, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let credentials = Credentials::from_env()?;
//!
//!     let pipeline = Pipeline::connect(config, &credentials).await?;
//!
//!     // Subscribe to events
//!     let mut events = pipeline.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let writer = JsonDeckWriter::new("leetcode.json");
//!     let notes = pipeline.generate(&writer).await?;
//!     println!("{notes} notes written");
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Catalog pagination into the problem cache
pub mod catalog;
/// Remote query client
pub mod client;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Deck model and writer boundary
pub mod deck;
/// Error types
pub mod error;
/// Flashcard field extractors
pub mod fields;
/// Note assembly
pub mod note;
/// Fetch-cache-assemble orchestration
pub mod pipeline;
/// Upstream rate-limit gate
pub mod rate_limit;
/// Retry with a fixed delay
pub mod retry;
/// Last accepted submission fetcher
pub mod submissions;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use catalog::CatalogFetcher;
pub use client::{Credentials, GraphqlRequest, HttpExecutor, LeetcodeClient, QueryExecutor};
pub use config::{CatalogFilter, Config};
pub use db::Database;
pub use deck::{DeckModel, DeckWriter, JsonDeckWriter, guid_for};
pub use error::{DatabaseError, Error, Result};
pub use note::{FIELD_NAMES, Note};
pub use pipeline::Pipeline;
pub use submissions::SubmissionFetcher;
pub use types::{Difficulty, Event, Problem, ProblemStatus, Slug, Submission};

/// Helper function to generate a deck with graceful signal handling.
///
/// Runs [`Pipeline::generate`] until it finishes or a termination signal
/// arrives. On a signal the pipeline is shut down and the run stops at the next
/// page or problem boundary with [`Error::Cancelled`]. No deck is written.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use leetcode_anki::{Config, Credentials, JsonDeckWriter, Pipeline, generate_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pipeline = Pipeline::connect(Config::default(), &Credentials::from_env()?).await?;
///
///     // Run with automatic signal handling
///     generate_with_shutdown(&pipeline, &JsonDeckWriter::new("leetcode.json")).await?;
///
///     Ok(())
/// }
/// ```
pub async fn generate_with_shutdown(pipeline: &Pipeline, writer: &dyn DeckWriter) -> Result<usize> {
    let run = pipeline.generate(writer);
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => result,
        () = wait_for_signal() => {
            pipeline.shutdown();
            run.await
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
