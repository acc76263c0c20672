//! Deck model and writer boundary
//!
//! Packaging notes into a deck file is left to a [`DeckWriter`]. The crate ships
//! [`JsonDeckWriter`], which writes the model and notes (with their stable
//! guids) as one JSON document that a packager can pick up.

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::note::{FIELD_NAMES, Note};

/// Note model id shared by every generated deck
pub const MODEL_ID: u64 = 4567610856;

/// Deck id shared by every generated deck
pub const DECK_ID: u64 = 8589798175;

/// Note model name
pub const MODEL_NAME: &str = "Leetcode model";

const BASE91_TABLE: &[u8; 91] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!#$%&()*+,-./:;<=>?@[]^_`{|}~";

/// Stable note identity for `values`
///
/// Compatible with genanki: sha256 of the values joined by `__`, first eight
/// bytes read as a big-endian integer, written in base 91.
pub fn guid_for(values: &[&str]) -> String {
    let digest = Sha256::digest(values.join("__").as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let mut value = u64::from_be_bytes(prefix);

    let mut encoded = Vec::new();
    while value > 0 {
        encoded.push(BASE91_TABLE[(value % 91) as usize]);
        value /= 91;
    }
    encoded.reverse();
    encoded.into_iter().map(char::from).collect()
}

/// Template-independent description of the note model and target deck
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeckModel {
    /// Note model id
    pub model_id: u64,
    /// Deck id
    pub deck_id: u64,
    /// Note model name
    pub model_name: String,
    /// Deck name shown to the user
    pub deck_name: String,
    /// Field names in note field order
    pub fields: Vec<String>,
}

impl DeckModel {
    /// Model for a deck called `deck_name`
    pub fn new(deck_name: impl Into<String>) -> Self {
        Self {
            model_id: MODEL_ID,
            deck_id: DECK_ID,
            model_name: MODEL_NAME.to_string(),
            deck_name: deck_name.into(),
            fields: FIELD_NAMES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Produces a deck artifact from finished notes
///
/// Called once per run, and only when every note assembled successfully.
#[async_trait]
pub trait DeckWriter: Send + Sync {
    /// Write `notes` as a deck described by `model`
    async fn write(&self, model: &DeckModel, notes: &[Note]) -> Result<()>;
}

/// Writes the deck as a JSON document
#[derive(Clone, Debug)]
pub struct JsonDeckWriter {
    path: PathBuf,
}

#[derive(Serialize)]
struct DeckDocument<'a> {
    model: &'a DeckModel,
    notes: Vec<NoteDocument<'a>>,
}

#[derive(Serialize)]
struct NoteDocument<'a> {
    guid: String,
    #[serde(flatten)]
    note: &'a Note,
}

impl JsonDeckWriter {
    /// Writer targeting `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DeckWriter for JsonDeckWriter {
    async fn write(&self, model: &DeckModel, notes: &[Note]) -> Result<()> {
        let document = DeckDocument {
            model,
            notes: notes
                .iter()
                .map(|note| NoteDocument {
                    guid: note.guid(),
                    note,
                })
                .collect(),
        };
        let json = serde_json::to_vec_pretty(&document)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;

        tracing::info!(
            path = %self.path.display(),
            notes = notes.len(),
            deck = %model.deck_name,
            "Deck written"
        );
        Ok(())
    }
}
