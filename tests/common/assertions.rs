//! Custom test assertions for pipeline tests

use leetcode_anki::Event;
use serde_json::Value;
use std::path::Path;
use tokio::sync::broadcast;

/// Drain every event already sent on `events`
pub fn drain_events(events: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}

/// Read the JSON deck written to `path`
pub async fn read_deck(path: &Path) -> Value {
    let bytes = tokio::fs::read(path)
        .await
        .unwrap_or_else(|e| panic!("deck {} was not written: {e}", path.display()));
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("deck is not JSON: {e}"))
}

/// Find the note for `slug` in a JSON deck
pub fn deck_note<'a>(deck: &'a Value, slug: &str) -> &'a Value {
    deck["notes"]
        .as_array()
        .and_then(|notes| notes.iter().find(|n| n["fields"][0] == slug))
        .unwrap_or_else(|| panic!("no note for {slug}"))
}
