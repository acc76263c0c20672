//! Note assembly
//!
//! A [`Note`] is one flashcard: 14 positional fields, tags and a sort key. The
//! first field is always the slug; the note identity is derived from it alone.

use serde::Serialize;

use crate::deck::guid_for;
use crate::error::Result;
use crate::fields;
use crate::types::Problem;

/// Field names of the note model, in field order
pub const FIELD_NAMES: [&str; 14] = [
    "Slug",
    "Id",
    "Title",
    "Topic",
    "Content",
    "Difficulty",
    "Paid",
    "Likes",
    "Dislikes",
    "SubmissionsTotal",
    "SubmissionsAccepted",
    "SumissionAcceptRate",
    "Frequency",
    "LastSubmissionCode",
];

/// One assembled flashcard
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Note {
    /// Field values matching [`FIELD_NAMES`]
    pub fields: Vec<String>,
    /// Topic tags plus the derived difficulty tag
    pub tags: Vec<String>,
    /// Frequency zero-padded to three characters
    pub sort_field: String,
}

impl Note {
    /// First field
    pub fn slug(&self) -> &str {
        self.fields.first().map_or("", String::as_str)
    }

    /// Stable identity, unchanged when the note content is updated
    pub fn guid(&self) -> String {
        guid_for(&[self.slug()])
    }

    /// Value of a named field
    pub fn field(&self, name: &str) -> Option<&str> {
        FIELD_NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.fields.get(i))
            .map(String::as_str)
    }
}

/// Assemble the note for `problem`
///
/// `last_submission` is `None` when submissions are not included; otherwise its
/// code is HTML-escaped into the last field. Fails on the first extractor error
/// without producing a partial note.
pub fn assemble(problem: &Problem, last_submission: Option<&str>) -> Result<Note> {
    let difficulty = fields::difficulty_html(problem)?;
    let total = fields::submissions_total(problem)?;
    let accepted = fields::submissions_accepted(problem)?;
    let accept_rate = fields::accept_rate_percent(problem)?;
    let frequency = fields::freq_bar(problem).to_string();

    let last_submission = last_submission
        .map(|code| format!("\n{}", html_escape::encode_quoted_attribute(code)))
        .unwrap_or_default();

    let fields = vec![
        problem.title_slug.clone(),
        fields::problem_id(problem).to_string(),
        fields::title(problem).to_string(),
        fields::category(problem).to_string(),
        fields::description(problem).to_string(),
        difficulty,
        fields::paid_flag(problem).to_string(),
        fields::likes(problem).to_string(),
        fields::dislikes(problem).to_string(),
        total.to_string(),
        accepted.to_string(),
        accept_rate.to_string(),
        frequency.clone(),
        last_submission,
    ];

    Ok(Note {
        fields,
        tags: fields::tags(problem),
        sort_field: zero_pad(&frequency, 3),
    })
}

/// Left-pad with zeros to `width`, keeping a leading sign in front
fn zero_pad(value: &str, width: usize) -> String {
    if value.len() >= width {
        return value.to_string();
    }
    let (sign, digits) = match value.strip_prefix(['-', '+']) {
        Some(rest) => (&value[..1], rest),
        None => ("", value),
    };
    format!("{sign}{}{digits}", "0".repeat(width - value.len()))
}
