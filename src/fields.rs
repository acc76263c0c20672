//! Field extractors
//!
//! Pure projections of a cached [`Problem`] into the values of one flashcard.

use crate::error::{Error, Result};
use crate::types::{Difficulty, Problem, ProblemStats};

/// Number shown on the website
pub fn problem_id(problem: &Problem) -> &str {
    &problem.question_frontend_id
}

/// Problem title
pub fn title(problem: &Problem) -> &str {
    &problem.title
}

/// Category title (Algorithms, Database, ...)
pub fn category(problem: &Problem) -> &str {
    &problem.category_title
}

/// Problem statement, "No content" when upstream hides it
pub fn description(problem: &Problem) -> &str {
    problem
        .content
        .as_deref()
        .filter(|content| !content.is_empty())
        .unwrap_or("No content")
}

/// Parsed difficulty
pub fn difficulty(problem: &Problem) -> Result<Difficulty> {
    problem.difficulty.parse()
}

/// Difficulty wrapped in its font color
///
/// Fails with [`Error::InvalidValue`] for anything other than Easy, Medium or Hard.
pub fn difficulty_html(problem: &Problem) -> Result<String> {
    let difficulty = difficulty(problem)?;
    Ok(format!(
        "<font color='{}'>{}</font>",
        difficulty.color(),
        difficulty
    ))
}

/// "yes" for subscriber-only problems
pub fn paid_flag(problem: &Problem) -> &'static str {
    if problem.is_paid_only { "yes" } else { "no" }
}

/// Like count
pub fn likes(problem: &Problem) -> u64 {
    problem.likes
}

/// Dislike count
pub fn dislikes(problem: &Problem) -> u64 {
    problem.dislikes
}

/// Submission counters decoded from the embedded stats JSON
pub fn stats(problem: &Problem) -> Result<ProblemStats> {
    serde_json::from_str(&problem.stats).map_err(|e| {
        Error::data_shape(
            format!("stats of {}", problem.title_slug),
            e.to_string(),
        )
    })
}

/// Total number of submissions
pub fn submissions_total(problem: &Problem) -> Result<u64> {
    Ok(stats(problem)?.total_submission_raw)
}

/// Number of accepted submissions
pub fn submissions_accepted(problem: &Problem) -> Result<u64> {
    Ok(stats(problem)?.total_accepted_raw)
}

/// Share of accepted submissions, rounded down, in `0..=100`
///
/// A problem without submissions is reported as [`Error::Division`] instead of 0.
pub fn accept_rate_percent(problem: &Problem) -> Result<u8> {
    let stats = stats(problem)?;
    if stats.total_submission_raw == 0 {
        return Err(Error::Division(problem.title_slug.clone()));
    }

    let percent = u128::from(stats.total_accepted_raw) * 100
        / u128::from(stats.total_submission_raw);
    Ok(percent.min(100) as u8)
}

/// Topic tag slugs followed by `difficulty-{difficulty}-tag`
pub fn tags(problem: &Problem) -> Vec<String> {
    problem
        .topic_tags
        .iter()
        .map(|tag| tag.slug.clone())
        .chain(std::iter::once(format!(
            "difficulty-{}-tag",
            problem.difficulty.to_lowercase()
        )))
        .collect()
}

/// Popularity metric, 0 when upstream omits it
pub fn freq_bar(problem: &Problem) -> f64 {
    problem.freq_bar.unwrap_or(0.0)
}
