use crate::types::{Problem, TopicTag};


/// Minimal well-formed problem for cache tests
pub(super) fn sample_problem(slug: &str) -> Problem {
    Problem {
        title_slug: slug.to_string(),
        question_frontend_id: "1".to_string(),
        title: format!("Title of {slug}"),
        category_title: "Algorithms".to_string(),
        content: Some("<p>statement</p>".to_string()),
        difficulty: "Easy".to_string(),
        is_paid_only: false,
        likes: 10,
        dislikes: 1,
        topic_tags: vec![TopicTag {
            name: "Array".to_string(),
            slug: "array".to_string(),
        }],
        freq_bar: Some(12.5),
        stats: r#"{"totalSubmissionRaw": 10, "totalAcceptedRaw": 5}"#.to_string(),
        hints: vec![],
    }
}
