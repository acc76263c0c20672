//! GraphQL response fixtures and mock mounting helpers

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Problem record as returned inside a catalog page
pub fn problem(slug: &str, difficulty: &str, freq_bar: f64, total: u64, accepted: u64) -> Value {
    json!({
        "questionFrontendId": "1",
        "title": slug.replace('-', " "),
        "titleSlug": slug,
        "categoryTitle": "Algorithms",
        "freqBar": freq_bar,
        "content": format!("<p>{slug}</p>"),
        "isPaidOnly": false,
        "difficulty": difficulty,
        "likes": 100,
        "dislikes": 3,
        "topicTags": [{"name": "Array", "slug": "array"}],
        "stats": format!("{{\"totalSubmissionRaw\": {total}, \"totalAcceptedRaw\": {accepted}}}"),
        "hints": []
    })
}

/// The "two-sum" record used by the end-to-end scenario
pub fn two_sum() -> Value {
    problem("two-sum", "Easy", 42.0, 100, 50)
}

/// Body of a catalog count response
pub fn count_body(total: u64) -> Value {
    json!({"data": {"problemsetQuestionList": {"totalNum": total}}})
}

/// Body of a catalog page response
pub fn page_body(problems: Vec<Value>) -> Value {
    json!({"data": {"problemsetQuestionList": {"questions": problems}}})
}

/// Mock answering the catalog count query
pub fn count_mock(total: u64) -> Mock {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "operationName": "problemsetQuestionList",
            "variables": {"skip": 0, "limit": 1}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(count_body(total)))
}

/// Mock answering the catalog page query at `skip`
pub fn page_mock(skip: u64, problems: Vec<Value>) -> Mock {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("questions: data"))
        .and(body_partial_json(json!({"variables": {"skip": skip}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(problems)))
}

/// Mock answering the submission list query for `slug`
pub fn submission_list_mock(slug: &str, ids: &[&str]) -> Mock {
    let submissions: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "operationName": "submissionList",
            "variables": {"questionSlug": slug}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"questionSubmissionList": {
                "lastKey": null,
                "hasNext": false,
                "submissions": submissions
            }}
        })))
}

/// Mock answering the submission details query for `id`
pub fn submission_details_mock(id: u64, code: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "operationName": "submissionDetails",
            "variables": {"submissionId": id}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"submissionDetails": {"code": code, "lang": {"name": "rust", "verboseName": "Rust"}}}
        })))
}

/// Start a server answering the single-page two-sum catalog
pub async fn two_sum_server() -> MockServer {
    let server = MockServer::start().await;
    count_mock(2).mount(&server).await;
    page_mock(0, vec![two_sum()]).mount(&server).await;
    server
}
