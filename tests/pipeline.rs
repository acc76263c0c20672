//! End-to-end pipeline tests against a mock GraphQL endpoint
//!
//! Every test runs the real HTTP transport, SQLite cache and JSON deck writer;
//! only the upstream service is replaced by wiremock.

mod common;

use common::{
    TEST_CSRF_TOKEN, TEST_SESSION_ID, count_mock, deck_note, drain_events, page_mock, problem,
    read_deck, submission_details_mock, submission_list_mock, test_config, test_credentials,
    two_sum, two_sum_server,
};
use leetcode_anki::{
    CatalogFilter, Error, Event, JsonDeckWriter, Pipeline, ProblemStatus, guid_for,
};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn two_sum_window() -> CatalogFilter {
    CatalogFilter {
        start: 0,
        stop: 1,
        page_size: 10,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_two_sum_deck_end_to_end() {
    let server = two_sum_server().await;
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server, &temp_dir, two_sum_window());
    let deck_path = temp_dir.path().join("leetcode.json");

    let pipeline = Pipeline::connect(config, &test_credentials()).await.unwrap();
    let written = pipeline
        .generate(&JsonDeckWriter::new(&deck_path))
        .await
        .unwrap();

    assert_eq!(written, 1);
    let deck = read_deck(&deck_path).await;
    assert_eq!(deck["model"]["deck_name"], "leetcode");
    assert_eq!(deck["model"]["model_id"], 4567610856u64);

    let note = deck_note(&deck, "two-sum");
    assert_eq!(note["guid"], guid_for(&["two-sum"]));
    assert_eq!(note["fields"][11], "50");
    assert_eq!(note["tags"], serde_json::json!(["array", "difficulty-easy-tag"]));
    assert_eq!(note["sort_field"], "042");
    assert!(note["fields"][5].as_str().unwrap().contains("Easy"));
    assert_eq!(note["fields"][13], "");
}

#[tokio::test]
async fn test_requests_carry_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-csrftoken", TEST_CSRF_TOKEN))
        .and(header(
            "cookie",
            format!("LEETCODE_SESSION={TEST_SESSION_ID}; csrftoken={TEST_CSRF_TOKEN}").as_str(),
        ))
        .and(header("referer", server.uri().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"problemsetQuestionList": {"totalNum": 0, "questions": []}}
        })))
        .expect(2)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server, &temp_dir, CatalogFilter::default());

    let pipeline = Pipeline::connect(config, &test_credentials()).await.unwrap();
    let slugs = pipeline.ensure_catalog_loaded().await.unwrap();

    // count 0 still walks one (empty) page
    assert!(slugs.is_empty());
}

#[tokio::test]
async fn test_rerun_reuses_committed_pages() {
    let server = MockServer::start().await;
    count_mock(2).expect(2).mount(&server).await;
    page_mock(0, vec![two_sum()]).expect(1).mount(&server).await;
    let temp_dir = TempDir::new().unwrap();

    for _ in 0..2 {
        let config = test_config(&server, &temp_dir, two_sum_window());
        let pipeline = Pipeline::connect(config, &test_credentials()).await.unwrap();

        let notes = pipeline.assemble_all().await.unwrap();

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].slug(), "two-sum");
        pipeline.database().clone().close().await;
    }

    server.verify().await;
}

#[tokio::test]
async fn test_force_refresh_refetches_pages() {
    let server = MockServer::start().await;
    count_mock(2).expect(2).mount(&server).await;
    page_mock(0, vec![two_sum()]).expect(2).mount(&server).await;
    let temp_dir = TempDir::new().unwrap();

    for _ in 0..2 {
        let mut config = test_config(&server, &temp_dir, two_sum_window());
        config.cache.force_refresh = true;
        let pipeline = Pipeline::connect(config, &test_credentials()).await.unwrap();
        pipeline.ensure_catalog_loaded().await.unwrap();
        pipeline.database().clone().close().await;
    }

    server.verify().await;
}

#[tokio::test]
async fn test_multi_page_catalog_in_order() {
    let server = MockServer::start().await;
    count_mock(5).mount(&server).await;
    page_mock(
        0,
        vec![
            problem("a", "Easy", 1.0, 10, 1),
            problem("b", "Medium", 2.0, 10, 2),
        ],
    )
    .mount(&server)
    .await;
    page_mock(
        2,
        vec![
            problem("c", "Hard", 3.0, 10, 3),
            problem("d", "Easy", 4.0, 10, 4),
        ],
    )
    .mount(&server)
    .await;
    page_mock(4, vec![problem("e", "Medium", 5.0, 10, 5)])
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let catalog = CatalogFilter {
        page_size: 2,
        ..Default::default()
    };
    let config = test_config(&server, &temp_dir, catalog);

    let pipeline = Pipeline::connect(config, &test_credentials()).await.unwrap();
    let mut events = pipeline.subscribe();
    let notes = pipeline.assemble_all().await.unwrap();

    let slugs: Vec<&str> = notes.iter().map(|n| n.slug()).collect();
    assert_eq!(slugs, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(notes[2].tags, vec!["array", "difficulty-hard-tag"]);
    assert_eq!(notes[3].field("SumissionAcceptRate"), Some("40"));

    let events = drain_events(&mut events);
    assert_eq!(
        events.first(),
        Some(&Event::CatalogCounted {
            total: 5,
            pages: 3,
            page_size: 2
        })
    );
    let committed = events
        .iter()
        .filter(|e| matches!(e, Event::PageCommitted { .. }))
        .count();
    assert_eq!(committed, 3);
    assert_eq!(events.last(), Some(&Event::NotesAssembled { count: 5 }));
}

#[tokio::test]
async fn test_gateway_error_is_retried() {
    let server = MockServer::start().await;
    count_mock(2).mount(&server).await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("questions: data"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    page_mock(0, vec![two_sum()]).mount(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server, &temp_dir, two_sum_window());

    let pipeline = Pipeline::connect(config, &test_credentials()).await.unwrap();
    let slugs = pipeline.ensure_catalog_loaded().await.unwrap();

    assert_eq!(slugs, ["two-sum".to_string()]);
}

#[tokio::test]
async fn test_exhausted_retries_write_nothing() {
    let server = MockServer::start().await;
    count_mock(2).mount(&server).await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("questions: data"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server, &temp_dir, two_sum_window());
    let deck_path = temp_dir.path().join("leetcode.json");

    let pipeline = Pipeline::connect(config, &test_credentials()).await.unwrap();
    let err = pipeline
        .generate(&JsonDeckWriter::new(&deck_path))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Http { status: 502, .. }));
    assert!(!deck_path.exists());
    assert_eq!(pipeline.database().count_problems().await.unwrap(), 0);
    server.verify().await;
}

#[tokio::test]
async fn test_graphql_errors_are_data_shape_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errors": [{"message": "That user is not logged in"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server, &temp_dir, two_sum_window());

    let pipeline = Pipeline::connect(config, &test_credentials()).await.unwrap();
    let err = pipeline.ensure_catalog_loaded().await.unwrap_err();

    assert!(matches!(err, Error::DataShape { .. }));
    assert!(err.to_string().contains("not logged in"));
}

#[tokio::test]
async fn test_start_beyond_catalog_is_range_error() {
    let server = MockServer::start().await;
    count_mock(2).expect(1).mount(&server).await;
    page_mock(0, vec![two_sum()]).expect(0).mount(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let catalog = CatalogFilter {
        start: 3,
        ..Default::default()
    };
    let config = test_config(&server, &temp_dir, catalog);

    let pipeline = Pipeline::connect(config, &test_credentials()).await.unwrap();
    let err = pipeline.ensure_catalog_loaded().await.unwrap_err();

    assert!(matches!(err, Error::Range(_)));
    server.verify().await;
}

#[tokio::test]
async fn test_last_submissions_in_deck() {
    let server = MockServer::start().await;
    count_mock(2).mount(&server).await;
    page_mock(
        0,
        vec![two_sum(), problem("add-two-numbers", "Medium", 30.0, 10, 5)],
    )
    .mount(&server)
    .await;
    submission_list_mock("two-sum", &["969483658"])
        .mount(&server)
        .await;
    submission_details_mock(969483658, "if a < b { return; }")
        .mount(&server)
        .await;
    submission_list_mock("add-two-numbers", &[]).mount(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(
        &server,
        &temp_dir,
        CatalogFilter {
            page_size: 2,
            status: Some(ProblemStatus::Accepted),
            ..two_sum_window()
        },
    );
    config.submissions.include_last_submission = true;
    let deck_path = temp_dir.path().join("leetcode.json");

    let pipeline = Pipeline::connect(config, &test_credentials()).await.unwrap();
    pipeline
        .generate(&JsonDeckWriter::new(&deck_path))
        .await
        .unwrap();

    let deck = read_deck(&deck_path).await;
    assert_eq!(
        deck_note(&deck, "two-sum")["fields"][13],
        "\nif a &lt; b { return; }"
    );
    assert_eq!(deck_note(&deck, "add-two-numbers")["fields"][13], "\n");

    let cached = pipeline
        .database()
        .get_submission("two-sum")
        .await
        .unwrap()
        .unwrap();
    assert!(cached.present);
    assert_eq!(cached.code, "if a < b { return; }");
}
