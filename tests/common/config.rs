//! Test configuration pointing the pipeline at a mock GraphQL server

use leetcode_anki::{CatalogFilter, Config, Credentials};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

/// Session id sent by every test pipeline
pub const TEST_SESSION_ID: &str = "test-session";

/// CSRF token sent by every test pipeline
pub const TEST_CSRF_TOKEN: &str = "test-csrf";

/// Credentials matching [`TEST_SESSION_ID`] and [`TEST_CSRF_TOKEN`]
pub fn test_credentials() -> Credentials {
    Credentials {
        session_id: TEST_SESSION_ID.to_string(),
        csrf_token: TEST_CSRF_TOKEN.to_string(),
    }
}

/// Config for `server` with the cache and deck under `temp_dir`
///
/// No request delay and a short retry delay so tests stay fast.
pub fn test_config(server: &MockServer, temp_dir: &TempDir, catalog: CatalogFilter) -> Config {
    let mut config = Config {
        catalog,
        ..Default::default()
    };
    config.api.endpoint = format!("{}/graphql", server.uri());
    config.api.referer = server.uri();
    config.api.request_delay = Duration::ZERO;
    config.api.timeout = Duration::from_secs(5);
    config.retry.delay = Duration::from_millis(10);
    config.cache.cache_dir = temp_dir.path().join("cache");
    config.deck.output_file = temp_dir.path().join("leetcode.apkg");
    config
}
