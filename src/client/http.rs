//! HTTP transport for the GraphQL endpoint

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, REFERER};
use serde_json::Value;

use super::{GraphqlRequest, QueryExecutor};
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// Longest error body kept in [`Error::Http`]
const MAX_ERROR_BODY: usize = 512;

/// Session credentials copied from a logged-in browser
///
/// Obtaining them is out of scope; they are passed in as-is.
#[derive(Clone)]
pub struct Credentials {
    /// Value of the `LEETCODE_SESSION` cookie
    pub session_id: String,
    /// Value of the `csrftoken` cookie
    pub csrf_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("session_id", &"<redacted>")
            .field("csrf_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read `LEETCODE_SESSION_ID` and `LEETCODE_CSRF_TOKEN` from the environment
    pub fn from_env() -> Result<Self> {
        let read = |key: &str| {
            std::env::var(key).map_err(|_| Error::Config {
                message: format!("environment variable {key} is not set"),
                key: Some(key.to_string()),
            })
        };
        Ok(Self {
            session_id: read("LEETCODE_SESSION_ID")?,
            csrf_token: read("LEETCODE_CSRF_TOKEN")?,
        })
    }

    fn headers(&self, referer: &str) -> Result<HeaderMap> {
        let value = |v: String, key: &str| {
            HeaderValue::from_str(&v).map_err(|e| Error::Config {
                message: format!("invalid header value: {e}"),
                key: Some(key.to_string()),
            })
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(REFERER, value(referer.to_string(), "api.referer")?);
        headers.insert(
            "x-csrftoken",
            value(self.csrf_token.clone(), "LEETCODE_CSRF_TOKEN")?,
        );
        headers.insert(
            COOKIE,
            value(
                format!(
                    "LEETCODE_SESSION={}; csrftoken={}",
                    self.session_id, self.csrf_token
                ),
                "LEETCODE_SESSION_ID",
            )?,
        );
        Ok(headers)
    }
}

/// [`QueryExecutor`] that POSTs to the configured endpoint with reqwest
#[derive(Clone, Debug)]
pub struct HttpExecutor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpExecutor {
    /// Build an executor sending `credentials` with every request
    pub fn new(config: &ApiConfig, credentials: &Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(credentials.headers(&config.referer)?)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl QueryExecutor for HttpExecutor {
    async fn execute(&self, request: &GraphqlRequest) -> Result<Value> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let mut body = text;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            tracing::warn!(
                status = status.as_u16(),
                operation = request.operation_name,
                "GraphQL endpoint returned an error status"
            );
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::data_shape(request.operation_name, format!("response is not JSON: {e}"))
        })
    }
}
