//! Remote query client
//!
//! [`LeetcodeClient`] turns typed requests into GraphQL calls. The transport is
//! injected through [`QueryExecutor`] so the pipeline never deals with how
//! credentials were obtained; [`HttpExecutor`] is the production transport.
//!
//! Every call goes through the client's [`RateGate`]. Transport errors are
//! returned untouched so callers can decide whether to retry them.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::CatalogFilter;
use crate::error::{Error, Result};
use crate::rate_limit::RateGate;
use crate::types::Problem;

mod http;
pub mod queries;

pub use http::{Credentials, HttpExecutor};
pub use queries::{GraphqlRequest, PageList, SubmissionId};

use queries::{
    CountData, PageData, QuestionData, SubmissionDetailsData, SubmissionListData, decode,
};

/// Capability to execute an authenticated GraphQL request
///
/// Implementations return the full response body (`{"data": ..., "errors": ...}`).
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Send one request and return the decoded JSON body
    async fn execute(&self, request: &GraphqlRequest) -> Result<Value>;
}

/// Typed GraphQL client for the problem catalog
#[derive(Clone)]
pub struct LeetcodeClient {
    executor: Arc<dyn QueryExecutor>,
    gate: RateGate,
}

impl std::fmt::Debug for LeetcodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeetcodeClient")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl LeetcodeClient {
    /// Create a client over `executor`, serialized through `gate`
    pub fn new(executor: Arc<dyn QueryExecutor>, gate: RateGate) -> Self {
        Self { executor, gate }
    }

    /// Run one request under the rate-limit gate and return its `data` object
    pub async fn run_query(&self, request: &GraphqlRequest) -> Result<Value> {
        tracing::debug!(operation = request.operation_name, "sending GraphQL request");
        let body = self.gate.run(self.executor.execute(request)).await?;
        extract_data(request.operation_name, body)
    }

    /// Number of problems matching the filter
    pub async fn problems_count(&self, filter: &CatalogFilter) -> Result<u64> {
        let data = self
            .run_query(&GraphqlRequest::problems_count(filter))
            .await?;
        let count: CountData = decode("problemsetQuestionList", data)?;
        Ok(count.problemset_question_list.total_num.unwrap_or(0))
    }

    /// One catalog page starting at `skip`
    pub async fn problems_page(
        &self,
        filter: &CatalogFilter,
        skip: u64,
        limit: u64,
    ) -> Result<PageList> {
        let data = self
            .run_query(&GraphqlRequest::problems_page(filter, skip, limit))
            .await?;
        let page: PageData = decode("problemsetQuestionList", data)?;
        Ok(page.problemset_question_list)
    }

    /// Full detail of one problem
    pub async fn question(&self, slug: &str) -> Result<Problem> {
        let data = self.run_query(&GraphqlRequest::question(slug)).await?;
        let detail: QuestionData = decode("question", data)?;
        detail
            .question
            .ok_or_else(|| Error::data_shape("question", format!("no question for slug {slug}")))
    }

    /// Ids of the accepted submissions for `slug`, newest first
    pub async fn accepted_submission_ids(&self, slug: &str, limit: u32) -> Result<Vec<SubmissionId>> {
        let data = self
            .run_query(&GraphqlRequest::accepted_submissions(slug, limit))
            .await?;
        let list: SubmissionListData = decode("questionSubmissionList", data)?;
        Ok(list
            .question_submission_list
            .map(|l| l.submissions.into_iter().map(|s| s.id).collect())
            .unwrap_or_default())
    }

    /// Source code of one submission, `None` when upstream has none
    pub async fn submission_code(&self, id: &SubmissionId) -> Result<Option<String>> {
        let data = self
            .run_query(&GraphqlRequest::submission_details(id))
            .await?;
        let details: SubmissionDetailsData = decode("submissionDetails", data)?;
        Ok(details
            .submission_details
            .and_then(|d| d.code)
            .filter(|code| !code.is_empty()))
    }
}

/// Pull `data` out of a GraphQL response body
///
/// A response with `errors` and no `data` is a contract failure; `errors`
/// alongside usable data are logged and otherwise ignored.
fn extract_data(operation: &str, mut body: Value) -> Result<Value> {
    let errors = body
        .get("errors")
        .and_then(Value::as_array)
        .filter(|errors| !errors.is_empty())
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string()
                })
                .collect::<Vec<_>>()
                .join("; ")
        });

    match body.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => {
            if let Some(errors) = errors {
                tracing::warn!(operation, errors = %errors, "GraphQL response carried errors");
            }
            Ok(data)
        }
        _ => Err(Error::data_shape(
            operation,
            errors.unwrap_or_else(|| "response has no data".to_string()),
        )),
    }
}
