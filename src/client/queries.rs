//! GraphQL documents, request bodies and typed response records

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

use crate::config::CatalogFilter;
use crate::error::{Error, Result};
use crate::types::Problem;

/// Status code upstream uses for accepted submissions
pub const SUBMISSION_STATUS_ACCEPTED: u32 = 10;

const PROBLEMS_COUNT_QUERY: &str = r#"
query problemsetQuestionList($categorySlug: String, $limit: Int, $skip: Int, $filters: QuestionListFilterInput) {
  problemsetQuestionList: questionList(
    categorySlug: $categorySlug
    limit: $limit
    skip: $skip
    filters: $filters
  ) {
    totalNum
  }
}
"#;

const PROBLEMS_PAGE_QUERY: &str = r#"
query problemsetQuestionList($categorySlug: String, $limit: Int, $skip: Int, $filters: QuestionListFilterInput) {
  problemsetQuestionList: questionList(
    categorySlug: $categorySlug
    limit: $limit
    skip: $skip
    filters: $filters
  ) {
    questions: data {
      questionFrontendId
      title
      titleSlug
      categoryTitle
      freqBar
      content
      isPaidOnly
      difficulty
      likes
      dislikes
      topicTags {
        name
        slug
      }
      stats
      hints
    }
  }
}
"#;

const QUESTION_QUERY: &str = r#"
query questionData($titleSlug: String!) {
  question(titleSlug: $titleSlug) {
    questionFrontendId
    title
    titleSlug
    categoryTitle
    freqBar
    content
    isPaidOnly
    difficulty
    likes
    dislikes
    topicTags {
      name
      slug
    }
    stats
    hints
  }
}
"#;

const SUBMISSION_LIST_QUERY: &str = r#"
query submissionList($offset: Int!, $limit: Int!, $lastKey: String, $questionSlug: String!, $lang: Int, $status: Int) {
  questionSubmissionList(
    offset: $offset
    limit: $limit
    lastKey: $lastKey
    questionSlug: $questionSlug
    lang: $lang
    status: $status
  ) {
    lastKey
    hasNext
    submissions {
      id
    }
  }
}
"#;

const SUBMISSION_DETAILS_QUERY: &str = r#"
query submissionDetails($submissionId: Int!) {
  submissionDetails(submissionId: $submissionId) {
    code
    lang {
      name
      verboseName
    }
  }
}
"#;

/// Body of one GraphQL POST
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    /// Query document
    pub query: &'static str,
    /// Query variables
    pub variables: Value,
    /// Operation to run from the document
    pub operation_name: &'static str,
}

impl GraphqlRequest {
    fn question_list(filter: &CatalogFilter, skip: u64, limit: u64, query: &'static str) -> Self {
        Self {
            query,
            variables: json!({
                "categorySlug": "",
                "limit": limit,
                "skip": skip,
                "filters": {
                    "tags": [],
                    "listId": filter.list_id_or_empty(),
                    "status": filter.status.map(|s| s.as_str()),
                },
            }),
            operation_name: "problemsetQuestionList",
        }
    }

    /// Total number of problems under the filter
    pub fn problems_count(filter: &CatalogFilter) -> Self {
        Self::question_list(filter, 0, 1, PROBLEMS_COUNT_QUERY)
    }

    /// One catalog page
    pub fn problems_page(filter: &CatalogFilter, skip: u64, limit: u64) -> Self {
        Self::question_list(filter, skip, limit, PROBLEMS_PAGE_QUERY)
    }

    /// Full detail for one problem
    pub fn question(slug: &str) -> Self {
        Self {
            query: QUESTION_QUERY,
            variables: json!({ "titleSlug": slug }),
            operation_name: "questionData",
        }
    }

    /// Accepted submissions of the authenticated user, newest first
    pub fn accepted_submissions(slug: &str, limit: u32) -> Self {
        Self {
            query: SUBMISSION_LIST_QUERY,
            variables: json!({
                "questionSlug": slug,
                "offset": 0,
                "limit": limit,
                "lastKey": null,
                "status": SUBMISSION_STATUS_ACCEPTED,
            }),
            operation_name: "submissionList",
        }
    }

    /// Code and language of one submission
    pub fn submission_details(id: &SubmissionId) -> Self {
        Self {
            query: SUBMISSION_DETAILS_QUERY,
            variables: json!({ "submissionId": id.to_variable() }),
            operation_name: "submissionDetails",
        }
    }
}

/// Submission id; upstream sends it as a string but older responses use numbers
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SubmissionId {
    /// Numeric id
    Number(u64),
    /// String id
    Text(String),
}

impl SubmissionId {
    /// Value for the `Int!` variable of the details query
    fn to_variable(&self) -> Value {
        match self {
            SubmissionId::Number(n) => json!(n),
            SubmissionId::Text(s) => s.parse::<u64>().map_or_else(|_| json!(s), |n| json!(n)),
        }
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionId::Number(n) => write!(f, "{n}"),
            SubmissionId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CountData {
    pub problemset_question_list: CountList,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CountList {
    #[serde(default)]
    pub total_num: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageData {
    pub problemset_question_list: PageList,
}

/// One catalog page as returned by upstream
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageList {
    /// Problems in catalog order
    pub questions: Vec<Problem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionData {
    pub question: Option<Problem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmissionListData {
    #[serde(default)]
    pub question_submission_list: Option<SubmissionList>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionList {
    #[serde(default)]
    pub submissions: Vec<SubmissionSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionSummary {
    pub id: SubmissionId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmissionDetailsData {
    #[serde(default)]
    pub submission_details: Option<SubmissionDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionDetails {
    #[serde(default)]
    pub code: Option<String>,
}

/// Decode a `data` object, turning serde failures into [`Error::DataShape`]
pub(crate) fn decode<T: DeserializeOwned>(context: &str, data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|e| Error::data_shape(context, e.to_string()))
}
