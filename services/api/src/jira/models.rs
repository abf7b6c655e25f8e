use serde::{Deserialize, Serialize};

/// Response envelope for `/rest/api/3/search/jql`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<RawIssue>,
}

/// An issue as returned by the Jira search API.
///
/// Only the timestamp and comment fields are examined; everything else
/// (summary, status, assignee, ...) rides along in the flattened maps
/// and is re-serialized untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<IssueFields>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(rename = "resolutiondate", skip_serializing_if = "Option::is_none")]
    pub resolution_date: Option<String>,
    #[serde(
        rename = "statuscategorychangedate",
        skip_serializing_if = "Option::is_none"
    )]
    pub status_category_change_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentContainer>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentContainer {
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
