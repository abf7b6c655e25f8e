use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::error::ApiError;
use crate::issues::responses::IssuesResponse;
use crate::jira::query::{
    open_issues_jql, resolved_issues_jql, OPEN_ISSUE_FIELDS, RESOLVED_ISSUE_FIELDS,
};
use crate::metrics::aggregate::aggregate;
use crate::metrics::enrich::enrich;
use crate::AppState;

/// Result cap per population; no further pagination.
const MAX_RESULTS: u32 = 100;

pub async fn get_issues(
    State(state): State<AppState>,
) -> Result<Json<IssuesResponse>, ApiError> {
    let jira = &state.jira;
    let open_jql = open_issues_jql(jira.project_key());
    let resolved_jql = resolved_issues_jql(jira.project_key());

    // Both fetches must land before the core runs; either failure
    // short-circuits instead of aggregating a partial view.
    let (open_raw, resolved_raw) = tokio::try_join!(
        jira.search_issues(&open_jql, OPEN_ISSUE_FIELDS, MAX_RESULTS),
        jira.search_issues(&resolved_jql, RESOLVED_ISSUE_FIELDS, MAX_RESULTS),
    )?;

    tracing::debug!(
        open = open_raw.len(),
        resolved = resolved_raw.len(),
        "fetched issue populations"
    );

    let issues: Vec<_> = open_raw.into_iter().map(enrich).collect();
    let resolved: Vec<_> = resolved_raw.into_iter().map(enrich).collect();

    let summary = aggregate(&issues, &resolved, Utc::now());

    Ok(Json(IssuesResponse {
        browse_base: jira.base_url().to_owned(),
        issues,
        summary,
    }))
}
