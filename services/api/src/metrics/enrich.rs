use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::jira::models::RawIssue;

/// Parse a Jira timestamp. Accepts RFC 3339 as well as Jira's own
/// `2024-01-01T00:00:00.000+0000` form. Anything else counts as absent.
pub fn parse_ts(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.3f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A raw issue plus its derived latency attributes. Original fields are
/// carried through unchanged; the derived fields serialize as
/// `firstCommentAt`, `timeToFirstMs`, `resolvedAt`, `timeToResolutionMs`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedIssue {
    #[serde(flatten)]
    pub issue: RawIssue,
    pub first_comment_at: Option<DateTime<Utc>>,
    pub time_to_first_ms: Option<i64>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub time_to_resolution_ms: Option<i64>,
}

impl EnrichedIssue {
    /// Parsed creation timestamp, used as the anchor for the trailing
    /// response window.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.issue
            .fields
            .as_ref()
            .and_then(|f| f.created.as_deref())
            .and_then(parse_ts)
    }
}

/// Derive latency attributes for one issue. Total: missing or malformed
/// timestamp fields degrade to `None` derived values, never an error.
pub fn enrich(issue: RawIssue) -> EnrichedIssue {
    let fields = issue.fields.as_ref();

    let created = fields.and_then(|f| f.created.as_deref()).and_then(parse_ts);

    // Earliest parseable comment timestamp; comment order is irrelevant.
    let first_comment_at = fields
        .and_then(|f| f.comment.as_ref())
        .into_iter()
        .flat_map(|c| c.comments.iter())
        .filter_map(|c| c.created.as_deref().and_then(parse_ts))
        .min();

    let time_to_first_ms = match (created, first_comment_at) {
        (Some(created), Some(first)) => Some((first - created).num_milliseconds().max(0)),
        _ => None,
    };

    // A status-category change to Done stands in for an explicit
    // resolution timestamp when the latter is absent. The string is
    // chosen before parsing: a present-but-unparseable resolutiondate
    // yields None rather than falling through.
    let resolved_at = fields
        .and_then(|f| {
            f.resolution_date
                .as_deref()
                .or(f.status_category_change_date.as_deref())
        })
        .and_then(parse_ts);

    let time_to_resolution_ms = match (created, resolved_at) {
        (Some(created), Some(resolved)) => Some((resolved - created).num_milliseconds().max(0)),
        _ => None,
    };

    EnrichedIssue {
        issue,
        first_comment_at,
        time_to_first_ms,
        resolved_at,
        time_to_resolution_ms,
    }
}
