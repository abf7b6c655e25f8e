use serde::Serialize;

use crate::metrics::aggregate::AggregateSummary;
use crate::metrics::enrich::EnrichedIssue;

/// Outward shape of `GET /api/issues`: the enriched open issues
/// element-wise, the four averages, and the tracker base URL for
/// client-side issue links. Resolved issues feed the averages only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuesResponse {
    pub browse_base: String,
    pub issues: Vec<EnrichedIssue>,
    #[serde(flatten)]
    pub summary: AggregateSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_fields_flatten_to_top_level() {
        let response = IssuesResponse {
            browse_base: "https://test.atlassian.net".to_string(),
            issues: vec![],
            summary: AggregateSummary {
                avg_ttr_ms: Some(2000),
                avg_ttr_7d_ms: None,
                avg_time_to_resolution_ms: Some(50_000),
                avg_time_to_resolution_7d_ms: None,
            },
        };
        let json = serde_json::to_value(&response).expect("should serialize");
        assert_eq!(json["browseBase"], "https://test.atlassian.net");
        assert_eq!(json["avgTTRMs"], 2000);
        assert_eq!(json["avgTTR7dMs"], serde_json::Value::Null);
        assert_eq!(json["avgTimeToResolutionMs"], 50_000);
        assert_eq!(json["avgTimeToResolution7dMs"], serde_json::Value::Null);
        assert!(json["issues"].as_array().unwrap().is_empty());
    }
}
