use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::enrich::EnrichedIssue;

/// Rolled-up latency summary. `None` means the filtered population was
/// empty — distinct from an instant (zero) response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateSummary {
    #[serde(rename = "avgTTRMs")]
    pub avg_ttr_ms: Option<i64>,
    #[serde(rename = "avgTTR7dMs")]
    pub avg_ttr_7d_ms: Option<i64>,
    #[serde(rename = "avgTimeToResolutionMs")]
    pub avg_time_to_resolution_ms: Option<i64>,
    #[serde(rename = "avgTimeToResolution7dMs")]
    pub avg_time_to_resolution_7d_ms: Option<i64>,
}

/// Reduce the two enriched populations to four averages.
///
/// Population membership (open vs. resolved) is decided by the queries
/// that produced the inputs; this function never re-derives status.
/// Trailing windows are simple subtraction against `now`, lower bound
/// inclusive.
pub fn aggregate(
    open: &[EnrichedIssue],
    resolved: &[EnrichedIssue],
    now: DateTime<Utc>,
) -> AggregateSummary {
    let window = Duration::days(7);

    let avg_ttr_ms = mean_ms(open.iter().filter_map(|i| i.time_to_first_ms));

    let avg_ttr_7d_ms = mean_ms(
        open.iter()
            .filter(|i| i.created_at().is_some_and(|created| now - created <= window))
            .filter_map(|i| i.time_to_first_ms),
    );

    // All-time resolution average is unbounded: every resolved issue the
    // query returned counts, capped only by the 100-record result size.
    let avg_time_to_resolution_ms =
        mean_ms(resolved.iter().filter_map(|i| i.time_to_resolution_ms));

    let avg_time_to_resolution_7d_ms = mean_ms(
        resolved
            .iter()
            .filter(|i| i.resolved_at.is_some_and(|resolved| now - resolved <= window))
            .filter_map(|i| i.time_to_resolution_ms),
    );

    AggregateSummary {
        avg_ttr_ms,
        avg_ttr_7d_ms,
        avg_time_to_resolution_ms,
        avg_time_to_resolution_7d_ms,
    }
}

/// Mean in integer milliseconds, rounded half-away-from-zero (inputs are
/// non-negative, so effectively half-up). Empty input is `None`, never 0.
fn mean_ms(values: impl Iterator<Item = i64>) -> Option<i64> {
    let (sum, count) = values.fold((0i64, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| (sum as f64 / f64::from(count)).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jira::models::{IssueFields, RawIssue};
    use crate::metrics::enrich::parse_ts;

    fn issue(
        created: Option<&str>,
        time_to_first_ms: Option<i64>,
        resolved_at: Option<&str>,
        time_to_resolution_ms: Option<i64>,
    ) -> EnrichedIssue {
        EnrichedIssue {
            issue: RawIssue {
                key: None,
                fields: Some(IssueFields {
                    created: created.map(str::to_string),
                    resolution_date: None,
                    status_category_change_date: None,
                    comment: None,
                    extra: serde_json::Map::new(),
                }),
                extra: serde_json::Map::new(),
            },
            first_comment_at: None,
            time_to_first_ms,
            resolved_at: resolved_at.and_then(parse_ts),
            time_to_resolution_ms,
        }
    }

    fn at(now: DateTime<Utc>, hours_ago: i64) -> String {
        (now - Duration::hours(hours_ago)).to_rfc3339()
    }

    #[test]
    fn empty_populations_yield_all_none() {
        let summary = aggregate(&[], &[], Utc::now());
        assert_eq!(
            summary,
            AggregateSummary {
                avg_ttr_ms: None,
                avg_ttr_7d_ms: None,
                avg_time_to_resolution_ms: None,
                avg_time_to_resolution_7d_ms: None,
            }
        );
    }

    #[test]
    fn null_durations_are_excluded_not_counted_as_zero() {
        let now = Utc::now();
        let open = vec![
            issue(Some(&at(now, 1)), Some(4000), None, None),
            issue(Some(&at(now, 1)), None, None, None),
        ];
        let summary = aggregate(&open, &[], now);
        assert_eq!(summary.avg_ttr_ms, Some(4000));
        assert_eq!(summary.avg_ttr_7d_ms, Some(4000));
    }

    #[test]
    fn ttr_mean_over_open_population() {
        let now = Utc::now();
        let open = vec![
            issue(Some(&at(now, 0)), Some(1000), None, None),
            issue(Some(&at(now, 0)), Some(3000), None, None),
        ];
        let summary = aggregate(&open, &[], now);
        assert_eq!(summary.avg_ttr_ms, Some(2000));
        assert_eq!(summary.avg_ttr_7d_ms, Some(2000));
    }

    #[test]
    fn old_issue_excluded_from_7d_but_counted_all_time() {
        let now = Utc::now();
        let open = vec![
            issue(Some(&at(now, 0)), Some(1000), None, None),
            issue(Some(&at(now, 0)), Some(3000), None, None),
            issue(Some(&at(now, 10 * 24)), Some(99999), None, None),
        ];
        let summary = aggregate(&open, &[], now);
        // round((1000 + 3000 + 99999) / 3)
        assert_eq!(summary.avg_ttr_ms, Some(34666));
        assert_eq!(summary.avg_ttr_7d_ms, Some(2000));
    }

    #[test]
    fn resolution_8_days_ago_excluded_from_7d_window() {
        let now = Utc::now();
        let resolved = vec![
            issue(None, None, Some(&at(now, 8 * 24)), Some(50_000)),
            issue(None, None, Some(&at(now, 24)), Some(10_000)),
        ];
        let summary = aggregate(&[], &resolved, now);
        assert_eq!(summary.avg_time_to_resolution_ms, Some(30_000));
        assert_eq!(summary.avg_time_to_resolution_7d_ms, Some(10_000));
    }

    #[test]
    fn window_lower_bound_is_inclusive() {
        let now = Utc::now();
        let boundary = (now - Duration::days(7)).to_rfc3339();
        let open = vec![issue(Some(&boundary), Some(500), None, None)];
        let resolved = vec![issue(None, None, Some(&boundary), Some(700))];
        let summary = aggregate(&open, &resolved, now);
        assert_eq!(summary.avg_ttr_7d_ms, Some(500));
        assert_eq!(summary.avg_time_to_resolution_7d_ms, Some(700));
    }

    #[test]
    fn issue_without_created_excluded_from_7d_response_window() {
        let now = Utc::now();
        let open = vec![
            issue(None, Some(9000), None, None),
            issue(Some(&at(now, 1)), Some(1000), None, None),
        ];
        let summary = aggregate(&open, &[], now);
        assert_eq!(summary.avg_ttr_ms, Some(5000));
        assert_eq!(summary.avg_ttr_7d_ms, Some(1000));
    }

    #[test]
    fn mean_rounds_to_nearest_millisecond() {
        let now = Utc::now();
        let open = vec![
            issue(Some(&at(now, 0)), Some(1), None, None),
            issue(Some(&at(now, 0)), Some(2), None, None),
        ];
        let summary = aggregate(&open, &[], now);
        // 1.5 rounds half-up to 2
        assert_eq!(summary.avg_ttr_ms, Some(2));
    }

    #[test]
    fn metrics_are_independent_per_population() {
        let now = Utc::now();
        let open = vec![issue(Some(&at(now, 1)), Some(1000), None, None)];
        // resolved population contributes nothing to TTR metrics
        let resolved = vec![issue(Some(&at(now, 1)), Some(777), Some(&at(now, 1)), Some(2000))];
        let summary = aggregate(&open, &resolved, now);
        assert_eq!(summary.avg_ttr_ms, Some(1000));
        assert_eq!(summary.avg_time_to_resolution_ms, Some(2000));
    }

    #[test]
    fn order_of_inputs_does_not_matter() {
        let now = Utc::now();
        let a = issue(Some(&at(now, 0)), Some(1000), None, None);
        let b = issue(Some(&at(now, 0)), Some(3000), None, None);
        let forward = aggregate(&[a.clone(), b.clone()], &[], now);
        let backward = aggregate(&[b, a], &[], now);
        assert_eq!(forward, backward);
    }
}
