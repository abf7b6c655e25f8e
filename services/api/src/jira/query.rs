/// Fields requested for the open-issue population — display fields plus
/// the metric inputs.
pub const OPEN_ISSUE_FIELDS: &[&str] = &[
    "summary",
    "status",
    "assignee",
    "issuetype",
    "priority",
    "description",
    "created",
    "updated",
    "comment",
    "resolutiondate",
];

/// Fields requested for the resolved-issue population — metric inputs
/// only; these issues feed aggregates and are never returned element-wise.
pub const RESOLVED_ISSUE_FIELDS: &[&str] =
    &["created", "resolutiondate", "statuscategorychangedate", "comment"];

/// JQL for issues not in a terminal status category.
pub fn open_issues_jql(project_key: &str) -> String {
    format!(
        "project = {} AND statusCategory != Done ORDER BY updated DESC",
        escape_jql_value(project_key)
    )
}

/// JQL for issues in a terminal status category.
pub fn resolved_issues_jql(project_key: &str) -> String {
    format!(
        "project = {} AND statusCategory = Done ORDER BY updated DESC",
        escape_jql_value(project_key)
    )
}

/// Escape a JQL value — wrap in quotes if it contains special characters.
fn escape_jql_value(value: &str) -> String {
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_jql_for_plain_key() {
        assert_eq!(
            open_issues_jql("HELP"),
            "project = HELP AND statusCategory != Done ORDER BY updated DESC"
        );
    }

    #[test]
    fn resolved_jql_for_plain_key() {
        assert_eq!(
            resolved_issues_jql("HELP"),
            "project = HELP AND statusCategory = Done ORDER BY updated DESC"
        );
    }

    #[test]
    fn key_with_hyphen_is_quoted() {
        assert_eq!(
            open_issues_jql("MY-DESK"),
            "project = \"MY-DESK\" AND statusCategory != Done ORDER BY updated DESC"
        );
    }

    #[test]
    fn plain_alphanumeric_key_not_quoted() {
        assert_eq!(escape_jql_value("DEV2"), "DEV2");
    }

    #[test]
    fn quotes_inside_key_are_escaped() {
        assert_eq!(escape_jql_value("A\"B"), "\"A\\\"B\"");
    }

    #[test]
    fn resolved_fields_are_metric_inputs_only() {
        assert!(RESOLVED_ISSUE_FIELDS.contains(&"statuscategorychangedate"));
        assert!(!RESOLVED_ISSUE_FIELDS.contains(&"summary"));
    }
}
