use std::time::Duration;

use deskpulse_common::error::DeskpulseError;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::models::{RawIssue, SearchResponse};

#[derive(Debug, Clone)]
pub struct JiraClientConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub project_key: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl JiraClientConfig {
    /// Load Jira config from environment.
    ///
    /// Base URL, email and API token are required — misconfiguration
    /// fails at startup, not on the first request. `JIRA_PROJECT`
    /// defaults to `HELP`.
    pub fn from_env() -> Result<Self, DeskpulseError> {
        let base_url = required_var("JIRA_BASE_URL")?;
        let email = required_var("JIRA_EMAIL")?;
        let api_token = required_var("JIRA_API_TOKEN")?;

        let project_key = std::env::var("JIRA_PROJECT")
            .ok()
            .map(|v| v.trim().to_uppercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "HELP".to_string());

        let max_retries = std::env::var("JIRA_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let timeout_secs = std::env::var("JIRA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            api_token,
            project_key,
            max_retries,
            timeout_secs,
        })
    }
}

fn required_var(key: &str) -> Result<String, DeskpulseError> {
    std::env::var(key)
        .map_err(|_| DeskpulseError::Config(format!("{key} is required but not set")))
}

#[derive(Debug, thiserror::Error)]
pub enum JiraClientError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Body for the JQL search endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    jql: &'a str,
    fields: &'a [&'a str],
    max_results: u32,
}

#[derive(Clone)]
pub struct JiraClient {
    client: Client,
    config: JiraClientConfig,
}

impl JiraClient {
    pub fn new(config: JiraClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Trimmed Jira base URL, used by clients to build issue links.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn project_key(&self) -> &str {
        &self.config.project_key
    }

    /// Search issues via the JQL endpoint, retrying transient errors.
    pub async fn search_issues(
        &self,
        jql: &str,
        fields: &[&str],
        max_results: u32,
    ) -> Result<Vec<RawIssue>, JiraClientError> {
        let url = format!("{}/rest/api/3/search/jql", self.config.base_url);
        let body = SearchRequest {
            jql,
            fields,
            max_results,
        };
        let response = self.request_with_retry(&url, &body).await?;
        Ok(response.issues)
    }

    async fn request_with_retry(
        &self,
        url: &str,
        body: &SearchRequest<'_>,
    ) -> Result<SearchResponse, JiraClientError> {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = std::cmp::min(1u64 << attempt, 30);
                tracing::warn!(attempt, backoff_secs, "retrying after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }

            let response = match self
                .client
                .post(url)
                .basic_auth(&self.config.email, Some(&self.config.api_token))
                .json(body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(JiraClientError::RequestError(e));
                }
            };

            let status = response.status();

            if status.is_success() {
                return response
                    .json::<SearchResponse>()
                    .await
                    .map_err(JiraClientError::RequestError);
            }

            // Honor Retry-After header for 429
            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry_after) = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    let wait = std::cmp::min(retry_after, 60);
                    tracing::warn!(wait, "rate-limited, waiting Retry-After");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                last_error = "429 Too Many Requests".to_string();
                continue;
            }

            // Retry on 5xx
            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            // Fail fast on 4xx (except 429 handled above)
            let body = response.text().await.unwrap_or_default();
            return Err(JiraClientError::HttpError { status, body });
        }

        Err(JiraClientError::MaxRetriesExceeded {
            attempts: self.config.max_retries + 1,
            last_error,
        })
    }
}
