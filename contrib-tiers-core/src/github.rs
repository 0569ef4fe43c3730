//! GitHub-backed [`ContributionSource`] using the repository statistics endpoint.
//!
//! `GET /repos/{owner}/{repo}/stats/contributors` returns one entry per author with weekly
//! buckets of additions (`a`), deletions (`d`) and commits (`c`). GitHub computes these lazily
//! and answers `202 Accepted` until the data is ready, so the client polls a bounded number
//! of times before giving up with [`FetchError::StatsPending`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{ActivityWindow, RepoId};
use crate::contract::{ContributionRecord, ContributionSource, FetchError};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "contrib-tiers";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`GithubStatsClient`].
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub base_url: String,
    pub token: Option<String>,
    /// Total number of requests made while GitHub reports the statistics as pending.
    pub max_polls: u32,
    pub poll_interval: Duration,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            max_polls: 5,
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// One author entry of the `stats/contributors` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorStats {
    /// `null` for deleted accounts.
    pub author: Option<GithubAuthor>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub weeks: Vec<WeekStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubAuthor {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekStats {
    /// Start of the week, unix seconds.
    pub w: i64,
    #[serde(default)]
    pub a: u64,
    #[serde(default)]
    pub d: u64,
    #[serde(default)]
    pub c: u64,
}

/// Fold weekly statistics into one record per author, keeping only weeks inside `window`.
pub fn records_from_stats(
    stats: Vec<ContributorStats>,
    window: &ActivityWindow,
) -> Vec<ContributionRecord> {
    stats
        .into_iter()
        .filter_map(|entry| {
            let Some(author) = entry.author else {
                debug!(total = entry.total, "Skipping stats entry without author");
                return None;
            };
            let mut record = ContributionRecord::new(author.login, 0, 0);
            for week in entry.weeks.iter().filter(|w| window.includes(w.w)) {
                record.additions = record.additions.saturating_add(week.a);
                record.deletions = record.deletions.saturating_add(week.d);
                record.commits = record.commits.saturating_add(week.c);
            }
            Some(record)
        })
        .collect()
}

pub struct GithubStatsClient {
    client: Client,
    config: GithubConfig,
}

impl GithubStatsClient {
    pub fn new(mut config: GithubConfig) -> Result<Self, FetchError> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build HTTP client");
                FetchError::Transport(e.to_string())
            })?;
        info!(
            base_url = %config.base_url,
            token_set = config.token.is_some(),
            max_polls = config.max_polls,
            "Initialized GitHub statistics client"
        );
        Ok(Self { client, config })
    }

    fn stats_url(&self, repo: &RepoId) -> String {
        format!(
            "{}/repos/{}/{}/stats/contributors",
            self.config.base_url,
            repo.owner(),
            repo.name()
        )
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        request.send().await.map_err(|e| {
            error!(error = ?e, url, "GitHub request failed");
            FetchError::Transport(e.to_string())
        })
    }
}

#[async_trait]
impl ContributionSource for GithubStatsClient {
    async fn fetch(
        &self,
        repo: &RepoId,
        window: &ActivityWindow,
    ) -> Result<Vec<ContributionRecord>, FetchError> {
        let url = self.stats_url(repo);
        let attempts = self.config.max_polls.max(1);

        for attempt in 1..=attempts {
            debug!(url = %url, attempt, "Requesting contributor statistics");
            let response = self.get(&url).await?;
            let status = response.status();

            if status == StatusCode::ACCEPTED {
                info!(repo = %repo, attempt, attempts, "GitHub is still computing statistics");
                if attempt < attempts {
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                continue;
            }
            if status == StatusCode::NO_CONTENT {
                info!(repo = %repo, "Repository has no contribution statistics");
                return Ok(Vec::new());
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                error!(repo = %repo, status = status.as_u16(), body = %body, "GitHub returned an error status");
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let body = response.text().await?;
            let stats: Vec<ContributorStats> = serde_json::from_str(&body).map_err(|e| {
                error!(repo = %repo, error = %e, "Failed to parse contributor statistics");
                FetchError::Malformed(e.to_string())
            })?;
            let records = records_from_stats(stats, window);
            info!(repo = %repo, authors = records.len(), "Fetched contributor statistics");
            return Ok(records);
        }

        error!(repo = %repo, attempts, "Statistics still pending after all attempts");
        Err(FetchError::StatsPending {
            repo: repo.to_string(),
            attempts,
        })
    }
}
