//! GitHub development-activity adapter
//!
//! Best-effort: repo search by project name, then commit cadence over the
//! last four weeks and the contributor count for the top hit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::config::GithubConfig;
use crate::error::{Error, Result};
use crate::sources::{GithubMetrics, MetricSource};
use crate::util::retry::{with_retry, RetryPolicy};

/// Weeks of commit activity averaged into commits_per_week
const COMMIT_WINDOW_WEEKS: usize = 4;

pub struct GithubClient {
    client: reqwest::Client,
    config: GithubConfig,
    retry: RetryPolicy,
}

impl GithubClient {
    pub fn new(config: GithubConfig, retry: RetryPolicy, request_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(request_timeout)
                // GitHub rejects requests without a user agent
                .user_agent("listing-sniper")
                .build()
                .unwrap_or_default(),
            config,
            retry,
        }
    }

    /// Fetch development-activity metrics for an exchange symbol
    pub async fn fetch_github(&self, symbol: &str) -> Result<Option<GithubMetrics>> {
        let project = symbol
            .strip_suffix("USDT")
            .unwrap_or(symbol)
            .to_lowercase();

        let search_url = format!("{}/search/repositories", self.config.base_url);
        let query = format!("{project} in:name");
        let search: RepoSearch = self.get_json(&search_url, &[("q", query.as_str())]).await?;

        let Some(repo) = search.items.into_iter().next() else {
            return Ok(None);
        };

        let activity_url = format!(
            "{}/repos/{}/stats/commit_activity",
            self.config.base_url, repo.full_name
        );
        // GitHub answers 202 while the stats are being computed; that counts
        // as no data for this pass
        let Some(weeks) = self
            .get_json_optional::<Vec<WeekActivity>>(&activity_url, &[])
            .await?
        else {
            return Ok(None);
        };

        let window = weeks
            .iter()
            .rev()
            .take(COMMIT_WINDOW_WEEKS)
            .map(|week| week.total)
            .sum::<u64>();
        let commits_per_week = window as f64 / COMMIT_WINDOW_WEEKS as f64;

        let contributors_url = format!(
            "{}/repos/{}/contributors",
            self.config.base_url, repo.full_name
        );
        let contributors: Vec<Contributor> = self
            .get_json_optional(&contributors_url, &[("per_page", "100")])
            .await?
            .unwrap_or_default();

        Ok(Some(GithubMetrics {
            commits_per_week,
            active_contributors: contributors.len() as u32,
            repo_url: repo.html_url,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
        }))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        self.get_json_optional(url, params)
            .await?
            .ok_or_else(|| Error::provider("github", format!("stats pending for {url}")))
    }

    /// GET returning None for the 202 stats-pending response
    async fn get_json_optional<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>> {
        with_retry("github", &self.retry, || async {
            let mut request = self
                .client
                .get(url)
                .header("Accept", "application/vnd.github.v3+json")
                .query(params);
            if !self.config.token.is_empty() {
                request = request.header("Authorization", format!("token {}", self.config.token));
            }

            let response = request.send().await?;
            let status = response.status();
            if status.as_u16() == 202 {
                return Ok(None);
            }
            if status.as_u16() == 403 || status.as_u16() == 429 {
                return Err(Error::RateLimited("github"));
            }
            if !status.is_success() {
                return Err(Error::HttpStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Ok(Some(response.json().await?))
        })
        .await
    }
}

#[async_trait]
impl MetricSource for GithubClient {
    type Bag = GithubMetrics;

    fn name(&self) -> &'static str {
        "github"
    }

    async fn fetch(&self, symbol: &str, _listed_at: DateTime<Utc>) -> Result<Option<GithubMetrics>> {
        self.fetch_github(symbol).await
    }
}

#[derive(Debug, Deserialize)]
struct RepoSearch {
    #[serde(default)]
    items: Vec<Repo>,
}

#[derive(Debug, Deserialize)]
struct Repo {
    full_name: String,
    html_url: String,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
}

#[derive(Debug, Deserialize)]
struct WeekActivity {
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct Contributor {
    #[serde(default, rename = "login")]
    _login: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_window_average() {
        let weeks: Vec<WeekActivity> = serde_json::from_value(serde_json::json!([
            {"total": 1}, {"total": 2}, {"total": 10}, {"total": 20}, {"total": 30}, {"total": 40}
        ]))
        .unwrap();

        let window: u64 = weeks
            .iter()
            .rev()
            .take(COMMIT_WINDOW_WEEKS)
            .map(|week| week.total)
            .sum();
        assert_eq!(window, 100);
        assert_eq!(window as f64 / COMMIT_WINDOW_WEEKS as f64, 25.0);
    }

    #[test]
    fn test_repo_search_parses() {
        let search: RepoSearch = serde_json::from_value(serde_json::json!({
            "total_count": 1,
            "items": [{
                "full_name": "example/abc-chain",
                "html_url": "https://github.com/example/abc-chain",
                "stargazers_count": 420,
                "forks_count": 69
            }]
        }))
        .unwrap();
        assert_eq!(search.items[0].full_name, "example/abc-chain");
        assert_eq!(search.items[0].stargazers_count, 420);
    }
}
