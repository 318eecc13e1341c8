//! Social-media adapter: Twitter search plus Reddit crypto subreddits
//!
//! Produces hype, growth, sentiment and community-strength figures from
//! mention counts around the listing time. Sentiment is a small keyword
//! lexicon over collected texts — a raw input for the scorer, not decision
//! logic.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::SocialConfig;
use crate::error::{Error, Result};
use crate::sources::{MetricSource, SocialMetrics};
use crate::util::retry::{with_retry, RetryPolicy};

/// Mentions counted before the listing vs right after it
const PRE_LISTING_WINDOW_HOURS: i64 = 24;
const POST_LISTING_WINDOW_HOURS: i64 = 1;

pub struct SocialClient {
    client: reqwest::Client,
    config: SocialConfig,
    retry: RetryPolicy,
}

#[derive(Debug, Default)]
struct TwitterWindow {
    tweet_count: u64,
    texts: Vec<String>,
}

#[derive(Debug, Default)]
struct RedditActivity {
    post_count: u64,
    comment_count: u64,
    texts: Vec<String>,
}

impl SocialClient {
    pub fn new(config: SocialConfig, retry: RetryPolicy, request_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(request_timeout)
                .user_agent(config.reddit_user_agent.clone())
                .build()
                .unwrap_or_default(),
            config,
            retry,
        }
    }

    /// Fetch social metrics for a symbol listed at `listed_at`
    pub async fn fetch_social(
        &self,
        symbol: &str,
        listed_at: DateTime<Utc>,
    ) -> Result<Option<SocialMetrics>> {
        let base = symbol.strip_suffix("USDT").unwrap_or(symbol);

        let twitter = self.twitter_windows(base, listed_at).await;
        let reddit = self.reddit_activity(base).await;

        if twitter.is_none() && reddit.is_none() {
            return Ok(None);
        }

        let (pre, post) = twitter
            .as_ref()
            .map(|(pre, post)| (pre.tweet_count, post.tweet_count))
            .unwrap_or((0, 0));

        let pre = pre.max(1) as f64;
        let growth_rate = ((post as f64 - pre) / pre) * 100.0;

        let reddit_score = reddit
            .as_ref()
            .map(|r| (r.post_count + r.comment_count) as f64 / 100.0)
            .unwrap_or(0.0);
        let hype_score = growth_rate * 0.6 + reddit_score * 0.4;

        let mut texts: Vec<String> = Vec::new();
        if let Some((pre_window, post_window)) = &twitter {
            texts.extend(pre_window.texts.iter().cloned());
            texts.extend(post_window.texts.iter().cloned());
        }
        if let Some(activity) = &reddit {
            texts.extend(activity.texts.iter().cloned());
        }
        let sentiment = mean_polarity(&texts);

        let community_strength = if post == 0 {
            0.0
        } else {
            (growth_rate * 0.5 + sentiment * 0.5) * 100.0
        };

        Ok(Some(SocialMetrics {
            hype_score,
            sentiment,
            community_strength,
            growth_rate,
        }))
    }

    /// Tweet counts and texts for the pre- and post-listing windows.
    /// Returns None when no bearer token is configured or the API fails.
    async fn twitter_windows(
        &self,
        base: &str,
        listed_at: DateTime<Utc>,
    ) -> Option<(TwitterWindow, TwitterWindow)> {
        if self.config.twitter_bearer_token.is_empty() {
            return None;
        }

        let query = format!("#{base} OR ${base}");
        let pre_start = listed_at - ChronoDuration::hours(PRE_LISTING_WINDOW_HOURS);
        let post_end = listed_at + ChronoDuration::hours(POST_LISTING_WINDOW_HOURS);

        let pre = match self.twitter_search(&query, pre_start, listed_at).await {
            Ok(window) => window,
            Err(e) => {
                debug!(base, error = %e, "twitter pre-listing search failed");
                return None;
            }
        };
        let post = match self.twitter_search(&query, listed_at, post_end).await {
            Ok(window) => window,
            Err(e) => {
                debug!(base, error = %e, "twitter post-listing search failed");
                return None;
            }
        };

        Some((pre, post))
    }

    async fn twitter_search(
        &self,
        query: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TwitterWindow> {
        // The recent-search endpoint rejects end times in the future or
        // within the last few seconds
        let latest_allowed = Utc::now() - ChronoDuration::seconds(15);
        let end = end.min(latest_allowed);
        if start >= end {
            return Ok(TwitterWindow::default());
        }

        let url = format!("{}/tweets/search/recent", self.config.twitter_base_url);
        let start_time = start.to_rfc3339();
        let end_time = end.to_rfc3339();
        let body: TwitterSearchResponse = with_retry("twitter", &self.retry, || async {
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.config.twitter_bearer_token)
                .query(&[
                    ("query", query),
                    ("max_results", "100"),
                    ("start_time", start_time.as_str()),
                    ("end_time", end_time.as_str()),
                    ("tweet.fields", "text"),
                ])
                .send()
                .await?;

            let status = response.status();
            if status.as_u16() == 429 {
                return Err(Error::RateLimited("twitter"));
            }
            if !status.is_success() {
                return Err(Error::HttpStatus {
                    status: status.as_u16(),
                    url: url.clone(),
                });
            }
            Ok(response.json().await?)
        })
        .await?;

        let tweets = body.data.unwrap_or_default();
        Ok(TwitterWindow {
            tweet_count: tweets.len() as u64,
            texts: tweets.into_iter().map(|t| t.text).collect(),
        })
    }

    /// Posts and comment counts across the configured subreddits.
    /// Returns None when every subreddit search fails.
    async fn reddit_activity(&self, base: &str) -> Option<RedditActivity> {
        let mut activity = RedditActivity::default();
        let mut any_success = false;

        for subreddit in &self.config.subreddits {
            match self.reddit_search(subreddit, base).await {
                Ok(posts) => {
                    any_success = true;
                    for post in posts {
                        activity.post_count += 1;
                        activity.comment_count += post.num_comments.unwrap_or(0);
                        let mut text = post.title;
                        if let Some(body) = post.selftext {
                            text.push(' ');
                            text.push_str(&body);
                        }
                        activity.texts.push(text);
                    }
                }
                Err(e) => {
                    debug!(subreddit, base, error = %e, "reddit search failed");
                }
            }
        }

        any_success.then_some(activity)
    }

    async fn reddit_search(&self, subreddit: &str, base: &str) -> Result<Vec<RedditPost>> {
        let url = format!(
            "{}/r/{}/search.json",
            self.config.reddit_base_url, subreddit
        );

        let body: RedditListing = with_retry("reddit", &self.retry, || async {
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("q", base),
                    ("restrict_sr", "1"),
                    ("t", "day"),
                    ("limit", "100"),
                ])
                .send()
                .await?;

            let status = response.status();
            if status.as_u16() == 429 {
                return Err(Error::RateLimited("reddit"));
            }
            if !status.is_success() {
                return Err(Error::HttpStatus {
                    status: status.as_u16(),
                    url: url.clone(),
                });
            }
            Ok(response.json().await?)
        })
        .await?;

        Ok(body
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .collect())
    }
}

#[async_trait]
impl MetricSource for SocialClient {
    type Bag = SocialMetrics;

    fn name(&self) -> &'static str {
        "social"
    }

    async fn fetch(&self, symbol: &str, listed_at: DateTime<Utc>) -> Result<Option<SocialMetrics>> {
        self.fetch_social(symbol, listed_at).await
    }
}

const POSITIVE_WORDS: &[&str] = &[
    "moon", "bullish", "pump", "gem", "buy", "win", "good", "great", "amazing", "rocket",
    "profit", "hold", "hodl", "massive", "huge", "strong", "undervalued",
];

const NEGATIVE_WORDS: &[&str] = &[
    "rug", "scam", "dump", "bearish", "sell", "bad", "dead", "exit", "crash", "avoid", "fake",
    "honeypot", "loss", "weak", "rekt", "overvalued",
];

/// Keyword-lexicon polarity in [-1, 1]
pub fn lexicon_polarity(text: &str) -> f64 {
    let mut positive = 0.0_f64;
    let mut negative = 0.0_f64;
    let mut words = 0_usize;

    for token in text.split_whitespace() {
        words += 1;
        let word = token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if POSITIVE_WORDS.contains(&word.as_str()) {
            positive += 1.0;
        } else if NEGATIVE_WORDS.contains(&word.as_str()) {
            negative += 1.0;
        }
    }

    if words == 0 {
        return 0.0;
    }
    ((positive - negative) / (words as f64).sqrt()).clamp(-1.0, 1.0)
}

fn mean_polarity(texts: &[String]) -> f64 {
    if texts.is_empty() {
        return 0.0;
    }
    texts.iter().map(|t| lexicon_polarity(t)).sum::<f64>() / texts.len() as f64
}

#[derive(Debug, Deserialize)]
struct TwitterSearchResponse {
    data: Option<Vec<Tweet>>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Debug, Deserialize)]
struct RedditListingData {
    #[serde(default)]
    children: Vec<RedditChild>,
}

#[derive(Debug, Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    #[serde(default)]
    title: String,
    selftext: Option<String>,
    num_comments: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_signs() {
        assert!(lexicon_polarity("this gem is going to moon, massive pump") > 0.0);
        assert!(lexicon_polarity("obvious rug, devs dump and exit scam") < 0.0);
        assert_eq!(lexicon_polarity(""), 0.0);
    }

    #[test]
    fn test_polarity_neutral_text() {
        assert_eq!(lexicon_polarity("the listing happens on tuesday"), 0.0);
    }

    #[test]
    fn test_polarity_strips_punctuation() {
        assert!(lexicon_polarity("Moon! Pump!! HODL...") > 0.0);
    }

    #[test]
    fn test_polarity_is_bounded() {
        let hype = "moon pump gem buy rocket profit";
        let polarity = lexicon_polarity(hype);
        assert!(polarity <= 1.0 && polarity >= -1.0);
    }

    #[test]
    fn test_mean_polarity_averages() {
        let texts = vec![
            "massive pump incoming, moon soon".to_string(),
            "total rug, avoid this scam".to_string(),
        ];
        let mean = mean_polarity(&texts);
        assert!(mean.abs() < 0.5);
    }
}
