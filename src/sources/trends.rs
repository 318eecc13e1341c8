//! Google Trends adapter
//!
//! Trends has no official API; this follows the widget handshake the web UI
//! uses: an explore call issues per-widget tokens, then the timeseries
//! widget returns interest-over-time points. Both responses carry an
//! anti-JSON prefix that has to be stripped before parsing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;

use crate::config::TrendsConfig;
use crate::error::{Error, Result};
use crate::sources::{MetricSource, TrendsMetrics};
use crate::util::retry::{with_retry, RetryPolicy};

/// Points averaged into the interest figure (the most recent week of data)
const RECENT_POINTS: usize = 7;

pub struct TrendsClient {
    client: reqwest::Client,
    config: TrendsConfig,
    retry: RetryPolicy,
}

impl TrendsClient {
    pub fn new(config: TrendsConfig, retry: RetryPolicy, request_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(request_timeout)
                .user_agent("Mozilla/5.0 (compatible; listing-sniper)")
                .build()
                .unwrap_or_default(),
            config,
            retry,
        }
    }

    /// Fetch search-interest metrics for an exchange symbol
    pub async fn fetch_trends(&self, symbol: &str) -> Result<Option<TrendsMetrics>> {
        let term = symbol.strip_suffix("USDT").unwrap_or(symbol);

        let Some((token, request)) = self.timeseries_widget(term).await? else {
            return Ok(None);
        };

        let url = format!("{}/api/widgetdata/multiline", self.config.base_url);
        let text = self
            .get_text(
                &url,
                &[
                    ("hl", "en-US"),
                    ("tz", "360"),
                    ("req", request.as_str()),
                    ("token", token.as_str()),
                ],
            )
            .await?;

        let body: Value = serde_json::from_str(strip_json_prefix(&text))?;
        let points = body
            .pointer("/default/timelineData")
            .and_then(Value::as_array)
            .map(|timeline| {
                timeline
                    .iter()
                    .filter_map(|point| point.pointer("/value/0").and_then(Value::as_f64))
                    .collect::<Vec<f64>>()
            })
            .unwrap_or_default();

        if points.is_empty() {
            return Ok(None);
        }

        let recent: Vec<f64> = points.iter().rev().take(RECENT_POINTS).copied().collect();
        let interest = recent.iter().sum::<f64>() / recent.len() as f64;

        Ok(Some(TrendsMetrics {
            interest_over_time: interest,
        }))
    }

    /// Run the explore handshake and return the timeseries widget's token
    /// and request payload
    async fn timeseries_widget(&self, term: &str) -> Result<Option<(String, String)>> {
        let request = serde_json::json!({
            "comparisonItem": [{ "keyword": term, "geo": "", "time": "today 3-m" }],
            "category": 0,
            "property": "",
        })
        .to_string();

        let url = format!("{}/api/explore", self.config.base_url);
        let text = self
            .get_text(&url, &[("hl", "en-US"), ("tz", "360"), ("req", request.as_str())])
            .await?;

        let body: Value = serde_json::from_str(strip_json_prefix(&text))?;
        let widget = body
            .pointer("/widgets")
            .and_then(Value::as_array)
            .and_then(|widgets| {
                widgets
                    .iter()
                    .find(|w| w.pointer("/id").and_then(Value::as_str) == Some("TIMESERIES"))
            });

        let Some(widget) = widget else {
            return Ok(None);
        };

        let token = widget.pointer("/token").and_then(Value::as_str);
        let request = widget.pointer("/request").map(|r| r.to_string());

        Ok(token.zip(request).map(|(t, r)| (t.to_string(), r)))
    }

    async fn get_text(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        with_retry("trends", &self.retry, || async {
            let response = self.client.get(url).query(params).send().await?;

            let status = response.status();
            if status.as_u16() == 429 {
                return Err(Error::RateLimited("trends"));
            }
            if !status.is_success() {
                return Err(Error::HttpStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Ok(response.text().await?)
        })
        .await
    }
}

#[async_trait]
impl MetricSource for TrendsClient {
    type Bag = TrendsMetrics;

    fn name(&self) -> &'static str {
        "trends"
    }

    async fn fetch(&self, symbol: &str, _listed_at: DateTime<Utc>) -> Result<Option<TrendsMetrics>> {
        self.fetch_trends(symbol).await
    }
}

/// Responses start with an anti-hijack prefix such as `)]}',` before the
/// JSON body
fn strip_json_prefix(text: &str) -> &str {
    text.find('{').map(|start| &text[start..]).unwrap_or(text)
}
