//! DexScreener adapter
//!
//! Looks the base symbol up via the search endpoint and keeps the deepest
//! pair whose base token matches.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::config::DexScreenerConfig;
use crate::error::{Error, Result};
use crate::sources::{DexMetrics, MetricSource};
use crate::util::retry::{with_retry, RetryPolicy};

pub struct DexScreenerClient {
    client: reqwest::Client,
    config: DexScreenerConfig,
    retry: RetryPolicy,
}

impl DexScreenerClient {
    pub fn new(config: DexScreenerConfig, retry: RetryPolicy, request_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(request_timeout)
                .build()
                .unwrap_or_default(),
            config,
            retry,
        }
    }

    /// Fetch DEX metrics for an exchange symbol
    pub async fn fetch_dex(&self, symbol: &str) -> Result<Option<DexMetrics>> {
        let base = symbol.strip_suffix("USDT").unwrap_or(symbol);
        let url = format!("{}/latest/dex/search", self.config.base_url);

        let body: SearchResponse = with_retry("dexscreener", &self.retry, || async {
            let response = self.client.get(&url).query(&[("q", base)]).send().await?;

            let status = response.status();
            if status.as_u16() == 429 {
                return Err(Error::RateLimited("dexscreener"));
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

        let best = body
            .pairs
            .unwrap_or_default()
            .into_iter()
            .filter(|pair| {
                pair.base_token
                    .symbol
                    .as_deref()
                    .map(|s| s.eq_ignore_ascii_case(base))
                    .unwrap_or(false)
            })
            .max_by(|a, b| {
                liquidity_usd(a)
                    .partial_cmp(&liquidity_usd(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        let Some(pair) = best else {
            return Ok(None);
        };

        Ok(Some(DexMetrics {
            liquidity_usd: liquidity_usd(&pair),
            // DexScreener does not expose holder counts; the holders
            // component scores zero for this source
            holders: 0,
            price_change_24h: pair
                .price_change
                .as_ref()
                .and_then(|change| change.h24)
                .unwrap_or(0.0),
        }))
    }
}

#[async_trait]
impl MetricSource for DexScreenerClient {
    type Bag = DexMetrics;

    fn name(&self) -> &'static str {
        "dex"
    }

    async fn fetch(&self, symbol: &str, _listed_at: DateTime<Utc>) -> Result<Option<DexMetrics>> {
        self.fetch_dex(symbol).await
    }
}

fn liquidity_usd(pair: &DexPair) -> f64 {
    pair.liquidity
        .as_ref()
        .and_then(|liquidity| liquidity.usd)
        .unwrap_or(0.0)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    pairs: Option<Vec<DexPair>>,
}

#[derive(Debug, Deserialize)]
struct DexPair {
    #[serde(rename = "baseToken")]
    base_token: BaseToken,
    #[serde(rename = "priceChange")]
    price_change: Option<PriceChange>,
    liquidity: Option<Liquidity>,
}

#[derive(Debug, Deserialize)]
struct BaseToken {
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PriceChange {
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Liquidity {
    usd: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_response_parses() {
        let body: SearchResponse = serde_json::from_value(serde_json::json!({
            "pairs": [{
                "baseToken": {"symbol": "ABC", "address": "0x1", "name": "ABC Coin"},
                "priceChange": {"m5": 1.0, "h24": -14.5},
                "liquidity": {"usd": 250000.0, "base": 1.0, "quote": 2.0}
            }]
        }))
        .unwrap();

        let pairs = body.pairs.unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(liquidity_usd(&pairs[0]), 250_000.0);
        assert_eq!(pairs[0].price_change.as_ref().unwrap().h24, Some(-14.5));
    }

    #[test]
    fn test_missing_pairs_field() {
        let body: SearchResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(body.pairs.is_none());
    }
}
