//! Market-data adapter: CoinGecko with CoinMarketCap fallback
//!
//! Freshly listed tokens are often missing from one aggregator or indexed
//! under a mangled name, so the lookup walks a list of search variations of
//! the base symbol before giving up.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::debug;

use crate::config::{CoinGeckoConfig, CoinMarketCapConfig};
use crate::error::{Error, Result};
use crate::sources::{MarketMetrics, MetricSource};
use crate::util::cache::ApiCache;
use crate::util::retry::{with_retry, RetryPolicy};

pub struct MarketDataClient {
    client: reqwest::Client,
    coingecko: CoinGeckoConfig,
    coinmarketcap: CoinMarketCapConfig,
    retry: RetryPolicy,
    cache: ApiCache<Option<MarketMetrics>>,
}

impl MarketDataClient {
    pub fn new(
        coingecko: CoinGeckoConfig,
        coinmarketcap: CoinMarketCapConfig,
        retry: RetryPolicy,
        cache_ttl: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(request_timeout)
                .build()
                .unwrap_or_default(),
            coingecko,
            coinmarketcap,
            retry,
            cache: ApiCache::new(cache_ttl),
        }
    }

    /// Fetch market metrics for an exchange symbol
    pub async fn fetch_market(&self, symbol: &str) -> Result<Option<MarketMetrics>> {
        if let Some(cached) = self.cache.get(symbol) {
            return Ok(cached);
        }

        let mut metrics = None;

        for term in search_variations(symbol) {
            match self.coingecko_lookup(&term).await {
                Ok(Some(found)) => {
                    debug!(symbol, term, "coingecko match");
                    metrics = Some(found);
                    break;
                }
                Ok(None) => continue,
                Err(e) => {
                    debug!(symbol, term, error = %e, "coingecko lookup failed");
                    continue;
                }
            }
        }

        if metrics.is_none() && !self.coinmarketcap.api_key.is_empty() {
            for term in search_variations(symbol) {
                match self.coinmarketcap_quote(&term).await {
                    Ok(Some(found)) => {
                        debug!(symbol, term, "coinmarketcap match");
                        metrics = Some(found);
                        break;
                    }
                    Ok(None) => continue,
                    Err(e) => {
                        debug!(symbol, term, error = %e, "coinmarketcap lookup failed");
                        continue;
                    }
                }
            }
        }

        self.cache.insert(symbol, metrics.clone());
        Ok(metrics)
    }

    async fn coingecko_lookup(&self, term: &str) -> Result<Option<MarketMetrics>> {
        let search_url = format!("{}/search", self.coingecko.base_url);
        let search: GeckoSearch = with_retry("coingecko", &self.retry, || async {
            self.coingecko_get(&search_url, &[("query", term)]).await
        })
        .await?;

        let Some(coin) = search.coins.into_iter().next() else {
            return Ok(None);
        };

        let coin_url = format!("{}/coins/{}", self.coingecko.base_url, coin.id);
        let detail: GeckoCoin = with_retry("coingecko", &self.retry, || async {
            self.coingecko_get(
                &coin_url,
                &[
                    ("localization", "false"),
                    ("tickers", "true"),
                    ("market_data", "true"),
                    ("community_data", "false"),
                    ("developer_data", "false"),
                ],
            )
            .await
        })
        .await?;

        let Some(data) = detail.market_data else {
            return Ok(None);
        };

        let metrics = MarketMetrics {
            price: usd(&data.current_price),
            volume_24h: usd(&data.total_volume),
            market_cap: usd(&data.market_cap),
            price_change_24h: data.price_change_percentage_24h.unwrap_or(0.0),
            total_supply: data.total_supply.unwrap_or(0.0),
            circulating_supply: data.circulating_supply,
            max_supply: data.max_supply,
            exchanges_listed: detail.tickers.len() as u32,
        };

        // Aggregators return placeholder rows for unindexed tokens
        if metrics.price > 0.0 || metrics.market_cap > 0.0 {
            Ok(Some(metrics))
        } else {
            Ok(None)
        }
    }

    async fn coingecko_get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut request = self.client.get(url).query(params);
        if !self.coingecko.api_key.is_empty() {
            request = request.header("x-cg-demo-api-key", &self.coingecko.api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.as_u16() == 429 {
            return Err(Error::RateLimited("coingecko"));
        }
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    async fn coinmarketcap_quote(&self, term: &str) -> Result<Option<MarketMetrics>> {
        let url = format!("{}/cryptocurrency/quotes/latest", self.coinmarketcap.base_url);
        let symbol = term.to_uppercase();

        let body: CmcResponse = with_retry("coinmarketcap", &self.retry, || async {
            let response = self
                .client
                .get(&url)
                .header("X-CMC_PRO_API_KEY", &self.coinmarketcap.api_key)
                .header("Accept", "application/json")
                .query(&[("symbol", symbol.as_str()), ("convert", "USD")])
                .send()
                .await?;

            let status = response.status();
            if status.as_u16() == 429 {
                return Err(Error::RateLimited("coinmarketcap"));
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

        let Some(coin) = body.data.into_values().next() else {
            return Ok(None);
        };
        let Some(quote) = coin.quote.get("USD") else {
            return Ok(None);
        };

        let metrics = MarketMetrics {
            price: quote.price.unwrap_or(0.0),
            volume_24h: quote.volume_24h.unwrap_or(0.0),
            market_cap: quote.market_cap.unwrap_or(0.0),
            price_change_24h: quote.percent_change_24h.unwrap_or(0.0),
            total_supply: coin.total_supply.unwrap_or(0.0),
            circulating_supply: coin.circulating_supply,
            max_supply: coin.max_supply,
            exchanges_listed: coin.num_market_pairs.unwrap_or(1),
        };

        if metrics.price > 0.0 || metrics.market_cap > 0.0 {
            Ok(Some(metrics))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl MetricSource for MarketDataClient {
    type Bag = MarketMetrics;

    fn name(&self) -> &'static str {
        "market"
    }

    async fn fetch(&self, symbol: &str, _listed_at: DateTime<Utc>) -> Result<Option<MarketMetrics>> {
        self.fetch_market(symbol).await
    }
}

/// Base-symbol variations tried against aggregator search, covering
/// leveraged-token suffixes and separator-mangled names
fn search_variations(symbol: &str) -> Vec<String> {
    let base = symbol
        .strip_suffix("USDT")
        .unwrap_or(symbol)
        .to_lowercase();

    let mut variations = vec![
        base.clone(),
        base.replace("3l", ""),
        base.replace("3s", ""),
        base.replace("up", ""),
        base.replace("down", ""),
        base.split('_').next().unwrap_or(&base).to_string(),
        base.split('-').next().unwrap_or(&base).to_string(),
    ];

    variations.retain(|v| !v.is_empty());
    let mut seen = HashSet::new();
    variations.retain(|v| seen.insert(v.clone()));
    variations
}

fn usd(prices: &HashMap<String, Option<f64>>) -> f64 {
    prices.get("usd").copied().flatten().unwrap_or(0.0)
}

#[derive(Debug, Deserialize)]
struct GeckoSearch {
    #[serde(default)]
    coins: Vec<GeckoSearchCoin>,
}

#[derive(Debug, Deserialize)]
struct GeckoSearchCoin {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GeckoCoin {
    market_data: Option<GeckoMarketData>,
    #[serde(default)]
    tickers: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GeckoMarketData {
    #[serde(default)]
    current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    total_volume: HashMap<String, Option<f64>>,
    #[serde(default)]
    market_cap: HashMap<String, Option<f64>>,
    price_change_percentage_24h: Option<f64>,
    total_supply: Option<f64>,
    circulating_supply: Option<f64>,
    max_supply: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CmcResponse {
    #[serde(default)]
    data: HashMap<String, CmcCoin>,
}

#[derive(Debug, Deserialize)]
struct CmcCoin {
    #[serde(default)]
    quote: HashMap<String, CmcQuote>,
    total_supply: Option<f64>,
    circulating_supply: Option<f64>,
    max_supply: Option<f64>,
    num_market_pairs: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CmcQuote {
    price: Option<f64>,
    volume_24h: Option<f64>,
    market_cap: Option<f64>,
    percent_change_24h: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_variations_cover_leveraged_suffixes() {
        let variations = search_variations("BTC3LUSDT");
        assert_eq!(variations[0], "btc3l");
        assert!(variations.contains(&"btc".to_string()));
    }

    #[test]
    fn test_search_variations_split_separators() {
        let variations = search_variations("LUNA-2USDT");
        assert!(variations.contains(&"luna".to_string()));

        let variations = search_variations("GST_SOLUSDT");
        assert!(variations.contains(&"gst".to_string()));
    }

    #[test]
    fn test_search_variations_deduplicate() {
        let variations = search_variations("BTCUSDT");
        let unique: HashSet<_> = variations.iter().collect();
        assert_eq!(unique.len(), variations.len());
    }

    #[test]
    fn test_gecko_market_data_tolerates_nulls() {
        let data: GeckoMarketData = serde_json::from_value(serde_json::json!({
            "current_price": {"usd": null},
            "market_cap": {"usd": 1000000.0},
            "price_change_percentage_24h": null
        }))
        .unwrap();
        assert_eq!(usd(&data.current_price), 0.0);
        assert_eq!(usd(&data.market_cap), 1_000_000.0);
    }
}
