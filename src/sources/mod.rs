//! Metric sources for listing analysis
//!
//! Each source fetches one optional metric bag for a symbol. A bag that is
//! absent means the provider had no data for the token — never that the
//! token had zero activity. That distinction is load-bearing: absence maps
//! to a neutral default score downstream, not a penalized one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod collector;
pub mod dex;
pub mod github;
pub mod historical;
pub mod market;
pub mod orderbook;
pub mod social;
pub mod trends;

pub use collector::SnapshotCollector;
pub use dex::DexScreenerClient;
pub use github::GithubClient;
pub use historical::HistoricalAnalyzer;
pub use market::MarketDataClient;
pub use orderbook::OrderbookSource;
pub use social::SocialClient;
pub use trends::TrendsClient;

/// One source of metrics for a symbol
///
/// `fetch` resolves to `Ok(None)` when the provider simply has no data for
/// the token; errors are reserved for transport and protocol failures. The
/// collector treats both the same way (no data), but errors are logged.
#[async_trait]
pub trait MetricSource: Send + Sync {
    type Bag: Send;

    /// Source name for logging
    fn name(&self) -> &'static str;

    /// Fetch metrics for a symbol listed at `listed_at`
    async fn fetch(&self, symbol: &str, listed_at: DateTime<Utc>) -> Result<Option<Self::Bag>>;
}

/// Everything collected about one listing, consumed exactly once by the
/// scoring pipeline. Never mutated after collection.
#[derive(Debug, Clone, Serialize)]
pub struct TokenSnapshot {
    /// Exchange-suffixed symbol, e.g. "XUSDT"
    pub symbol: String,
    pub collected_at: DateTime<Utc>,
    pub market: Option<MarketMetrics>,
    pub social: Option<SocialMetrics>,
    pub dex: Option<DexMetrics>,
    pub historical: Option<HistoricalMetrics>,
    pub github: Option<GithubMetrics>,
    pub trends: Option<TrendsMetrics>,
    pub orderbook: Option<OrderbookMetrics>,
}

impl TokenSnapshot {
    /// Snapshot with no data from any source
    pub fn empty(symbol: impl Into<String>, collected_at: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            collected_at,
            market: None,
            social: None,
            dex: None,
            historical: None,
            github: None,
            trends: None,
            orderbook: None,
        }
    }

    /// Number of sources that produced data
    pub fn informed_sources(&self) -> usize {
        [
            self.market.is_some(),
            self.social.is_some(),
            self.dex.is_some(),
            self.historical.is_some(),
            self.github.is_some(),
            self.trends.is_some(),
            self.orderbook.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// Aggregated market data (CoinGecko, with CoinMarketCap fallback)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMetrics {
    pub market_cap: f64,
    pub volume_24h: f64,
    pub price: f64,
    /// Signed percentage
    pub price_change_24h: f64,
    pub total_supply: f64,
    pub circulating_supply: Option<f64>,
    pub max_supply: Option<f64>,
    pub exchanges_listed: u32,
}

/// Social buzz derived from Twitter and Reddit activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialMetrics {
    pub hype_score: f64,
    /// Mean text polarity in [-1, 1]
    pub sentiment: f64,
    pub community_strength: f64,
    /// Signed percentage, may exceed 100
    pub growth_rate: f64,
}

/// DEX-side liquidity and activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexMetrics {
    pub liquidity_usd: f64,
    pub holders: u64,
    /// Signed percentage
    pub price_change_24h: f64,
}

/// Outcome statistics over previously analyzed listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalMetrics {
    /// 0-100
    pub success_rate: f64,
    /// Signed percentage
    pub avg_roi_score: f64,
    pub stability_score: f64,
}

/// Development activity for the token's project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubMetrics {
    pub commits_per_week: f64,
    pub active_contributors: u32,
    pub repo_url: String,
    pub stars: u64,
    pub forks: u64,
}

/// Search-interest data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsMetrics {
    /// 0-100 scale
    pub interest_over_time: f64,
}

/// Derived order-book structure metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderbookMetrics {
    /// Best bid/ask spread as a percentage of the bid
    pub spread_pct: f64,
    /// Levels holding more than 3x the mean size (top of book)
    pub bid_walls: u32,
    pub ask_walls: u32,
    pub depth_score: f64,
    /// (bid - ask) / (bid + ask) over the top levels, in [-1, 1]
    pub buy_pressure: f64,
    /// 0-100
    pub volatility_risk: f64,
}
