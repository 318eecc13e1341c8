//! Concurrent snapshot collection
//!
//! The seven sources are independent of each other, so their fetches run
//! concurrently; the join is the synchronization barrier before scoring.
//! Each fetch is wrapped in its own deadline and degrades to "no data" on
//! failure — one slow or broken provider never blocks the others or the
//! analysis.

use chrono::{DateTime, Utc};
use futures::join;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::db::ListingStore;
use crate::exchange::bybit::BybitClient;
use crate::util::retry::RetryPolicy;

use super::dex::DexScreenerClient;
use super::github::GithubClient;
use super::historical::HistoricalAnalyzer;
use super::market::MarketDataClient;
use super::orderbook::OrderbookSource;
use super::social::SocialClient;
use super::trends::TrendsClient;
use super::{MetricSource, TokenSnapshot};

pub struct SnapshotCollector {
    market: MarketDataClient,
    social: SocialClient,
    dex: DexScreenerClient,
    historical: HistoricalAnalyzer,
    github: GithubClient,
    trends: TrendsClient,
    orderbook: OrderbookSource,
    source_timeout: Duration,
}

impl SnapshotCollector {
    pub fn new(config: &Config, bybit: Arc<BybitClient>, store: Arc<ListingStore>) -> Self {
        let retry = RetryPolicy::from_config(&config.collector.retry);
        let request_timeout = Duration::from_millis(config.exchange.request_timeout_ms);
        let cache_ttl = Duration::from_secs(config.collector.cache_ttl_secs);

        Self {
            market: MarketDataClient::new(
                config.providers.coingecko.clone(),
                config.providers.coinmarketcap.clone(),
                retry.clone(),
                cache_ttl,
                request_timeout,
            ),
            social: SocialClient::new(
                config.providers.social.clone(),
                retry.clone(),
                request_timeout,
            ),
            dex: DexScreenerClient::new(
                config.providers.dexscreener.clone(),
                retry.clone(),
                request_timeout,
            ),
            historical: HistoricalAnalyzer::new(store),
            github: GithubClient::new(
                config.providers.github.clone(),
                retry.clone(),
                request_timeout,
            ),
            trends: TrendsClient::new(config.providers.trends.clone(), retry, request_timeout),
            orderbook: OrderbookSource::new(bybit, config.exchange.orderbook_depth),
            source_timeout: Duration::from_secs(config.collector.source_timeout_secs),
        }
    }

    /// Collect every source for one listing. Always returns a snapshot; any
    /// source may be absent.
    pub async fn collect(&self, symbol: &str, listed_at: DateTime<Utc>) -> TokenSnapshot {
        debug!(symbol, "collecting snapshot");

        let (market, social, dex, historical, github, trends, orderbook) = join!(
            self.guarded(&self.market, symbol, listed_at),
            self.guarded(&self.social, symbol, listed_at),
            self.guarded(&self.dex, symbol, listed_at),
            self.guarded(&self.historical, symbol, listed_at),
            self.guarded(&self.github, symbol, listed_at),
            self.guarded(&self.trends, symbol, listed_at),
            self.guarded(&self.orderbook, symbol, listed_at),
        );

        let snapshot = TokenSnapshot {
            symbol: symbol.to_string(),
            collected_at: Utc::now(),
            market,
            social,
            dex,
            historical,
            github,
            trends,
            orderbook,
        };

        debug!(
            symbol,
            informed = snapshot.informed_sources(),
            "snapshot collected"
        );
        snapshot
    }

    async fn guarded<S: MetricSource>(
        &self,
        source: &S,
        symbol: &str,
        listed_at: DateTime<Utc>,
    ) -> Option<S::Bag> {
        match tokio::time::timeout(self.source_timeout, source.fetch(symbol, listed_at)).await {
            Ok(Ok(bag)) => bag,
            Ok(Err(e)) => {
                warn!(source = source.name(), symbol, error = %e, "source fetch failed");
                None
            }
            Err(_) => {
                warn!(
                    source = source.name(),
                    symbol,
                    timeout_secs = self.source_timeout.as_secs(),
                    "source fetch timed out"
                );
                None
            }
        }
    }
}
