//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default = "default_exchange_base_url")]
    pub base_url: String,
    /// Announcements fetched per poll (Bybit caps the page size at 200)
    #[serde(default = "default_announcement_limit")]
    pub announcement_limit: u32,
    /// Depth levels requested for the order book
    #[serde(default = "default_orderbook_depth")]
    pub orderbook_depth: u32,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: default_exchange_base_url(),
            announcement_limit: default_announcement_limit(),
            orderbook_depth: default_orderbook_depth(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between announcement polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Window for the `history` command
    #[serde(default = "default_history_days")]
    pub history_days: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            history_days: default_history_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Hard deadline per metric source; a slow source degrades to "no data"
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,
    /// TTL for cached provider responses
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: default_source_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_initial_interval_ms")]
    pub initial_interval_ms: u64,
    #[serde(default = "default_retry_max_elapsed_ms")]
    pub max_elapsed_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_retry_initial_interval_ms(),
            max_elapsed_ms: default_retry_max_elapsed_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub coingecko: CoinGeckoConfig,
    #[serde(default)]
    pub coinmarketcap: CoinMarketCapConfig,
    #[serde(default)]
    pub dexscreener: DexScreenerConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub trends: TrendsConfig,
    #[serde(default)]
    pub social: SocialConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinGeckoConfig {
    #[serde(default = "default_coingecko_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: default_coingecko_url(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinMarketCapConfig {
    #[serde(default = "default_coinmarketcap_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for CoinMarketCapConfig {
    fn default() -> Self {
        Self {
            base_url: default_coinmarketcap_url(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexScreenerConfig {
    #[serde(default = "default_dexscreener_url")]
    pub base_url: String,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            base_url: default_dexscreener_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_github_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            base_url: default_github_url(),
            token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendsConfig {
    #[serde(default = "default_trends_url")]
    pub base_url: String,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            base_url: default_trends_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialConfig {
    #[serde(default = "default_twitter_url")]
    pub twitter_base_url: String,
    #[serde(default)]
    pub twitter_bearer_token: String,
    #[serde(default = "default_reddit_url")]
    pub reddit_base_url: String,
    #[serde(default = "default_reddit_user_agent")]
    pub reddit_user_agent: String,
    #[serde(default = "default_subreddits")]
    pub subreddits: Vec<String>,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            twitter_base_url: default_twitter_url(),
            twitter_bearer_token: String::new(),
            reddit_base_url: default_reddit_url(),
            reddit_user_agent: default_reddit_user_agent(),
            subreddits: default_subreddits(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_exchange_base_url() -> String {
    "https://api.bybit.com".to_string()
}

fn default_announcement_limit() -> u32 {
    50
}

fn default_orderbook_depth() -> u32 {
    50
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_history_days() -> i64 {
    30
}

fn default_source_timeout_secs() -> u64 {
    20
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_retry_initial_interval_ms() -> u64 {
    500
}

fn default_retry_max_elapsed_ms() -> u64 {
    8_000
}

fn default_coingecko_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_coinmarketcap_url() -> String {
    "https://pro-api.coinmarketcap.com/v1".to_string()
}

fn default_dexscreener_url() -> String {
    "https://api.dexscreener.com".to_string()
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

fn default_trends_url() -> String {
    "https://trends.google.com/trends".to_string()
}

fn default_twitter_url() -> String {
    "https://api.twitter.com/2".to_string()
}

fn default_reddit_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_reddit_user_agent() -> String {
    "listing-sniper/0.1".to_string()
}

fn default_subreddits() -> Vec<String> {
    vec![
        "CryptoCurrency".to_string(),
        "CryptoMarkets".to_string(),
        "CryptoMoonShots".to_string(),
    ]
}

fn default_database_path() -> String {
    "listings.db".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix SNIPER_)
            .add_source(
                config::Environment::with_prefix("SNIPER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.fill_env_keys();
        config.validate()?;

        Ok(config)
    }

    /// Pick up the conventional API-key environment variables when the
    /// config file leaves them empty
    fn fill_env_keys(&mut self) {
        let fill = |slot: &mut String, var: &str| {
            if slot.is_empty() {
                if let Ok(value) = std::env::var(var) {
                    *slot = value;
                }
            }
        };

        fill(&mut self.providers.coingecko.api_key, "COINGECKO_API_KEY");
        fill(&mut self.providers.coinmarketcap.api_key, "CMC_API_KEY");
        fill(&mut self.providers.github.token, "GITHUB_TOKEN");
        fill(
            &mut self.providers.social.twitter_bearer_token,
            "TWITTER_BEARER_TOKEN",
        );
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.monitor.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be at least 1");
        }

        if self.monitor.history_days < 1 {
            anyhow::bail!("history_days must be at least 1");
        }

        if self.exchange.announcement_limit == 0 || self.exchange.announcement_limit > 200 {
            anyhow::bail!(
                "announcement_limit must be between 1 and 200, got {}",
                self.exchange.announcement_limit
            );
        }

        if self.collector.source_timeout_secs == 0 {
            anyhow::bail!("source_timeout_secs must be at least 1");
        }

        if self.database.path.is_empty() {
            anyhow::bail!("database path must not be empty");
        }

        Ok(())
    }
}
