//! Bybit v5 public REST client

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

/// Common v5 response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TimeResult {
    #[serde(rename = "timeSecond")]
    time_second: String,
}

#[derive(Debug, Deserialize)]
struct TickersResult {
    #[serde(default)]
    list: Vec<SpotTicker>,
}

#[derive(Debug, Deserialize)]
struct OrderBookResult {
    #[serde(rename = "b", default)]
    bids: Vec<[String; 2]>,
    #[serde(rename = "a", default)]
    asks: Vec<[String; 2]>,
}

#[derive(Debug, Deserialize)]
struct AnnouncementsResult {
    #[serde(default)]
    list: Vec<Announcement>,
}

/// One spot ticker row; Bybit serializes numbers as strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotTicker {
    pub symbol: String,
    #[serde(rename = "lastPrice", default)]
    pub last_price: String,
    #[serde(rename = "volume24h", default)]
    pub volume_24h: String,
    #[serde(rename = "turnover24h", default)]
    pub turnover_24h: String,
    #[serde(rename = "price24hPcnt", default)]
    pub price_24h_pcnt: String,
}

impl SpotTicker {
    pub fn last_price(&self) -> Option<f64> {
        self.last_price.parse().ok()
    }

    /// 24h turnover in the quote currency (USDT)
    pub fn turnover_24h(&self) -> Option<f64> {
        self.turnover_24h.parse().ok()
    }

    /// 24h change as a percentage (the wire value is a fraction)
    pub fn change_24h_pct(&self) -> Option<f64> {
        self.price_24h_pcnt.parse::<f64>().ok().map(|f| f * 100.0)
    }
}

/// One price level of the book
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BookLevel {
    pub price: f64,
    pub size: f64,
}

/// Parsed order book, best levels first
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderBook {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

fn parse_levels(raw: Vec<[String; 2]>) -> Vec<BookLevel> {
    raw.into_iter()
        .filter_map(|[price, size]| {
            Some(BookLevel {
                price: price.parse().ok()?,
                size: size.parse().ok()?,
            })
        })
        .collect()
}

/// One announcement-feed entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    /// Publication time in epoch milliseconds
    #[serde(rename = "dateTimestamp", default)]
    pub date_timestamp: i64,
}

impl Announcement {
    pub fn announced_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.date_timestamp)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Public Bybit v5 REST client
pub struct BybitClient {
    client: reqwest::Client,
    base_url: String,
}

impl BybitClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    async fn get_result<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "exchange request");

        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body: ApiResponse<T> = response.json().await?;
        if body.ret_code != 0 {
            return Err(Error::Exchange {
                code: body.ret_code,
                message: body.ret_msg,
            });
        }

        body.result
            .ok_or_else(|| Error::EmptyExchangeResponse(path.to_string()))
    }

    /// Bybit server time in epoch seconds
    pub async fn get_server_time(&self) -> Result<i64> {
        let result: TimeResult = self.get_result("/v5/market/time", &[]).await?;
        result
            .time_second
            .parse()
            .map_err(|_| Error::Parse(format!("bad server time: {}", result.time_second)))
    }

    /// All spot tickers
    pub async fn get_tickers(&self) -> Result<Vec<SpotTicker>> {
        let result: TickersResult = self
            .get_result("/v5/market/tickers", &[("category", "spot".to_string())])
            .await?;
        Ok(result.list)
    }

    /// Ticker for one symbol, if it trades
    pub async fn get_ticker(&self, symbol: &str) -> Result<Option<SpotTicker>> {
        let result: TickersResult = self
            .get_result(
                "/v5/market/tickers",
                &[
                    ("category", "spot".to_string()),
                    ("symbol", symbol.to_string()),
                ],
            )
            .await?;
        Ok(result.list.into_iter().next())
    }

    /// Order book for one symbol
    pub async fn get_order_book(&self, symbol: &str, limit: u32) -> Result<OrderBook> {
        let result: OrderBookResult = self
            .get_result(
                "/v5/market/orderbook",
                &[
                    ("category", "spot".to_string()),
                    ("symbol", symbol.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(OrderBook {
            bids: parse_levels(result.bids),
            asks: parse_levels(result.asks),
        })
    }

    /// Recent new-crypto announcements
    pub async fn get_announcements(&self, limit: u32) -> Result<Vec<Announcement>> {
        let result: AnnouncementsResult = self
            .get_result(
                "/v5/announcements/index",
                &[
                    ("locale", "en-US".to_string()),
                    ("type", "new_crypto".to_string()),
                    ("page", "1".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(result.list)
    }
}
