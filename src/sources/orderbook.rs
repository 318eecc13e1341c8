//! Order-book structure analysis
//!
//! Pure derivations over raw book levels: spread, walls, depth, buy
//! pressure and a volatility-risk estimate. An empty or one-sided book is
//! treated as absence of data, not as zero liquidity — new pairs often have
//! no resting orders yet.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::Result;
use crate::exchange::bybit::{BookLevel, BybitClient, OrderBook};
use crate::sources::{MetricSource, OrderbookMetrics};

/// Levels considered for depth, walls and volatility
pub const DEPTH_LEVELS: usize = 20;
/// Levels considered for buy pressure
const PRESSURE_LEVELS: usize = 5;
/// A level this many times the mean size counts as a wall
const WALL_RATIO: f64 = 3.0;

/// Derive order-book metrics from raw levels
pub fn analyze_order_book(book: &OrderBook) -> Option<OrderbookMetrics> {
    let best_bid = book.bids.first()?;
    let best_ask = book.asks.first()?;
    if best_bid.price <= 0.0 {
        return None;
    }

    let spread_pct = (best_ask.price - best_bid.price) / best_bid.price * 100.0;

    let bid_depth: f64 = book.bids.iter().take(DEPTH_LEVELS).map(|l| l.size).sum();
    let ask_depth: f64 = book.asks.iter().take(DEPTH_LEVELS).map(|l| l.size).sum();
    let depth_score = (bid_depth + ask_depth) / 2.0;

    let bid_pressure: f64 = book.bids.iter().take(PRESSURE_LEVELS).map(|l| l.size).sum();
    let ask_pressure: f64 = book.asks.iter().take(PRESSURE_LEVELS).map(|l| l.size).sum();
    let total_pressure = bid_pressure + ask_pressure;
    let buy_pressure = if total_pressure > 0.0 {
        (bid_pressure - ask_pressure) / total_pressure
    } else {
        0.0
    };

    let max_ask = book
        .asks
        .iter()
        .take(DEPTH_LEVELS)
        .map(|l| l.price)
        .fold(best_ask.price, f64::max);
    let min_bid = book
        .bids
        .iter()
        .take(DEPTH_LEVELS)
        .map(|l| l.price)
        .fold(best_bid.price, f64::min);
    let volatility_risk = (max_ask - min_bid) / best_bid.price * 100.0;

    Some(OrderbookMetrics {
        spread_pct,
        bid_walls: count_walls(&book.bids),
        ask_walls: count_walls(&book.asks),
        depth_score,
        buy_pressure,
        volatility_risk,
    })
}

fn count_walls(levels: &[BookLevel]) -> u32 {
    let sizes: Vec<f64> = levels.iter().take(DEPTH_LEVELS).map(|l| l.size).collect();
    if sizes.is_empty() {
        return 0;
    }
    let mean = sizes.iter().sum::<f64>() / sizes.len() as f64;
    sizes.iter().filter(|size| **size > mean * WALL_RATIO).count() as u32
}

/// Metric source wrapping the exchange's order-book endpoint
pub struct OrderbookSource {
    bybit: Arc<BybitClient>,
    depth: u32,
}

impl OrderbookSource {
    pub fn new(bybit: Arc<BybitClient>, depth: u32) -> Self {
        Self { bybit, depth }
    }
}

#[async_trait]
impl MetricSource for OrderbookSource {
    type Bag = OrderbookMetrics;

    fn name(&self) -> &'static str {
        "orderbook"
    }

    async fn fetch(
        &self,
        symbol: &str,
        _listed_at: DateTime<Utc>,
    ) -> Result<Option<OrderbookMetrics>> {
        let book = self.bybit.get_order_book(symbol, self.depth).await?;
        Ok(analyze_order_book(&book))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn level(price: f64, size: f64) -> BookLevel {
        BookLevel { price, size }
    }

    fn balanced_book() -> OrderBook {
        OrderBook {
            bids: vec![level(1.00, 10.0), level(0.99, 10.0), level(0.98, 10.0)],
            asks: vec![level(1.01, 10.0), level(1.02, 10.0), level(1.03, 10.0)],
        }
    }

    #[test]
    fn test_empty_book_is_absence() {
        assert!(analyze_order_book(&OrderBook::default()).is_none());
    }

    #[test]
    fn test_one_sided_book_is_absence() {
        let book = OrderBook {
            bids: vec![level(1.0, 5.0)],
            asks: vec![],
        };
        assert!(analyze_order_book(&book).is_none());
    }

    #[test]
    fn test_spread_percentage() {
        let metrics = analyze_order_book(&balanced_book()).unwrap();
        // (1.01 - 1.00) / 1.00 * 100
        assert!((metrics.spread_pct - 1.0).abs() < EPS);
    }

    #[test]
    fn test_balanced_book_has_no_pressure() {
        let metrics = analyze_order_book(&balanced_book()).unwrap();
        assert!(metrics.buy_pressure.abs() < EPS);
    }

    #[test]
    fn test_bid_heavy_book_has_positive_pressure() {
        let book = OrderBook {
            bids: vec![level(1.00, 30.0), level(0.99, 30.0)],
            asks: vec![level(1.01, 10.0), level(1.02, 10.0)],
        };
        let metrics = analyze_order_book(&book).unwrap();
        // (60 - 20) / 80
        assert!((metrics.buy_pressure - 0.5).abs() < EPS);
    }

    #[test]
    fn test_walls_counted_above_three_times_mean() {
        let mut bids = vec![level(1.00, 10.0); 9];
        bids.push(level(0.90, 200.0));
        let book = OrderBook {
            bids,
            asks: vec![level(1.01, 10.0), level(1.02, 10.0)],
        };
        let metrics = analyze_order_book(&book).unwrap();
        assert_eq!(metrics.bid_walls, 1);
        assert_eq!(metrics.ask_walls, 0);
    }

    #[test]
    fn test_depth_and_volatility() {
        let metrics = analyze_order_book(&balanced_book()).unwrap();
        // (30 + 30) / 2
        assert!((metrics.depth_score - 30.0).abs() < EPS);
        // (1.03 - 0.98) / 1.00 * 100
        assert!((metrics.volatility_risk - 5.0).abs() < EPS);
    }
}
