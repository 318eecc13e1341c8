//! Per-source sub-scorers
//!
//! Each sub-scorer maps one optional metric bag to a score in [0, 100], or
//! `None` when the source has no data or the computation is degenerate.
//! Defaulting happens one level up, in the composite scorer, so a missing
//! source stays distinguishable from one that legitimately scored low.

use serde::Serialize;
use std::fmt;

use crate::sources::{
    DexMetrics, GithubMetrics, HistoricalMetrics, MarketMetrics, OrderbookMetrics, SocialMetrics,
    TokenSnapshot, TrendsMetrics,
};

/// The seven metric sources, in composite order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Market,
    Social,
    Dex,
    Historical,
    Github,
    Trends,
    Orderbook,
}

impl SourceKind {
    pub const ALL: [SourceKind; 7] = [
        SourceKind::Market,
        SourceKind::Social,
        SourceKind::Dex,
        SourceKind::Historical,
        SourceKind::Github,
        SourceKind::Trends,
        SourceKind::Orderbook,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Market => "market",
            SourceKind::Social => "social",
            SourceKind::Dex => "dex",
            SourceKind::Historical => "historical",
            SourceKind::Github => "github",
            SourceKind::Trends => "trends",
            SourceKind::Orderbook => "orderbook",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Guard a computed score: degenerate arithmetic (NaN/inf from bad provider
/// values) surfaces as "unknown" for that source only, everything else is
/// clamped into [0, 100].
fn checked(score: f64) -> Option<f64> {
    if score.is_finite() {
        Some(score.clamp(0.0, 100.0))
    } else {
        None
    }
}

/// Market score: cap, volume, 24h move and exchange spread
pub fn market_subscore(metrics: Option<&MarketMetrics>) -> Option<f64> {
    let m = metrics?;
    let market_cap_score = (m.market_cap / 1_000_000.0).clamp(0.0, 100.0);
    let volume_score = (m.volume_24h / 100_000.0).clamp(0.0, 100.0);
    let volatility_score = m.price_change_24h.abs().clamp(0.0, 100.0);
    let exchange_score = (f64::from(m.exchanges_listed) / 5.0).clamp(0.0, 20.0);

    checked(
        market_cap_score * 0.4 + volume_score * 0.3 + volatility_score * 0.2 + exchange_score * 0.1,
    )
}

/// Social score: hype, sentiment, community and growth
pub fn social_subscore(metrics: Option<&SocialMetrics>) -> Option<f64> {
    let m = metrics?;
    checked(
        m.hype_score * 0.3 + m.sentiment * 0.3 + m.community_strength * 0.2 + m.growth_rate * 0.2,
    )
}

/// DEX score: liquidity, holder count and 24h move
pub fn dex_subscore(metrics: Option<&DexMetrics>) -> Option<f64> {
    let m = metrics?;
    let liquidity_score = (m.liquidity_usd / 100_000.0).clamp(0.0, 100.0);
    let holders_score = (m.holders as f64 / 1_000.0).clamp(0.0, 100.0);
    let price_impact = m.price_change_24h.abs().clamp(0.0, 100.0);

    checked(liquidity_score * 0.4 + holders_score * 0.3 + price_impact * 0.3)
}

/// Historical score: prior listing outcomes
pub fn historical_subscore(metrics: Option<&HistoricalMetrics>) -> Option<f64> {
    let m = metrics?;
    checked(m.success_rate * 0.4 + m.avg_roi_score * 0.3 + m.stability_score * 0.3)
}

/// GitHub score: commit cadence and contributor count
pub fn github_subscore(metrics: Option<&GithubMetrics>) -> Option<f64> {
    let m = metrics?;
    let commits_score = (m.commits_per_week / 50.0).clamp(0.0, 100.0);
    let contributors_score = (f64::from(m.active_contributors) / 20.0).clamp(0.0, 100.0);

    checked(commits_score * 0.6 + contributors_score * 0.4)
}

/// Trends score: search interest passed through
pub fn trends_subscore(metrics: Option<&TrendsMetrics>) -> Option<f64> {
    let m = metrics?;
    checked(m.interest_over_time.clamp(0.0, 100.0))
}

/// Order-book score: depth, pressure and inverse volatility risk
pub fn orderbook_subscore(metrics: Option<&OrderbookMetrics>) -> Option<f64> {
    let m = metrics?;
    checked(m.depth_score * 0.4 + m.buy_pressure * 0.4 + (100.0 - m.volatility_risk) * 0.2)
}

/// All seven sub-scores for one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SubScores {
    pub market: Option<f64>,
    pub social: Option<f64>,
    pub dex: Option<f64>,
    pub historical: Option<f64>,
    pub github: Option<f64>,
    pub trends: Option<f64>,
    pub orderbook: Option<f64>,
}

impl SubScores {
    /// Compute every sub-score from a snapshot
    pub fn compute(snapshot: &TokenSnapshot) -> Self {
        Self {
            market: market_subscore(snapshot.market.as_ref()),
            social: social_subscore(snapshot.social.as_ref()),
            dex: dex_subscore(snapshot.dex.as_ref()),
            historical: historical_subscore(snapshot.historical.as_ref()),
            github: github_subscore(snapshot.github.as_ref()),
            trends: trends_subscore(snapshot.trends.as_ref()),
            orderbook: orderbook_subscore(snapshot.orderbook.as_ref()),
        }
    }

    pub fn get(&self, kind: SourceKind) -> Option<f64> {
        match kind {
            SourceKind::Market => self.market,
            SourceKind::Social => self.social,
            SourceKind::Dex => self.dex,
            SourceKind::Historical => self.historical,
            SourceKind::Github => self.github,
            SourceKind::Trends => self.trends,
            SourceKind::Orderbook => self.orderbook,
        }
    }

    /// Sub-scores paired with their source, in composite order
    pub fn entries(&self) -> [(SourceKind, Option<f64>); 7] {
        [
            (SourceKind::Market, self.market),
            (SourceKind::Social, self.social),
            (SourceKind::Dex, self.dex),
            (SourceKind::Historical, self.historical),
            (SourceKind::Github, self.github),
            (SourceKind::Trends, self.trends),
            (SourceKind::Orderbook, self.orderbook),
        ]
    }

    /// Number of sources that produced a score
    pub fn informed(&self) -> usize {
        self.entries()
            .iter()
            .filter(|(_, score)| score.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const EPS: f64 = 1e-9;

    fn market_bag() -> MarketMetrics {
        MarketMetrics {
            market_cap: 50_000_000.0,
            volume_24h: 2_000_000.0,
            price: 1.25,
            price_change_24h: -12.0,
            total_supply: 1e9,
            circulating_supply: Some(5e8),
            max_supply: None,
            exchanges_listed: 30,
        }
    }

    #[test]
    fn test_absent_bags_are_unknown() {
        assert_eq!(market_subscore(None), None);
        assert_eq!(social_subscore(None), None);
        assert_eq!(dex_subscore(None), None);
        assert_eq!(historical_subscore(None), None);
        assert_eq!(github_subscore(None), None);
        assert_eq!(trends_subscore(None), None);
        assert_eq!(orderbook_subscore(None), None);
    }

    #[test]
    fn test_market_formula() {
        // cap 50M -> 50, vol 2M -> 20, |change| 12, exchanges 30/5 -> 6
        let score = market_subscore(Some(&market_bag())).unwrap();
        let expected = 50.0 * 0.4 + 20.0 * 0.3 + 12.0 * 0.2 + 6.0 * 0.1;
        assert!((score - expected).abs() < EPS);
    }

    #[test]
    fn test_market_components_are_capped() {
        let metrics = MarketMetrics {
            market_cap: 1e12,
            volume_24h: 1e12,
            price: 100.0,
            price_change_24h: 500.0,
            total_supply: 0.0,
            circulating_supply: None,
            max_supply: None,
            exchanges_listed: 1000,
        };
        let score = market_subscore(Some(&metrics)).unwrap();
        // 100*0.4 + 100*0.3 + 100*0.2 + 20*0.1
        assert!((score - 92.0).abs() < EPS);
    }

    #[test]
    fn test_nan_input_is_unknown() {
        let mut metrics = market_bag();
        metrics.market_cap = f64::NAN;
        assert_eq!(market_subscore(Some(&metrics)), None);
    }

    #[test]
    fn test_social_score_is_clamped() {
        // Growth can blow past 100; the sub-score must not
        let metrics = SocialMetrics {
            hype_score: 300.0,
            sentiment: 0.9,
            community_strength: 250.0,
            growth_rate: 800.0,
        };
        assert_eq!(social_subscore(Some(&metrics)), Some(100.0));

        let negative = SocialMetrics {
            hype_score: -120.0,
            sentiment: -1.0,
            community_strength: 0.0,
            growth_rate: -100.0,
        };
        assert_eq!(social_subscore(Some(&negative)), Some(0.0));
    }

    #[test]
    fn test_orderbook_formula() {
        let metrics = OrderbookMetrics {
            spread_pct: 0.1,
            bid_walls: 1,
            ask_walls: 0,
            depth_score: 80.0,
            buy_pressure: 0.5,
            volatility_risk: 30.0,
        };
        let score = orderbook_subscore(Some(&metrics)).unwrap();
        let expected = 80.0 * 0.4 + 0.5 * 0.4 + 70.0 * 0.2;
        assert!((score - expected).abs() < EPS);
    }

    #[test]
    fn test_trends_passthrough_and_clamp() {
        let metrics = TrendsMetrics {
            interest_over_time: 63.0,
        };
        assert_eq!(trends_subscore(Some(&metrics)), Some(63.0));

        let over = TrendsMetrics {
            interest_over_time: 180.0,
        };
        assert_eq!(trends_subscore(Some(&over)), Some(100.0));
    }

    #[test]
    fn test_compute_tracks_partial_snapshots() {
        let mut snapshot = TokenSnapshot::empty("XUSDT", Utc::now());
        snapshot.market = Some(market_bag());
        snapshot.trends = Some(TrendsMetrics {
            interest_over_time: 40.0,
        });

        let scores = SubScores::compute(&snapshot);
        assert!(scores.market.is_some());
        assert!(scores.trends.is_some());
        assert!(scores.social.is_none());
        assert_eq!(scores.informed(), 2);
    }
}
