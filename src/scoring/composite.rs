//! Composite score and derived indicators
//!
//! The composite is the unweighted mean over all seven sources with the
//! neutral default substituted for unknowns — the single place where
//! defaulting happens. Volatility and hype are derived from overlapping
//! subsets of the raw snapshot plus the meme-name heuristic; the symbol is
//! threaded explicitly wherever the heuristic applies.

use serde::Serialize;

use crate::sources::TokenSnapshot;

use super::meme::is_meme_symbol;
use super::subscores::{SourceKind, SubScores};

/// Substituted for each unknown sub-score
pub const NEUTRAL_SUBSCORE: f64 = 50.0;
/// Used when no volatility sample is available
pub const DEFAULT_VOLATILITY: f64 = 40.0;
/// Used when no hype sample is available
pub const DEFAULT_HYPE: f64 = 30.0;
/// Appended to the hype samples for meme-named symbols
const MEME_HYPE_BONUS: f64 = 80.0;

/// Unweighted mean of the seven sub-scores with neutral fill
pub fn composite_score(scores: &SubScores) -> f64 {
    let sum: f64 = scores
        .entries()
        .iter()
        .map(|(_, score)| score.unwrap_or(NEUTRAL_SUBSCORE))
        .sum();
    sum / SourceKind::ALL.len() as f64
}

/// Volatility indicator from price-change and order-book risk samples
pub fn volatility_indicator(snapshot: &TokenSnapshot) -> f64 {
    let mut samples = Vec::with_capacity(3);

    if let Some(market) = &snapshot.market {
        if market.price_change_24h.is_finite() {
            samples.push(market.price_change_24h.abs());
        }
    }
    if let Some(orderbook) = &snapshot.orderbook {
        if orderbook.volatility_risk.is_finite() {
            samples.push(orderbook.volatility_risk);
        }
    }
    if let Some(dex) = &snapshot.dex {
        if dex.price_change_24h.is_finite() {
            samples.push(dex.price_change_24h.abs());
        }
    }

    mean_or(&samples, DEFAULT_VOLATILITY)
}

/// Hype indicator from social buzz, search interest and the meme heuristic
pub fn hype_indicator(symbol: &str, snapshot: &TokenSnapshot) -> f64 {
    let mut samples = Vec::with_capacity(3);

    if let Some(social) = &snapshot.social {
        if social.hype_score.is_finite() {
            samples.push(social.hype_score);
        }
    }
    if let Some(trends) = &snapshot.trends {
        if trends.interest_over_time.is_finite() {
            samples.push(trends.interest_over_time);
        }
    }
    if is_meme_symbol(symbol) {
        samples.push(MEME_HYPE_BONUS);
    }

    mean_or(&samples, DEFAULT_HYPE)
}

fn mean_or(samples: &[f64], default: f64) -> f64 {
    if samples.is_empty() {
        default
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

/// Full scoring output for one snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub subscores: SubScores,
    pub composite: f64,
    pub volatility: f64,
    pub hype: f64,
}

impl ScoreBreakdown {
    pub fn compute(snapshot: &TokenSnapshot) -> Self {
        let subscores = SubScores::compute(snapshot);
        Self {
            composite: composite_score(&subscores),
            volatility: volatility_indicator(snapshot),
            hype: hype_indicator(&snapshot.symbol, snapshot),
            subscores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{
        DexMetrics, MarketMetrics, OrderbookMetrics, SocialMetrics, TrendsMetrics,
    };
    use chrono::Utc;

    const EPS: f64 = 1e-9;

    fn market_bag(price_change_24h: f64) -> MarketMetrics {
        MarketMetrics {
            market_cap: 20_000_000.0,
            volume_24h: 1_000_000.0,
            price: 0.8,
            price_change_24h,
            total_supply: 1e9,
            circulating_supply: None,
            max_supply: None,
            exchanges_listed: 5,
        }
    }

    #[test]
    fn test_all_missing_resolves_to_neutral_defaults() {
        let snapshot = TokenSnapshot::empty("NEWUSDT", Utc::now());
        let breakdown = ScoreBreakdown::compute(&snapshot);

        assert!((breakdown.composite - 50.0).abs() < EPS);
        assert!((breakdown.volatility - 40.0).abs() < EPS);
        assert!((breakdown.hype - 30.0).abs() < EPS);
    }

    #[test]
    fn test_partial_blend_fills_exactly_five_neutrals() {
        let mut snapshot = TokenSnapshot::empty("NEWUSDT", Utc::now());
        snapshot.market = Some(market_bag(10.0));
        snapshot.social = Some(SocialMetrics {
            hype_score: 60.0,
            sentiment: 0.2,
            community_strength: 40.0,
            growth_rate: 20.0,
        });

        let scores = SubScores::compute(&snapshot);
        let market = scores.market.unwrap();
        let social = scores.social.unwrap();

        let expected = (market + social + 5.0 * 50.0) / 7.0;
        assert!((composite_score(&scores) - expected).abs() < EPS);
    }

    #[test]
    fn test_volatility_averages_present_samples() {
        let mut snapshot = TokenSnapshot::empty("NEWUSDT", Utc::now());
        snapshot.market = Some(market_bag(-20.0));
        snapshot.orderbook = Some(OrderbookMetrics {
            spread_pct: 0.2,
            bid_walls: 0,
            ask_walls: 0,
            depth_score: 10.0,
            buy_pressure: 0.0,
            volatility_risk: 70.0,
        });

        // mean(|-20|, 70)
        assert!((volatility_indicator(&snapshot) - 45.0).abs() < EPS);

        snapshot.dex = Some(DexMetrics {
            liquidity_usd: 0.0,
            holders: 0,
            price_change_24h: -30.0,
        });
        // mean(20, 70, 30)
        assert!((volatility_indicator(&snapshot) - 40.0).abs() < EPS);
    }

    #[test]
    fn test_hype_averages_social_and_trends() {
        let mut snapshot = TokenSnapshot::empty("NEWUSDT", Utc::now());
        snapshot.social = Some(SocialMetrics {
            hype_score: 90.0,
            sentiment: 0.0,
            community_strength: 0.0,
            growth_rate: 0.0,
        });
        snapshot.trends = Some(TrendsMetrics {
            interest_over_time: 30.0,
        });

        assert!((hype_indicator("NEWUSDT", &snapshot) - 60.0).abs() < EPS);
    }

    #[test]
    fn test_meme_bonus_joins_the_hype_samples() {
        let mut snapshot = TokenSnapshot::empty("DOGEUSDT", Utc::now());
        snapshot.trends = Some(TrendsMetrics {
            interest_over_time: 20.0,
        });

        // mean(20, 80)
        assert!((hype_indicator("DOGEUSDT", &snapshot) - 50.0).abs() < EPS);

        // With no samples at all the bonus alone carries the indicator
        let bare = TokenSnapshot::empty("DOGEUSDT", Utc::now());
        assert!((hype_indicator("DOGEUSDT", &bare) - 80.0).abs() < EPS);
    }
}
