//! End-to-end analysis of one listing snapshot

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::scoring::ScoreBreakdown;
use crate::sources::TokenSnapshot;

use super::adjuster::{adjust_parameters, AdjustedParameters};
use super::presets::StrategyKind;
use super::selector::select_strategy;

/// The scoring pipeline's output for one listing
#[derive(Debug, Clone, Serialize)]
pub struct ListingAnalysis {
    pub symbol: String,
    pub analyzed_at: DateTime<Utc>,
    pub strategy: StrategyKind,
    pub parameters: AdjustedParameters,
    pub breakdown: ScoreBreakdown,
}

/// Score a snapshot, select a preset and adjust its parameters
///
/// Always produces a result: an entirely empty snapshot resolves to the
/// mid-risk preset with unmodified base parameters.
pub fn analyze_snapshot(snapshot: &TokenSnapshot) -> ListingAnalysis {
    let breakdown = ScoreBreakdown::compute(snapshot);

    let strategy = select_strategy(
        &snapshot.symbol,
        breakdown.composite,
        breakdown.volatility,
        breakdown.hype,
        snapshot.informed_sources(),
    );

    let parameters = adjust_parameters(
        strategy,
        breakdown.volatility,
        breakdown.hype,
        &breakdown.subscores,
    );

    debug!(
        symbol = %snapshot.symbol,
        strategy = strategy.as_str(),
        composite = breakdown.composite,
        volatility = breakdown.volatility,
        hype = breakdown.hype,
        "listing analyzed"
    );

    ListingAnalysis {
        symbol: snapshot.symbol.clone(),
        analyzed_at: snapshot.collected_at,
        strategy,
        parameters,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{MarketMetrics, SocialMetrics, TrendsMetrics};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_empty_snapshot_resolves_to_balanced_base() {
        let snapshot = TokenSnapshot::empty("NEWUSDT", Utc::now());
        let analysis = analyze_snapshot(&snapshot);

        assert_eq!(analysis.strategy, StrategyKind::BalancedPump);
        assert!((analysis.breakdown.composite - 50.0).abs() < EPS);
        assert!((analysis.breakdown.volatility - 40.0).abs() < EPS);
        assert!((analysis.breakdown.hype - 30.0).abs() < EPS);
        assert_eq!(
            analysis.parameters,
            AdjustedParameters::base(StrategyKind::BalancedPump)
        );
    }

    #[test]
    fn test_meme_symbol_dominates_weak_metrics() {
        let mut snapshot = TokenSnapshot::empty("DOGEUSDT", Utc::now());
        // Everything tuned toward Momentum
        snapshot.social = Some(SocialMetrics {
            hype_score: 0.0,
            sentiment: 0.0,
            community_strength: 0.0,
            growth_rate: 0.0,
        });
        snapshot.trends = Some(TrendsMetrics {
            interest_over_time: 0.0,
        });
        snapshot.market = Some(MarketMetrics {
            market_cap: 0.0,
            volume_24h: 0.0,
            price: 0.01,
            price_change_24h: 0.0,
            total_supply: 0.0,
            circulating_supply: None,
            max_supply: None,
            exchanges_listed: 0,
        });

        let analysis = analyze_snapshot(&snapshot);
        assert_eq!(analysis.strategy, StrategyKind::AggressivePump);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let mut snapshot = TokenSnapshot::empty("ABCUSDT", Utc::now());
        snapshot.trends = Some(TrendsMetrics {
            interest_over_time: 55.0,
        });

        let first = analyze_snapshot(&snapshot);
        let second = analyze_snapshot(&snapshot);
        assert_eq!(first.strategy, second.strategy);
        assert_eq!(first.parameters, second.parameters);
    }
}
