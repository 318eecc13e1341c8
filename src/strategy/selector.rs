//! Strategy selection
//!
//! A pure classification called once per listing. Uncertainty biases toward
//! the mid-risk preset: both the zero-information case and internal
//! degeneracy resolve to BalancedPump, never Momentum, because the caller
//! treats them as "insufficient information" rather than "definitely low
//! risk".

use tracing::warn;

use crate::scoring::is_meme_symbol;

use super::presets::StrategyKind;

/// Volatility at or above this short-circuits to AggressivePump
const AGGRESSIVE_VOLATILITY: f64 = 70.0;
/// Hype at or above this short-circuits to AggressivePump
const AGGRESSIVE_HYPE: f64 = 80.0;
/// Weighted score boundaries for the three presets
const AGGRESSIVE_WEIGHTED: f64 = 70.0;
const BALANCED_WEIGHTED: f64 = 45.0;

/// Select a strategy preset for one listing
///
/// `informed_sources` is the number of metric bags the snapshot actually
/// carried; with zero the weighted classification would only restate the
/// neutral defaults, so the mid-risk preset is returned directly.
pub fn select_strategy(
    symbol: &str,
    composite: f64,
    volatility: f64,
    hype: f64,
    informed_sources: usize,
) -> StrategyKind {
    // Highest precedence: obvious pump conditions
    if is_meme_symbol(symbol) || volatility >= AGGRESSIVE_VOLATILITY || hype >= AGGRESSIVE_HYPE {
        return StrategyKind::AggressivePump;
    }

    if informed_sources == 0 {
        return StrategyKind::BalancedPump;
    }

    let weighted = composite * 0.4 + volatility * 0.3 + hype * 0.3;
    if !weighted.is_finite() {
        warn!(symbol, "degenerate weighted score, using balanced preset");
        return StrategyKind::BalancedPump;
    }

    if weighted >= AGGRESSIVE_WEIGHTED {
        StrategyKind::AggressivePump
    } else if weighted >= BALANCED_WEIGHTED {
        StrategyKind::BalancedPump
    } else {
        StrategyKind::Momentum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meme_symbol_short_circuits() {
        // Everything else tuned toward Momentum
        let strategy = select_strategy("DOGEUSDT", 10.0, 5.0, 5.0, 7);
        assert_eq!(strategy, StrategyKind::AggressivePump);
    }

    #[test]
    fn test_high_volatility_short_circuits() {
        assert_eq!(
            select_strategy("ABCUSDT", 10.0, 70.0, 5.0, 7),
            StrategyKind::AggressivePump
        );
    }

    #[test]
    fn test_high_hype_short_circuits() {
        assert_eq!(
            select_strategy("ABCUSDT", 10.0, 5.0, 80.0, 7),
            StrategyKind::AggressivePump
        );
    }

    #[test]
    fn test_no_information_is_balanced() {
        // Neutral defaults with zero informed sources
        assert_eq!(
            select_strategy("ABCUSDT", 50.0, 40.0, 30.0, 0),
            StrategyKind::BalancedPump
        );
    }

    #[test]
    fn test_weighted_classification() {
        // weighted = 0.4*90 + 0.3*60 + 0.3*70 = 75
        assert_eq!(
            select_strategy("ABCUSDT", 90.0, 60.0, 70.0, 7),
            StrategyKind::AggressivePump
        );

        // weighted = 0.4*50 + 0.3*50 + 0.3*50 = 50
        assert_eq!(
            select_strategy("ABCUSDT", 50.0, 50.0, 50.0, 7),
            StrategyKind::BalancedPump
        );

        // weighted = 0.4*30 + 0.3*30 + 0.3*30 = 30
        assert_eq!(
            select_strategy("ABCUSDT", 30.0, 30.0, 30.0, 7),
            StrategyKind::Momentum
        );
    }

    #[test]
    fn test_degenerate_score_falls_back_to_balanced() {
        assert_eq!(
            select_strategy("ABCUSDT", f64::NAN, 40.0, 30.0, 3),
            StrategyKind::BalancedPump
        );
    }
}
