//! Parameter adjustment for a selected preset
//!
//! A deterministic, side-effect-free transform: every multiplier applies to
//! the preset's *base* values, so calling the adjuster twice with identical
//! inputs yields identical output. The stop-loss cap and leverage bounds are
//! enforced unconditionally as a final safety net.

use serde::Serialize;

use crate::scoring::{SubScores, NEUTRAL_SUBSCORE};

use super::presets::{StrategyKind, StrategyParams};

/// Hype above this scales take-profit targets up
const HYPE_BOOST: f64 = 80.0;
/// Hype below this scales take-profit targets down
const HYPE_FADE: f64 = 30.0;
/// Volatility above this tightens the stop loss
const VOLATILITY_TIGHTEN: f64 = 60.0;
/// Volatility below this widens the stop loss
const VOLATILITY_WIDEN: f64 = 30.0;
/// Risk-score thresholds for leverage steps
const RISK_LOW: f64 = 40.0;
const RISK_HIGH: f64 = 70.0;
/// Recovery mode needs both order-book depth and market strength
const RECOVERY_ORDERBOOK: f64 = 80.0;
const RECOVERY_MARKET: f64 = 70.0;

const MIN_LEVERAGE: u8 = 1;
const MAX_LEVERAGE: u8 = 5;

/// A preset's parameters after per-listing adjustment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedParameters {
    pub hold_time: String,
    pub take_profits: Vec<f64>,
    pub stop_loss: f64,
    pub leverage: u8,
    pub trailing_stop: f64,
    pub recovery_mode: bool,
}

impl AdjustedParameters {
    /// A preset's base parameters with no perturbation applied
    pub fn base(kind: StrategyKind) -> Self {
        Self::from_params(&kind.params())
    }

    fn from_params(params: &StrategyParams) -> Self {
        Self {
            hold_time: params.hold_time.to_string(),
            take_profits: params.take_profits.clone(),
            stop_loss: params.stop_loss,
            leverage: params.leverage,
            trailing_stop: params.trailing_stop,
            recovery_mode: false,
        }
    }
}

/// Adjust the preset's base parameters for one listing
pub fn adjust_parameters(
    kind: StrategyKind,
    volatility: f64,
    hype: f64,
    scores: &SubScores,
) -> AdjustedParameters {
    adjust_from_base(kind, &kind.params(), volatility, hype, scores)
}

/// Same adjustment against an explicit base bundle
pub fn adjust_from_base(
    kind: StrategyKind,
    base: &StrategyParams,
    volatility: f64,
    hype: f64,
    scores: &SubScores,
) -> AdjustedParameters {
    let mut params = AdjustedParameters::from_params(base);

    // Take-profit scaling is a uniform multiplier, so target ordering is
    // preserved by construction
    if hype > HYPE_BOOST {
        for target in &mut params.take_profits {
            *target *= 1.2;
        }
    } else if hype < HYPE_FADE {
        for target in &mut params.take_profits {
            *target *= 0.8;
        }
    }

    if volatility > VOLATILITY_TIGHTEN {
        params.stop_loss *= 0.9;
    } else if volatility < VOLATILITY_WIDEN {
        params.stop_loss *= 1.1;
    }

    // The cap applies whether or not a multiplier branch ran; stop_loss is
    // negative, so max() pulls excessive magnitudes back to the cap
    params.stop_loss = params.stop_loss.max(kind.stop_loss_cap());

    let risk_score = scores.market.unwrap_or(NEUTRAL_SUBSCORE) * 0.4
        + scores.social.unwrap_or(NEUTRAL_SUBSCORE) * 0.3
        + scores.dex.unwrap_or(NEUTRAL_SUBSCORE) * 0.3;

    if risk_score < RISK_LOW {
        params.leverage = params.leverage.saturating_sub(1).max(MIN_LEVERAGE);
    } else if risk_score > RISK_HIGH {
        params.leverage = (params.leverage + 1).min(MAX_LEVERAGE);
    }

    // A missing orderbook or market sub-score never enables recovery mode
    if matches!(
        (scores.orderbook, scores.market),
        (Some(orderbook), Some(market)) if orderbook > RECOVERY_ORDERBOOK && market > RECOVERY_MARKET
    ) {
        params.recovery_mode = true;
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn scores_with_risk(value: f64) -> SubScores {
        SubScores {
            market: Some(value),
            social: Some(value),
            dex: Some(value),
            ..SubScores::default()
        }
    }

    #[test]
    fn test_neutral_inputs_leave_base_untouched() {
        // Midpoint defaults: no branch fires
        for kind in StrategyKind::ALL {
            let adjusted = adjust_parameters(kind, 40.0, 30.0, &SubScores::default());
            assert_eq!(adjusted, AdjustedParameters::base(kind), "{kind}");
        }
    }

    #[test]
    fn test_take_profit_scaling_ratio() {
        let boosted = adjust_parameters(
            StrategyKind::BalancedPump,
            40.0,
            90.0,
            &SubScores::default(),
        );
        let faded = adjust_parameters(
            StrategyKind::BalancedPump,
            40.0,
            10.0,
            &SubScores::default(),
        );

        for (up, down) in boosted.take_profits.iter().zip(&faded.take_profits) {
            assert!((up / down - 1.5).abs() < EPS);
        }

        // Ordering preserved under scaling
        for window in boosted.take_profits.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn test_stop_loss_tighten_passes_within_cap() {
        // Aggressive base -8 * 0.9 = -7.2, well within the -10 cap
        let adjusted = adjust_parameters(
            StrategyKind::AggressivePump,
            65.0,
            50.0,
            &SubScores::default(),
        );
        assert!((adjusted.stop_loss - (-7.2)).abs() < EPS);
    }

    #[test]
    fn test_stop_loss_widen_within_cap_is_unclamped() {
        // Custom base -9 widened by 1.1 = -9.9, still inside the -10 cap
        let base = StrategyParams {
            stop_loss: -9.0,
            ..StrategyKind::AggressivePump.params()
        };
        let adjusted = adjust_from_base(
            StrategyKind::AggressivePump,
            &base,
            20.0,
            50.0,
            &SubScores::default(),
        );
        assert!((adjusted.stop_loss - (-9.9)).abs() < EPS);
    }

    #[test]
    fn test_stop_loss_clamped_only_past_the_cap() {
        // Custom base -9.5 widened by 1.1 = -10.45, magnitude past the cap
        let base = StrategyParams {
            stop_loss: -9.5,
            ..StrategyKind::AggressivePump.params()
        };
        let adjusted = adjust_from_base(
            StrategyKind::AggressivePump,
            &base,
            20.0,
            50.0,
            &SubScores::default(),
        );
        assert!((adjusted.stop_loss - (-10.0)).abs() < EPS);
    }

    #[test]
    fn test_clamp_runs_without_a_multiplier_branch() {
        // Mid volatility: no multiplier, but an out-of-cap base still clamps
        let base = StrategyParams {
            stop_loss: -14.0,
            ..StrategyKind::BalancedPump.params()
        };
        let adjusted = adjust_from_base(
            StrategyKind::BalancedPump,
            &base,
            45.0,
            50.0,
            &SubScores::default(),
        );
        assert!((adjusted.stop_loss - (-12.0)).abs() < EPS);
    }

    #[test]
    fn test_leverage_steps_and_bounds() {
        // Base leverage 3 steps down and up
        let low = adjust_parameters(
            StrategyKind::BalancedPump,
            40.0,
            50.0,
            &scores_with_risk(0.0),
        );
        assert_eq!(low.leverage, 2);

        let high = adjust_parameters(
            StrategyKind::BalancedPump,
            40.0,
            50.0,
            &scores_with_risk(100.0),
        );
        assert_eq!(high.leverage, 4);

        // Base leverage 5 cannot exceed the ceiling
        let capped = adjust_parameters(
            StrategyKind::AggressivePump,
            40.0,
            50.0,
            &scores_with_risk(100.0),
        );
        assert_eq!(capped.leverage, 5);

        // Floor holds from a custom base of 1
        let base = StrategyParams {
            leverage: 1,
            ..StrategyKind::Momentum.params()
        };
        let floored = adjust_from_base(
            StrategyKind::Momentum,
            &base,
            40.0,
            50.0,
            &scores_with_risk(0.0),
        );
        assert_eq!(floored.leverage, 1);
    }

    #[test]
    fn test_recovery_mode_requires_both_scores_present() {
        let mut scores = SubScores::default();
        scores.orderbook = Some(90.0);
        scores.market = Some(80.0);
        let adjusted = adjust_parameters(StrategyKind::BalancedPump, 40.0, 50.0, &scores);
        assert!(adjusted.recovery_mode);

        // Missing market data never enables recovery mode
        scores.market = None;
        let adjusted = adjust_parameters(StrategyKind::BalancedPump, 40.0, 50.0, &scores);
        assert!(!adjusted.recovery_mode);

        // Present but weak market data fails the threshold
        scores.market = Some(60.0);
        let adjusted = adjust_parameters(StrategyKind::BalancedPump, 40.0, 50.0, &scores);
        assert!(!adjusted.recovery_mode);
    }

    #[test]
    fn test_adjuster_is_idempotent() {
        let scores = SubScores {
            market: Some(75.0),
            social: Some(80.0),
            dex: Some(65.0),
            orderbook: Some(85.0),
            ..SubScores::default()
        };
        let first = adjust_parameters(StrategyKind::AggressivePump, 72.0, 85.0, &scores);
        let second = adjust_parameters(StrategyKind::AggressivePump, 72.0, 85.0, &scores);
        assert_eq!(first, second);
    }
}
